// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_zoomable --heading-base-level=0

//! Understory Zoomable: per-page zoom, tap, and drag-to-dismiss state machines.
//!
//! This crate models everything that happens *inside* a single page of a paged
//! media viewer: pinch-to-zoom within caller-configured bounds, double-tap zoom
//! toggling, single-tap recognition that yields to an in-flight double tap, a
//! vertical drag-to-dismiss gesture with proportional background fade, and the
//! arbitration rule that decides whether a touch belongs to the page or to the
//! enclosing pager.
//!
//! The core concepts are:
//!
//! - [`interp`]: the two interpolation helpers ([`interp::lerp`] and
//!   [`interp::normalize`]) everything else is built on.
//! - [`ZoomPolicy`] / [`DoubleTap`]: caller-supplied zoom behavior for one
//!   element, re-evaluated on every refresh.
//! - [`ZoomModel`]: scale bounds, double-tap zoom targeting, and centering
//!   insets for one page's content.
//! - [`TapState`]: single/double tap recognition with the "single tap requires
//!   double-tap failure" gate.
//! - [`DismissState`]: the vertical drag state machine, fade computation, and
//!   the release decision that commits a dismiss.
//! - [`ZoomableSurface`]: the composition of the above for one materialized
//!   page, owning the caller's element and rendered content, and exposing the
//!   driver interface (`update_state`, `on_zoom_begin`/`on_zoom_end`,
//!   `pan_should_begin`, `on_drag_release`) that a platform integration layer
//!   forwards its scroll/gesture callbacks into.
//!
//! This crate deliberately does **not** know about scroll views, gesture
//! recognizers, or any particular UI framework. Host frameworks are
//! responsible for:
//!
//! - Owning the platform scroll/zoom primitive and forwarding its continuous
//!   state (offsets, scale, velocities, timestamps) into the surface.
//! - Applying the values the surface reports back: background fade, centering
//!   insets, zoom target rectangles, and the dismiss animation command.
//! - Running animations; the surface only decides *that* and *for how long*
//!   something animates, never interpolates frames itself.
//!
//! ## Minimal example
//!
//! Drag a page downward and watch the background fade, then release hard
//! enough to commit a dismiss:
//!
//! ```rust
//! use understory_zoomable::{SurfaceParams, ZoomableSurface};
//!
//! let params = SurfaceParams {
//!     dismiss_enabled: true,
//!     ..SurfaceParams::default()
//! };
//! let mut surface = ZoomableSurface::new(0, "element", "rendered", params);
//! surface.set_viewport(kurbo::Size::new(390.0, 844.0), kurbo::Insets::ZERO);
//!
//! surface.on_pan_begin();
//! // Dragged toward dismissal: the background starts fading.
//! let update = surface.update_state(kurbo::Vec2::new(0.0, -84.4));
//! assert!(update.fade.unwrap() < 1.0);
//!
//! // A fast release past the trigger offset commits the dismiss.
//! surface.update_state(kurbo::Vec2::new(0.0, -126.6));
//! let animation = surface.on_drag_release(-1.5).expect("dismiss should commit");
//! assert_eq!(animation.duration_ms, 200);
//! assert!(surface.finish_dismiss());
//! ```
//!
//! All geometry is `kurbo`: tap locations are [`kurbo::Point`], pan
//! translations [`kurbo::Vec2`], viewports [`kurbo::Size`], zoom targets
//! [`kurbo::Rect`], and centering insets [`kurbo::Insets`].
//!
//! This crate is `no_std`.

#![no_std]

pub mod interp;

mod dismiss;
mod surface;
mod tap;
mod zoom;

pub use dismiss::{DismissAnimation, DismissState};
pub use surface::{Axis, PanBegin, SurfaceParams, SurfacePhase, SurfaceUpdate, ZoomableSurface};
pub use tap::{DOUBLE_TAP_WINDOW_MS, TapOutcome, TapState};
pub use zoom::{DoubleTap, ZoomModel, ZoomTarget, ZoomPolicy};
