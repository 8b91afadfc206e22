// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_media_pager --heading-base-level=0

//! Understory Media Pager: an embeddable paged, zoomable media viewer core.
//!
//! Given an ordered collection of arbitrary elements and a function that
//! renders one element into an opaque surface, this crate presents them
//! one-at-a-time in a swipeable pager with per-page pinch/double-tap zoom,
//! vertical drag-to-dismiss with proportional background fade, lazy page
//! materialization around a sliding window, incremental data loading, and
//! overscroll notification.
//!
//! It composes the two sibling crates and adds the caller-facing surface:
//!
//! - [`understory_pager`] maintains the page window and turns continuous
//!   scroll input into discrete paging decisions.
//! - [`understory_zoomable`] runs each page's zoom/tap/dismiss state
//!   machines and the pan arbitration against the pager.
//! - [`DataSource`] + [`ViewProvider`] (this crate) bridge the caller's
//!   sequence and renderer into the engine's load/refresh contract, expose
//!   the imperative [`ViewProvider::go_to_page`] and
//!   [`ViewProvider::reload_views`] operations, and route engine and
//!   surface events into the [`PagerConfig`] callback slots.
//!
//! There is no rendering, no platform scroll view, and no clock in here:
//! the platform integration layer owns those and drives the provider
//! through the `pager_*` / `surface_*` methods, then calls
//! [`ViewProvider::tick`] once per event-loop turn to drain deferred work
//! (page-binding writes, load-more, window fills).
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use understory_media_pager::{PagerBuilder, ViewProvider};
//!
//! let photos: Vec<&str> = (0..40).map(|_| "photo").collect();
//! let current = Rc::new(Cell::new(0_usize));
//!
//! let binding = current.clone();
//! let config = PagerBuilder::new()
//!     .zoomable(1.0, 4.0)
//!     .page_binding(move |page| binding.set(page))
//!     .finish();
//!
//! let mut viewer = ViewProvider::new(photos, 5, config, |element| element.len());
//! viewer.set_viewport(kurbo::Size::new(390.0, 844.0), kurbo::Insets::ZERO);
//! viewer.tick(0);
//!
//! // Swipe one page forward and settle.
//! viewer.pager_drag_begin();
//! let extent = viewer.engine().page_extent();
//! viewer.pager_scroll(viewer.engine().scroll_offset() + extent * 0.8);
//! let target = viewer.pager_drag_end(0.7);
//! viewer.pager_scroll(target);
//! viewer.pager_settled();
//! viewer.tick(16);
//!
//! assert_eq!(viewer.current_index(), 6);
//! assert_eq!(current.get(), 6);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod provider;

pub use config::{Dismissal, PagerBuilder, PagerConfig};
pub use provider::{DataSource, ViewProvider};

// The caller-facing vocabulary of the two engine crates.
pub use understory_pager::{Edge, LoadMore, PagerEngine, PagerEvent};
pub use understory_zoomable::{
    Axis, DismissAnimation, DoubleTap, SurfacePhase, ZoomPolicy, ZoomTarget, ZoomableSurface,
};
