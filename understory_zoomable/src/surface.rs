// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One materialized page: content + zoom + tap + dismiss, and the pan
//! arbitration against the enclosing pager.
//!
//! [`ZoomableSurface`] is a plain object wrapping explicit state fields; the
//! platform integration layer owns the actual scroll/zoom primitive and
//! forwards its delegate callbacks into the driver interface here
//! ([`ZoomableSurface::update_state`], [`ZoomableSurface::on_zoom_begin`],
//! [`ZoomableSurface::pan_should_begin`], ...). Exactly one of
//! {page-turn, zoomed-content-pan, dismiss-drag} is active per touch: the
//! surface's recognizers must be configured to not recognize simultaneously
//! with the pager's pan, and [`ZoomableSurface::pan_should_begin`] is the
//! single decision point for which side wins.

use core::fmt;

use kurbo::{Insets, Point, Size, Vec2};

use crate::dismiss::{DismissAnimation, DismissState};
use crate::tap::{DOUBLE_TAP_WINDOW_MS, TapOutcome, TapState};
use crate::zoom::{ZoomModel, ZoomPolicy, ZoomTarget};

/// Paging axis of the enclosing pager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Pages advance along the horizontal axis; the dismiss drag (when
    /// enabled) runs vertically.
    Horizontal,
    /// Pages advance along the vertical axis. The dismiss gesture is
    /// unavailable: it would conflict with paging.
    Vertical,
}

impl Axis {
    /// Component of `v` along the paging axis.
    #[must_use]
    pub const fn main(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// Component of `v` across the paging axis.
    #[must_use]
    pub const fn cross(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.y,
            Self::Vertical => v.x,
        }
    }

    /// Extent of `size` along the paging axis.
    #[must_use]
    pub const fn main_extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Extent of `size` across the paging axis.
    #[must_use]
    pub const fn cross_extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }
}

/// Per-surface gesture phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfacePhase {
    /// No gesture in flight.
    Idle,
    /// A surface-owned pan is live (dismiss drag or zoomed-content pan).
    Dragging,
    /// A pinch or double-tap zoom is live.
    Zooming,
    /// A dismiss has committed; the surface is being torn down. Terminal.
    DismissCommitted,
}

/// Which kind of surface-owned pan just began.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanBegin {
    /// Cross-axis drag on an unzoomed page: the dismiss gesture.
    DismissDrag,
    /// Pan of zoomed content.
    ContentPan,
}

/// Construction parameters for a [`ZoomableSurface`].
#[derive(Clone, Copy, Debug)]
pub struct SurfaceParams {
    /// Paging axis of the enclosing pager.
    pub paging_axis: Axis,
    /// Whether the dismiss gesture is wired at all. Only meaningful for
    /// [`Axis::Horizontal`]; callers must leave it off for vertical pagers.
    pub dismiss_enabled: bool,
    /// Drag fraction that must be exceeded before a release can dismiss.
    pub dismiss_trigger_offset: f64,
    /// Release velocity that must be exceeded before a release can dismiss.
    pub dismiss_velocity: f64,
    /// Dismiss animation duration in milliseconds.
    pub dismiss_animation_ms: u64,
    /// Drag fraction at which the background is fully transparent.
    pub full_fade_at: f64,
    /// Cross-axis travel beyond which the pinch recognizer is disabled while
    /// unzoomed.
    pub pinch_enable_offset: f64,
    /// Double-tap recognition window in milliseconds.
    pub double_tap_window_ms: u64,
    /// Whether the embedding layer has a double-tap callback. Together with
    /// the zoom policy this decides whether single taps must wait for
    /// double-tap failure.
    pub double_tap_listener: bool,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            paging_axis: Axis::Horizontal,
            dismiss_enabled: false,
            dismiss_trigger_offset: 0.1,
            dismiss_velocity: 1.3,
            dismiss_animation_ms: 200,
            full_fade_at: 0.2,
            pinch_enable_offset: 10.0,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            double_tap_listener: false,
        }
    }
}

/// Values recomputed by [`ZoomableSurface::update_state`] on every scroll or
/// zoom delta.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceUpdate {
    /// New background opacity to report, if the dismiss fade is active.
    /// `None` while zoomed, while a dismiss animation is in flight, or when
    /// the dismiss gesture is disabled.
    pub fade: Option<f64>,
    /// Whether the pinch recognizer should currently be enabled.
    pub pinch_enabled: bool,
    /// Whether the enclosing pager may page: `true` exactly while the
    /// content sits at its minimum scale.
    pub paging_allowed: bool,
}

/// One materialized page: the caller's element and rendered content plus all
/// per-page gesture state.
///
/// A surface's logical `index` is stable for its lifetime; eviction drops
/// the surface and all of its zoom state with it (a later re-entry of the
/// same index gets a fresh surface at baseline scale).
pub struct ZoomableSurface<E, V> {
    index: usize,
    element: E,
    content: V,

    zoom: ZoomModel,
    dismiss: DismissState,
    taps: TapState,
    phase: SurfacePhase,

    paging_axis: Axis,
    pinch_enable_offset: f64,
    double_tap_listener: bool,

    viewport: Size,
    safe_area: Insets,
    content_size: Option<Size>,

    main_offset: f64,
    cross_offset: f64,
    pinch_enabled: bool,
    dismiss_reported: bool,
}

impl<E, V> ZoomableSurface<E, V> {
    /// Creates a surface for the element at `index` with its rendered
    /// `content`.
    #[must_use]
    pub fn new(index: usize, element: E, content: V, params: SurfaceParams) -> Self {
        let dismiss = DismissState::new(
            params.dismiss_enabled && params.paging_axis == Axis::Horizontal,
            params.dismiss_trigger_offset,
            params.dismiss_velocity,
            params.full_fade_at,
            params.dismiss_animation_ms,
        );
        Self {
            index,
            element,
            content,
            zoom: ZoomModel::new(),
            dismiss,
            taps: TapState::with_window(params.double_tap_listener, params.double_tap_window_ms),
            phase: SurfacePhase::Idle,
            paging_axis: params.paging_axis,
            pinch_enable_offset: params.pinch_enable_offset,
            double_tap_listener: params.double_tap_listener,
            viewport: Size::ZERO,
            safe_area: Insets::ZERO,
            content_size: None,
            main_offset: 0.0,
            cross_offset: 0.0,
            pinch_enabled: true,
            dismiss_reported: false,
        }
    }

    /// Logical index of this page. Stable for the surface's lifetime.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The data element this page renders.
    #[must_use]
    pub const fn element(&self) -> &E {
        &self.element
    }

    /// The rendered content.
    #[must_use]
    pub const fn content(&self) -> &V {
        &self.content
    }

    /// Replaces the element value, e.g. when the caller's sequence mutated
    /// the value at this index.
    pub fn set_element(&mut self, element: E) {
        self.element = element;
    }

    /// Swaps the rendered content in place, preserving zoom and scroll
    /// state; returns the old content. Used by refresh.
    pub fn replace_content(&mut self, content: V) -> V {
        core::mem::replace(&mut self.content, content)
    }

    /// Current gesture phase.
    #[must_use]
    pub const fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Current zoom scale.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    /// Whether the enclosing pager may page (content at minimum scale).
    #[must_use]
    pub fn paging_allowed(&self) -> bool {
        self.zoom.is_unzoomed()
    }

    /// Sets the viewport size and safe-area insets.
    pub fn set_viewport(&mut self, viewport: Size, safe_area: Insets) {
        self.viewport = viewport;
        self.safe_area = safe_area;
    }

    /// Sets the content's natural (aspect-fitted, unscaled) size, used for
    /// centering. Defaults to the viewport when never set.
    pub fn set_content_size(&mut self, size: Size) {
        self.content_size = Some(size);
    }

    /// Re-evaluates the zoom policy for this page's element.
    ///
    /// Re-invoked on every state refresh: the policy is a function of the
    /// element and callers may change it between renders.
    pub fn update_zoom_policy(&mut self, policy: ZoomPolicy) {
        self.zoom.set_policy(policy);
        let gated = self.double_tap_listener
            || !matches!(self.zoom.double_tap(), crate::zoom::DoubleTap::Disabled);
        self.taps.set_gate_on_double(gated);
    }

    /// Centering insets for the current scale, bounds, and safe area.
    #[must_use]
    pub fn insets(&self) -> Insets {
        let content = self.content_size.unwrap_or(self.viewport);
        self.zoom.centering_insets(content, self.viewport, self.safe_area)
    }

    /// Resets zoom to the minimum scale (e.g. after the page scrolls out of
    /// the visible region).
    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    /// A surface-owned pan began; returns which kind it is.
    ///
    /// A dismiss drag (unzoomed, cross-axis) is what the embedding layer's
    /// drag-start callback reports.
    pub fn on_pan_begin(&mut self) -> PanBegin {
        self.taps.cancel();
        if self.phase != SurfacePhase::DismissCommitted {
            self.phase = SurfacePhase::Dragging;
        }
        if self.zoom.is_unzoomed() {
            self.dismiss.begin_drag();
            PanBegin::DismissDrag
        } else {
            PanBegin::ContentPan
        }
    }

    /// Recomputes per-delta state from the platform scroll offset.
    ///
    /// Invoked on every scroll delta of the surface's own scroll primitive.
    /// Decides whether paging is allowed, whether the pinch recognizer stays
    /// enabled (disabled once cross-axis travel exceeds the enable offset
    /// while unzoomed, to prevent competing gesture interpretation), and the
    /// dismiss fade value for the background.
    pub fn update_state(&mut self, offset: Vec2) -> SurfaceUpdate {
        self.main_offset = self.paging_axis.main(offset);
        self.cross_offset = self.paging_axis.cross(offset);

        let unzoomed = self.zoom.is_unzoomed();
        self.pinch_enabled = !(unzoomed && abs(self.cross_offset) > self.pinch_enable_offset);

        let fade = if unzoomed
            && self.dismiss.enabled()
            && !self.dismiss.is_committed()
            && self.phase != SurfacePhase::Zooming
        {
            let extent = self.paging_axis.cross_extent(self.viewport);
            Some(self.dismiss.fade_for_offset(self.cross_offset, extent))
        } else {
            None
        };

        SurfaceUpdate {
            fade,
            pinch_enabled: self.pinch_enabled,
            paging_allowed: unzoomed,
        }
    }

    /// Whether the pinch recognizer should currently be enabled.
    #[must_use]
    pub const fn pinch_enabled(&self) -> bool {
        self.pinch_enabled
    }

    /// A pinch (or animated double-tap zoom) began.
    pub fn on_zoom_begin(&mut self) {
        self.taps.cancel();
        if self.phase != SurfacePhase::DismissCommitted {
            self.phase = SurfacePhase::Zooming;
        }
    }

    /// Per-frame zoom scale change; returns the clamped scale.
    pub fn on_zoom_update(&mut self, scale: f64) -> f64 {
        self.zoom.set_scale(scale)
    }

    /// The zoom gesture ended at `scale`; returns the clamped scale.
    pub fn on_zoom_end(&mut self, scale: f64) -> f64 {
        let clamped = self.zoom.set_scale(scale);
        if self.phase == SurfacePhase::Zooming {
            self.phase = SurfacePhase::Idle;
        }
        clamped
    }

    /// Decides whether the surface's own pan should begin for a touch with
    /// the given initial translation, or whether the pager's pan wins.
    ///
    /// - Cross-axis dominant: the surface keeps the pan (dismiss drag, or
    ///   cross-axis pan of zoomed content).
    /// - Paging-axis dominant while unzoomed: always defer to the pager.
    /// - Paging-axis dominant while zoomed: defer only when the content is
    ///   at its edge in the direction of travel; otherwise the surface pans
    ///   its zoomed content.
    #[must_use]
    pub fn pan_should_begin(&self, translation: Vec2) -> bool {
        if self.phase == SurfacePhase::DismissCommitted {
            return false;
        }
        let main = self.paging_axis.main(translation);
        let cross = self.paging_axis.cross(translation);
        if abs(cross) > abs(main) {
            return true;
        }
        if self.zoom.is_unzoomed() {
            return false;
        }

        let content = self.content_size.unwrap_or(self.viewport);
        let scaled = self.paging_axis.main_extent(content) * self.zoom.scale();
        let viewport_main = self.paging_axis.main_extent(self.viewport);
        let max_offset = (scaled - viewport_main).max(0.0);
        const EDGE_EPSILON: f64 = 0.5;
        let at_leading = self.main_offset <= EDGE_EPSILON;
        let at_trailing = self.main_offset >= max_offset - EDGE_EPSILON;

        // Positive translation pulls toward earlier content; it is blocked
        // at the leading edge. Negative is blocked at the trailing edge.
        if main > 0.0 && at_leading {
            return false;
        }
        if main < 0.0 && at_trailing {
            return false;
        }
        true
    }

    /// The surface's pan was released with the given cross-axis velocity.
    ///
    /// Commits the dismiss when the drag and velocity thresholds are both
    /// exceeded (see [`DismissState::release`]); otherwise the surface
    /// returns to idle.
    pub fn on_drag_release(&mut self, velocity: f64) -> Option<DismissAnimation> {
        let extent = self.paging_axis.cross_extent(self.viewport);
        let fraction = if extent > 0.0 {
            self.cross_offset / extent
        } else {
            0.0
        };
        let zooming = self.phase == SurfacePhase::Zooming;
        let animation = self.dismiss.release(fraction, velocity, zooming);
        self.phase = if animation.is_some() {
            SurfacePhase::DismissCommitted
        } else if self.phase == SurfacePhase::Dragging {
            SurfacePhase::Idle
        } else {
            self.phase
        };
        animation
    }

    /// The host finished running the dismiss animation.
    ///
    /// Returns `true` exactly once per committed dismiss; the embedding
    /// layer invokes the dismiss callback on `true`.
    pub fn finish_dismiss(&mut self) -> bool {
        if self.phase == SurfacePhase::DismissCommitted && !self.dismiss_reported {
            self.dismiss_reported = true;
            true
        } else {
            false
        }
    }

    /// Feeds a completed tap; `None` while a zoom or dismiss is in flight.
    pub fn on_tap(&mut self, at: Point, timestamp_ms: u64) -> Option<TapOutcome> {
        match self.phase {
            SurfacePhase::Zooming | SurfacePhase::DismissCommitted => None,
            _ => Some(self.taps.on_tap(at, timestamp_ms)),
        }
    }

    /// Resolves a pending single tap whose double-tap window has lapsed.
    pub fn poll_taps(&mut self, timestamp_ms: u64) -> Option<Point> {
        self.taps.poll(timestamp_ms)
    }

    /// Computes and applies the zoom toggle for a recognized double tap.
    ///
    /// The returned target is what the host should animate to; the model's
    /// scale is updated immediately so subsequent arbitration and paging
    /// decisions see the post-zoom state.
    pub fn apply_double_tap(&mut self, at: Point) -> Option<ZoomTarget> {
        let target = self.zoom.double_tap_target(at, self.viewport)?;
        match target {
            ZoomTarget::Rect(rect) => {
                let width = self.paging_axis.main_extent(self.viewport);
                let rect_main = match self.paging_axis {
                    Axis::Horizontal => rect.width(),
                    Axis::Vertical => rect.height(),
                };
                if rect_main > 0.0 {
                    self.zoom.set_scale(width / rect_main);
                }
            }
            ZoomTarget::Scale(scale) => {
                self.zoom.set_scale(scale);
            }
        }
        Some(target)
    }
}

/// Core has no `f64::abs`.
fn abs(value: f64) -> f64 {
    if value.is_sign_negative() { -value } else { value }
}

impl<E, V> fmt::Debug for ZoomableSurface<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomableSurface")
            .field("index", &self.index)
            .field("phase", &self.phase)
            .field("scale", &self.zoom.scale())
            .field("paging_axis", &self.paging_axis)
            .finish_non_exhaustive()
    }
}
