// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-to-dismiss state: fade feedback and the release commit decision.
//!
//! The dismiss gesture is a cross-axis drag on an unzoomed page. While the
//! drag is live the background fades proportionally to the drag distance;
//! on release, the gesture commits iff the drag went past the configured
//! trigger offset *and* the release velocity is past the configured
//! threshold. A committed dismiss is terminal: the page animates off-screen
//! and no further fade values are produced.
//!
//! Offsets and velocities use the convention that the dismiss direction is
//! negative (the content is pulled past its resting edge).

use crate::interp::normalize;

/// Animation command emitted when a dismiss commits.
///
/// The host animates the background fade to `0` and the page translation to
/// fully off-screen over `duration_ms`, then reports completion back to the
/// surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DismissAnimation {
    /// Duration of the dismiss animation in milliseconds.
    pub duration_ms: u64,
}

/// Dismiss-drag state for one surface.
#[derive(Clone, Copy, Debug)]
pub struct DismissState {
    enabled: bool,
    trigger_offset: f64,
    velocity_threshold: f64,
    full_fade_at: f64,
    animation_ms: u64,
    dragging: bool,
    committed: bool,
}

impl DismissState {
    /// Creates dismiss state.
    ///
    /// - `trigger_offset`: drag fraction (of the page extent) that must be
    ///   exceeded before a release can commit, in `[0, 1]`.
    /// - `velocity_threshold`: release speed that must be exceeded.
    /// - `full_fade_at`: drag fraction at which the background reaches full
    ///   transparency, in `[0, 1]`.
    /// - `animation_ms`: dismiss animation duration.
    #[must_use]
    pub fn new(
        enabled: bool,
        trigger_offset: f64,
        velocity_threshold: f64,
        full_fade_at: f64,
        animation_ms: u64,
    ) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&trigger_offset),
            "dismiss trigger offset must be a fraction in [0, 1]; got {trigger_offset}"
        );
        debug_assert!(
            (0.0..=1.0).contains(&full_fade_at),
            "full-fade fraction must be in [0, 1]; got {full_fade_at}"
        );
        Self {
            enabled,
            trigger_offset,
            velocity_threshold,
            full_fade_at,
            animation_ms,
            dragging: false,
            committed: false,
        }
    }

    /// Whether the dismiss gesture is enabled at all.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a drag is currently live.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether a dismiss has committed (terminal).
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Marks the start of a drag.
    pub fn begin_drag(&mut self) {
        if !self.committed {
            self.dragging = true;
        }
    }

    /// Background opacity for the given cross-axis offset.
    ///
    /// Two nested normalizations: the drag distance is first normalized
    /// against the page extent, and that fraction is normalized against the
    /// full-fade fraction, so full transparency is reached at
    /// `full_fade_at * page_extent` of drag. Non-negative offsets restore
    /// full opacity.
    #[must_use]
    pub fn fade_for_offset(&self, offset: f64, page_extent: f64) -> f64 {
        if offset >= 0.0 {
            return 1.0;
        }
        let dragged = normalize(-offset, 0.0, page_extent);
        1.0 - normalize(dragged, 0.0, self.full_fade_at)
    }

    /// Decides whether a release commits the dismiss.
    ///
    /// `drag_fraction` is the cross-axis offset divided by the page extent
    /// (negative in the dismiss direction); `velocity` is the release
    /// velocity with the same sign convention; `zooming` is `true` while a
    /// pinch is in flight. The drag ends either way; on commit the state is
    /// terminal and [`Self::fade_for_offset`] should no longer be consulted.
    pub fn release(
        &mut self,
        drag_fraction: f64,
        velocity: f64,
        zooming: bool,
    ) -> Option<DismissAnimation> {
        let was_dragging = self.dragging;
        self.dragging = false;
        if !self.enabled || self.committed || !was_dragging || zooming {
            return None;
        }
        if drag_fraction < -self.trigger_offset && velocity < -self.velocity_threshold {
            self.committed = true;
            Some(DismissAnimation {
                duration_ms: self.animation_ms,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DismissState {
        // Defaults from the viewer configuration: trigger 0.1, velocity 1.3,
        // full fade at 0.2 of the page, 200ms animation.
        DismissState::new(true, 0.1, 1.3, 0.2, 200)
    }

    #[test]
    fn fade_is_full_at_rest_and_for_positive_offsets() {
        let s = state();
        assert_eq!(s.fade_for_offset(0.0, 800.0), 1.0);
        assert_eq!(s.fade_for_offset(25.0, 800.0), 1.0);
    }

    #[test]
    fn fade_reaches_zero_at_the_full_fade_fraction() {
        let s = state();
        // 20% of an 800pt page dragged: fully transparent.
        assert_eq!(s.fade_for_offset(-160.0, 800.0), 0.0);
        // 10% dragged: halfway through the fade.
        let fade = s.fade_for_offset(-80.0, 800.0);
        assert!((fade - 0.5).abs() < 1e-9, "fade was {fade}");
        // Beyond the full-fade point it stays clamped at zero.
        assert_eq!(s.fade_for_offset(-400.0, 800.0), 0.0);
    }

    #[test]
    fn release_below_trigger_never_dismisses() {
        let mut s = state();
        s.begin_drag();
        assert_eq!(s.release(-0.05, -2.0, false), None);
        assert!(!s.is_committed());
    }

    #[test]
    fn release_below_velocity_never_dismisses() {
        let mut s = state();
        s.begin_drag();
        assert_eq!(s.release(-0.15, -1.0, false), None);
    }

    #[test]
    fn release_past_both_thresholds_dismisses_exactly_once() {
        let mut s = state();
        s.begin_drag();
        let animation = s.release(-0.15, -1.5, false);
        assert_eq!(animation, Some(DismissAnimation { duration_ms: 200 }));
        assert!(s.is_committed());

        // Terminal: a second release cannot re-fire.
        s.begin_drag();
        assert!(!s.is_dragging());
        assert_eq!(s.release(-0.5, -5.0, false), None);
    }

    #[test]
    fn release_without_drag_or_mid_zoom_is_ignored() {
        let mut s = state();
        assert_eq!(s.release(-0.5, -5.0, false), None);

        s.begin_drag();
        assert_eq!(s.release(-0.5, -5.0, true), None);
        assert!(!s.is_committed());
    }

    #[test]
    fn disabled_state_never_commits() {
        let mut s = DismissState::new(false, 0.1, 1.3, 0.2, 200);
        s.begin_drag();
        assert_eq!(s.release(-0.9, -9.0, false), None);
    }
}
