// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom scale bounds, double-tap zoom targeting, and content centering.

use kurbo::{Insets, Point, Rect, Size};

use crate::interp::lerp;

/// Tolerance used when comparing zoom scales.
///
/// Scales arrive from continuous pinch input; exact float equality against
/// the configured minimum is too strict.
pub(crate) const SCALE_EPSILON: f64 = 1e-6;

/// Double-tap behavior configured for one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DoubleTap {
    /// Double taps do not zoom.
    Disabled,
    /// Double taps toggle between the minimum scale and a midpoint scale at
    /// `lerp(min, max, fraction)`.
    Scale(f64),
}

/// Zoom behavior for one element, as resolved by the caller's policy
/// function.
///
/// The policy is a function of the element, not a static property: the same
/// viewer can host zoomable photos next to non-zoomable items, and callers
/// may change an element's policy between refreshes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomPolicy {
    /// Zooming is disabled: the scale is pinned to `1.0` and double-tap zoom
    /// is off.
    Disabled,
    /// Zooming within `[min, max]`.
    Enabled {
        /// Minimum zoom scale. Must be positive and `<= max`.
        min: f64,
        /// Maximum zoom scale.
        max: f64,
        /// Double-tap behavior.
        double_tap: DoubleTap,
    },
}

/// What a double tap should do to the zoom state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomTarget {
    /// Zoom so that the given rectangle (in unscaled content coordinates)
    /// fills the viewport; used when zooming in around the tap point.
    Rect(Rect),
    /// Animate back to the given scale; used when zooming out.
    Scale(f64),
}

/// Scale bounds and centering math for one page's content.
#[derive(Clone, Copy, Debug)]
pub struct ZoomModel {
    min_scale: f64,
    max_scale: f64,
    scale: f64,
    double_tap: DoubleTap,
}

impl ZoomModel {
    /// Creates a model with zoom disabled (scale pinned to `1.0`).
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 1.0,
            scale: 1.0,
            double_tap: DoubleTap::Disabled,
        }
    }

    /// Applies the element's zoom policy.
    ///
    /// Re-invoked on every state refresh: the policy is a caller-supplied
    /// function of the element and may change between refreshes. `Disabled`
    /// pins `min = max = 1` and turns double-tap zoom off; `Enabled` installs
    /// the bounds and clamps the current scale into them.
    ///
    /// # Panics
    ///
    /// An enabled policy with `min > max` or a non-positive `min` is a
    /// programmer error and panics.
    pub fn set_policy(&mut self, policy: ZoomPolicy) {
        match policy {
            ZoomPolicy::Disabled => {
                self.min_scale = 1.0;
                self.max_scale = 1.0;
                self.scale = 1.0;
                self.double_tap = DoubleTap::Disabled;
            }
            ZoomPolicy::Enabled {
                min,
                max,
                double_tap,
            } => {
                assert!(
                    min <= max,
                    "zoom policy requires min <= max; got min={min}, max={max}"
                );
                assert!(min > 0.0, "zoom policy requires a positive min; got {min}");
                self.min_scale = min;
                self.max_scale = max;
                self.double_tap = double_tap;
                self.scale = self.scale.clamp(min, max);
            }
        }
    }

    /// Current zoom scale.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Configured minimum scale.
    #[must_use]
    pub const fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// Configured maximum scale.
    #[must_use]
    pub const fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Configured double-tap behavior.
    #[must_use]
    pub const fn double_tap(&self) -> DoubleTap {
        self.double_tap
    }

    /// Sets the scale, clamped into the configured bounds; returns the
    /// clamped value.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        self.scale = scale.clamp(self.min_scale, self.max_scale);
        self.scale
    }

    /// Resets the scale to the configured minimum.
    pub fn reset(&mut self) {
        self.scale = self.min_scale;
    }

    /// Returns `true` when the content is at (or within tolerance of) its
    /// minimum scale.
    ///
    /// Paging is allowed exactly in this state; a zoomed page pans its own
    /// content instead of turning pages.
    #[must_use]
    pub fn is_unzoomed(&self) -> bool {
        self.scale <= self.min_scale + SCALE_EPSILON
    }

    /// Computes what a double tap at `tap` should do, if anything.
    ///
    /// At minimum scale the target is the rectangle of size
    /// `viewport / mid_scale` centered on the tap point, so the tapped point
    /// stays under the finger; otherwise the target is the minimum scale.
    /// `mid_scale = lerp(min, max, fraction)` for `DoubleTap::Scale(fraction)`.
    #[must_use]
    pub fn double_tap_target(&self, tap: Point, viewport: Size) -> Option<ZoomTarget> {
        let DoubleTap::Scale(fraction) = self.double_tap else {
            return None;
        };
        if self.is_unzoomed() {
            let mid = lerp(self.min_scale, self.max_scale, fraction);
            if mid <= 0.0 {
                return None;
            }
            let size = Size::new(viewport.width / mid, viewport.height / mid);
            let origin = Point::new(tap.x - size.width / 2.0, tap.y - size.height / 2.0);
            Some(ZoomTarget::Rect(Rect::from_origin_size(origin, size)))
        } else {
            Some(ZoomTarget::Scale(self.min_scale))
        }
    }

    /// Symmetric insets that keep content smaller than the viewport centered.
    ///
    /// `content` is the unscaled content size; scaling is applied here.
    /// Safe-area insets are subtracted on the vertical edges so edge-to-edge
    /// rendering is preserved: an unzoomed full-bleed page gets exactly the
    /// negated safe area.
    #[must_use]
    pub fn centering_insets(&self, content: Size, viewport: Size, safe_area: Insets) -> Insets {
        let scaled = Size::new(content.width * self.scale, content.height * self.scale);
        let horizontal = ((viewport.width - scaled.width) / 2.0).max(0.0);
        let vertical = ((viewport.height - scaled.height) / 2.0).max(0.0);
        Insets::new(
            horizontal,
            vertical - safe_area.y0,
            horizontal,
            vertical - safe_area.y1,
        )
    }
}

impl Default for ZoomModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(min: f64, max: f64) -> ZoomPolicy {
        ZoomPolicy::Enabled {
            min,
            max,
            double_tap: DoubleTap::Scale(0.5),
        }
    }

    #[test]
    fn disabled_policy_pins_scale() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(1.0, 4.0));
        zoom.set_scale(3.0);
        zoom.set_policy(ZoomPolicy::Disabled);
        assert_eq!(zoom.scale(), 1.0);
        assert_eq!(zoom.min_scale(), 1.0);
        assert_eq!(zoom.max_scale(), 1.0);
        assert_eq!(zoom.double_tap(), DoubleTap::Disabled);
        assert!(zoom.is_unzoomed());
    }

    #[test]
    fn policy_change_clamps_current_scale() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(1.0, 10.0));
        zoom.set_scale(8.0);
        zoom.set_policy(enabled(1.0, 4.0));
        assert_eq!(zoom.scale(), 4.0);
    }

    #[test]
    #[should_panic(expected = "min <= max")]
    fn inverted_bounds_panic() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(4.0, 1.0));
    }

    #[test]
    fn set_scale_clamps_and_reports() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(1.0, 4.0));
        assert_eq!(zoom.set_scale(9.0), 4.0);
        assert_eq!(zoom.set_scale(0.2), 1.0);
        assert!(zoom.is_unzoomed());
    }

    #[test]
    fn double_tap_zooms_in_around_tap_point() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(1.0, 3.0));
        let viewport = Size::new(400.0, 800.0);
        let target = zoom.double_tap_target(Point::new(100.0, 200.0), viewport);
        // mid = lerp(1, 3, 0.5) = 2; rect is viewport / 2 centered on the tap.
        let Some(ZoomTarget::Rect(rect)) = target else {
            panic!("expected rect target, got {target:?}");
        };
        assert_eq!(rect.width(), 200.0);
        assert_eq!(rect.height(), 400.0);
        assert_eq!(rect.center(), Point::new(100.0, 200.0));
    }

    #[test]
    fn double_tap_toggles_back_to_min_when_zoomed() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(1.0, 3.0));
        zoom.set_scale(2.0);
        let target = zoom.double_tap_target(Point::ZERO, Size::new(400.0, 800.0));
        assert_eq!(target, Some(ZoomTarget::Scale(1.0)));
    }

    #[test]
    fn double_tap_disabled_yields_no_target() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(ZoomPolicy::Enabled {
            min: 1.0,
            max: 3.0,
            double_tap: DoubleTap::Disabled,
        });
        assert_eq!(zoom.double_tap_target(Point::ZERO, Size::new(400.0, 800.0)), None);
    }

    #[test]
    fn unzoomed_full_bleed_insets_negate_safe_area() {
        let zoom = ZoomModel::new();
        let viewport = Size::new(390.0, 844.0);
        let insets = zoom.centering_insets(viewport, viewport, Insets::new(0.0, 47.0, 0.0, 34.0));
        assert_eq!(insets.x0, 0.0);
        assert_eq!(insets.x1, 0.0);
        assert_eq!(insets.y0, -47.0);
        assert_eq!(insets.y1, -34.0);
    }

    #[test]
    fn small_content_is_centered() {
        let zoom = ZoomModel::new();
        let insets = zoom.centering_insets(
            Size::new(200.0, 100.0),
            Size::new(400.0, 400.0),
            Insets::ZERO,
        );
        assert_eq!(insets.x0, 100.0);
        assert_eq!(insets.x1, 100.0);
        assert_eq!(insets.y0, 150.0);
        assert_eq!(insets.y1, 150.0);
    }

    #[test]
    fn zoomed_content_larger_than_viewport_gets_no_centering() {
        let mut zoom = ZoomModel::new();
        zoom.set_policy(enabled(1.0, 4.0));
        zoom.set_scale(2.0);
        let viewport = Size::new(400.0, 400.0);
        let insets = zoom.centering_insets(viewport, viewport, Insets::ZERO);
        assert_eq!(insets, Insets::ZERO);
    }
}
