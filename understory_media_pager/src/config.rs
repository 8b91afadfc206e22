// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The viewer configuration record and its fluent builder.

use core::fmt;

use alloc::boxed::Box;

use understory_pager::{Edge, LoadMore};
use understory_zoomable::{Axis, DoubleTap, ZoomPolicy};

/// Context handed to the dismiss callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dismissal {
    /// When set, the embedding layer should suppress its own automatic
    /// transition: the explicit dismiss animation has already run, and
    /// stacking a second animation on top causes visual artifacts.
    pub suppress_host_animations: bool,
}

/// Immutable-per-session viewer options.
///
/// Fields are public and the record can be assembled directly, but most
/// callers go through [`PagerBuilder`]. Threshold invariants (`preload_radius
/// >= 1`, all fractions in `[0, 1]`) are programmer errors checked by
/// [`PagerConfig::validate`] at construction time.
pub struct PagerConfig<E> {
    /// Pages kept materialized on each side of the current page.
    pub preload_radius: usize,
    /// Spacing between adjacent pages along the paging axis.
    pub page_spacing: f64,
    /// Paging axis.
    pub axis: Axis,
    /// Minimum release speed needed to trigger a dismiss.
    pub dismiss_velocity: f64,
    /// Minimum drag fraction (of the page extent, in `[0, 1]`) needed to
    /// trigger a dismiss.
    pub dismiss_trigger_offset: f64,
    /// Dismiss animation duration in milliseconds.
    pub dismiss_animation_ms: u64,
    /// Suppress the host's automatic transition when dismissing; the
    /// explicit dismiss animation has already run.
    pub cancel_host_animations_on_dismiss: bool,
    /// Drag fraction (in `[0, 1]`) at which the background is fully
    /// transparent.
    pub full_fade_at: f64,
    /// Cross-axis travel beyond which the pinch gesture is disabled while
    /// unzoomed.
    pub pinch_enable_offset: f64,
    /// Overscroll fraction (of a page, in `[0, 1]`) needed to fire the
    /// overscroll callback.
    pub overscroll_threshold: f64,
    /// When the load-more callback fires.
    pub load_more_on: LoadMore,
    /// Per-element zoom policy.
    pub zoom_policy: Box<dyn Fn(&E) -> ZoomPolicy>,

    /// Called on a single tap.
    pub on_tap: Option<Box<dyn FnMut()>>,
    /// Called on a double tap (in addition to any double-tap zoom).
    pub on_double_tap: Option<Box<dyn FnMut()>>,
    /// Called when a dismiss drag begins.
    pub on_drag_start: Option<Box<dyn FnMut()>>,
    /// Called when the dismiss animation completes. The dismiss gesture is
    /// disabled entirely when unset.
    pub on_dismiss: Option<Box<dyn FnMut(Dismissal)>>,
    /// Called when more content should be loaded.
    pub on_load_more: Option<Box<dyn FnMut()>>,
    /// Called when the user overscrolls past either end of the data.
    pub on_overscroll: Option<Box<dyn FnMut(Edge)>>,
    /// Called on every zoom scale change with the element and new scale.
    pub on_zoom: Option<Box<dyn FnMut(&E, f64)>>,
    /// Write side of the caller-owned current-page binding.
    pub page_binding: Option<Box<dyn FnMut(usize)>>,
    /// Write side of the background-opacity binding, driven continuously
    /// during a dismiss drag.
    pub opacity_binding: Option<Box<dyn FnMut(f64)>>,
    /// Write side of the absolute-content-position binding (page index plus
    /// sub-page fraction), driven continuously during scroll. Horizontal
    /// axis only.
    pub position_binding: Option<Box<dyn FnMut(f64)>>,
}

impl<E> Default for PagerConfig<E> {
    fn default() -> Self {
        Self {
            preload_radius: 3,
            page_spacing: 0.0,
            axis: Axis::Horizontal,
            dismiss_velocity: 1.3,
            dismiss_trigger_offset: 0.1,
            dismiss_animation_ms: 200,
            cancel_host_animations_on_dismiss: true,
            full_fade_at: 0.2,
            pinch_enable_offset: 10.0,
            overscroll_threshold: 0.15,
            load_more_on: LoadMore::LastElement { minus: 3 },
            zoom_policy: Box::new(|_| ZoomPolicy::Disabled),
            on_tap: None,
            on_double_tap: None,
            on_drag_start: None,
            on_dismiss: None,
            on_load_more: None,
            on_overscroll: None,
            on_zoom: None,
            page_binding: None,
            opacity_binding: None,
            position_binding: None,
        }
    }
}

impl<E> PagerConfig<E> {
    /// Checks the configuration invariants.
    ///
    /// # Panics
    ///
    /// Violations (zero preload radius, fractional thresholds outside
    /// `[0, 1]`) are programmer errors and panic with a clear message.
    pub fn validate(&self) {
        assert!(
            self.preload_radius >= 1,
            "preload radius must be >= 1 for the window math to be well-defined"
        );
        for (name, value) in [
            ("dismiss_trigger_offset", self.dismiss_trigger_offset),
            ("full_fade_at", self.full_fade_at),
            ("overscroll_threshold", self.overscroll_threshold),
        ] {
            assert!(
                (0.0..=1.0).contains(&value),
                "{name} must be a fraction in [0, 1]; got {value}"
            );
        }
    }
}

impl<E> fmt::Debug for PagerConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerConfig")
            .field("preload_radius", &self.preload_radius)
            .field("page_spacing", &self.page_spacing)
            .field("axis", &self.axis)
            .field("dismiss_velocity", &self.dismiss_velocity)
            .field("dismiss_trigger_offset", &self.dismiss_trigger_offset)
            .field("dismiss_animation_ms", &self.dismiss_animation_ms)
            .field("full_fade_at", &self.full_fade_at)
            .field("pinch_enable_offset", &self.pinch_enable_offset)
            .field("overscroll_threshold", &self.overscroll_threshold)
            .field("load_more_on", &self.load_more_on)
            .field("has_dismiss", &self.on_dismiss.is_some())
            .field("has_load_more", &self.on_load_more.is_some())
            .finish_non_exhaustive()
    }
}

/// Fluent assembly of a [`PagerConfig`].
///
/// A plain mutable builder rather than modified-copy chaining; behavior is
/// identical, only ergonomics differ. Dismiss, background-opacity, and
/// absolute-position features are horizontal-only and are stripped when the
/// finished configuration's axis is vertical.
#[derive(Debug)]
pub struct PagerBuilder<E> {
    config: PagerConfig<E>,
}

impl<E> PagerBuilder<E> {
    /// Starts from the default configuration (horizontal axis).
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PagerConfig::default(),
        }
    }

    /// Sets the paging axis.
    #[must_use]
    pub fn axis(mut self, axis: Axis) -> Self {
        self.config.axis = axis;
        self
    }

    /// Enables the dismiss gesture with the given completion callback.
    ///
    /// Ignored for vertical pagers: the dismiss drag would conflict with
    /// paging.
    #[must_use]
    pub fn on_dismiss(mut self, callback: impl FnMut(Dismissal) + 'static) -> Self {
        self.config.on_dismiss = Some(Box::new(callback));
        self
    }

    /// Installs the background-opacity binding written during dismiss drags.
    #[must_use]
    pub fn background_opacity(mut self, binding: impl FnMut(f64) + 'static) -> Self {
        self.config.opacity_binding = Some(Box::new(binding));
        self
    }

    /// Sets the single-tap callback.
    #[must_use]
    pub fn on_tap(mut self, callback: impl FnMut() + 'static) -> Self {
        self.config.on_tap = Some(Box::new(callback));
        self
    }

    /// Sets the double-tap callback. Fires in addition to any configured
    /// double-tap zoom.
    #[must_use]
    pub fn on_double_tap(mut self, callback: impl FnMut() + 'static) -> Self {
        self.config.on_double_tap = Some(Box::new(callback));
        self
    }

    /// Sets the drag-start callback, fired when a dismiss drag begins.
    #[must_use]
    pub fn on_drag_start(mut self, callback: impl FnMut() + 'static) -> Self {
        self.config.on_drag_start = Some(Box::new(callback));
        self
    }

    /// Sets the load-more trigger and callback.
    #[must_use]
    pub fn should_load_more(
        mut self,
        on: LoadMore,
        callback: impl FnMut() + 'static,
    ) -> Self {
        self.config.load_more_on = on;
        self.config.on_load_more = Some(Box::new(callback));
        self
    }

    /// Enables zoom for every element with the given bounds and the default
    /// double-tap behavior (toggle to the midpoint scale).
    ///
    /// # Panics
    ///
    /// `min > max` is a programmer error and panics.
    #[must_use]
    pub fn zoomable(self, min: f64, max: f64) -> Self {
        self.zoomable_with(min, max, DoubleTap::Scale(0.5))
    }

    /// Enables zoom for every element with explicit double-tap behavior.
    #[must_use]
    pub fn zoomable_with(mut self, min: f64, max: f64, double_tap: DoubleTap) -> Self {
        assert!(
            min <= max,
            "zoomable requires min <= max; got min={min}, max={max}"
        );
        self.config.zoom_policy = Box::new(move |_| ZoomPolicy::Enabled {
            min,
            max,
            double_tap,
        });
        self
    }

    /// Resolves the zoom policy per element.
    #[must_use]
    pub fn zoomable_per_element(mut self, policy: impl Fn(&E) -> ZoomPolicy + 'static) -> Self {
        self.config.zoom_policy = Box::new(policy);
        self
    }

    /// Sets the per-frame zoom callback.
    #[must_use]
    pub fn on_zoom(mut self, callback: impl FnMut(&E, f64) + 'static) -> Self {
        self.config.on_zoom = Some(Box::new(callback));
        self
    }

    /// Sets the overscroll callback.
    #[must_use]
    pub fn overscroll(mut self, callback: impl FnMut(Edge) + 'static) -> Self {
        self.config.on_overscroll = Some(Box::new(callback));
        self
    }

    /// Installs the absolute-content-position binding (horizontal only).
    #[must_use]
    pub fn absolute_content_position(mut self, binding: impl FnMut(f64) + 'static) -> Self {
        self.config.position_binding = Some(Box::new(binding));
        self
    }

    /// Installs the write side of the caller-owned current-page binding.
    #[must_use]
    pub fn page_binding(mut self, binding: impl FnMut(usize) + 'static) -> Self {
        self.config.page_binding = Some(Box::new(binding));
        self
    }

    /// Escape hatch for the advanced settings not covered by a dedicated
    /// setter.
    #[must_use]
    pub fn settings(mut self, adjust: impl FnOnce(&mut PagerConfig<E>)) -> Self {
        adjust(&mut self.config);
        self
    }

    /// Finishes the configuration.
    ///
    /// Validates the invariants and strips horizontal-only features when the
    /// axis is vertical.
    #[must_use]
    pub fn finish(mut self) -> PagerConfig<E> {
        if self.config.axis == Axis::Vertical {
            self.config.on_dismiss = None;
            self.config.opacity_binding = None;
            self.config.position_binding = None;
        }
        self.config.validate();
        self.config
    }
}

impl<E> Default for PagerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_session_options() {
        let config: PagerConfig<u8> = PagerConfig::default();
        assert_eq!(config.preload_radius, 3);
        assert_eq!(config.dismiss_velocity, 1.3);
        assert_eq!(config.dismiss_trigger_offset, 0.1);
        assert_eq!(config.dismiss_animation_ms, 200);
        assert!(config.cancel_host_animations_on_dismiss);
        assert_eq!(config.full_fade_at, 0.2);
        assert_eq!(config.pinch_enable_offset, 10.0);
        assert_eq!(config.overscroll_threshold, 0.15);
        assert_eq!(config.load_more_on, LoadMore::LastElement { minus: 3 });
        assert_eq!(config.axis, Axis::Horizontal);
        assert!(matches!((config.zoom_policy)(&0), ZoomPolicy::Disabled));
    }

    #[test]
    fn builder_wires_callbacks_and_policy() {
        let config: PagerConfig<u8> = PagerBuilder::new()
            .zoomable(1.0, 4.0)
            .on_tap(|| {})
            .on_dismiss(|_| {})
            .should_load_more(LoadMore::LastElement { minus: 1 }, || {})
            .finish();
        assert!(config.on_tap.is_some());
        assert!(config.on_dismiss.is_some());
        assert!(config.on_load_more.is_some());
        assert_eq!(config.load_more_on, LoadMore::LastElement { minus: 1 });
        let policy = (config.zoom_policy)(&0);
        assert_eq!(
            policy,
            ZoomPolicy::Enabled {
                min: 1.0,
                max: 4.0,
                double_tap: DoubleTap::Scale(0.5),
            }
        );
    }

    #[test]
    fn vertical_axis_strips_horizontal_only_features() {
        let config: PagerConfig<u8> = PagerBuilder::new()
            .on_dismiss(|_| {})
            .background_opacity(|_| {})
            .absolute_content_position(|_| {})
            .axis(Axis::Vertical)
            .finish();
        assert!(config.on_dismiss.is_none());
        assert!(config.opacity_binding.is_none());
        assert!(config.position_binding.is_none());
    }

    #[test]
    fn settings_escape_hatch_reaches_advanced_options() {
        let config: PagerConfig<u8> = PagerBuilder::new()
            .settings(|c| {
                c.preload_radius = 2;
                c.overscroll_threshold = 0.25;
            })
            .finish();
        assert_eq!(config.preload_radius, 2);
        assert_eq!(config.overscroll_threshold, 0.25);
    }

    #[test]
    #[should_panic(expected = "preload radius")]
    fn zero_preload_radius_is_rejected() {
        let _ = PagerBuilder::<u8>::new()
            .settings(|c| c.preload_radius = 0)
            .finish();
    }

    #[test]
    #[should_panic(expected = "fraction in [0, 1]")]
    fn out_of_range_threshold_is_rejected() {
        let _ = PagerBuilder::<u8>::new()
            .settings(|c| c.dismiss_trigger_offset = 1.5)
            .finish();
    }
}
