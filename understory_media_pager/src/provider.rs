// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The coordinator between a caller-supplied data sequence, the per-element
//! renderer, and the pager engine.

use core::marker::PhantomData;

use alloc::vec::Vec;

use kurbo::{Insets, Point, Size, Vec2};

use understory_pager::{EngineParams, PageLoader, PagerEngine, PagerEvent};
use understory_zoomable::{
    Axis, DismissAnimation, PanBegin, SurfaceParams, TapOutcome, ZoomPolicy, ZoomTarget,
    ZoomableSurface,
};

use crate::config::{Dismissal, PagerConfig};

/// A caller-owned random-access sequence of elements.
///
/// The viewer never mutates the sequence, only reads by index and observes
/// the length. It may grow, shrink, or have elements replaced between any
/// two renders; call [`ViewProvider::reload_views`] afterwards so the window
/// reacts.
pub trait DataSource {
    /// Element type.
    type Element;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` when the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`, or `None` out of bounds. Out-of-range reads
    /// are expected steady-state behavior (the window probes past its
    /// edges), not errors.
    fn get(&self, index: usize) -> Option<&Self::Element>;
}

impl<E> DataSource for Vec<E> {
    type Element = E;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&E> {
        self.as_slice().get(index)
    }
}

impl<E> DataSource for &[E] {
    type Element = E;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Option<&E> {
        (**self).get(index)
    }
}

/// Adapts the data sequence + renderer into the engine's page-loading
/// contract: probe the element, render it, wrap it in a surface tagged with
/// its index.
struct SurfaceLoader<'a, D: DataSource, V, R> {
    data: &'a D,
    render: &'a mut R,
    zoom_policy: &'a dyn Fn(&D::Element) -> ZoomPolicy,
    params: SurfaceParams,
    viewport: Size,
    safe_area: Insets,
    _content: PhantomData<fn() -> V>,
}

impl<D, V, R> PageLoader for SurfaceLoader<'_, D, V, R>
where
    D: DataSource,
    D::Element: Clone,
    R: FnMut(&D::Element) -> V,
{
    type Page = ZoomableSurface<D::Element, V>;

    fn load_page(&mut self, index: usize) -> Option<Self::Page> {
        let element = self.data.get(index)?.clone();
        let content = (self.render)(&element);
        let mut surface = ZoomableSurface::new(index, element, content, self.params);
        surface.set_viewport(self.viewport, self.safe_area);
        let policy = (self.zoom_policy)(surface.element());
        surface.update_zoom_policy(policy);
        Some(surface)
    }
}

fn surface_params<E>(config: &PagerConfig<E>) -> SurfaceParams {
    SurfaceParams {
        paging_axis: config.axis,
        dismiss_enabled: config.on_dismiss.is_some() && config.axis == Axis::Horizontal,
        dismiss_trigger_offset: config.dismiss_trigger_offset,
        dismiss_velocity: config.dismiss_velocity,
        dismiss_animation_ms: config.dismiss_animation_ms,
        full_fade_at: config.full_fade_at,
        pinch_enable_offset: config.pinch_enable_offset,
        double_tap_listener: config.on_double_tap.is_some(),
        ..SurfaceParams::default()
    }
}

fn engine_params<E>(config: &PagerConfig<E>) -> EngineParams {
    EngineParams {
        preload_radius: config.preload_radius,
        page_spacing: config.page_spacing,
        overscroll_threshold: config.overscroll_threshold,
        load_more: config.load_more_on,
        ..EngineParams::default()
    }
}

/// The embeddable viewer core: owns the engine and the page window, bridges
/// the caller's data + renderer into it, and routes engine/surface events to
/// the configured callbacks.
///
/// The platform glue drives it through two method families: pager-level
/// scroll input (`pager_*`) and current-page gesture input (`surface_*`),
/// plus [`ViewProvider::tick`] once per event-loop turn to drain deferred
/// work.
pub struct ViewProvider<D, V, R>
where
    D: DataSource,
    D::Element: Clone,
    R: FnMut(&D::Element) -> V,
{
    data: D,
    render: R,
    config: PagerConfig<D::Element>,
    engine: PagerEngine<ZoomableSurface<D::Element, V>>,
    viewport: Size,
    safe_area: Insets,
}

impl<D, V, R> ViewProvider<D, V, R>
where
    D: DataSource,
    D::Element: Clone,
    R: FnMut(&D::Element) -> V,
{
    /// Creates a provider over `data`, starting at `initial_page` (clamped
    /// into the data), rendering elements with `render`.
    ///
    /// The window materializes on the first [`ViewProvider::set_viewport`]
    /// call, once the page extent is known.
    #[must_use]
    pub fn new(
        data: D,
        initial_page: usize,
        config: PagerConfig<D::Element>,
        render: R,
    ) -> Self {
        config.validate();
        let initial = initial_page.min(data.len().saturating_sub(1));
        let mut engine = PagerEngine::new(engine_params(&config), initial);
        engine.set_data_len(data.len());
        Self {
            data,
            render,
            config,
            engine,
            viewport: Size::ZERO,
            safe_area: Insets::ZERO,
        }
    }

    /// The caller's data sequence.
    #[must_use]
    pub const fn data(&self) -> &D {
        &self.data
    }

    /// Mutable access to the data sequence. Call
    /// [`ViewProvider::reload_views`] after mutating.
    pub const fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// The underlying engine (window contents, offsets), read-only.
    #[must_use]
    pub const fn engine(&self) -> &PagerEngine<ZoomableSurface<D::Element, V>> {
        &self.engine
    }

    /// The settled current page index.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.engine.current_index()
    }

    /// The current page's surface, if any page is materialized.
    #[must_use]
    pub fn current_surface(&self) -> Option<&ZoomableSurface<D::Element, V>> {
        self.engine.window().get(self.engine.current_index())
    }

    /// Reports the viewport size and safe-area insets.
    ///
    /// The first call performs the initial layout; later calls re-anchor
    /// the current page after a size transition (rotation).
    pub fn set_viewport(&mut self, viewport: Size, safe_area: Insets) {
        self.viewport = viewport;
        self.safe_area = safe_area;
        let axis = self.config.axis;
        self.with_loader(|engine, loader| {
            engine.set_viewport(axis.main_extent(viewport), loader);
        });
        for slot in self.engine.window_mut().iter_mut() {
            slot.payload.set_viewport(viewport, safe_area);
        }
    }

    /// Jumps to `page`, clamped into `[0, len - 1]`; returns the scroll
    /// offset the platform should show.
    ///
    /// An animated jump to a materialized page only returns the target
    /// offset: the host animates there and reports
    /// [`ViewProvider::pager_settled`], which performs the index change.
    /// Everything else (non-animated, or target outside the window) applies
    /// immediately.
    pub fn go_to_page(&mut self, page: isize, animated: bool) -> f64 {
        let len = self.data.len();
        if len == 0 {
            return 0.0;
        }
        #[allow(
            clippy::cast_possible_wrap,
            reason = "practical data lengths fit in isize"
        )]
        let clamped = usize::try_from(page.clamp(0, len as isize - 1)).unwrap_or(0);
        if animated {
            if let Some(position) = self.engine.window().position_of(clamped) {
                return position as f64 * self.engine.page_extent();
            }
        }
        self.with_loader(|engine, loader| engine.go_to_page(clamped, loader));
        self.engine.scroll_offset()
    }

    /// Reacts to external data mutation: re-renders every materialized page
    /// in place (same index, zoom preserved), evicts pages beyond the new
    /// length, and schedules fills for newly reachable indices.
    pub fn reload_views(&mut self) {
        let before = self.engine.current_index();
        self.engine.set_data_len(self.data.len());
        let clamped = self.engine.current_index();
        if clamped != before {
            // The data shrank beneath the current page: snap to the
            // clamped index and rebuild around it.
            self.with_loader(|engine, loader| engine.go_to_page(clamped, loader));
        }

        let Self {
            data,
            render,
            config,
            engine,
            ..
        } = self;
        for slot in engine.window_mut().iter_mut() {
            if let Some(element) = data.get(slot.index) {
                let content = render(element);
                slot.payload.set_element(element.clone());
                drop(slot.payload.replace_content(content));
                slot.payload.update_zoom_policy((config.zoom_policy)(element));
            }
        }
    }

    /// Drains deferred work: window fills, the page binding write, the
    /// load-more callback, and pending single taps whose double-tap window
    /// has lapsed. Call once per event-loop turn.
    pub fn tick(&mut self, timestamp_ms: u64) {
        let events = self.with_loader(|engine, loader| engine.tick(loader));
        for event in events {
            match event {
                PagerEvent::PageSettled(index) => {
                    if let Some(binding) = self.config.page_binding.as_mut() {
                        binding(index);
                    }
                }
                PagerEvent::LoadMore => {
                    if let Some(callback) = self.config.on_load_more.as_mut() {
                        callback();
                    }
                }
            }
        }

        let mut resolved_taps = 0_usize;
        for slot in self.engine.window_mut().iter_mut() {
            if slot.payload.poll_taps(timestamp_ms).is_some() {
                resolved_taps += 1;
            }
        }
        for _ in 0..resolved_taps {
            if let Some(callback) = self.config.on_tap.as_mut() {
                callback();
            }
        }
    }

    // Pager-level input.

    /// A pager drag began.
    pub fn pager_drag_begin(&mut self) {
        self.engine.on_drag_begin();
    }

    /// A pager scroll delta arrived.
    pub fn pager_scroll(&mut self, offset: f64) {
        let Some(update) = self.engine.on_scroll(offset) else {
            return;
        };
        if let Some(edge) = update.overscroll
            && let Some(callback) = self.config.on_overscroll.as_mut()
        {
            callback(edge);
        }
        if self.config.axis == Axis::Horizontal
            && let Some(binding) = self.config.position_binding.as_mut()
        {
            binding(update.absolute_position);
        }
        self.apply_zoom_resets(&update.zoom_resets);
    }

    /// The pager drag released with the given velocity; returns the snap
    /// target offset for the platform's deceleration.
    pub fn pager_drag_end(&mut self, velocity: f64) -> f64 {
        self.engine.on_drag_end(velocity)
    }

    /// Pager scrolling settled: the sole path that changes the current
    /// index.
    pub fn pager_settled(&mut self) {
        let settle = self.with_loader(|engine, loader| engine.scrolling_finished(loader));
        self.apply_zoom_resets(&settle.zoom_resets);
    }

    // Current-page input.

    /// The current surface's own pan began.
    pub fn surface_pan_begin(&mut self) {
        let index = self.engine.current_index();
        let Some(surface) = self.engine.window_mut().get_mut(index) else {
            return;
        };
        let began = surface.on_pan_begin();
        if began == PanBegin::DismissDrag
            && let Some(callback) = self.config.on_drag_start.as_mut()
        {
            callback();
        }
    }

    /// Arbitration: should the current surface's pan begin (instead of the
    /// pager's)? With no page materialized the pager wins by default.
    #[must_use]
    pub fn surface_pan_should_begin(&self, translation: Vec2) -> bool {
        self.current_surface()
            .is_some_and(|surface| surface.pan_should_begin(translation))
    }

    /// A scroll delta on the current surface's own scroll primitive.
    pub fn surface_scroll(&mut self, offset: Vec2) {
        let index = self.engine.current_index();
        let Some(surface) = self.engine.window_mut().get_mut(index) else {
            return;
        };
        let update = surface.update_state(offset);
        if let Some(fade) = update.fade
            && let Some(binding) = self.config.opacity_binding.as_mut()
        {
            binding(fade);
        }
    }

    /// The current surface's pan released with the given cross-axis
    /// velocity. A committed dismiss returns the animation the host must
    /// run before calling [`ViewProvider::finish_dismiss`].
    pub fn surface_release(&mut self, velocity: f64) -> Option<DismissAnimation> {
        let index = self.engine.current_index();
        self.engine
            .window_mut()
            .get_mut(index)?
            .on_drag_release(velocity)
    }

    /// The host finished the dismiss animation: drives the background
    /// opacity to zero and invokes the dismiss callback exactly once.
    pub fn finish_dismiss(&mut self) {
        let index = self.engine.current_index();
        let Some(surface) = self.engine.window_mut().get_mut(index) else {
            return;
        };
        if !surface.finish_dismiss() {
            return;
        }
        if let Some(binding) = self.config.opacity_binding.as_mut() {
            binding(0.0);
        }
        if let Some(callback) = self.config.on_dismiss.as_mut() {
            callback(Dismissal {
                suppress_host_animations: self.config.cancel_host_animations_on_dismiss,
            });
        }
    }

    /// A pinch began on the current surface.
    pub fn surface_zoom_begin(&mut self) {
        let index = self.engine.current_index();
        if let Some(surface) = self.engine.window_mut().get_mut(index) {
            surface.on_zoom_begin();
        }
    }

    /// Per-frame pinch scale on the current surface; fires the per-frame
    /// zoom callback with the element and clamped scale.
    pub fn surface_zoom(&mut self, scale: f64) {
        let index = self.engine.current_index();
        let Some(surface) = self.engine.window_mut().get_mut(index) else {
            return;
        };
        let clamped = surface.on_zoom_update(scale);
        if let Some(callback) = self.config.on_zoom.as_mut() {
            callback(surface.element(), clamped);
        }
    }

    /// The pinch ended at `scale`.
    pub fn surface_zoom_end(&mut self, scale: f64) {
        let index = self.engine.current_index();
        let Some(surface) = self.engine.window_mut().get_mut(index) else {
            return;
        };
        let clamped = surface.on_zoom_end(scale);
        if let Some(callback) = self.config.on_zoom.as_mut() {
            callback(surface.element(), clamped);
        }
    }

    /// A completed tap on the current surface.
    ///
    /// Singles fire the tap callback (possibly later, via
    /// [`ViewProvider::tick`], when a double-tap consumer forces the
    /// recognizer to wait). A double tap fires the double-tap callback and,
    /// when double-tap zoom is configured, also toggles zoom — the two
    /// co-fire. Returns the zoom target for the host to animate, if any.
    pub fn surface_tap(&mut self, at: Point, timestamp_ms: u64) -> Option<ZoomTarget> {
        let index = self.engine.current_index();
        let surface = self.engine.window_mut().get_mut(index)?;
        match surface.on_tap(at, timestamp_ms)? {
            TapOutcome::Single(_) => {
                if let Some(callback) = self.config.on_tap.as_mut() {
                    callback();
                }
                None
            }
            TapOutcome::Double(point) => {
                let target = surface.apply_double_tap(point);
                let scale = surface.scale();
                if let Some(callback) = self.config.on_double_tap.as_mut() {
                    callback();
                }
                if target.is_some()
                    && let Some(callback) = self.config.on_zoom.as_mut()
                {
                    callback(surface.element(), scale);
                }
                target
            }
            TapOutcome::Pending => None,
        }
    }

    fn apply_zoom_resets(&mut self, resets: &[usize]) {
        for &index in resets {
            if let Some(surface) = self.engine.window_mut().get_mut(index) {
                surface.reset_zoom();
            }
        }
    }

    fn with_loader<T>(
        &mut self,
        f: impl FnOnce(
            &mut PagerEngine<ZoomableSurface<D::Element, V>>,
            &mut SurfaceLoader<'_, D, V, R>,
        ) -> T,
    ) -> T {
        let mut loader = SurfaceLoader {
            data: &self.data,
            render: &mut self.render,
            zoom_policy: self.config.zoom_policy.as_ref(),
            params: surface_params(&self.config),
            viewport: self.viewport,
            safe_area: self.safe_area,
            _content: PhantomData,
        };
        f(&mut self.engine, &mut loader)
    }
}

impl<D, V, R> core::fmt::Debug for ViewProvider<D, V, R>
where
    D: DataSource,
    D::Element: Clone,
    R: FnMut(&D::Element) -> V,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewProvider")
            .field("data_len", &self.data.len())
            .field("current_index", &self.engine.current_index())
            .field("window_len", &self.engine.window().len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
