// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pager controller: offset↔index derivation, snap targeting, and
//! edge signals over a [`PageWindow`].

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::deferred::{DeferredQueue, DeferredTask};
use crate::window::{PageLoader, PageWindow, maintain_window};

/// Which end of the data sequence an overscroll ran past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Dragged past the first page.
    Beginning,
    /// Dragged past the last page.
    End,
}

/// When the load-more signal fires relative to the end of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Fire once the current index is within `minus` pages of the last
    /// element.
    LastElement {
        /// Number of pages before the last element at which to fire.
        minus: usize,
    },
}

/// Tuning parameters for a [`PagerEngine`].
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    /// Pages kept materialized on each side of the current page. Must be at
    /// least 1 for the window math to be well-defined.
    pub preload_radius: usize,
    /// Spacing between adjacent pages, in the same units as the viewport
    /// extent.
    pub page_spacing: f64,
    /// Fraction of a page the user must overscroll past either end before
    /// the overscroll signal fires. In `[0, 1]`.
    pub overscroll_threshold: f64,
    /// Load-more trigger.
    pub load_more: LoadMore,
    /// Release speed beyond which a drag snaps a full page forward or
    /// backward instead of rounding to the nearest page.
    pub snap_velocity: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            preload_radius: 3,
            page_spacing: 0.0,
            overscroll_threshold: 0.15,
            load_more: LoadMore::LastElement { minus: 3 },
            snap_velocity: 0.5,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct EngineFlags: u8 {
        /// The user's finger is down on the pager.
        const TRACKING = 1 << 0;
        /// The beginning-overscroll signal already fired this gesture.
        const NOTIFIED_BEGINNING = 1 << 1;
        /// The end-overscroll signal already fired this gesture.
        const NOTIFIED_END = 1 << 2;
        /// The first layout pass happened (viewport extent is known).
        const LAID_OUT = 1 << 3;
        /// Scroll events are ignored while a window mutation is in
        /// progress; cleared by the deferred unmute task.
        const MUTED = 1 << 4;
    }
}

/// Values produced by a scroll delta.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollUpdate {
    /// Overscroll signal, at most once per gesture per edge.
    pub overscroll: Option<Edge>,
    /// Continuous content position in pages: current index plus sub-page
    /// fraction.
    pub absolute_position: f64,
    /// Materialized pages that scrolled out of the visible region and
    /// should have their zoom reset to baseline.
    pub zoom_resets: SmallVec<[usize; 8]>,
}

/// Values produced when scrolling settles.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleUpdate {
    /// The new current index, if the settle landed on a different page.
    pub page_changed: Option<usize>,
    /// Materialized pages outside the visible region that should have
    /// their zoom reset.
    pub zoom_resets: SmallVec<[usize; 8]>,
}

/// Events surfaced by draining the deferred queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerEvent {
    /// Write the settled page index into the caller-owned binding.
    PageSettled(usize),
    /// Ask the caller for more data.
    LoadMore,
}

/// Sliding-window pager controller.
///
/// The engine owns the page window and a *window-relative* scroll offset
/// along the paging axis (page 0 of the window sits at offset 0). It never
/// reads a clock and never calls back into the host: inputs arrive through
/// the driver methods ([`Self::on_drag_begin`], [`Self::on_scroll`],
/// [`Self::on_drag_end`], [`Self::scrolling_finished`]) and cross-tick
/// effects are drained from [`Self::tick`].
#[derive(Debug)]
pub struct PagerEngine<P> {
    window: PageWindow<P>,
    deferred: DeferredQueue,
    params: EngineParams,
    current_index: usize,
    data_len: usize,
    scroll_offset: f64,
    viewport_extent: f64,
    flags: EngineFlags,
}

impl<P> PagerEngine<P> {
    /// Creates an engine starting at `initial_index`.
    ///
    /// # Panics
    ///
    /// Invalid parameters (zero preload radius, overscroll threshold outside
    /// `[0, 1]`) are programmer errors and panic.
    #[must_use]
    pub fn new(params: EngineParams, initial_index: usize) -> Self {
        assert!(
            params.preload_radius >= 1,
            "preload radius must be >= 1 for the window math to be well-defined"
        );
        assert!(
            (0.0..=1.0).contains(&params.overscroll_threshold),
            "overscroll threshold must be a fraction in [0, 1]; got {}",
            params.overscroll_threshold
        );
        Self {
            window: PageWindow::new(),
            deferred: DeferredQueue::new(),
            params,
            current_index: initial_index,
            data_len: 0,
            scroll_offset: 0.0,
            viewport_extent: 0.0,
            flags: EngineFlags::empty(),
        }
    }

    /// The settled current index.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// The live page window.
    #[must_use]
    pub const fn window(&self) -> &PageWindow<P> {
        &self.window
    }

    /// The live page window, mutably (for refreshing payloads in place).
    pub const fn window_mut(&mut self) -> &mut PageWindow<P> {
        &mut self.window
    }

    /// Length of the external data sequence, as last reported.
    #[must_use]
    pub const fn data_len(&self) -> usize {
        self.data_len
    }

    /// Window-relative scroll offset along the paging axis.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Extent of one page step: viewport extent plus inter-page spacing.
    #[must_use]
    pub fn page_extent(&self) -> f64 {
        self.viewport_extent + self.params.page_spacing
    }

    /// Continuous content position in pages: index plus sub-page fraction.
    #[must_use]
    pub fn absolute_position(&self) -> f64 {
        let extent = self.page_extent();
        let Some(first) = self.window.first_index() else {
            return 0.0;
        };
        if extent <= 0.0 {
            return first as f64;
        }
        first as f64 + self.scroll_offset / extent
    }

    /// Reports a new data length.
    ///
    /// Clamps the current index, evicts now-invalid pages immediately, and
    /// schedules fills for newly reachable edges on the deferred queue (the
    /// caller's own pass may still be in progress; materializing new pages
    /// inline could observe a half-mutated sequence).
    pub fn set_data_len(&mut self, data_len: usize) {
        self.data_len = data_len;
        if data_len == 0 {
            self.current_index = 0;
        } else if self.current_index >= data_len {
            self.current_index = data_len - 1;
        }
        let (front, _back) =
            self.window
                .evict_outside(self.current_index, self.params.preload_radius, data_len);
        self.scroll_offset -= front as f64 * self.page_extent();
        if self.window.is_empty() {
            self.scroll_offset = 0.0;
        }
        if self.flags.contains(EngineFlags::LAID_OUT) {
            self.queue_missing_fills();
        }
    }

    /// Reports the viewport extent along the paging axis.
    ///
    /// The first call performs the initial layout (populates the window and
    /// anchors the offset at the current page); later calls re-anchor after
    /// a size transition such as device rotation, so the current page stays
    /// put.
    pub fn set_viewport<L: PageLoader<Page = P>>(&mut self, extent: f64, loader: &mut L) {
        self.viewport_extent = extent.max(0.0);
        if !self.flags.contains(EngineFlags::LAID_OUT) {
            self.flags.insert(EngineFlags::LAID_OUT);
            self.compute_view_state(loader);
        }
        self.anchor();
    }

    /// A drag began: start tracking and re-arm the overscroll signals.
    pub fn on_drag_begin(&mut self) {
        self.flags.insert(EngineFlags::TRACKING);
        self.flags
            .remove(EngineFlags::NOTIFIED_BEGINNING | EngineFlags::NOTIFIED_END);
    }

    /// Returns `true` while the user's finger is down.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.flags.contains(EngineFlags::TRACKING)
    }

    /// A scroll delta arrived; returns `None` while scroll delivery is
    /// muted by an in-progress window mutation.
    ///
    /// The discrete current index is *not* derived here, even when the
    /// offset has clearly crossed into another page: index-change side
    /// effects must not fire repeatedly during a continuous drag.
    /// [`Self::scrolling_finished`] is the sole settle path.
    pub fn on_scroll(&mut self, offset: f64) -> Option<ScrollUpdate> {
        if self.flags.contains(EngineFlags::MUTED) {
            return None;
        }
        self.scroll_offset = offset;
        Some(ScrollUpdate {
            overscroll: self.check_overscroll(),
            absolute_position: self.absolute_position(),
            zoom_resets: self.offscreen_pages(),
        })
    }

    /// The drag is being released with the given velocity; returns the
    /// offset the platform's deceleration should target.
    ///
    /// A decisive flick (speed beyond the snap velocity) advances exactly
    /// one page in the flick direction even if momentum would otherwise
    /// overshoot; a gentle release snaps to the nearest page.
    pub fn on_drag_end(&mut self, velocity: f64) -> f64 {
        self.flags.remove(EngineFlags::TRACKING);
        let extent = self.page_extent();
        if extent <= 0.0 || self.window.is_empty() {
            return 0.0;
        }
        let position = self.scroll_offset / extent;
        let target = if velocity > self.params.snap_velocity {
            floor_page(position + 1.0)
        } else if velocity < -self.params.snap_velocity {
            -floor_page(-(position - 1.0))
        } else {
            floor_page(position + 0.5)
        };
        #[allow(
            clippy::cast_possible_wrap,
            reason = "the window length is bounded by the preload radius"
        )]
        let max_page = self.window.len() as isize - 1;
        target.clamp(0, max_page) as f64 * extent
    }

    /// Scrolling settled: derive the discrete current index, restore the
    /// window invariant around it, and queue the caller-visible writes.
    pub fn scrolling_finished<L: PageLoader<Page = P>>(&mut self, loader: &mut L) -> SettleUpdate {
        self.flags.remove(EngineFlags::TRACKING);
        let Some(index) = self.index_under_offset() else {
            return SettleUpdate {
                page_changed: None,
                zoom_resets: SmallVec::new(),
            };
        };
        let page_changed = (index != self.current_index).then(|| {
            self.apply_index_change(index, loader);
            index
        });
        SettleUpdate {
            page_changed,
            zoom_resets: self.offscreen_pages(),
        }
    }

    /// Jumps to `index` (clamped into the data), rebuilding the window
    /// around it and snapping the offset there.
    pub fn go_to_page<L: PageLoader<Page = P>>(&mut self, index: usize, loader: &mut L) {
        if self.data_len == 0 {
            return;
        }
        let index = index.min(self.data_len - 1);
        self.apply_index_change(index, loader);
        self.anchor();
    }

    /// Restores the window invariant around the current index.
    ///
    /// Scroll-event delivery is muted for the remainder of the tick so the
    /// mutation cannot re-enter through scroll callbacks it causes itself;
    /// the unmute is queued as a deferred task.
    pub fn compute_view_state<L: PageLoader<Page = P>>(&mut self, loader: &mut L) {
        self.flags.insert(EngineFlags::MUTED);
        self.deferred.push(DeferredTask::Unmute);
        let delta = maintain_window(
            &mut self.window,
            loader,
            self.current_index,
            self.params.preload_radius,
            self.data_len,
        );
        if delta.rebuilt {
            self.anchor();
        } else {
            self.scroll_offset += delta.front_shift() as f64 * self.page_extent();
        }
    }

    /// Drains the deferred queue, executing internal tasks and returning
    /// the caller-visible events in FIFO order.
    ///
    /// Stale tasks are skipped: a fill whose index has since left the
    /// preload range, or a settle write superseded by a later index change.
    pub fn tick<L: PageLoader<Page = P>>(&mut self, loader: &mut L) -> SmallVec<[PagerEvent; 4]> {
        let mut events = SmallVec::new();
        while let Some(task) = self.deferred.pop() {
            match task {
                DeferredTask::Unmute => {
                    self.flags.remove(EngineFlags::MUTED);
                }
                DeferredTask::Fill(index) => self.apply_fill(index, loader),
                DeferredTask::PageSettled(index) => {
                    if index == self.current_index {
                        events.push(PagerEvent::PageSettled(index));
                    }
                }
                DeferredTask::LoadMore => events.push(PagerEvent::LoadMore),
            }
        }
        events
    }

    /// Number of tasks currently deferred. Mostly useful in tests.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    fn apply_index_change<L: PageLoader<Page = P>>(&mut self, index: usize, loader: &mut L) {
        self.current_index = index;
        self.compute_view_state(loader);
        self.deferred.push(DeferredTask::PageSettled(index));
        if self.load_more_due() {
            self.deferred.push(DeferredTask::LoadMore);
        }
    }

    fn load_more_due(&self) -> bool {
        if self.data_len == 0 {
            return false;
        }
        match self.params.load_more {
            LoadMore::LastElement { minus } => self.current_index + minus >= self.data_len - 1,
        }
    }

    fn anchor(&mut self) {
        self.scroll_offset = self
            .window
            .position_of(self.current_index)
            .map_or(0.0, |position| position as f64 * self.page_extent());
    }

    /// Logical index nearest the current offset, by rounding the offset to
    /// a window-relative page position.
    fn index_under_offset(&self) -> Option<usize> {
        let extent = self.page_extent();
        if extent <= 0.0 || self.window.is_empty() {
            return self.window.first_index();
        }
        #[allow(
            clippy::cast_possible_wrap,
            clippy::cast_sign_loss,
            reason = "the position is clamped into the window bounds before the cast"
        )]
        let position = floor_page(self.scroll_offset / extent + 0.5)
            .clamp(0, self.window.len() as isize - 1) as usize;
        self.window.index_at(position)
    }

    fn check_overscroll(&mut self) -> Option<Edge> {
        let extent = self.page_extent();
        if extent <= 0.0 || self.window.is_empty() || self.data_len == 0 {
            return None;
        }
        let threshold = self.params.overscroll_threshold * extent;
        if self.window.first_index() == Some(0)
            && -self.scroll_offset > threshold
            && !self.flags.contains(EngineFlags::NOTIFIED_BEGINNING)
        {
            self.flags.insert(EngineFlags::NOTIFIED_BEGINNING);
            return Some(Edge::Beginning);
        }
        let last_position = (self.window.len() - 1) as f64 * extent;
        if self.window.last_index() == Some(self.data_len - 1)
            && self.scroll_offset - last_position > threshold
            && !self.flags.contains(EngineFlags::NOTIFIED_END)
        {
            self.flags.insert(EngineFlags::NOTIFIED_END);
            return Some(Edge::End);
        }
        None
    }

    /// Materialized pages that do not overlap the visible region and are
    /// not the current page; their zoom should return to baseline.
    fn offscreen_pages(&self) -> SmallVec<[usize; 8]> {
        let extent = self.page_extent();
        let mut resets = SmallVec::new();
        if extent <= 0.0 || self.viewport_extent <= 0.0 {
            return resets;
        }
        for (position, slot) in self.window.iter().enumerate() {
            if slot.index == self.current_index {
                continue;
            }
            let page_start = position as f64 * extent;
            let visible = page_start < self.scroll_offset + self.viewport_extent
                && page_start + self.viewport_extent > self.scroll_offset;
            if !visible {
                resets.push(slot.index);
            }
        }
        resets
    }

    fn queue_missing_fills(&mut self) {
        if self.data_len == 0 {
            return;
        }
        let radius = self.params.preload_radius;
        let low = self.current_index.saturating_sub(radius);
        let high = self
            .current_index
            .saturating_add(radius)
            .min(self.data_len - 1);
        match (self.window.first_index(), self.window.last_index()) {
            (Some(first), Some(last)) => {
                for index in (last + 1)..=high {
                    self.deferred.push(DeferredTask::Fill(index));
                }
                for index in (low..first).rev() {
                    self.deferred.push(DeferredTask::Fill(index));
                }
            }
            _ => {
                // Seed outward from current so contiguity checks pass at
                // drain time.
                self.deferred.push(DeferredTask::Fill(self.current_index));
                for index in (self.current_index + 1)..=high {
                    self.deferred.push(DeferredTask::Fill(index));
                }
                for index in (low..self.current_index).rev() {
                    self.deferred.push(DeferredTask::Fill(index));
                }
            }
        }
    }

    /// Executes a deferred fill if it is still applicable.
    fn apply_fill<L: PageLoader<Page = P>>(&mut self, index: usize, loader: &mut L) {
        if index >= self.data_len
            || self.current_index.abs_diff(index) > self.params.preload_radius
            || self.window.contains(index)
        {
            return;
        }
        match (self.window.first_index(), self.window.last_index()) {
            (None, None) => {
                if index == self.current_index
                    && let Some(payload) = loader.load_page(index)
                {
                    self.window.push_back(index, payload);
                    self.anchor();
                }
            }
            (Some(first), _) if index + 1 == first => {
                if let Some(payload) = loader.load_page(index) {
                    self.window.push_front(index, payload);
                    self.scroll_offset += self.page_extent();
                }
            }
            (_, Some(last)) if index == last + 1 => {
                if let Some(payload) = loader.load_page(index) {
                    self.window.push_back(index, payload);
                }
            }
            // Non-adjacent: the window moved since this fill was queued.
            _ => {}
        }
    }
}

/// Floor to an integer page number. `as isize` truncates toward zero, so
/// correct the negative side explicitly (core has no `f64::floor`).
fn floor_page(value: f64) -> isize {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "page positions are small; callers clamp into window bounds"
    )]
    let truncated = value as isize;
    if truncated as f64 > value {
        truncated - 1
    } else {
        truncated
    }
}
