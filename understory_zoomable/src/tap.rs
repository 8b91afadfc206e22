// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single/double tap recognition for one surface.
//!
//! When a double-tap consumer exists (a double-tap callback or double-tap
//! zoom), a single tap must not fire for the first tap of a double tap. The
//! recognizer therefore holds the first tap *pending* until the double-tap
//! window lapses; hosts resolve pendings by calling [`TapState::poll`] each
//! tick. When no double-tap consumer exists, taps resolve immediately.
//!
//! Timestamps are caller-supplied milliseconds, as everywhere in this
//! workspace; the recognizer never reads a clock.
//!
//! ```
//! use kurbo::Point;
//! use understory_zoomable::{TapOutcome, TapState};
//!
//! let mut taps = TapState::new(true);
//!
//! // First tap is held back until the double-tap window passes...
//! assert_eq!(taps.on_tap(Point::new(10.0, 10.0), 1_000), TapOutcome::Pending);
//! // ...a second tap inside the window resolves as a double tap.
//! let outcome = taps.on_tap(Point::new(12.0, 11.0), 1_200);
//! assert_eq!(outcome, TapOutcome::Double(Point::new(12.0, 11.0)));
//!
//! // A lone tap resolves as single once the window lapses.
//! assert_eq!(taps.on_tap(Point::new(50.0, 50.0), 2_000), TapOutcome::Pending);
//! assert_eq!(taps.poll(2_400), Some(Point::new(50.0, 50.0)));
//! ```

use kurbo::Point;

/// Default double-tap window in milliseconds.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

/// Result of feeding one tap into [`TapState`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TapOutcome {
    /// Resolved as a single tap at the given location.
    Single(Point),
    /// Resolved as the second tap of a double tap; the location is the
    /// second tap's, which is where a double-tap zoom should center.
    Double(Point),
    /// Held pending double-tap failure; resolve via [`TapState::poll`].
    Pending,
}

/// Tap recognizer state for one surface.
#[derive(Clone, Copy, Debug)]
pub struct TapState {
    gate_on_double: bool,
    window_ms: u64,
    pending: Option<(Point, u64)>,
}

impl TapState {
    /// Creates a recognizer.
    ///
    /// `gate_on_double` is `true` when a double-tap consumer exists, making
    /// single taps wait for double-tap failure.
    #[must_use]
    pub fn new(gate_on_double: bool) -> Self {
        Self::with_window(gate_on_double, DOUBLE_TAP_WINDOW_MS)
    }

    /// Creates a recognizer with a custom double-tap window.
    #[must_use]
    pub fn with_window(gate_on_double: bool, window_ms: u64) -> Self {
        Self {
            gate_on_double,
            window_ms,
            pending: None,
        }
    }

    /// Enables or disables the double-tap gate.
    ///
    /// Called whenever the surface's zoom policy is re-evaluated; a policy
    /// change can add or remove the double-tap consumer.
    pub fn set_gate_on_double(&mut self, gate_on_double: bool) {
        self.gate_on_double = gate_on_double;
        if !gate_on_double {
            self.pending = None;
        }
    }

    /// Feeds one completed tap at `at` into the recognizer.
    ///
    /// If a pending tap expired without the host calling [`Self::poll`], the
    /// stale pending resolves here as its missed `Single`, and the new tap is
    /// armed as the next pending.
    pub fn on_tap(&mut self, at: Point, timestamp_ms: u64) -> TapOutcome {
        if !self.gate_on_double {
            return TapOutcome::Single(at);
        }
        match self.pending.take() {
            Some((_, t0)) if timestamp_ms.saturating_sub(t0) <= self.window_ms => {
                TapOutcome::Double(at)
            }
            Some((stale, _)) => {
                self.pending = Some((at, timestamp_ms));
                TapOutcome::Single(stale)
            }
            None => {
                self.pending = Some((at, timestamp_ms));
                TapOutcome::Pending
            }
        }
    }

    /// Resolves a pending tap as a single tap once its window has lapsed.
    pub fn poll(&mut self, timestamp_ms: u64) -> Option<Point> {
        match self.pending {
            Some((at, t0)) if timestamp_ms.saturating_sub(t0) > self.window_ms => {
                self.pending = None;
                Some(at)
            }
            _ => None,
        }
    }

    /// Discards any pending tap (e.g. when a drag or pinch begins).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns `true` while a tap is held pending double-tap failure.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for TapState {
    fn default() -> Self {
        Self::new(false)
    }
}
