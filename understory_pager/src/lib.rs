// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pager --heading-base-level=0

//! Understory Pager: a sliding-window paging engine over a dense index strip.
//!
//! This crate maintains a bounded window of materialized pages around a
//! logical index into an arbitrarily-sized external data sequence, and turns
//! continuous scroll input into discrete paging decisions: which page is
//! current, where a released drag should snap, when the user has overscrolled
//! past either end, and when more data should be requested.
//!
//! The core concepts are:
//!
//! - [`PageLoader`]: the injected "materialize page at index" capability.
//!   Probing past the data edge returns `None` and is expected steady-state
//!   behavior, not an error.
//! - [`PageWindow`]: the contiguous, index-ordered set of live pages, plus
//!   [`maintain_window`], which restores the window invariant (exactly
//!   `preload_radius` pages on each side of current, data bounds permitting)
//!   after every index change or data mutation.
//! - [`PagerEngine`]: the controller. It owns the window and the
//!   window-relative scroll offset, derives the discrete current index only
//!   when scrolling settles, computes velocity-based snap targets, and fires
//!   overscroll exactly once per gesture.
//! - [`DeferredQueue`]: the explicit end-of-tick task queue standing in for
//!   "run after the current layout pass". Scroll-event muting, page-binding
//!   writes, load-more, and data-growth fills all go through it, with
//!   idempotency re-checked at drain time.
//!
//! This crate deliberately does **not** know about views, gestures, or any
//! particular UI framework. Host frameworks are responsible for:
//!
//! - Implementing [`PageLoader`] over their data + view pipeline.
//! - Forwarding scroll deltas, drag begin/end, and settle callbacks from
//!   their scroll primitive into the engine.
//! - Applying returned snap targets and draining [`PagerEngine::tick`] at a
//!   well-defined point in their event loop.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_pager::{EngineParams, PageLoader, PagerEngine};
//!
//! struct Numbers(usize);
//! impl PageLoader for Numbers {
//!     type Page = usize;
//!     fn load_page(&mut self, index: usize) -> Option<usize> {
//!         (index < self.0).then_some(index)
//!     }
//! }
//!
//! let mut loader = Numbers(100);
//! let mut pager = PagerEngine::new(EngineParams::default(), 10);
//! pager.set_data_len(100);
//! pager.set_viewport(300.0, &mut loader);
//!
//! // Preload radius 3: pages 7..=13 are materialized around page 10.
//! let indices: Vec<_> = pager.window().indices().collect();
//! assert_eq!(indices, vec![7, 8, 9, 10, 11, 12, 13]);
//! pager.tick(&mut loader); // drain the initial-layout unmute
//!
//! // A decisive flick advances exactly one page.
//! pager.on_drag_begin();
//! let _ = pager.on_scroll(pager.scroll_offset() + 20.0);
//! let target = pager.on_drag_end(0.6);
//! let _ = pager.on_scroll(target);
//! let settle = pager.scrolling_finished(&mut loader);
//! assert_eq!(pager.current_index(), 11);
//! # let _ = settle;
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod deferred;
mod engine;
mod window;

pub use deferred::{DeferredQueue, DeferredTask};
pub use engine::{
    Edge, EngineParams, LoadMore, PagerEngine, PagerEvent, ScrollUpdate, SettleUpdate,
};
pub use window::{PageLoader, PageSlot, PageWindow, WindowDelta, maintain_window};
