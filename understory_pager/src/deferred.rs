// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An explicit deferred-task queue drained at end of tick.
//!
//! Several pager operations must not run inside the event that triggered
//! them: re-enabling scroll-event delivery after a window mutation (the
//! delegate detach/reattach pattern), writing the caller-owned page binding,
//! the load-more request, and window fills triggered while the caller's own
//! pass may still be in progress. Each is queued here and executed when the
//! host drains the engine at a well-defined point in its single-threaded
//! event loop.
//!
//! Tasks execute in FIFO order. Duplicate work is suppressed twice over:
//! once at enqueue time (a fill for an index already pending, a second
//! unmute, a second load-more are not queued again) and once at drain time
//! (the engine re-checks whether a task is still applicable and skips stale
//! ones). There is no cancellation primitive; staleness re-checking is the
//! substitute.

use alloc::collections::VecDeque;

use hashbrown::HashSet;

/// A unit of work deferred to the next drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Re-enable scroll-event delivery after a window mutation.
    Unmute,
    /// Materialize the page at the given index unless already present.
    Fill(usize),
    /// Push the settled page index into the caller-owned binding.
    PageSettled(usize),
    /// Ask the caller for more data.
    LoadMore,
}

/// FIFO queue of deferred tasks with enqueue-time dedup.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    queue: VecDeque<DeferredTask>,
    pending_fills: HashSet<usize>,
    unmute_pending: bool,
    load_more_pending: bool,
}

impl DeferredQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a task; returns `false` if it was suppressed as a duplicate.
    pub fn push(&mut self, task: DeferredTask) -> bool {
        match task {
            DeferredTask::Unmute => {
                if self.unmute_pending {
                    return false;
                }
                self.unmute_pending = true;
            }
            DeferredTask::Fill(index) => {
                if !self.pending_fills.insert(index) {
                    return false;
                }
            }
            DeferredTask::LoadMore => {
                if self.load_more_pending {
                    return false;
                }
                self.load_more_pending = true;
            }
            // The settle write always queues; drain-time staleness checking
            // keeps only the one matching the current index.
            DeferredTask::PageSettled(_) => {}
        }
        self.queue.push_back(task);
        true
    }

    /// Dequeues the oldest task.
    pub fn pop(&mut self) -> Option<DeferredTask> {
        let task = self.queue.pop_front()?;
        match task {
            DeferredTask::Unmute => self.unmute_pending = false,
            DeferredTask::Fill(index) => {
                self.pending_fills.remove(&index);
            }
            DeferredTask::LoadMore => self.load_more_pending = false,
            DeferredTask::PageSettled(_) => {}
        }
        Some(task)
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
