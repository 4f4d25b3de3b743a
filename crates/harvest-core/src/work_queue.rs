//! Lock-free work queue handing each item to exactly one worker

use std::sync::atomic::{AtomicUsize, Ordering};

/// Claim-once queue over a fixed item list.
///
/// Workers call [`next()`](WorkQueue::next) to atomically claim the next
/// item. An item is never handed out twice, so two workers can never own
/// the same partition at the same time.
pub struct WorkQueue<S> {
    items: Vec<S>,
    cursor: AtomicUsize,
}

impl<S> WorkQueue<S> {
    pub fn new(items: Vec<S>) -> Self {
        log::debug!("{} items in work queue", items.len());
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next unclaimed item, or `None` when drained.
    pub fn next(&self) -> Option<&S> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }

    /// Total items in queue
    pub fn total(&self) -> usize {
        self.items.len()
    }
}
