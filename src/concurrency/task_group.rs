//! Barrier synchronization over a group of tasks.

use parking_lot::{Condvar, Mutex};
use tracing::trace;

#[derive(Debug, Default)]
struct Counts {
    started: usize,
    completed: usize,
}

/// Tracks how many tasks of a group have started and completed, and lets a thread wait until the
/// two counts are equal.
///
/// A group can be reused: after [`wait_for_complete`][Self::wait_for_complete] returns, more
/// tasks may be started and waited on again.
#[derive(Debug)]
pub struct TaskGroup {
    id: usize,
    counts: Mutex<Counts>,
    signal: Condvar,
}

impl TaskGroup {
    /// Returns a new group with no tasks.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            counts: Mutex::new(Counts::default()),
            signal: Condvar::new(),
        }
    }

    /// Returns the id of this group.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Records that a task of this group has started.
    ///
    /// This must be called before the task is handed to another thread, otherwise a waiter could
    /// observe equal counts before the task is counted.
    pub fn task_starting(&self) {
        let mut counts = self.counts.lock();
        counts.started += 1;
        trace!(group = self.id, started = counts.started, "task starting");
    }

    /// Records that a task of this group has completed, waking any waiters if it was the last.
    pub fn task_stopping(&self) {
        let mut counts = self.counts.lock();
        counts.completed += 1;
        trace!(group = self.id, completed = counts.completed, "task stopping");

        if counts.started == counts.completed {
            self.signal.notify_all();
        }
    }

    /// Returns whether every started task has completed.
    pub fn no_tasks(&self) -> bool {
        let counts = self.counts.lock();
        counts.started == counts.completed
    }

    /// Blocks until every started task has completed.
    pub fn wait_for_complete(&self) {
        let mut counts = self.counts.lock();
        // Re-check after every wake
        while counts.started != counts.completed {
            self.signal.wait(&mut counts);
        }
    }
}

/// Signals completion of a task to its group when dropped, including when the task panics.
pub(crate) struct CompletionGuard<'a>(pub(crate) &'a TaskGroup);

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.0.task_stopping();
    }
}
