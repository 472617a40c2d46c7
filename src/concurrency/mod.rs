//! The concurrency substrate used by population trainers.
//!
//! [`EngineConcurrency`] owns a [`ThreadPool`] and hands out [`TaskGroup`]s. A trainer starts one
//! task per individual with [`process_task`][EngineConcurrency::process_task], then blocks on the
//! group's [`wait_for_complete`][TaskGroup::wait_for_complete] before touching shared state:
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use encog::concurrency::EngineConcurrency;
//! use encog::config::EngineConfig;
//!
//! let concurrency = EngineConcurrency::new(&EngineConfig::default());
//! let group = concurrency.create_task_group();
//! let done = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..8 {
//!     let done = Arc::clone(&done);
//!     concurrency.process_task(move || { done.fetch_add(1, Ordering::SeqCst); }, Some(&group));
//! }
//!
//! group.wait_for_complete();
//! assert_eq!(8, done.load(Ordering::SeqCst));
//! ```

mod pool;
mod task_group;

pub use pool::ThreadPool;
pub use task_group::TaskGroup;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::EngineConfig;
use pool::Job;
use task_group::CompletionGuard;

/// A thread pool plus task group factory, shared by the trainers of one application.
pub struct EngineConcurrency {
    // `None` when running strictly sequentially
    pool: Option<Mutex<ThreadPool>>,
    thread_count: usize,
    next_group: AtomicUsize,
    shutdown_timeout: Duration,
}

impl EngineConcurrency {
    /// Creates the substrate described by `config`.
    pub fn new(config: &EngineConfig) -> Self {
        let thread_count = config.resolved_thread_count();
        let pool = if thread_count > 1 {
            Some(Mutex::new(ThreadPool::new(thread_count)))
        } else {
            None
        };
        debug!(thread_count, "engine concurrency created");

        Self {
            pool,
            thread_count,
            next_group: AtomicUsize::new(0),
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    /// Creates a substrate that runs every task on the calling thread.
    pub fn sequential() -> Self {
        Self::new(&EngineConfig::single_threaded())
    }

    /// Returns the number of threads tasks are spread over.
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Returns whether tasks run on worker threads.
    pub fn is_multi_threaded(&self) -> bool {
        self.pool.is_some()
    }

    /// Creates a new, empty task group.
    pub fn create_task_group(&self) -> Arc<TaskGroup> {
        Arc::new(TaskGroup::new(self.next_group.fetch_add(1, Ordering::SeqCst)))
    }

    /// Runs `task`, on a worker thread if the substrate is multi-threaded or inline otherwise.
    ///
    /// If `group` is given, the task is counted as started before this returns and as completed
    /// when it finishes, even if it panics.
    pub fn process_task<F>(&self, task: F, group: Option<&Arc<TaskGroup>>)
    where
        F: FnOnce() + Send + 'static,
    {
        let group = group.map(Arc::clone);
        if let Some(group) = &group {
            group.task_starting();
        }

        let job: Job = Box::new(move || {
            let _guard = group.as_deref().map(CompletionGuard);
            task();
        });

        // The pool lock must be released before a rejected job runs inline, since the job may
        // submit tasks of its own
        let rejected = match &self.pool {
            Some(pool) => pool.lock().try_execute(job).err(),
            None => Some(job),
        };
        if let Some(job) = rejected {
            job();
        }
    }

    /// Shuts down the thread pool, waiting up to `timeout` for running tasks. Returns whether the
    /// pool drained in time. Later tasks run on the calling thread.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        match &self.pool {
            Some(pool) => pool.lock().shutdown(timeout),
            None => true,
        }
    }
}

impl Drop for EngineConcurrency {
    fn drop(&mut self) {
        self.shutdown(self.shutdown_timeout);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn config(thread_count: usize) -> EngineConfig {
        EngineConfig {
            thread_count,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_sequential_runs_inline() {
        let concurrency = EngineConcurrency::sequential();
        assert!(!concurrency.is_multi_threaded());

        let caller = thread::current().id();
        let group = concurrency.create_task_group();
        let ran_on = Arc::new(Mutex::new(None));
        let ran_on_ref = Arc::clone(&ran_on);

        concurrency.process_task(
            move || *ran_on_ref.lock() = Some(thread::current().id()),
            Some(&group),
        );

        // Already complete without waiting
        assert!(group.no_tasks());
        assert_eq!(Some(caller), *ran_on.lock());
    }

    #[test]
    fn test_parallel_barrier() {
        let concurrency = EngineConcurrency::new(&config(4));
        assert!(concurrency.is_multi_threaded());
        assert_eq!(4, concurrency.thread_count());

        let group = concurrency.create_task_group();
        let results = Arc::new(Mutex::new(Vec::new()));
        for i in 0..32 {
            let results = Arc::clone(&results);
            concurrency.process_task(
                move || {
                    thread::sleep(Duration::from_millis((i % 5) as u64));
                    results.lock().push(i);
                },
                Some(&group),
            );
        }

        group.wait_for_complete();
        let mut results = results.lock().clone();
        results.sort_unstable();
        assert_eq!((0..32).collect::<Vec<_>>(), results);
    }

    #[test]
    fn test_group_ids_unique() {
        let concurrency = EngineConcurrency::sequential();
        let a = concurrency.create_task_group();
        let b = concurrency.create_task_group();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_nested_tasks() {
        for shut_down in [false, true] {
            let concurrency = Arc::new(EngineConcurrency::new(&config(2)));
            if shut_down {
                assert!(concurrency.shutdown(Duration::from_secs(1)));
            }

            let group = concurrency.create_task_group();
            let ran = Arc::new(AtomicUsize::new(0));
            let inner = Arc::clone(&concurrency);
            let inner_group = Arc::clone(&group);
            let ran_ref = Arc::clone(&ran);

            concurrency.process_task(
                move || {
                    inner.process_task(
                        move || {
                            ran_ref.fetch_add(1, Ordering::SeqCst);
                        },
                        Some(&inner_group),
                    );
                },
                Some(&group),
            );

            group.wait_for_complete();
            assert_eq!(1, ran.load(Ordering::SeqCst));
        }
    }

    #[test]
    fn test_shutdown() {
        let concurrency = EngineConcurrency::new(&config(2));
        assert!(concurrency.shutdown(Duration::from_secs(1)));

        // Still usable, inline
        let group = concurrency.create_task_group();
        concurrency.process_task(|| {}, Some(&group));
        assert!(group.no_tasks());
    }
}
