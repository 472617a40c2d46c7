//! A fixed-size pool of worker threads.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Sender};
use tracing::{debug, info, warn};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// How often [`ThreadPool::shutdown`] checks whether running tasks have finished.
const SHUTDOWN_POLL: Duration = Duration::from_millis(5);

/// Decrements the active task counter when dropped.
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A pool of worker threads pulling jobs from a shared queue.
///
/// # Design
/// - Workers share one multi-consumer channel, so an idle worker takes the next job
/// - A job that panics is caught and logged; its worker keeps running
/// - `active` counts jobs that are queued or running
pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    active: Arc<AtomicUsize>,
}

impl ThreadPool {
    /// Spawns `size` worker threads (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = channel::unbounded::<Job>();
        let active = Arc::new(AtomicUsize::new(0));

        let workers = (0..size)
            .filter_map(|index| {
                let receiver = receiver.clone();
                let active = Arc::clone(&active);

                let spawned = thread::Builder::new()
                    .name(format!("encog-worker-{}", index))
                    .spawn(move || {
                        // Ends once every sender is dropped and the queue is drained
                        for job in receiver.iter() {
                            let _active = ActiveGuard(&active);
                            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                warn!(worker = index, "pool task panicked");
                            }
                        }
                        debug!(worker = index, "worker exiting");
                    });

                match spawned {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!(worker = index, "failed to spawn worker thread: {}", e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        info!(threads = workers.len(), "thread pool started");

        Self {
            sender: Some(sender),
            workers,
            active,
        }
    }

    /// Returns the number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of jobs queued or running.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Queues a job. If the pool has no workers or is shut down, the job runs on the calling
    /// thread instead.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(job) = self.try_execute(Box::new(job)) {
            job();
        }
    }

    /// Queues a job, handing it back if the pool has no workers or is shut down.
    pub(crate) fn try_execute(&self, job: Job) -> Result<(), Job> {
        match &self.sender {
            Some(sender) if !self.workers.is_empty() => {
                self.active.fetch_add(1, Ordering::SeqCst);
                sender.send(job).map_err(|rejected| {
                    self.active.fetch_sub(1, Ordering::SeqCst);
                    rejected.into_inner()
                })
            }
            _ => Err(job),
        }
    }

    /// Stops accepting jobs and waits up to `timeout` for queued and running jobs to finish.
    ///
    /// Running jobs are never interrupted. Returns whether every job finished in time; if not, the
    /// workers are left to finish on their own.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        // Closing the channel lets workers exit after draining the queue
        self.sender = None;

        let deadline = Instant::now() + timeout;
        while self.active_count() > 0 {
            if Instant::now() >= deadline {
                warn!(
                    active = self.active_count(),
                    "thread pool shutdown timed out with tasks still running"
                );
                self.workers.clear();
                return false;
            }
            thread::sleep(SHUTDOWN_POLL);
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
        info!("thread pool shut down");
        true
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.shutdown(Duration::from_secs(5));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::concurrency::task_group::{CompletionGuard, TaskGroup};

    #[test]
    fn test_execute_all() {
        let mut pool = ThreadPool::new(4);
        assert_eq!(4, pool.size());

        let group = Arc::new(TaskGroup::new(0));
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let group_ref = Arc::clone(&group);
            let count = Arc::clone(&count);
            group.task_starting();
            pool.execute(move || {
                let _guard = CompletionGuard(&group_ref);
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        group.wait_for_complete();
        assert_eq!(100, count.load(Ordering::SeqCst));
        assert!(pool.shutdown(Duration::from_secs(1)));
    }

    #[test]
    fn test_panicking_job_keeps_worker() {
        let mut pool = ThreadPool::new(1);
        let group = Arc::new(TaskGroup::new(0));

        group.task_starting();
        let group_ref = Arc::clone(&group);
        pool.execute(move || {
            let _guard = CompletionGuard(&group_ref);
            panic!("job failed");
        });
        group.wait_for_complete();

        // The only worker must still be alive to run this
        let ran = Arc::new(AtomicUsize::new(0));
        group.task_starting();
        let group_ref = Arc::clone(&group);
        let ran_ref = Arc::clone(&ran);
        pool.execute(move || {
            let _guard = CompletionGuard(&group_ref);
            ran_ref.store(1, Ordering::SeqCst);
        });
        group.wait_for_complete();

        assert_eq!(1, ran.load(Ordering::SeqCst));
        assert!(pool.shutdown(Duration::from_secs(1)));
    }

    #[test]
    fn test_shutdown_timeout() {
        let mut pool = ThreadPool::new(1);
        pool.execute(|| thread::sleep(Duration::from_millis(300)));

        assert!(!pool.shutdown(Duration::from_millis(10)));
        assert_eq!(0, pool.size());
    }

    #[test]
    fn test_execute_after_shutdown_runs_inline() {
        let mut pool = ThreadPool::new(2);
        assert!(pool.shutdown(Duration::from_secs(1)));

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_ref = Arc::clone(&ran);
        pool.execute(move || {
            ran_ref.store(1, Ordering::SeqCst);
        });
        assert_eq!(1, ran.load(Ordering::SeqCst));
    }
}
