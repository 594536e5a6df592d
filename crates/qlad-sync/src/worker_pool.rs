use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::BlockingQueue;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of worker threads sharing one FIFO job queue. Submission is
/// non-blocking; jobs run in arrival order per-worker, with no ordering
/// guarantee across workers. A panicking job is caught and logged, not
/// propagated: it never kills its worker thread.
pub struct WorkerPool {
    queue: Arc<BlockingQueue<Option<Job>>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `thread_count` workers (minimum 1).
    pub fn new(thread_count: usize) -> Self {
        let thread_count = thread_count.max(1);
        let queue = Arc::new(BlockingQueue::new());
        let workers = (0..thread_count)
            .map(|id| {
                let queue = Arc::clone(&queue);
                thread::Builder::new()
                    .name(format!("qlad-worker-{id}"))
                    .spawn(move || Self::run(queue))
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self { queue, workers }
    }

    fn run(queue: Arc<BlockingQueue<Option<Job>>>) {
        loop {
            match queue.pop() {
                None => return,
                Some(job) => {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                        let message = panic_message(&payload);
                        tracing::error!(panic = %message, "worker pool job panicked");
                    }
                }
            }
        }
    }

    /// Submits a job for execution. Never blocks.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Some(Box::new(job)));
    }

    /// Pushes one shutdown sentinel per worker and joins every thread.
    /// In-flight jobs are allowed to finish.
    pub fn stop(mut self) {
        for _ in &self.workers {
            self.queue.push(None);
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_submitted_jobs() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.stop();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn survives_a_panicking_job() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        pool.submit(|| panic!("boom"));
        let counter2 = Arc::clone(&counter);
        pool.submit(move || {
            counter2.fetch_add(1, Ordering::SeqCst);
        });
        pool.stop();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
