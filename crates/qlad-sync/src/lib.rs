//! Concurrency primitives for the detection pipeline's worker pool: a
//! monotone one-shot [`Signal`], an unbounded FIFO [`BlockingQueue`], and a
//! fixed-size [`WorkerPool`] built on top of them.

mod queue;
mod signal;
mod worker_pool;

pub use queue::BlockingQueue;
pub use signal::Signal;
pub use worker_pool::WorkerPool;
