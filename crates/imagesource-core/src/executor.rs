//! Background and delivery execution contexts.
//!
//! Work runs on a shared [`BackgroundPool`]; results come back through a
//! [`DeliveryQueue`] that the delivery thread (typically a UI loop) pumps.
//! [`ExecutionContext::dispatch`] ties the two together and guarantees one
//! completion per request.
//!
//! # Example
//!
//! ```ignore
//! let delivery = DeliveryQueue::new();
//! let context = ExecutionContext::with_pool(&ExecutorConfig::default(), &delivery)?;
//!
//! context.dispatch(|| Some(40 + 2), |answer| println!("{answer:?}"));
//!
//! // On the delivery thread:
//! delivery.run_next(Duration::from_secs(1));
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{trace, warn};

use crate::config::{ExecutorConfig, SourceConfig};

/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere jobs can be run.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Errors while building execution contexts.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

/// Concurrent worker pool for decode and read work.
pub struct BackgroundPool {
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for BackgroundPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundPool")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl BackgroundPool {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ExecutorError> {
        let prefix = config.thread_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(move |index| format!("{prefix}-{index}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Executor for BackgroundPool {
    fn execute(&self, job: Job) {
        self.pool.spawn(job);
    }
}

/// Completion queue owned by the delivery thread.
///
/// Jobs posted through a [`DeliveryContext`] run only when the owner pumps the
/// queue, and always on the pumping thread.
#[derive(Debug)]
pub struct DeliveryQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Handle for posting jobs to this queue from any thread.
    pub fn context(&self) -> DeliveryContext {
        DeliveryContext {
            sender: self.sender.clone(),
        }
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run every job already queued. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one job and run it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Run jobs until `count` have run or `timeout` elapses. Returns how many ran.
    pub fn run_until(&self, count: usize, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut ran = 0;
        while ran < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.run_next(remaining) {
                break;
            }
            ran += 1;
        }
        ran
    }
}

/// Sending side of a [`DeliveryQueue`].
#[derive(Debug, Clone)]
pub struct DeliveryContext {
    sender: Sender<Job>,
}

impl Executor for DeliveryContext {
    fn execute(&self, job: Job) {
        if self.sender.send(job).is_err() {
            warn!("delivery queue is gone, dropping completion");
        }
    }
}

/// Background and delivery executors shared by every image source.
///
/// Create one per process and clone it into each source; clones share the
/// same executors.
#[derive(Clone)]
pub struct ExecutionContext {
    background: Arc<dyn Executor>,
    delivery: Arc<dyn Executor>,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext").finish_non_exhaustive()
    }
}

impl ExecutionContext {
    pub fn new(background: Arc<dyn Executor>, delivery: Arc<dyn Executor>) -> Self {
        Self {
            background,
            delivery,
        }
    }

    /// Build a worker pool from `config` and deliver into `delivery`.
    pub fn with_pool(
        config: &ExecutorConfig,
        delivery: &DeliveryQueue,
    ) -> Result<Self, ExecutorError> {
        let pool = BackgroundPool::new(config)?;
        Ok(Self::new(Arc::new(pool), Arc::new(delivery.context())))
    }

    /// Build the process-wide context from configuration.
    pub fn from_config(
        config: &SourceConfig,
        delivery: &DeliveryQueue,
    ) -> Result<Self, ExecutorError> {
        Self::with_pool(&config.executor, delivery)
    }

    /// Run `work` in the background and hand its result to `handler` on the
    /// delivery context.
    ///
    /// `handler` is posted exactly once, whether `work` produced a value,
    /// produced `None`, or panicked (which counts as `None`).
    pub fn dispatch<T, W, H>(&self, work: W, handler: H)
    where
        T: Send + 'static,
        W: FnOnce() -> Option<T> + Send + 'static,
        H: FnOnce(Option<T>) + Send + 'static,
    {
        let delivery = Arc::clone(&self.delivery);
        self.background.execute(Box::new(move || {
            let result = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
                warn!("background work panicked, delivering no result");
                None
            });
            trace!(present = result.is_some(), "posting completion");
            delivery.execute(Box::new(move || handler(result)));
        }));
    }
}
