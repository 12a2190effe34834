//! Execution contexts for chunked transforms.
//!
//! A [`Context`] runs a batch of scoped jobs and reports the first failure.
//! Jobs may borrow from the caller's stack (source columns, buffer parts), so
//! `call` blocks until every job has finished or been skipped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{ConfigError, ExecutionConfig};
use crate::error::{Error, Result};

/// A unit of work borrowing data for `'scope`.
pub type Job<'scope> = Box<dyn FnOnce() -> Result<()> + Send + 'scope>;

/// Runs jobs on behalf of the transform engine.
pub trait Context: Send + Sync {
    /// Returns false once the context no longer accepts work.
    fn is_active(&self) -> bool;

    /// Number of jobs that can run at the same time.
    fn parallelism(&self) -> usize;

    /// Runs all `jobs` and blocks until they are done.
    ///
    /// # Errors
    ///
    /// Returns the first job failure, or [`Error::TaskAborted`] if the
    /// context rejects the submission.
    fn call<'scope>(&self, jobs: Vec<Job<'scope>>) -> Result<()>;
}

/// Runs `job`, turning a panic into [`Error::TaskAborted`].
fn run_guarded(job: Job<'_>) -> Result<()> {
    catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(Error::aborted(format!("job panicked: {reason}")))
    })
}

/// Context backed by a dedicated rayon thread pool.
///
/// # Example
///
/// ```rust,ignore
/// use colgrid_core::{EngineConfig, PoolContext};
///
/// let config = EngineConfig::load()?;
/// let context = PoolContext::from_config(&config.execution)?;
/// ```
#[derive(Debug)]
pub struct PoolContext {
    pool: rayon::ThreadPool,
    parallelism: usize,
    active: AtomicBool,
}

impl PoolContext {
    /// Creates a context with `parallelism` worker threads (0 = all cores).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the thread pool cannot be started.
    pub fn new(parallelism: usize) -> Result<Self> {
        Self::from_config(&ExecutionConfig {
            parallelism,
            ..ExecutionConfig::default()
        })
    }

    /// Creates a context from the execution configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid or the
    /// thread pool cannot be started.
    pub fn from_config(config: &ExecutionConfig) -> Result<Self> {
        config.validate()?;
        let parallelism = config.effective_parallelism();
        let prefix = config.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;
        tracing::debug!(parallelism, "started pool context");
        Ok(Self {
            pool,
            parallelism,
            active: AtomicBool::new(true),
        })
    }

    /// Stops accepting work. Running jobs are not interrupted.
    pub fn shutdown(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Context for PoolContext {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn parallelism(&self) -> usize {
        self.parallelism
    }

    fn call<'scope>(&self, jobs: Vec<Job<'scope>>) -> Result<()> {
        if !self.is_active() {
            return Err(Error::aborted("pool context is shut down"));
        }
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.pool.scope(|scope| {
            for job in jobs {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    // The receiver outlives the scope.
                    let _ = sender.send(run_guarded(job));
                });
            }
        });
        drop(sender);
        receiver.into_iter().collect()
    }
}

/// Context running every job in order on the calling thread.
#[derive(Debug)]
pub struct SequentialContext {
    active: AtomicBool,
}

impl Default for SequentialContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialContext {
    /// Creates an active sequential context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
        }
    }

    /// Stops accepting work.
    pub fn shutdown(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Context for SequentialContext {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn call<'scope>(&self, jobs: Vec<Job<'scope>>) -> Result<()> {
        if !self.is_active() {
            return Err(Error::aborted("sequential context is shut down"));
        }
        jobs.into_iter().try_for_each(run_guarded)
    }
}
