//! The chunked transform state machine.
//!
//! ```text
//! new(target, kernel, rows)
//!   └─ init(chunks)            allocate buffer, compute chunk bounds
//!        └─ do_part(s, e, i)   fill rows [s, e) of the buffer
//!             └─ result() / into_result()
//! ```
//!
//! [`Applier::execute`] drives the same steps in parallel: the buffer is
//! split into one disjoint part per chunk and every chunk becomes one job of
//! the execution context.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::chunking::{chunk_bounds, chunk_count, Workload};
use super::context::{Context, Job};
use super::kernel::Kernel;
use super::target::Target;
use crate::buffer::WriteBuffer;
use crate::error::{Error, Result};

fn not_initialized() -> Error {
    Error::IllegalState("applier is not initialized".to_string())
}

/// Applies a kernel to a row range, writing into a target buffer.
pub struct Applier<T: Target, K> {
    target: T,
    kernel: K,
    rows: usize,
    buffer: Option<T::Buffer>,
    bounds: Vec<(usize, usize)>,
}

impl<T: Target, K> std::fmt::Debug for Applier<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("target", &self.target.name())
            .field("rows", &self.rows)
            .field("initialized", &self.buffer.is_some())
            .field("chunks", &self.bounds.len())
            .finish()
    }
}

impl<T, K> Applier<T, K>
where
    T: Target,
    K: Kernel<Value = T::Value>,
{
    /// Creates an applier over `rows` rows. Validation happens in the
    /// transformer building it.
    pub fn new(target: T, kernel: K, rows: usize) -> Self {
        Self {
            target,
            kernel,
            rows,
            buffer: None,
            bounds: Vec::new(),
        }
    }

    /// Number of rows to transform.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Allocates the destination buffer and splits the rows into `chunks`.
    ///
    /// Re-initializing discards previous results.
    pub fn init(&mut self, chunks: usize) {
        self.buffer = Some(self.target.create_buffer(self.rows));
        self.bounds = chunk_bounds(self.rows, chunks);
    }

    /// Chunk ranges computed by [`Applier::init`].
    #[must_use]
    pub fn chunk_bounds(&self) -> &[(usize, usize)] {
        &self.bounds
    }

    /// Transforms rows `[start, end)` of chunk `chunk`.
    ///
    /// # Errors
    ///
    /// Fails if the applier is not initialized, the range exceeds the rows,
    /// or the kernel fails.
    pub fn do_part(&mut self, start: usize, end: usize, chunk: usize) -> Result<()> {
        let buffer = self.buffer.as_mut().ok_or_else(not_initialized)?;
        let mut parts = buffer.parts(&[(start, end)])?;
        let mut part = parts.pop().ok_or_else(not_initialized)?;
        tracing::trace!(chunk, start, end, "transforming chunk");
        self.kernel.run(start, end, &mut part)
    }

    /// Buffer in its current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] before [`Applier::init`].
    pub fn result(&self) -> Result<&T::Buffer> {
        self.buffer.as_ref().ok_or_else(not_initialized)
    }

    /// Consumes the applier and returns the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] before [`Applier::init`].
    pub fn into_result(self) -> Result<T::Buffer> {
        self.buffer.ok_or_else(not_initialized)
    }

    /// Runs all chunks on `context` and returns the filled buffer.
    ///
    /// The number of chunks follows from the context parallelism and the
    /// workload. A failing chunk stops chunks that have not started yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskAborted`] if the context is inactive, rejects the
    /// jobs, or any chunk fails; the chunk failure is the error source.
    pub fn execute(mut self, context: &dyn Context, workload: Workload) -> Result<T::Buffer> {
        let chunks = chunk_count(self.rows, context.parallelism(), workload);
        self.init(chunks);
        tracing::debug!(
            rows = self.rows,
            chunks,
            ?workload,
            target = self.target.name(),
            "planned transform"
        );

        let Self {
            kernel,
            buffer,
            bounds,
            ..
        } = self;
        let mut buffer = buffer.ok_or_else(not_initialized)?;
        if bounds.is_empty() {
            return Ok(buffer);
        }
        if !context.is_active() {
            tracing::warn!("context is inactive, transform not started");
            return Err(Error::aborted("context is not active"));
        }

        let abort = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        {
            let parts = buffer.parts(&bounds)?;
            let (kernel, abort, completed) = (&kernel, &abort, &completed);
            let jobs: Vec<Job<'_>> = parts
                .into_iter()
                .zip(bounds.iter().copied())
                .enumerate()
                .map(|(chunk, (mut part, (start, end)))| {
                    Box::new(move || {
                        if abort.load(Ordering::Acquire) {
                            return Ok(());
                        }
                        if !context.is_active() {
                            abort.store(true, Ordering::Release);
                            tracing::warn!(chunk, "context became inactive");
                            return Err(Error::aborted("context became inactive"));
                        }
                        tracing::trace!(chunk, start, end, "transforming chunk");
                        kernel.run(start, end, &mut part).map_err(|e| {
                            abort.store(true, Ordering::Release);
                            tracing::warn!(chunk, error = %e, "chunk failed");
                            e
                        })?;
                        completed.fetch_add(1, Ordering::AcqRel);
                        Ok(())
                    }) as Job<'_>
                })
                .collect();

            context.call(jobs).map_err(|e| match e {
                Error::TaskAborted { .. } => e,
                other => Error::TaskAborted {
                    reason: "chunk failed".to_string(),
                    source: Some(Box::new(other)),
                },
            })?;
        }

        let done = completed.load(Ordering::Acquire);
        if abort.load(Ordering::Acquire) || done != bounds.len() {
            tracing::warn!(done, chunks = bounds.len(), "transform incomplete");
            return Err(Error::aborted(format!(
                "{done} of {} chunks completed",
                bounds.len()
            )));
        }
        Ok(buffer)
    }
}
