//! Partitioning of row ranges into chunks.

use serde::{Deserialize, Serialize};

/// Expected cost of the transform function per row.
///
/// Heavier workloads use smaller chunks and more chunks per worker, so that
/// uneven rows balance out across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    /// Trivial arithmetic.
    Small,
    /// Typical element-wise functions.
    #[default]
    Default,
    /// Moderate work per row, e.g. string formatting.
    Medium,
    /// Expensive work per row.
    Large,
    /// Very expensive work per row.
    Huge,
}

impl Workload {
    /// Minimum number of rows worth a chunk of its own.
    #[must_use]
    pub const fn min_rows_per_chunk(self) -> usize {
        match self {
            Self::Small => 16_384,
            Self::Default => 4_096,
            Self::Medium => 1_024,
            Self::Large => 256,
            Self::Huge => 32,
        }
    }

    /// Maximum number of chunks per worker thread.
    #[must_use]
    pub const fn chunks_per_worker(self) -> usize {
        match self {
            Self::Small => 1,
            Self::Default => 2,
            Self::Medium => 4,
            Self::Large => 8,
            Self::Huge => 16,
        }
    }
}

/// Number of chunks for `rows` rows on `parallelism` workers.
///
/// Zero rows need no chunk; otherwise at least one chunk is used.
#[must_use]
pub fn chunk_count(rows: usize, parallelism: usize, workload: Workload) -> usize {
    if rows == 0 {
        return 0;
    }
    let max_chunks = parallelism.max(1) * workload.chunks_per_worker();
    rows.div_ceil(workload.min_rows_per_chunk())
        .clamp(1, max_chunks)
}

/// Splits `[0, rows)` into `chunks` contiguous ranges.
///
/// Range sizes differ by at most one; the first `rows % chunks` ranges are
/// one row longer.
#[must_use]
pub fn chunk_bounds(rows: usize, chunks: usize) -> Vec<(usize, usize)> {
    if chunks == 0 {
        return Vec::new();
    }
    let base = rows / chunks;
    let extra = rows % chunks;
    let mut start = 0;
    (0..chunks)
        .map(|chunk| {
            let end = start + base + usize::from(chunk < extra);
            let bounds = (start, end);
            start = end;
            bounds
        })
        .collect()
}
