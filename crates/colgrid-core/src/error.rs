//! Error types for `colgrid`.
//!
//! A single error type covers configuration mistakes, capability violations
//! and failed parallel executions. Error codes follow the pattern
//! `COLGRID-XXX` for easy debugging.

use thiserror::Error;

use crate::config::ConfigError;
use crate::packing::Format;

/// Result type alias for `colgrid` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `colgrid` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument (COLGRID-001).
    ///
    /// Raised for malformed tables, mappings or dictionary requests.
    #[error("[COLGRID-001] Invalid argument: {0}")]
    InvalidArgument(String),

    /// Object type mismatch (COLGRID-002).
    #[error("[COLGRID-002] Object type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Element type requested by the caller.
        expected: String,
        /// Element type stored in the column.
        actual: String,
    },

    /// Illegal state (COLGRID-003), e.g. writing to a frozen buffer.
    #[error("[COLGRID-003] Illegal state: {0}")]
    IllegalState(String),

    /// Index out of bounds (COLGRID-004).
    #[error("[COLGRID-004] Index {index} out of bounds for length {size}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Capacity of the target.
        size: usize,
    },

    /// Too many categories for the packing format (COLGRID-005).
    #[error("[COLGRID-005] Format {format:?} cannot hold more than {max} categories")]
    CategoryOverflow {
        /// Packing format of the buffer.
        format: Format,
        /// Maximum number of distinct categories.
        max: usize,
    },

    /// Operation not supported by the column (COLGRID-006).
    #[error("[COLGRID-006] Unsupported operation: {0}")]
    Unsupported(String),

    /// Parallel execution aborted (COLGRID-007).
    ///
    /// Wraps the chunk failure when the abort was caused by one.
    #[error("[COLGRID-007] Task aborted: {reason}")]
    TaskAborted {
        /// Human readable abort reason.
        reason: String,
        /// Failure of the chunk that caused the abort, if any.
        #[source]
        source: Option<Box<Error>>,
    },

    /// Configuration error (COLGRID-008).
    #[error("[COLGRID-008] Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Creates a task-aborted error without an underlying chunk failure.
    #[must_use]
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::TaskAborted {
            reason: reason.into(),
            source: None,
        }
    }

    /// Returns the error code (e.g., "COLGRID-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "COLGRID-001",
            Self::TypeMismatch { .. } => "COLGRID-002",
            Self::IllegalState(_) => "COLGRID-003",
            Self::IndexOutOfBounds { .. } => "COLGRID-004",
            Self::CategoryOverflow { .. } => "COLGRID-005",
            Self::Unsupported(_) => "COLGRID-006",
            Self::TaskAborted { .. } => "COLGRID-007",
            Self::Config(_) => "COLGRID-008",
        }
    }

    /// Returns true if the caller can retry the operation differently.
    ///
    /// A category overflow can be retried with a wider format and an aborted
    /// task with an active context. Everything else is a programming error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::CategoryOverflow { .. } | Self::TaskAborted { .. })
    }
}
