//! # `colgrid` Core
//!
//! In-memory columnar table engine with parallel column transforms.
//!
//! ## Features
//!
//! - **Typed immutable columns**: real, integer, categorical, object, time and date-time
//! - **Packed categories**: 2/4/8/16/32-bit category indices with a shared dictionary
//! - **Concurrent buffers**: categorical buffers grow their dictionary safely from many threads
//! - **Parallel transforms**: chunked element-wise and row-wise transforms with cooperative abort
//! - **Stable sorting**: NaN and signed-zero aware permutation sort
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use colgrid_core::{Column, PoolContext, Table};
//!
//! let table = Table::new(vec![(
//!     "x".to_string(),
//!     Column::real((0..75).map(f64::from).collect()),
//! )])?;
//!
//! let context = PoolContext::new(0)?;
//! let doubled = table
//!     .transform(0)?
//!     .apply_numeric_to_integer(|v| 2.0 * v, &context)?
//!     .into_column();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// =============================================================================
// NUMERIC CAST LINTS
// =============================================================================
// Category indices move between u32, usize and the packed widths; the packing
// code checks widths before casting.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// =============================================================================
// STYLISTIC LINTS
// =============================================================================
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::float_cmp)]

pub mod buffer;
pub mod column;
pub mod config;
pub mod error;
pub mod packing;
#[cfg(test)]
mod packing_tests;
pub mod row;
#[cfg(test)]
mod row_tests;
pub mod sorting;
#[cfg(test)]
mod sorting_tests;
pub mod table;
pub mod transform;

pub use buffer::{
    CategoricalBuffer, DateTimeBuffer, NumericBuffer, ObjectBuffer, Precision, Sink, TimeBuffer,
    WriteBuffer,
};
pub use column::{
    text, Capabilities, Capability, Category, Column, ColumnType, ColumnTypeId, Dictionary,
    ObjectReader, ObjectType,
};
pub use config::{ConfigError, EngineConfig, ExecutionConfig, TransformConfig};
pub use error::{Error, Result};
pub use packing::{Format, PackedIndices};
pub use row::{RowCursor, BEFORE_FIRST};
pub use sorting::Order;
pub use table::Table;
pub use transform::{
    Applier, Categorical, Context, DateTimes, Integer, Objects, PoolContext, Real,
    RowTransformer, SequentialContext, Target, Times, Transformer, Workload,
};
