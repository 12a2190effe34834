//! Mutable write buffers that freeze into immutable columns.
//!
//! Every buffer has a fixed length chosen at construction. Values are written
//! with `set` until the buffer is frozen; afterwards every mutator fails with
//! [`Error::IllegalState`](crate::Error::IllegalState).
//!
//! # Module Organization
//!
//! - `numeric`: real and integer buffers backed by `f64`
//! - `categorical`: packed category indices with a concurrently growing dictionary
//! - `object`: one optional object per row
//! - `temporal`: time of day and date-time buffers
//!
//! The transform engine writes through [`WriteBuffer::parts`], which splits a
//! buffer into disjoint row ranges that can be filled from different threads.

mod categorical;
mod numeric;
mod object;
mod temporal;

#[cfg(test)]
mod object_tests;

use std::fmt;

pub use categorical::{CategoricalBuffer, CategoricalPart};
pub use numeric::{NumericBuffer, NumericPart};
pub use object::{ObjectBuffer, ObjectPart};
pub use temporal::{DateTimeBuffer, DateTimePart, Precision, TimeBuffer, TimePart};

pub(crate) use numeric::round_half_up;

use crate::error::{Error, Result};

/// Maximum number of elements rendered by buffer previews.
const PREVIEW_ELEMENTS: usize = 32;

/// Writes values into a row range of a buffer.
pub trait Sink<V> {
    /// Stores `value` at absolute row `row`.
    ///
    /// # Errors
    ///
    /// Fails if `row` lies outside the range owned by this sink, or if the
    /// value cannot be stored.
    fn set(&mut self, row: usize, value: V) -> Result<()>;
}

/// A buffer that can be split into disjoint, independently writable parts.
pub trait WriteBuffer: Send {
    /// Value written per row.
    type Value;

    /// Writer of one row range.
    type Part<'a>: Sink<Self::Value> + Send
    where
        Self: 'a;

    /// Number of rows.
    fn size(&self) -> usize;

    /// Splits the buffer into one part per `(start, end)` range.
    ///
    /// Ranges must be ordered, non-overlapping and inside the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if the buffer is frozen and
    /// [`Error::InvalidArgument`] for malformed ranges.
    fn parts(&mut self, bounds: &[(usize, usize)]) -> Result<Vec<Self::Part<'_>>>;
}

/// Fails with [`Error::IllegalState`] if `frozen`.
pub(crate) fn ensure_mutable(frozen: bool) -> Result<()> {
    if frozen {
        Err(Error::IllegalState("buffer is frozen".to_string()))
    } else {
        Ok(())
    }
}

/// Fails with [`Error::IndexOutOfBounds`] unless `index < size`.
pub(crate) fn check_index(index: usize, size: usize) -> Result<()> {
    if index < size {
        Ok(())
    } else {
        Err(Error::IndexOutOfBounds { index, size })
    }
}

/// Splits `values` into mutable sub-slices, one per range, each paired with
/// its first absolute row.
pub(crate) fn split_ranges<'a, T>(
    values: &'a mut [T],
    bounds: &[(usize, usize)],
) -> Result<Vec<(usize, &'a mut [T])>> {
    let mut rest = values;
    let mut offset = 0;
    let mut parts = Vec::with_capacity(bounds.len());
    for &(start, end) in bounds {
        if start < offset || end < start || end - offset > rest.len() {
            return Err(Error::InvalidArgument(format!(
                "range [{start}, {end}) is unordered or exceeds the buffer"
            )));
        }
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(start - offset);
        let (part, tail) = tail.split_at_mut(end - start);
        parts.push((start, part));
        rest = tail;
        offset = end;
    }
    Ok(parts)
}

/// Checks ranges the same way as [`split_ranges`] without splitting anything.
pub(crate) fn check_ranges(size: usize, bounds: &[(usize, usize)]) -> Result<()> {
    let mut offset = 0;
    for &(start, end) in bounds {
        if start < offset || end < start || end > size {
            return Err(Error::InvalidArgument(format!(
                "range [{start}, {end}) is unordered or exceeds the buffer"
            )));
        }
        offset = end;
    }
    Ok(())
}

/// Renders `Name (len)` followed by the elements, eliding the middle of
/// long buffers as `...`.
pub(crate) fn preview(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    len: usize,
    render: impl Fn(usize) -> String,
) -> fmt::Result {
    writeln!(f, "{name} ({len})")?;
    let rendered: Vec<String> = if len <= PREVIEW_ELEMENTS {
        (0..len).map(&render).collect()
    } else {
        (0..PREVIEW_ELEMENTS - 2)
            .map(&render)
            .chain(std::iter::once("...".to_string()))
            .chain(std::iter::once(render(len - 1)))
            .collect()
    };
    write!(f, "({})", rendered.join(", "))
}
