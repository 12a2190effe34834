//! Read side of a transform: how a chunk reads its source rows.
//!
//! A kernel combines a source accessor with the user function and writes
//! one result per row of its chunk into a [`Sink`].

use std::marker::PhantomData;

use crate::buffer::Sink;
use crate::column::{Column, ObjectReader, ObjectValue};
use crate::error::Result;
use crate::row::RowCursor;

/// Computes the rows `[start, end)` of a transform.
pub trait Kernel: Sync {
    /// Value produced per row.
    type Value;

    /// Writes the results of rows `[start, end)` into `sink`.
    ///
    /// # Errors
    ///
    /// Propagates failures of the sink.
    fn run<S: Sink<Self::Value>>(&self, start: usize, end: usize, sink: &mut S) -> Result<()>;
}

/// Applies a function to the doubles of one column, bulk filled in batches.
pub struct NumericKernel<'c, F, V> {
    column: &'c Column,
    function: F,
    batch_rows: usize,
    value: PhantomData<fn() -> V>,
}

impl<'c, F, V> NumericKernel<'c, F, V> {
    pub(crate) fn new(column: &'c Column, function: F, batch_rows: usize) -> Self {
        Self {
            column,
            function,
            batch_rows: batch_rows.max(1),
            value: PhantomData,
        }
    }
}

impl<F, V> Kernel for NumericKernel<'_, F, V>
where
    F: Fn(f64) -> V + Sync,
{
    type Value = V;

    fn run<S: Sink<V>>(&self, start: usize, end: usize, sink: &mut S) -> Result<()> {
        let mut batch = vec![0.0; self.batch_rows.min(end.saturating_sub(start))];
        let mut row = start;
        while row < end {
            let len = batch.len().min(end - row);
            let filled = self.column.fill_numeric(&mut batch[..len], row)?;
            for (offset, &value) in batch[..filled].iter().enumerate() {
                sink.set(row + offset, (self.function)(value))?;
            }
            row += len;
        }
        Ok(())
    }
}

/// Applies a function to the category indices of one column.
pub struct CategoryKernel<'c, F, V> {
    column: &'c Column,
    function: F,
    batch_rows: usize,
    value: PhantomData<fn() -> V>,
}

impl<'c, F, V> CategoryKernel<'c, F, V> {
    pub(crate) fn new(column: &'c Column, function: F, batch_rows: usize) -> Self {
        Self {
            column,
            function,
            batch_rows: batch_rows.max(1),
            value: PhantomData,
        }
    }
}

impl<F, V> Kernel for CategoryKernel<'_, F, V>
where
    F: Fn(u32) -> V + Sync,
{
    type Value = V;

    fn run<S: Sink<V>>(&self, start: usize, end: usize, sink: &mut S) -> Result<()> {
        let mut batch = vec![0u32; self.batch_rows.min(end.saturating_sub(start))];
        let mut row = start;
        while row < end {
            let len = batch.len().min(end - row);
            let filled = self.column.fill_indices(&mut batch[..len], row)?;
            for (offset, &index) in batch[..filled].iter().enumerate() {
                sink.set(row + offset, (self.function)(index))?;
            }
            row += len;
        }
        Ok(())
    }
}

/// Applies a function to the objects of one column through direct access.
pub struct ObjectKernel<'c, T, F, V> {
    reader: ObjectReader<'c, T>,
    function: F,
    value: PhantomData<fn() -> V>,
}

impl<'c, T, F, V> ObjectKernel<'c, T, F, V> {
    pub(crate) fn new(reader: ObjectReader<'c, T>, function: F) -> Self {
        Self {
            reader,
            function,
            value: PhantomData,
        }
    }
}

impl<T, F, V> Kernel for ObjectKernel<'_, T, F, V>
where
    T: ObjectValue,
    F: Fn(Option<&T>) -> V + Sync,
{
    type Value = V;

    fn run<S: Sink<V>>(&self, start: usize, end: usize, sink: &mut S) -> Result<()> {
        for row in start..end {
            sink.set(row, (self.function)(self.reader.get(row)))?;
        }
        Ok(())
    }
}

/// Applies a function to whole rows of several columns.
pub struct RowKernel<'c, F, V> {
    columns: &'c [&'c Column],
    function: F,
    value: PhantomData<fn() -> V>,
}

impl<'c, F, V> RowKernel<'c, F, V> {
    pub(crate) fn new(columns: &'c [&'c Column], function: F) -> Self {
        Self {
            columns,
            function,
            value: PhantomData,
        }
    }
}

impl<F, V> Kernel for RowKernel<'_, F, V>
where
    F: Fn(&RowCursor<'_>) -> V + Sync,
{
    type Value = V;

    fn run<S: Sink<V>>(&self, start: usize, end: usize, sink: &mut S) -> Result<()> {
        let mut cursor = RowCursor::new(self.columns)?;
        for row in start..end {
            cursor.set_position(Some(row))?;
            sink.set(row, (self.function)(&cursor))?;
        }
        Ok(())
    }
}
