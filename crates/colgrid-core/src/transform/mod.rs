//! Parallel element-wise and row-wise column transforms.
//!
//! A transform reads one column ([`Transformer`]) or several aligned columns
//! ([`RowTransformer`]), applies a user function per row and writes the
//! results into the buffer of a [`Target`]. Rows are split into chunks that
//! run as jobs of an execution [`Context`]; each chunk owns a disjoint range
//! of the buffer.
//!
//! Capability and element type checks happen when the transform is built,
//! before any job runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use colgrid_core::{Column, SequentialContext, Transformer};
//!
//! let column = Column::real((0..75).map(f64::from).collect());
//! let doubled = Transformer::new(&column)
//!     .apply_numeric_to_integer(|v| 2.0 * v, &SequentialContext::new())?;
//! assert_eq!(doubled.get(74)?, 148.0);
//! ```

mod applier;
mod chunking;
mod context;
mod kernel;
mod target;

#[cfg(test)]
mod chunking_tests;

pub use applier::Applier;
pub use chunking::{chunk_bounds, chunk_count, Workload};
pub use context::{Context, Job, PoolContext, SequentialContext};
pub use kernel::{CategoryKernel, Kernel, NumericKernel, ObjectKernel, RowKernel};
pub use target::{Categorical, DateTimes, Integer, Objects, Real, Target, Times};

use crate::buffer::NumericBuffer;
use crate::column::{Capability, Column, ObjectValue};
use crate::config::TransformConfig;
use crate::error::Result;
use crate::row::RowCursor;

/// Transform of a single column.
#[derive(Debug, Clone)]
pub struct Transformer<'a> {
    column: &'a Column,
    workload: Workload,
    batch_rows: usize,
}

impl<'a> Transformer<'a> {
    /// Creates a transformer with the default configuration.
    #[must_use]
    pub fn new(column: &'a Column) -> Self {
        let config = TransformConfig::default();
        Self {
            column,
            workload: config.default_workload,
            batch_rows: config.batch_rows,
        }
    }

    /// Applies the workload and batch size of `config`.
    #[must_use]
    pub fn with_config(mut self, config: &TransformConfig) -> Self {
        self.workload = config.default_workload;
        self.batch_rows = config.batch_rows;
        self
    }

    /// Sets the expected per-row cost.
    #[must_use]
    pub fn workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }

    /// Builds the applier of a numeric transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`](crate::Error::Unsupported) if the column
    /// is not numeric readable.
    pub fn numeric_applier<T, F>(
        &self,
        function: F,
        target: T,
    ) -> Result<Applier<T, NumericKernel<'a, F, T::Value>>>
    where
        T: Target,
        F: Fn(f64) -> T::Value + Sync,
    {
        self.column.require(Capability::NumericReadable)?;
        let kernel = NumericKernel::new(self.column, function, self.batch_rows);
        Ok(Applier::new(target, kernel, self.column.size()))
    }

    /// Applies `function` to the numeric values of the column.
    ///
    /// Missing values are passed as NaN.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Unsupported`](crate::Error::Unsupported) before any
    /// work if the column is not numeric readable, and with
    /// [`Error::TaskAborted`](crate::Error::TaskAborted) if execution fails.
    pub fn apply_numeric<T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        T: Target,
        F: Fn(f64) -> T::Value + Sync,
    {
        self.numeric_applier(function, target)?
            .execute(context, self.workload)
    }

    /// Numeric to real transform.
    ///
    /// # Errors
    ///
    /// See [`Transformer::apply_numeric`].
    pub fn apply_numeric_to_real<F>(&self, function: F, context: &dyn Context) -> Result<NumericBuffer>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        self.apply_numeric(function, Real, context)
    }

    /// Numeric to integer transform; results are rounded half up.
    ///
    /// # Errors
    ///
    /// See [`Transformer::apply_numeric`].
    pub fn apply_numeric_to_integer<F>(
        &self,
        function: F,
        context: &dyn Context,
    ) -> Result<NumericBuffer>
    where
        F: Fn(f64) -> f64 + Sync,
    {
        self.apply_numeric(function, Integer, context)
    }

    /// Builds the applier of a category index transform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`](crate::Error::Unsupported) if the column
    /// is not categorical.
    pub fn category_applier<T, F>(
        &self,
        function: F,
        target: T,
    ) -> Result<Applier<T, CategoryKernel<'a, F, T::Value>>>
    where
        T: Target,
        F: Fn(u32) -> T::Value + Sync,
    {
        self.column.require_categorical()?;
        let kernel = CategoryKernel::new(self.column, function, self.batch_rows);
        Ok(Applier::new(target, kernel, self.column.size()))
    }

    /// Applies `function` to the category indices of the column.
    ///
    /// Missing values are passed as index 0.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Unsupported`](crate::Error::Unsupported) if the
    /// column is not categorical, and with
    /// [`Error::TaskAborted`](crate::Error::TaskAborted) if execution fails.
    pub fn apply_category<T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        T: Target,
        F: Fn(u32) -> T::Value + Sync,
    {
        self.category_applier(function, target)?
            .execute(context, self.workload)
    }

    /// Builds the applier of an object transform over elements of type `S`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`](crate::Error::Unsupported) if the column
    /// is not object readable and
    /// [`Error::TypeMismatch`](crate::Error::TypeMismatch) if it holds
    /// elements of another type.
    pub fn object_applier<S, T, F>(
        &self,
        function: F,
        target: T,
    ) -> Result<Applier<T, ObjectKernel<'a, S, F, T::Value>>>
    where
        S: ObjectValue,
        T: Target,
        F: Fn(Option<&S>) -> T::Value + Sync,
    {
        let reader = self.column.object_reader::<S>()?;
        let kernel = ObjectKernel::new(reader, function);
        Ok(Applier::new(target, kernel, self.column.size()))
    }

    /// Applies `function` to the objects of the column.
    ///
    /// # Errors
    ///
    /// Fails before any work if the column is not object readable or holds
    /// another element type, and with
    /// [`Error::TaskAborted`](crate::Error::TaskAborted) if execution fails.
    pub fn apply_object<S, T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        S: ObjectValue,
        T: Target,
        F: Fn(Option<&S>) -> T::Value + Sync,
    {
        self.object_applier(function, target)?
            .execute(context, self.workload)
    }
}

/// Row-wise transform of several aligned columns.
#[derive(Debug, Clone)]
pub struct RowTransformer<'a> {
    columns: Vec<&'a Column>,
    workload: Workload,
}

impl<'a> RowTransformer<'a> {
    /// Creates a row transformer over `columns`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if
    /// the columns differ in height.
    pub fn new(columns: Vec<&'a Column>) -> Result<Self> {
        RowCursor::new(&columns)?;
        Ok(Self {
            columns,
            workload: TransformConfig::default().default_workload,
        })
    }

    /// Applies the workload of `config`.
    #[must_use]
    pub fn with_config(mut self, config: &TransformConfig) -> Self {
        self.workload = config.default_workload;
        self
    }

    /// Sets the expected per-row cost.
    #[must_use]
    pub fn workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }

    fn height(&self) -> usize {
        self.columns.first().map_or(0, |c| c.size())
    }

    /// Builds the applier of a row transform without capability checks.
    pub fn row_applier<T, F>(&self, function: F, target: T) -> Applier<T, RowKernel<'_, F, T::Value>>
    where
        T: Target,
        F: Fn(&RowCursor<'_>) -> T::Value + Sync,
    {
        Applier::new(target, RowKernel::new(&self.columns, function), self.height())
    }

    /// Row transform reading numeric values.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Unsupported`](crate::Error::Unsupported) before any
    /// work if a column is not numeric readable, and with
    /// [`Error::TaskAborted`](crate::Error::TaskAborted) if execution fails.
    pub fn apply_numeric_rows<T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        T: Target,
        F: Fn(&RowCursor<'_>) -> T::Value + Sync,
    {
        for column in &self.columns {
            column.require(Capability::NumericReadable)?;
        }
        self.row_applier(function, target)
            .execute(context, self.workload)
    }

    /// Row transform reading category indices.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Unsupported`](crate::Error::Unsupported) before any
    /// work if a column is not categorical, and with
    /// [`Error::TaskAborted`](crate::Error::TaskAborted) if execution fails.
    pub fn apply_categorical_rows<T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        T: Target,
        F: Fn(&RowCursor<'_>) -> T::Value + Sync,
    {
        for column in &self.columns {
            column.require_categorical()?;
        }
        self.row_applier(function, target)
            .execute(context, self.workload)
    }

    /// Row transform reading objects of type `S`.
    ///
    /// # Errors
    ///
    /// Fails before any work if a column is not object readable or holds
    /// another element type, and with
    /// [`Error::TaskAborted`](crate::Error::TaskAborted) if execution fails.
    pub fn apply_object_rows<S, T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        S: ObjectValue,
        T: Target,
        F: Fn(&RowCursor<'_>) -> T::Value + Sync,
    {
        for column in &self.columns {
            column.require(Capability::ObjectReadable)?;
            column.require_element::<S>()?;
        }
        self.row_applier(function, target)
            .execute(context, self.workload)
    }

    /// Row transform over columns of any kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TaskAborted`](crate::Error::TaskAborted) if execution
    /// fails.
    pub fn apply_mixed_rows<T, F>(
        &self,
        function: F,
        target: T,
        context: &dyn Context,
    ) -> Result<T::Buffer>
    where
        T: Target,
        F: Fn(&RowCursor<'_>) -> T::Value + Sync,
    {
        self.row_applier(function, target)
            .execute(context, self.workload)
    }
}
