//! Immutable typed columns.
//!
//! A column is created by freezing a buffer or directly from raw arrays and
//! is read-only afterwards. Re-indexing with [`Column::map`] produces a new
//! column, either a lightweight view sharing the data or a materialised copy.
//!
//! # Architecture
//!
//! ```text
//! Column
//! ├── column_type: ColumnType (id + element type)
//! ├── data: ColumnData
//! │   ├── Numeric(Arc<[f64]>)                 Real / Integer
//! │   ├── Categorical(Arc<dyn CategoricalData>) PackedIndices + Dictionary<T>
//! │   ├── Object(Arc<dyn ObjectData>)           Vec<Option<T>>
//! │   ├── Time(Arc<[i64]>)                      nanoseconds of day
//! │   └── DateTime { seconds, nanos }           epoch seconds (+ nanoseconds)
//! └── rows: Option<Arc<[usize]>>                view mapping into data
//! ```

mod dictionary;
mod store;
pub mod temporal;
mod types;

#[cfg(test)]
mod column_tests;

use chrono::{DateTime, NaiveTime, Utc};
use std::any::Any;
use std::sync::Arc;

pub use dictionary::Dictionary;
pub use store::ObjectReader;
pub use types::{
    text, Capabilities, Capability, Category, CategoryValue, ColumnType, ColumnTypeId,
    ElementType, ObjectType, ObjectValue,
};

pub(crate) use store::{CategoricalData, CategoricalStore, ObjectData, ObjectStore};

use crate::buffer::{round_half_up, Precision};
use crate::error::{Error, Result};
use crate::packing::PackedIndices;
use crate::sorting::{self, Order};
use temporal::{decode_date_time, decode_time, MISSING_SECONDS, MISSING_TIME};

/// Mapping entry that never resolves to a row.
const HOLE: usize = usize::MAX;

#[derive(Debug, Clone)]
enum ColumnData {
    Numeric(Arc<[f64]>),
    Categorical(Arc<dyn CategoricalData>),
    Object(Arc<dyn ObjectData>),
    Time(Arc<[i64]>),
    DateTime {
        seconds: Arc<[i64]>,
        nanos: Option<Arc<[u32]>>,
    },
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(c) => c.indices().len(),
            Self::Object(o) => o.len(),
            Self::Time(v) => v.len(),
            Self::DateTime { seconds, .. } => seconds.len(),
        }
    }

    /// Row `i` of the result is row `rows[i]` of `self`, missing if out of range.
    fn gather(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(
                rows.iter()
                    .map(|&r| v.get(r).copied().unwrap_or(f64::NAN))
                    .collect(),
            ),
            Self::Categorical(c) => Self::Categorical(c.with_indices(c.indices().remap(rows))),
            Self::Object(o) => Self::Object(o.remap(rows)),
            Self::Time(v) => Self::Time(
                rows.iter()
                    .map(|&r| v.get(r).copied().unwrap_or(MISSING_TIME))
                    .collect(),
            ),
            Self::DateTime { seconds, nanos } => Self::DateTime {
                seconds: rows
                    .iter()
                    .map(|&r| seconds.get(r).copied().unwrap_or(MISSING_SECONDS))
                    .collect(),
                nanos: nanos.as_ref().map(|n| {
                    rows.iter()
                        .map(|&r| n.get(r).copied().unwrap_or(0))
                        .collect()
                }),
            },
        }
    }
}

/// Immutable, typed column.
#[derive(Debug, Clone)]
pub struct Column {
    column_type: ColumnType,
    data: ColumnData,
    rows: Option<Arc<[usize]>>,
}

impl Column {
    fn from_data(column_type: ColumnType, data: ColumnData) -> Self {
        Self {
            column_type,
            data,
            rows: None,
        }
    }

    pub(crate) fn from_numeric(id: ColumnTypeId, values: Arc<[f64]>) -> Self {
        Self::from_data(ColumnType::new(id, None), ColumnData::Numeric(values))
    }

    pub(crate) fn from_categorical<T: CategoryValue>(store: CategoricalStore<T>) -> Self {
        Self::from_data(
            ColumnType::new(ColumnTypeId::Categorical, Some(ElementType::of::<T>())),
            ColumnData::Categorical(Arc::new(store)),
        )
    }

    pub(crate) fn from_objects<T: ObjectValue>(store: ObjectStore<T>) -> Self {
        Self::from_data(
            ColumnType::new(ColumnTypeId::Object, Some(ElementType::of::<T>())),
            ColumnData::Object(Arc::new(store)),
        )
    }

    pub(crate) fn from_time_nanos(nanos: Arc<[i64]>) -> Self {
        Self::from_data(
            ColumnType::new(ColumnTypeId::Time, Some(ElementType::of::<NaiveTime>())),
            ColumnData::Time(nanos),
        )
    }

    pub(crate) fn from_date_time_parts(seconds: Arc<[i64]>, nanos: Option<Arc<[u32]>>) -> Self {
        Self::from_data(
            ColumnType::new(ColumnTypeId::DateTime, Some(ElementType::of::<DateTime<Utc>>())),
            ColumnData::DateTime { seconds, nanos },
        )
    }

    /// Creates a real column.
    #[must_use]
    pub fn real(values: Vec<f64>) -> Self {
        Self::from_numeric(ColumnTypeId::Real, values.into())
    }

    /// Creates an integer column; values are rounded half up.
    #[must_use]
    pub fn integer(values: Vec<f64>) -> Self {
        let values: Arc<[f64]> = values.into_iter().map(round_half_up).collect();
        Self::from_numeric(ColumnTypeId::Integer, values)
    }

    /// Creates a categorical column from packed indices and a dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if an index is not in the dictionary.
    pub fn categorical<T: CategoryValue>(
        indices: PackedIndices,
        dictionary: Dictionary<T>,
        object_type: ObjectType<T>,
    ) -> Result<Self> {
        let max = dictionary.max_index();
        if let Some(row) = (0..indices.len()).find(|&row| indices.get(row) > max) {
            return Err(Error::InvalidArgument(format!(
                "index {} at row {row} exceeds dictionary size {max}",
                indices.get(row)
            )));
        }
        Ok(Self::from_categorical(CategoricalStore {
            indices,
            dictionary: Arc::new(dictionary),
            object_type,
        }))
    }

    /// Creates an object column.
    #[must_use]
    pub fn objects<T: ObjectValue>(values: Vec<Option<T>>, object_type: ObjectType<T>) -> Self {
        Self::from_objects(ObjectStore {
            values,
            object_type,
        })
    }

    /// Creates a time column.
    #[must_use]
    pub fn times(values: &[Option<NaiveTime>]) -> Self {
        Self::from_time_nanos(values.iter().map(|&t| temporal::encode_time(t)).collect())
    }

    /// Creates a date-time column with the given precision.
    #[must_use]
    pub fn date_times(values: &[Option<DateTime<Utc>>], precision: Precision) -> Self {
        let (seconds, nanos): (Vec<i64>, Vec<u32>) = values
            .iter()
            .map(|&v| temporal::encode_date_time(v))
            .unzip();
        let nanos = match precision {
            Precision::Seconds => None,
            Precision::Nanoseconds => Some(nanos.into()),
        };
        Self::from_date_time_parts(seconds.into(), nanos)
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.rows
            .as_ref()
            .map_or_else(|| self.data.len(), |rows| rows.len())
    }

    /// Declared column type.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Declared type identifier.
    #[must_use]
    pub fn type_id(&self) -> ColumnTypeId {
        self.column_type.id()
    }

    /// Storage category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.column_type.category()
    }

    /// Capabilities of this column.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        use Capability::{NumericReadable, ObjectReadable, Sortable};
        match &self.data {
            ColumnData::Numeric(_) => Capabilities::of(&[NumericReadable, Sortable]),
            ColumnData::Categorical(c) => {
                let set = Capabilities::of(&[NumericReadable, ObjectReadable]);
                if c.is_sortable() {
                    set | Sortable
                } else {
                    set
                }
            }
            ColumnData::Object(o) => {
                if o.is_sortable() {
                    Capabilities::of(&[ObjectReadable, Sortable])
                } else {
                    Capabilities::of(&[ObjectReadable])
                }
            }
            ColumnData::Time(_) => Capabilities::of(&[NumericReadable, ObjectReadable, Sortable]),
            ColumnData::DateTime { .. } => Capabilities::of(&[ObjectReadable, Sortable]),
        }
    }

    /// Fails with [`Error::Unsupported`] if `capability` is missing.
    pub(crate) fn require(&self, capability: Capability) -> Result<()> {
        if self.capabilities().contains(capability) {
            Ok(())
        } else {
            Err(Error::Unsupported(format!(
                "{:?} column is not {capability:?}",
                self.type_id()
            )))
        }
    }

    /// Fails with [`Error::Unsupported`] unless the column is categorical.
    pub(crate) fn require_categorical(&self) -> Result<()> {
        match self.data {
            ColumnData::Categorical(_) => Ok(()),
            _ => Err(Error::Unsupported(format!(
                "{:?} column has no category indices",
                self.type_id()
            ))),
        }
    }

    /// Fails with [`Error::TypeMismatch`] unless elements are of type `T`.
    pub(crate) fn require_element<T: 'static>(&self) -> Result<()> {
        match self.column_type.element() {
            Some(element) if element.is::<T>() => Ok(()),
            Some(element) => Err(Error::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: element.name().to_string(),
            }),
            None => Err(Error::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: format!("{:?}", self.type_id()),
            }),
        }
    }

    #[inline]
    fn resolve(&self, row: usize) -> Option<usize> {
        let base = match &self.rows {
            Some(rows) => *rows.get(row)?,
            None => row,
        };
        (base < self.data.len()).then_some(base)
    }

    /// Value at `row` as a double, NaN if missing or not numeric readable.
    #[inline]
    #[must_use]
    pub fn numeric_at(&self, row: usize) -> f64 {
        let Some(row) = self.resolve(row) else {
            return f64::NAN;
        };
        match &self.data {
            ColumnData::Numeric(v) => v[row],
            ColumnData::Categorical(c) => match c.indices().get(row) {
                0 => f64::NAN,
                index => f64::from(index),
            },
            ColumnData::Time(v) if v[row] != MISSING_TIME => v[row] as f64,
            _ => f64::NAN,
        }
    }

    /// Category index at `row`, 0 if missing or not categorical.
    #[inline]
    #[must_use]
    pub fn index_at(&self, row: usize) -> u32 {
        match (&self.data, self.resolve(row)) {
            (ColumnData::Categorical(c), Some(row)) => c.indices().get(row),
            _ => 0,
        }
    }

    /// Object at `row`, `None` if missing or not stored as `T`.
    ///
    /// Works for object and categorical columns. Time and date-time values are
    /// not stored as objects; read them with [`Column::object_value`].
    #[must_use]
    pub fn object_at<T: ObjectValue>(&self, row: usize) -> Option<&T> {
        let row = self.resolve(row)?;
        match &self.data {
            ColumnData::Object(o) => o
                .as_any()
                .downcast_ref::<ObjectStore<T>>()?
                .values[row]
                .as_ref(),
            ColumnData::Categorical(c) => {
                let store = c.as_any().downcast_ref::<CategoricalStore<T>>()?;
                store.dictionary.get(store.indices.get(row))
            }
            _ => None,
        }
    }

    /// Owned object at `row`, `None` if missing or not stored as `T`.
    ///
    /// Unlike [`Column::object_at`] this also decodes time and date-time
    /// columns, so it reads every object readable column.
    #[must_use]
    pub fn object_value<T: ObjectValue>(&self, row: usize) -> Option<T> {
        match &self.data {
            ColumnData::Time(_) => {
                let time = self.time_at(row)?;
                (&time as &dyn Any).downcast_ref::<T>().cloned()
            }
            ColumnData::DateTime { .. } => {
                let instant = self.date_time_at(row)?;
                (&instant as &dyn Any).downcast_ref::<T>().cloned()
            }
            _ => self.object_at::<T>(row).cloned(),
        }
    }

    /// Time at `row`, `None` if missing or not a time column.
    #[must_use]
    pub fn time_at(&self, row: usize) -> Option<NaiveTime> {
        match (&self.data, self.resolve(row)) {
            (ColumnData::Time(v), Some(row)) => decode_time(v[row]),
            _ => None,
        }
    }

    /// Date-time at `row`, `None` if missing or not a date-time column.
    #[must_use]
    pub fn date_time_at(&self, row: usize) -> Option<DateTime<Utc>> {
        match (&self.data, self.resolve(row)) {
            (ColumnData::DateTime { seconds, nanos }, Some(row)) => {
                decode_date_time(seconds[row], nanos.as_ref().map_or(0, |n| n[row]))
            }
            _ => None,
        }
    }

    /// Copies values from `start` on into `target` as doubles.
    ///
    /// Returns the number of copied values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the column is not numeric readable.
    pub fn fill_numeric(&self, target: &mut [f64], start: usize) -> Result<usize> {
        self.require(Capability::NumericReadable)?;
        let count = target.len().min(self.size().saturating_sub(start));
        if count == 0 {
            return Ok(0);
        }
        match (&self.data, &self.rows) {
            (ColumnData::Numeric(v), None) => {
                target[..count].copy_from_slice(&v[start..start + count]);
            }
            _ => {
                for (offset, slot) in target[..count].iter_mut().enumerate() {
                    *slot = self.numeric_at(start + offset);
                }
            }
        }
        Ok(count)
    }

    /// Copies category indices from `start` on into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the column is not categorical.
    pub fn fill_indices(&self, target: &mut [u32], start: usize) -> Result<usize> {
        self.require_categorical()?;
        let count = target.len().min(self.size().saturating_sub(start));
        match (&self.data, &self.rows) {
            (ColumnData::Categorical(c), None) => {
                c.indices().fill(&mut target[..count], start);
            }
            _ => {
                for (offset, slot) in target[..count].iter_mut().enumerate() {
                    *slot = self.index_at(start + offset);
                }
            }
        }
        Ok(count)
    }

    /// Copies (clones) objects from `start` on into `target`.
    ///
    /// # Errors
    ///
    /// Fails if the column is not object readable or holds another type.
    pub fn fill_objects<T: ObjectValue>(
        &self,
        target: &mut [Option<T>],
        start: usize,
    ) -> Result<usize> {
        let reader = self.object_reader::<T>()?;
        let count = target.len().min(self.size().saturating_sub(start));
        for (offset, slot) in target[..count].iter_mut().enumerate() {
            *slot = reader.get(start + offset).cloned();
        }
        Ok(count)
    }

    /// Creates a direct indexed object reader for elements of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the column is not object readable and
    /// [`Error::TypeMismatch`] if it holds another element type.
    pub fn object_reader<T: ObjectValue>(&self) -> Result<ObjectReader<'_, T>> {
        self.require(Capability::ObjectReadable)?;
        self.require_element::<T>()?;
        let rows = self.rows.as_deref();
        let len = self.size();
        let mismatch = || Error::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: format!("{:?}", self.type_id()),
        };
        match &self.data {
            ColumnData::Object(o) => {
                let store = o
                    .as_any()
                    .downcast_ref::<ObjectStore<T>>()
                    .ok_or_else(mismatch)?;
                Ok(ObjectReader::values(&store.values, rows, len))
            }
            ColumnData::Categorical(c) => {
                let store = c
                    .as_any()
                    .downcast_ref::<CategoricalStore<T>>()
                    .ok_or_else(mismatch)?;
                Ok(ObjectReader::dictionary(
                    &store.indices,
                    &store.dictionary,
                    rows,
                    len,
                ))
            }
            ColumnData::Time(v) => {
                let decoded: Vec<Option<NaiveTime>> = v.iter().map(|&n| decode_time(n)).collect();
                let decoded = (Box::new(decoded) as Box<dyn Any>)
                    .downcast::<Vec<Option<T>>>()
                    .map_err(|_| mismatch())?;
                Ok(ObjectReader::decoded(*decoded, rows, len))
            }
            ColumnData::DateTime { seconds, nanos } => {
                let decoded: Vec<Option<DateTime<Utc>>> = seconds
                    .iter()
                    .enumerate()
                    .map(|(i, &s)| decode_date_time(s, nanos.as_ref().map_or(0, |n| n[i])))
                    .collect();
                let decoded = (Box::new(decoded) as Box<dyn Any>)
                    .downcast::<Vec<Option<T>>>()
                    .map_err(|_| mismatch())?;
                Ok(ObjectReader::decoded(*decoded, rows, len))
            }
            ColumnData::Numeric(_) => Err(mismatch()),
        }
    }

    /// Returns the dictionary of a categorical column.
    ///
    /// # Errors
    ///
    /// Fails if the column is not categorical or holds another element type.
    pub fn dictionary<T: CategoryValue>(&self) -> Result<Arc<Dictionary<T>>> {
        self.require_categorical()?;
        self.require_element::<T>()?;
        match &self.data {
            ColumnData::Categorical(c) => c
                .as_any()
                .downcast_ref::<CategoricalStore<T>>()
                .map(|store| Arc::clone(&store.dictionary))
                .ok_or_else(|| Error::TypeMismatch {
                    expected: std::any::type_name::<T>().to_string(),
                    actual: c.element().name().to_string(),
                }),
            _ => Err(Error::Unsupported("column has no dictionary".to_string())),
        }
    }

    /// Number of categories of a categorical column, 0 otherwise.
    #[must_use]
    pub fn dictionary_size(&self) -> usize {
        match &self.data {
            ColumnData::Categorical(c) => c.dictionary_size(),
            _ => 0,
        }
    }

    /// Interprets a category index of a boolean categorical column.
    ///
    /// Returns `None` for the missing index 0.
    ///
    /// # Errors
    ///
    /// Fails if the column is not categorical or its dictionary is not boolean.
    pub fn to_boolean(&self, category_index: u32) -> Result<Option<bool>> {
        match &self.data {
            ColumnData::Categorical(c) if c.is_boolean() => {
                if category_index == 0 {
                    Ok(None)
                } else {
                    Ok(Some(c.positive_index() == Some(category_index)))
                }
            }
            ColumnData::Categorical(_) => Err(Error::Unsupported(
                "dictionary is not boolean".to_string(),
            )),
            _ => Err(Error::Unsupported(format!(
                "{:?} column has no dictionary",
                self.type_id()
            ))),
        }
    }

    /// Renders the value at `row` for previews.
    pub(crate) fn render(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Categorical(c) => c.render(self.index_at(row)),
            ColumnData::Time(_) => self.time_at(row).map_or("?".to_string(), |t| t.to_string()),
            ColumnData::DateTime { .. } => self
                .date_time_at(row)
                .map_or("?".to_string(), |t| t.to_rfc3339()),
            ColumnData::Numeric(_) => {
                let value = self.numeric_at(row);
                if value.is_nan() {
                    "?".to_string()
                } else {
                    format!("{value}")
                }
            }
            ColumnData::Object(_) => {
                if self.resolve(row).is_some() {
                    "<object>".to_string()
                } else {
                    "?".to_string()
                }
            }
        }
    }

    /// Composes `mapping` with the current view into rows of the data.
    fn base_rows(&self, mapping: &[usize]) -> Vec<usize> {
        mapping
            .iter()
            .map(|&row| self.resolve(row).unwrap_or(HOLE))
            .collect()
    }

    /// Returns a column whose row `i` is row `mapping[i]` of this column.
    ///
    /// Entries `>= size()` produce missing values. With `prefer_view` the
    /// result shares this column's data, otherwise the rows are copied.
    #[must_use]
    pub fn map(&self, mapping: &[usize], prefer_view: bool) -> Self {
        let rows = self.base_rows(mapping);
        if prefer_view {
            Self {
                column_type: self.column_type,
                data: self.data.clone(),
                rows: Some(rows.into()),
            }
        } else {
            Self::from_data(self.column_type, self.data.gather(&rows))
        }
    }

    /// Returns true if this column is a view on shared data.
    #[must_use]
    pub fn is_view(&self) -> bool {
        self.rows.is_some()
    }

    /// Returns the stable sort permutation of this column.
    ///
    /// Missing values sort last in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the column is not sortable.
    pub fn sort(&self, order: Order) -> Result<Vec<usize>> {
        self.require(Capability::Sortable)?;
        if self.is_view() {
            let identity: Vec<usize> = (0..self.size()).collect();
            return self.map(&identity, false).sort(order);
        }
        let len = self.size();
        let permutation = match &self.data {
            ColumnData::Numeric(v) => sorting::sort_f64(v, order),
            ColumnData::Time(v) => sorting::sort_i64(v, order),
            ColumnData::DateTime { seconds, nanos } => sorting::sort_by(len, order, |a, b| {
                let nanos_of = |row: usize| nanos.as_ref().map_or(0, |n| n[row]);
                seconds[a]
                    .cmp(&seconds[b])
                    .then_with(|| nanos_of(a).cmp(&nanos_of(b)))
            }),
            ColumnData::Categorical(c) => {
                let indices = c.indices();
                sorting::sort_by(len, order, |a, b| {
                    c.compare_indices(indices.get(a), indices.get(b))
                })
            }
            ColumnData::Object(o) => sorting::sort_by(len, order, |a, b| o.compare_rows(a, b)),
        };
        Ok(permutation)
    }
}
