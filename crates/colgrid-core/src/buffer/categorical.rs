//! Categorical buffer with a concurrently growing dictionary.
//!
//! Rows store packed category indices; the dictionary assigns indices in
//! first-seen order starting at 1.
//!
//! # Thread safety
//!
//! `set` takes `&self` and may be called from many threads at once:
//!
//! - **Known values**: a lock-free `DashMap` lookup, then an atomic store of
//!   the packed index.
//! - **New values**: the `DashMap` entry for the value stays locked while the
//!   index is appended under a write lock scoped to the insert path, so each
//!   distinct value receives exactly one index.
//! - **Freezing**: writers hold the frozen flag's read lock for the whole
//!   write, so a write either lands before the frozen snapshot or fails.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::Arc;

use super::{check_index, check_ranges, ensure_mutable, preview, Sink, WriteBuffer};
use crate::column::{CategoricalStore, CategoryValue, Column, Dictionary, ObjectType};
use crate::error::{Error, Result};
use crate::packing::{AtomicIndices, Format};

/// Outcome of looking up or assigning a category index.
enum Assignment {
    Index(u32),
    Exhausted,
}

/// Buffer of category indices backed by a packing [`Format`].
pub struct CategoricalBuffer<T: CategoryValue> {
    indices: AtomicIndices,
    format: Format,
    index_of: DashMap<T, u32, FxBuildHasher>,
    /// `values[0]` is the missing slot.
    values: RwLock<Vec<Option<T>>>,
    object_type: ObjectType<T>,
    frozen: RwLock<bool>,
}

impl<T: CategoryValue> CategoricalBuffer<T> {
    /// Creates a buffer of `len` missing values.
    #[must_use]
    pub fn new(len: usize, format: Format) -> Self {
        Self {
            indices: AtomicIndices::new(format, len),
            format,
            index_of: DashMap::with_hasher(FxBuildHasher::default()),
            values: RwLock::new(vec![None]),
            object_type: ObjectType::new(),
            frozen: RwLock::new(false),
        }
    }

    /// Sets the element type descriptor used by the frozen column.
    #[must_use]
    pub fn with_object_type(mut self, object_type: ObjectType<T>) -> Self {
        self.object_type = object_type;
        self
    }

    /// Packing format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.indices.len()
    }

    /// Number of distinct non-missing values seen so far.
    #[must_use]
    pub fn different_values(&self) -> usize {
        self.values.read().len() - 1
    }

    /// Returns the value at `index`, `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= size()`.
    pub fn get(&self, index: usize) -> Result<Option<T>> {
        check_index(index, self.indices.len())?;
        let category = self.indices.load(index) as usize;
        Ok(self.values.read().get(category).cloned().flatten())
    }

    /// Returns the category index stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= size()`.
    pub fn category_index(&self, index: usize) -> Result<u32> {
        check_index(index, self.indices.len())?;
        Ok(self.indices.load(index))
    }

    /// Stores `value` at `index`.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is frozen, `index` is out of bounds, or a new
    /// value would exceed the categories of the format
    /// ([`Error::CategoryOverflow`]).
    pub fn set(&self, index: usize, value: Option<T>) -> Result<()> {
        if self.set_save(index, value)? {
            Ok(())
        } else {
            Err(Error::CategoryOverflow {
                format: self.format,
                max: self.format.max_categories(),
            })
        }
    }

    /// Stores `value` at `index` unless it needs a category the format
    /// cannot hold; returns false in that case and leaves the row unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is frozen or `index` is out of bounds.
    pub fn set_save(&self, index: usize, value: Option<T>) -> Result<bool> {
        let frozen = self.frozen.read();
        ensure_mutable(*frozen)?;
        check_index(index, self.indices.len())?;
        let category = match value {
            None => 0,
            Some(value) => match self.assign(value) {
                Assignment::Index(category) => category,
                Assignment::Exhausted => {
                    tracing::warn!(
                        format = ?self.format,
                        max = self.format.max_categories(),
                        "categorical buffer refused a new category"
                    );
                    return Ok(false);
                }
            },
        };
        self.indices.store(index, category);
        Ok(true)
    }

    /// Looks up the index of `value`, assigning the next one if unseen.
    fn assign(&self, value: T) -> Assignment {
        if let Some(category) = self.index_of.get(&value) {
            return Assignment::Index(*category);
        }
        match self.index_of.entry(value) {
            Entry::Occupied(entry) => Assignment::Index(*entry.get()),
            Entry::Vacant(entry) => {
                let mut values = self.values.write();
                let next = values.len();
                if next > self.format.max_categories() {
                    return Assignment::Exhausted;
                }
                values.push(Some(entry.key().clone()));
                // next <= max_categories < i32::MAX
                let category = next as u32;
                entry.insert(category);
                Assignment::Index(category)
            }
        }
    }

    /// Prevents further modification.
    ///
    /// Waits for writes in flight.
    pub fn freeze(&self) {
        *self.frozen.write() = true;
    }

    /// Returns true once the buffer is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        *self.frozen.read()
    }

    fn dictionary(&self) -> Dictionary<T> {
        Dictionary::from_slots(self.values.read().clone())
    }

    fn column_with(&self, dictionary: Dictionary<T>) -> Column {
        Column::from_categorical(CategoricalStore {
            indices: self.indices.snapshot(),
            dictionary: Arc::new(dictionary),
            object_type: self.object_type,
        })
    }

    /// Freezes the buffer and returns a categorical column.
    pub fn to_column(&self) -> Column {
        self.freeze();
        self.column_with(self.dictionary())
    }

    /// Freezes the buffer and returns a categorical column with a boolean
    /// dictionary whose positive value is `positive`.
    ///
    /// Without a positive value at most one distinct value may be present,
    /// and it becomes the negative value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if more than two distinct values
    /// are present or `positive` was never stored.
    pub fn to_boolean_column(&self, positive: Option<&T>) -> Result<Column> {
        self.freeze();
        let dictionary = self.dictionary().into_boolean(positive)?;
        Ok(self.column_with(dictionary))
    }
}

impl<T: CategoryValue> fmt::Debug for CategoricalBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoricalBuffer")
            .field("format", &self.format)
            .field("size", &self.indices.len())
            .field("different_values", &self.different_values())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

impl<T: CategoryValue> fmt::Display for CategoricalBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.read();
        preview(f, "Categorical Buffer", self.indices.len(), |i| {
            values
                .get(self.indices.load(i) as usize)
                .and_then(Option::as_ref)
                .map_or_else(|| "?".to_string(), |v| format!("{v:?}"))
        })
    }
}

/// Writer of one row range of a [`CategoricalBuffer`].
///
/// Rows are written through the shared buffer; the part only restricts the
/// range.
#[derive(Debug)]
pub struct CategoricalPart<'a, T: CategoryValue> {
    buffer: &'a CategoricalBuffer<T>,
    start: usize,
    end: usize,
}

impl<T: CategoryValue> Sink<Option<T>> for CategoricalPart<'_, T> {
    fn set(&mut self, row: usize, value: Option<T>) -> Result<()> {
        if !(self.start..self.end).contains(&row) {
            return Err(Error::IndexOutOfBounds {
                index: row,
                size: self.end,
            });
        }
        self.buffer.set(row, value)
    }
}

impl<T: CategoryValue> WriteBuffer for CategoricalBuffer<T> {
    type Value = Option<T>;
    type Part<'a> = CategoricalPart<'a, T>;

    fn size(&self) -> usize {
        self.indices.len()
    }

    fn parts(&mut self, bounds: &[(usize, usize)]) -> Result<Vec<CategoricalPart<'_, T>>> {
        ensure_mutable(self.is_frozen())?;
        check_ranges(self.indices.len(), bounds)?;
        let buffer = &*self;
        Ok(bounds
            .iter()
            .map(|&(start, end)| CategoricalPart { buffer, start, end })
            .collect())
    }
}
