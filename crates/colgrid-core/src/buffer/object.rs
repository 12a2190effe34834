//! Buffer of arbitrary objects.

use std::fmt;

use super::{check_index, ensure_mutable, preview, split_ranges, Sink, WriteBuffer};
use crate::column::{Column, ObjectStore, ObjectType, ObjectValue};
use crate::error::{Error, Result};

/// Buffer holding one optional object per row. Unwritten rows are missing.
pub struct ObjectBuffer<T: ObjectValue> {
    values: Vec<Option<T>>,
    object_type: ObjectType<T>,
    frozen: bool,
}

impl<T: ObjectValue> ObjectBuffer<T> {
    /// Creates a buffer of `len` missing values.
    #[must_use]
    pub fn new(len: usize, object_type: ObjectType<T>) -> Self {
        Self {
            values: vec![None; len],
            object_type,
            frozen: false,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns the value at `index`, `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= size()`.
    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        check_index(index, self.values.len())?;
        Ok(self.values[index].as_ref())
    }

    /// Stores `value` at `index`.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is frozen or `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: Option<T>) -> Result<()> {
        ensure_mutable(self.frozen)?;
        check_index(index, self.values.len())?;
        self.values[index] = value;
        Ok(())
    }

    /// Prevents further modification.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns true once the buffer is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freezes the buffer and returns an object column with cloned values.
    pub fn to_column(&mut self) -> Column {
        self.freeze();
        Column::from_objects(ObjectStore {
            values: self.values.clone(),
            object_type: self.object_type,
        })
    }

    /// Converts the buffer into an object column without copying.
    #[must_use]
    pub fn into_column(self) -> Column {
        Column::from_objects(ObjectStore {
            values: self.values,
            object_type: self.object_type,
        })
    }
}

impl<T: ObjectValue> fmt::Debug for ObjectBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBuffer")
            .field("element", &std::any::type_name::<T>())
            .field("size", &self.values.len())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl<T: ObjectValue> fmt::Display for ObjectBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        preview(f, "Object Buffer", self.values.len(), |i| {
            self.values[i]
                .as_ref()
                .map_or_else(|| "?".to_string(), |v| format!("{v:?}"))
        })
    }
}

/// Writer of one row range of an [`ObjectBuffer`].
#[derive(Debug)]
pub struct ObjectPart<'a, T> {
    offset: usize,
    values: &'a mut [Option<T>],
}

impl<T: ObjectValue> Sink<Option<T>> for ObjectPart<'_, T> {
    #[inline]
    fn set(&mut self, row: usize, value: Option<T>) -> Result<()> {
        let size = self.offset + self.values.len();
        let slot = row
            .checked_sub(self.offset)
            .and_then(|i| self.values.get_mut(i))
            .ok_or(Error::IndexOutOfBounds { index: row, size })?;
        *slot = value;
        Ok(())
    }
}

impl<T: ObjectValue> WriteBuffer for ObjectBuffer<T> {
    type Value = Option<T>;
    type Part<'a> = ObjectPart<'a, T>;

    fn size(&self) -> usize {
        self.values.len()
    }

    fn parts(&mut self, bounds: &[(usize, usize)]) -> Result<Vec<ObjectPart<'_, T>>> {
        ensure_mutable(self.frozen)?;
        Ok(split_ranges(&mut self.values, bounds)?
            .into_iter()
            .map(|(offset, values)| ObjectPart { offset, values })
            .collect())
    }
}
