//! Real and integer buffers.

use std::fmt;

use super::{check_index, ensure_mutable, preview, split_ranges, Sink, WriteBuffer};
use crate::column::{Column, ColumnTypeId};
use crate::error::{Error, Result};

/// Rounds to the nearest integer, halves towards positive infinity.
///
/// NaN and infinities are returned unchanged.
#[inline]
#[must_use]
pub(crate) fn round_half_up(value: f64) -> f64 {
    if value.is_finite() {
        // `value + 0.5` is inexact near 0.5 and above 2^52.
        let rounded = value.round();
        if rounded - value == -0.5 {
            rounded + 1.0
        } else {
            rounded
        }
    } else {
        value
    }
}

/// Buffer of doubles for real or integer columns.
///
/// Integer buffers round every written value half up. Unwritten rows hold `0.0`.
#[derive(Clone, PartialEq)]
pub struct NumericBuffer {
    values: Vec<f64>,
    type_id: ColumnTypeId,
    frozen: bool,
}

impl NumericBuffer {
    fn with_type(len: usize, type_id: ColumnTypeId) -> Self {
        Self {
            values: vec![0.0; len],
            type_id,
            frozen: false,
        }
    }

    /// Creates a real buffer of `len` zeros.
    #[must_use]
    pub fn real(len: usize) -> Self {
        Self::with_type(len, ColumnTypeId::Real)
    }

    /// Creates an integer buffer of `len` zeros.
    #[must_use]
    pub fn integer(len: usize) -> Self {
        Self::with_type(len, ColumnTypeId::Integer)
    }

    /// Creates a buffer holding `values`, rounded for integer buffers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `type_id` is real or integer.
    pub fn from_values(values: Vec<f64>, type_id: ColumnTypeId) -> Result<Self> {
        match type_id {
            ColumnTypeId::Real => Ok(Self {
                values,
                type_id,
                frozen: false,
            }),
            ColumnTypeId::Integer => Ok(Self {
                values: values.into_iter().map(round_half_up).collect(),
                type_id,
                frozen: false,
            }),
            other => Err(Error::InvalidArgument(format!(
                "{other:?} is not a numeric column type"
            ))),
        }
    }

    /// Column type produced by this buffer.
    #[must_use]
    pub fn type_id(&self) -> ColumnTypeId {
        self.type_id
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= size()`.
    pub fn get(&self, index: usize) -> Result<f64> {
        check_index(index, self.values.len())?;
        Ok(self.values[index])
    }

    /// Stores `value` at `index`.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is frozen or `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        ensure_mutable(self.frozen)?;
        check_index(index, self.values.len())?;
        self.values[index] = self.convert(value);
        Ok(())
    }

    #[inline]
    fn convert(&self, value: f64) -> f64 {
        if self.type_id == ColumnTypeId::Integer {
            round_half_up(value)
        } else {
            value
        }
    }

    /// Values as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
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

    /// Freezes the buffer and returns a column with a copy of its values.
    pub fn to_column(&mut self) -> Column {
        self.freeze();
        Column::from_numeric(self.type_id, self.values.as_slice().into())
    }

    /// Converts the buffer into a column without copying.
    #[must_use]
    pub fn into_column(self) -> Column {
        Column::from_numeric(self.type_id, self.values.into())
    }
}

impl fmt::Debug for NumericBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericBuffer")
            .field("type_id", &self.type_id)
            .field("size", &self.values.len())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl fmt::Display for NumericBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.type_id {
            ColumnTypeId::Integer => "Integer Buffer",
            _ => "Real Buffer",
        };
        preview(f, name, self.values.len(), |i| {
            let value = self.values[i];
            if value.is_nan() {
                "?".to_string()
            } else {
                format!("{value}")
            }
        })
    }
}

/// Writer of one row range of a [`NumericBuffer`].
#[derive(Debug)]
pub struct NumericPart<'a> {
    offset: usize,
    values: &'a mut [f64],
    integer: bool,
}

impl Sink<f64> for NumericPart<'_> {
    #[inline]
    fn set(&mut self, row: usize, value: f64) -> Result<()> {
        let size = self.offset + self.values.len();
        let slot = row
            .checked_sub(self.offset)
            .and_then(|i| self.values.get_mut(i))
            .ok_or(Error::IndexOutOfBounds { index: row, size })?;
        *slot = if self.integer {
            round_half_up(value)
        } else {
            value
        };
        Ok(())
    }
}

impl WriteBuffer for NumericBuffer {
    type Value = f64;
    type Part<'a> = NumericPart<'a>;

    fn size(&self) -> usize {
        self.values.len()
    }

    fn parts(&mut self, bounds: &[(usize, usize)]) -> Result<Vec<NumericPart<'_>>> {
        ensure_mutable(self.frozen)?;
        let integer = self.type_id == ColumnTypeId::Integer;
        Ok(split_ranges(&mut self.values, bounds)?
            .into_iter()
            .map(|(offset, values)| NumericPart {
                offset,
                values,
                integer,
            })
            .collect())
    }
}
