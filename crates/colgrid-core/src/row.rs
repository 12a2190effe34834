//! Positioned cursor over aligned columns.
//!
//! Row-wise transforms hand a [`RowCursor`] to the user function. The cursor
//! starts before the first row; reads at that position return missing values.

use chrono::{DateTime, NaiveTime, Utc};

use crate::column::{Column, ObjectValue};
use crate::error::{Error, Result};

/// Position before row 0.
pub const BEFORE_FIRST: Option<usize> = None;

/// Cursor over an ordered list of columns of equal height.
///
/// # Panics
///
/// The typed reads index the column list and panic if `column >= width()`.
#[derive(Debug, Clone)]
pub struct RowCursor<'a> {
    columns: &'a [&'a Column],
    height: usize,
    position: Option<usize>,
}

impl<'a> RowCursor<'a> {
    /// Creates a cursor positioned before the first row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the columns differ in height.
    pub fn new(columns: &'a [&'a Column]) -> Result<Self> {
        let height = columns.first().map_or(0, |c| c.size());
        if let Some(column) = columns.iter().find(|c| c.size() != height) {
            return Err(Error::InvalidArgument(format!(
                "column height {} differs from {height}",
                column.size()
            )));
        }
        Ok(Self {
            columns,
            height,
            position: BEFORE_FIRST,
        })
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current row, [`BEFORE_FIRST`] before the first move.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns true if [`RowCursor::advance`] reaches another row.
    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.position.map_or(0, |p| p + 1) < self.height
    }

    /// Moves to the next row. Check [`RowCursor::has_remaining`] first.
    pub fn advance(&mut self) {
        self.position = Some(self.position.map_or(0, |p| p + 1));
    }

    /// Moves to `position`; [`BEFORE_FIRST`] resets the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the row does not exist.
    pub fn set_position(&mut self, position: Option<usize>) -> Result<()> {
        if let Some(row) = position {
            if row >= self.height {
                return Err(Error::IndexOutOfBounds {
                    index: row,
                    size: self.height,
                });
            }
        }
        self.position = position;
        Ok(())
    }

    #[inline]
    fn row(&self) -> usize {
        // Out of range rows read as missing.
        self.position.unwrap_or(usize::MAX)
    }

    /// The column at `column`.
    #[must_use]
    pub fn column(&self, column: usize) -> &'a Column {
        self.columns[column]
    }

    /// Numeric value of `column` at the current row.
    #[inline]
    #[must_use]
    pub fn numeric(&self, column: usize) -> f64 {
        self.columns[column].numeric_at(self.row())
    }

    /// Category index of `column` at the current row.
    #[inline]
    #[must_use]
    pub fn index(&self, column: usize) -> u32 {
        self.columns[column].index_at(self.row())
    }

    /// Object of `column` at the current row.
    ///
    /// Time and date-time columns are decoded, see [`Column::object_value`].
    #[inline]
    #[must_use]
    pub fn get<T: ObjectValue>(&self, column: usize) -> Option<T> {
        self.columns[column].object_value(self.row())
    }

    /// Time of `column` at the current row.
    #[must_use]
    pub fn time(&self, column: usize) -> Option<NaiveTime> {
        self.columns[column].time_at(self.row())
    }

    /// Date-time of `column` at the current row.
    #[must_use]
    pub fn date_time(&self, column: usize) -> Option<DateTime<Utc>> {
        self.columns[column].date_time_at(self.row())
    }
}
