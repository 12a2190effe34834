//! Time of day and date-time buffers.
//!
//! Times are stored as nanoseconds since midnight, date-times as epoch
//! seconds plus (for high precision) nanoseconds. Unwritten rows are missing.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{check_index, ensure_mutable, preview, split_ranges, Sink, WriteBuffer};
use crate::column::temporal::{
    decode_date_time, decode_time, encode_date_time, encode_time, MISSING_SECONDS, MISSING_TIME,
};
use crate::column::Column;
use crate::error::{Error, Result};

/// Buffer of times of day.
#[derive(Clone, PartialEq)]
pub struct TimeBuffer {
    nanos: Vec<i64>,
    frozen: bool,
}

impl TimeBuffer {
    /// Creates a buffer of `len` missing times.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            nanos: vec![MISSING_TIME; len],
            frozen: false,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.nanos.len()
    }

    /// Returns the time at `index`, `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= size()`.
    pub fn get(&self, index: usize) -> Result<Option<NaiveTime>> {
        check_index(index, self.nanos.len())?;
        Ok(decode_time(self.nanos[index]))
    }

    /// Stores `value` at `index`.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is frozen or `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: Option<NaiveTime>) -> Result<()> {
        ensure_mutable(self.frozen)?;
        check_index(index, self.nanos.len())?;
        self.nanos[index] = encode_time(value);
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

    /// Freezes the buffer and returns a time column.
    pub fn to_column(&mut self) -> Column {
        self.freeze();
        Column::from_time_nanos(self.nanos.as_slice().into())
    }

    /// Converts the buffer into a time column without copying.
    #[must_use]
    pub fn into_column(self) -> Column {
        Column::from_time_nanos(self.nanos.into())
    }
}

impl fmt::Debug for TimeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeBuffer")
            .field("size", &self.nanos.len())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl fmt::Display for TimeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        preview(f, "Time Buffer", self.nanos.len(), |i| {
            decode_time(self.nanos[i]).map_or_else(|| "?".to_string(), |t| t.to_string())
        })
    }
}

/// Writer of one row range of a [`TimeBuffer`].
#[derive(Debug)]
pub struct TimePart<'a> {
    offset: usize,
    nanos: &'a mut [i64],
}

impl Sink<Option<NaiveTime>> for TimePart<'_> {
    fn set(&mut self, row: usize, value: Option<NaiveTime>) -> Result<()> {
        let size = self.offset + self.nanos.len();
        let slot = row
            .checked_sub(self.offset)
            .and_then(|i| self.nanos.get_mut(i))
            .ok_or(Error::IndexOutOfBounds { index: row, size })?;
        *slot = encode_time(value);
        Ok(())
    }
}

impl WriteBuffer for TimeBuffer {
    type Value = Option<NaiveTime>;
    type Part<'a> = TimePart<'a>;

    fn size(&self) -> usize {
        self.nanos.len()
    }

    fn parts(&mut self, bounds: &[(usize, usize)]) -> Result<Vec<TimePart<'_>>> {
        ensure_mutable(self.frozen)?;
        Ok(split_ranges(&mut self.nanos, bounds)?
            .into_iter()
            .map(|(offset, nanos)| TimePart { offset, nanos })
            .collect())
    }
}

/// Precision of a date-time buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Whole seconds; nanoseconds are dropped on write.
    #[default]
    Seconds,
    /// Seconds and nanoseconds.
    Nanoseconds,
}

/// Buffer of instants.
#[derive(Clone, PartialEq)]
pub struct DateTimeBuffer {
    seconds: Vec<i64>,
    nanos: Option<Vec<u32>>,
    frozen: bool,
}

impl DateTimeBuffer {
    /// Creates a buffer of `len` missing instants.
    #[must_use]
    pub fn new(len: usize, precision: Precision) -> Self {
        Self {
            seconds: vec![MISSING_SECONDS; len],
            nanos: match precision {
                Precision::Seconds => None,
                Precision::Nanoseconds => Some(vec![0; len]),
            },
            frozen: false,
        }
    }

    /// Precision of stored values.
    #[must_use]
    pub fn precision(&self) -> Precision {
        if self.nanos.is_some() {
            Precision::Nanoseconds
        } else {
            Precision::Seconds
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.seconds.len()
    }

    /// Returns the instant at `index`, `None` if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= size()`.
    pub fn get(&self, index: usize) -> Result<Option<DateTime<Utc>>> {
        check_index(index, self.seconds.len())?;
        let nanos = self.nanos.as_ref().map_or(0, |n| n[index]);
        Ok(decode_date_time(self.seconds[index], nanos))
    }

    /// Stores `value` at `index`.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is frozen or `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: Option<DateTime<Utc>>) -> Result<()> {
        ensure_mutable(self.frozen)?;
        check_index(index, self.seconds.len())?;
        let (seconds, nanos) = encode_date_time(value);
        self.seconds[index] = seconds;
        if let Some(n) = self.nanos.as_mut() {
            n[index] = nanos;
        }
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

    /// Freezes the buffer and returns a date-time column.
    pub fn to_column(&mut self) -> Column {
        self.freeze();
        Column::from_date_time_parts(
            self.seconds.as_slice().into(),
            self.nanos.as_deref().map(Into::into),
        )
    }

    /// Converts the buffer into a date-time column without copying.
    #[must_use]
    pub fn into_column(self) -> Column {
        Column::from_date_time_parts(self.seconds.into(), self.nanos.map(Into::into))
    }
}

impl fmt::Debug for DateTimeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateTimeBuffer")
            .field("size", &self.seconds.len())
            .field("precision", &self.precision())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl fmt::Display for DateTimeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        preview(f, "Date-Time Buffer", self.seconds.len(), |i| {
            let nanos = self.nanos.as_ref().map_or(0, |n| n[i]);
            decode_date_time(self.seconds[i], nanos)
                .map_or_else(|| "?".to_string(), |t| t.to_rfc3339())
        })
    }
}

/// Writer of one row range of a [`DateTimeBuffer`].
#[derive(Debug)]
pub struct DateTimePart<'a> {
    offset: usize,
    seconds: &'a mut [i64],
    nanos: Option<&'a mut [u32]>,
}

impl Sink<Option<DateTime<Utc>>> for DateTimePart<'_> {
    fn set(&mut self, row: usize, value: Option<DateTime<Utc>>) -> Result<()> {
        let size = self.offset + self.seconds.len();
        let index = row
            .checked_sub(self.offset)
            .filter(|&i| i < self.seconds.len())
            .ok_or(Error::IndexOutOfBounds { index: row, size })?;
        let (seconds, nanos) = encode_date_time(value);
        self.seconds[index] = seconds;
        if let Some(n) = self.nanos.as_deref_mut() {
            n[index] = nanos;
        }
        Ok(())
    }
}

impl WriteBuffer for DateTimeBuffer {
    type Value = Option<DateTime<Utc>>;
    type Part<'a> = DateTimePart<'a>;

    fn size(&self) -> usize {
        self.seconds.len()
    }

    fn parts(&mut self, bounds: &[(usize, usize)]) -> Result<Vec<DateTimePart<'_>>> {
        ensure_mutable(self.frozen)?;
        let seconds = split_ranges(&mut self.seconds, bounds)?;
        let nanos: Vec<Option<&mut [u32]>> = match self.nanos.as_mut() {
            Some(n) => split_ranges(n, bounds)?
                .into_iter()
                .map(|(_, part)| Some(part))
                .collect(),
            None => Vec::new(),
        };
        let mut nanos = nanos.into_iter();
        Ok(seconds
            .into_iter()
            .map(|(offset, seconds)| DateTimePart {
                offset,
                seconds,
                nanos: nanos.next().flatten(),
            })
            .collect())
    }
}
