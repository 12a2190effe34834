//! Result representations of a transform.
//!
//! A target decides which buffer a transform writes into and therefore the
//! value type the user function must return:
//!
//! | Target              | Function returns            | Buffer                 |
//! |---------------------|-----------------------------|------------------------|
//! | [`Real`]            | `f64`                       | [`NumericBuffer`]      |
//! | [`Integer`]         | `f64` (rounded half up)     | [`NumericBuffer`]      |
//! | [`Categorical<T>`]  | `Option<T>`                 | [`CategoricalBuffer`]  |
//! | [`Objects<T>`]      | `Option<T>`                 | [`ObjectBuffer`]       |
//! | [`Times`]           | `Option<NaiveTime>`         | [`TimeBuffer`]         |
//! | [`DateTimes`]       | `Option<DateTime<Utc>>`     | [`DateTimeBuffer`]     |

use chrono::{DateTime, NaiveTime, Utc};

use crate::buffer::{
    CategoricalBuffer, DateTimeBuffer, NumericBuffer, ObjectBuffer, Precision, TimeBuffer,
    WriteBuffer,
};
use crate::column::{CategoryValue, ObjectType, ObjectValue};
use crate::packing::Format;

/// Creates the destination buffer of a transform.
pub trait Target: Sync {
    /// Value produced per row by the transform function.
    type Value;

    /// Buffer written by the transform.
    type Buffer: WriteBuffer<Value = Self::Value>;

    /// Creates a buffer of `rows` default values.
    fn create_buffer(&self, rows: usize) -> Self::Buffer;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Real column target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Real;

impl Target for Real {
    type Value = f64;
    type Buffer = NumericBuffer;

    fn create_buffer(&self, rows: usize) -> NumericBuffer {
        NumericBuffer::real(rows)
    }

    fn name(&self) -> &'static str {
        "real"
    }
}

/// Integer column target; results are rounded half up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl Target for Integer {
    type Value = f64;
    type Buffer = NumericBuffer;

    fn create_buffer(&self, rows: usize) -> NumericBuffer {
        NumericBuffer::integer(rows)
    }

    fn name(&self) -> &'static str {
        "integer"
    }
}

/// Categorical column target with a packing format.
#[derive(Debug)]
pub struct Categorical<T> {
    format: Format,
    object_type: ObjectType<T>,
}

impl<T: CategoryValue> Categorical<T> {
    /// Categorical target without ordering.
    #[must_use]
    pub fn new(format: Format) -> Self {
        Self {
            format,
            object_type: ObjectType::new(),
        }
    }

    /// Categorical target whose column uses `object_type`.
    #[must_use]
    pub fn with_type(format: Format, object_type: ObjectType<T>) -> Self {
        Self {
            format,
            object_type,
        }
    }
}

impl<T: CategoryValue> Target for Categorical<T> {
    type Value = Option<T>;
    type Buffer = CategoricalBuffer<T>;

    fn create_buffer(&self, rows: usize) -> CategoricalBuffer<T> {
        CategoricalBuffer::new(rows, self.format).with_object_type(self.object_type)
    }

    fn name(&self) -> &'static str {
        "categorical"
    }
}

/// Object column target.
#[derive(Debug)]
pub struct Objects<T> {
    object_type: ObjectType<T>,
}

impl<T: ObjectValue> Objects<T> {
    /// Object target with the given element type descriptor.
    #[must_use]
    pub fn new(object_type: ObjectType<T>) -> Self {
        Self { object_type }
    }
}

impl<T: ObjectValue> Default for Objects<T> {
    fn default() -> Self {
        Self::new(ObjectType::new())
    }
}

impl<T: ObjectValue> Target for Objects<T> {
    type Value = Option<T>;
    type Buffer = ObjectBuffer<T>;

    fn create_buffer(&self, rows: usize) -> ObjectBuffer<T> {
        ObjectBuffer::new(rows, self.object_type)
    }

    fn name(&self) -> &'static str {
        "object"
    }
}

/// Time of day target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Times;

impl Target for Times {
    type Value = Option<NaiveTime>;
    type Buffer = TimeBuffer;

    fn create_buffer(&self, rows: usize) -> TimeBuffer {
        TimeBuffer::new(rows)
    }

    fn name(&self) -> &'static str {
        "time"
    }
}

/// Date-time target.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimes {
    precision: Precision,
}

impl DateTimes {
    /// Date-time target with the given precision.
    #[must_use]
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }
}

impl Target for DateTimes {
    type Value = Option<DateTime<Utc>>;
    type Buffer = DateTimeBuffer;

    fn create_buffer(&self, rows: usize) -> DateTimeBuffer {
        DateTimeBuffer::new(rows, self.precision)
    }

    fn name(&self) -> &'static str {
        "date-time"
    }
}
