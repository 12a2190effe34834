//! Type-erased storage of categorical and object columns.
//!
//! Columns are not generic over their element type, so categorical and
//! object data live behind the traits below and are downcast when a caller
//! asks for a concrete element type.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::dictionary::Dictionary;
use super::types::{CategoryValue, ElementType, ObjectType, ObjectValue};
use crate::packing::PackedIndices;

/// Missing values sort after present values.
fn compare_present<T>(
    a: Option<&T>,
    b: Option<&T>,
    comparator: fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => comparator(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) trait CategoricalData: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn indices(&self) -> &PackedIndices;
    fn element(&self) -> ElementType;
    fn dictionary_size(&self) -> usize;
    fn is_boolean(&self) -> bool;
    fn positive_index(&self) -> Option<u32>;
    fn is_sortable(&self) -> bool;
    /// Compares two category indices by their values.
    fn compare_indices(&self, a: u32, b: u32) -> Ordering;
    /// Same dictionary, different rows.
    fn with_indices(&self, indices: PackedIndices) -> Arc<dyn CategoricalData>;
    fn render(&self, index: u32) -> String;
}

pub(crate) struct CategoricalStore<T> {
    pub(crate) indices: PackedIndices,
    pub(crate) dictionary: Arc<Dictionary<T>>,
    pub(crate) object_type: ObjectType<T>,
}

impl<T: CategoryValue> fmt::Debug for CategoricalStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoricalStore")
            .field("format", &self.indices.format())
            .field("rows", &self.indices.len())
            .field("dictionary", &self.dictionary)
            .finish()
    }
}

impl<T: CategoryValue> CategoricalData for CategoricalStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn indices(&self) -> &PackedIndices {
        &self.indices
    }

    fn element(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn dictionary_size(&self) -> usize {
        self.dictionary.size()
    }

    fn is_boolean(&self) -> bool {
        self.dictionary.is_boolean()
    }

    fn positive_index(&self) -> Option<u32> {
        self.dictionary.positive_index()
    }

    fn is_sortable(&self) -> bool {
        self.object_type.comparator().is_some()
    }

    fn compare_indices(&self, a: u32, b: u32) -> Ordering {
        match self.object_type.comparator() {
            Some(comparator) => {
                compare_present(self.dictionary.get(a), self.dictionary.get(b), comparator)
            }
            None => Ordering::Equal,
        }
    }

    fn with_indices(&self, indices: PackedIndices) -> Arc<dyn CategoricalData> {
        Arc::new(Self {
            indices,
            dictionary: Arc::clone(&self.dictionary),
            object_type: self.object_type,
        })
    }

    fn render(&self, index: u32) -> String {
        self.dictionary
            .get(index)
            .map_or_else(|| "?".to_string(), |v| format!("{v:?}"))
    }
}

pub(crate) trait ObjectData: Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn len(&self) -> usize;
    fn element(&self) -> ElementType;
    fn is_sortable(&self) -> bool;
    fn compare_rows(&self, a: usize, b: usize) -> Ordering;
    /// Row `i` of the result is row `mapping[i]`; out of range rows are missing.
    fn remap(&self, mapping: &[usize]) -> Arc<dyn ObjectData>;
}

pub(crate) struct ObjectStore<T> {
    pub(crate) values: Vec<Option<T>>,
    pub(crate) object_type: ObjectType<T>,
}

impl<T: ObjectValue> fmt::Debug for ObjectStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("element", &std::any::type_name::<T>())
            .field("rows", &self.values.len())
            .finish()
    }
}

impl<T: ObjectValue> ObjectData for ObjectStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn element(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn is_sortable(&self) -> bool {
        self.object_type.comparator().is_some()
    }

    fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match self.object_type.comparator() {
            Some(comparator) => compare_present(
                self.values[a].as_ref(),
                self.values[b].as_ref(),
                comparator,
            ),
            None => Ordering::Equal,
        }
    }

    fn remap(&self, mapping: &[usize]) -> Arc<dyn ObjectData> {
        let values = mapping
            .iter()
            .map(|&row| self.values.get(row).cloned().flatten())
            .collect();
        Arc::new(Self {
            values,
            object_type: self.object_type,
        })
    }
}

enum ReaderSource<'a, T> {
    Values(&'a [Option<T>]),
    Dictionary {
        indices: &'a PackedIndices,
        dictionary: &'a Dictionary<T>,
    },
    Decoded(Vec<Option<T>>),
}

/// Direct indexed object access to one column.
///
/// Obtained from [`Column::object_reader`](super::Column::object_reader);
/// the element type has been checked at creation.
pub struct ObjectReader<'a, T> {
    source: ReaderSource<'a, T>,
    rows: Option<&'a [usize]>,
    len: usize,
}

impl<T> fmt::Debug for ObjectReader<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("len", &self.len)
            .field("view", &self.rows.is_some())
            .finish()
    }
}

impl<'a, T> ObjectReader<'a, T> {
    pub(crate) fn values(values: &'a [Option<T>], rows: Option<&'a [usize]>, len: usize) -> Self {
        Self {
            source: ReaderSource::Values(values),
            rows,
            len,
        }
    }

    pub(crate) fn dictionary(
        indices: &'a PackedIndices,
        dictionary: &'a Dictionary<T>,
        rows: Option<&'a [usize]>,
        len: usize,
    ) -> Self {
        Self {
            source: ReaderSource::Dictionary {
                indices,
                dictionary,
            },
            rows,
            len,
        }
    }

    pub(crate) fn decoded(values: Vec<Option<T>>, rows: Option<&'a [usize]>, len: usize) -> Self {
        Self {
            source: ReaderSource::Decoded(values),
            rows,
            len,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value at `row`, `None` if missing or out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&T> {
        let row = match self.rows {
            Some(rows) => *rows.get(row)?,
            None => row,
        };
        match &self.source {
            ReaderSource::Values(values) => values.get(row)?.as_ref(),
            ReaderSource::Decoded(values) => values.get(row)?.as_ref(),
            ReaderSource::Dictionary {
                indices,
                dictionary,
            } => {
                if row >= indices.len() {
                    return None;
                }
                dictionary.get(indices.get(row))
            }
        }
    }
}
