//! Minimal labelled table of aligned columns.

use indexmap::IndexMap;

use crate::column::Column;
use crate::error::{Error, Result};
use crate::sorting::Order;
use crate::transform::{RowTransformer, Transformer};

/// Ordered, labelled columns of equal height.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: IndexMap<String, Column>,
    height: usize,
}

impl Table {
    /// Creates a table from labelled columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for empty or duplicate labels and
    /// for columns of different heights.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let height = columns.first().map_or(0, |(_, c)| c.size());
        let mut map = IndexMap::with_capacity(columns.len());
        for (label, column) in columns {
            if label.trim().is_empty() {
                return Err(Error::InvalidArgument("empty column label".to_string()));
            }
            if column.size() != height {
                return Err(Error::InvalidArgument(format!(
                    "column '{label}' has height {}, expected {height}",
                    column.size()
                )));
            }
            if map.contains_key(&label) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate column label '{label}'"
                )));
            }
            map.insert(label, column);
        }
        Ok(Self {
            columns: map,
            height,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Column with `label`.
    #[must_use]
    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.get(label)
    }

    /// Column at `index`.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get_index(index).map(|(_, c)| c)
    }

    fn require_label(&self, label: &str) -> Result<&Column> {
        self.column(label)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown column label '{label}'")))
    }

    /// Transform of the column at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if there is no such column.
    pub fn transform(&self, index: usize) -> Result<Transformer<'_>> {
        self.column_at(index)
            .map(Transformer::new)
            .ok_or(Error::IndexOutOfBounds {
                index,
                size: self.width(),
            })
    }

    /// Transform of the column with `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for unknown labels.
    pub fn transform_label(&self, label: &str) -> Result<Transformer<'_>> {
        self.require_label(label).map(Transformer::new)
    }

    /// Row-wise transform of the columns with `labels`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for unknown labels.
    pub fn transform_rows(&self, labels: &[&str]) -> Result<RowTransformer<'_>> {
        let columns = labels
            .iter()
            .map(|label| self.require_label(label))
            .collect::<Result<Vec<_>>>()?;
        RowTransformer::new(columns)
    }

    /// Re-indexes every column with `mapping`, see [`Column::map`].
    #[must_use]
    pub fn map(&self, mapping: &[usize], prefer_view: bool) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(label, column)| (label.clone(), column.map(mapping, prefer_view)))
                .collect(),
            height: mapping.len(),
        }
    }

    /// Returns the table sorted by the column with `label`.
    ///
    /// # Errors
    ///
    /// Fails for unknown labels and unsortable columns.
    pub fn sort(&self, label: &str, order: Order) -> Result<Self> {
        let permutation = self.require_label(label)?.sort(order)?;
        Ok(self.map(&permutation, true))
    }
}
