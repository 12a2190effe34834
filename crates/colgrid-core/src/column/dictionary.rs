//! Category dictionaries.
//!
//! A dictionary maps category index `i >= 1` to a value. Index 0 is reserved
//! for missing values and never maps to a value.

use crate::error::{Error, Result};

/// Ordered mapping from category index to value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary<T> {
    /// `values[0]` is always `None`.
    values: Vec<Option<T>>,
    boolean: bool,
    positive: Option<u32>,
}

impl<T> Dictionary<T> {
    /// Creates a dictionary assigning indices `1..=values.len()` in order.
    #[must_use]
    pub fn new(values: Vec<T>) -> Self {
        let mut slots = Vec::with_capacity(values.len() + 1);
        slots.push(None);
        slots.extend(values.into_iter().map(Some));
        Self {
            values: slots,
            boolean: false,
            positive: None,
        }
    }

    /// Creates a dictionary from raw slots; `slots[0]` is forced to `None`.
    pub(crate) fn from_slots(mut slots: Vec<Option<T>>) -> Self {
        if slots.is_empty() {
            slots.push(None);
        } else {
            slots[0] = None;
        }
        Self {
            values: slots,
            boolean: false,
            positive: None,
        }
    }

    /// Returns the value of `index`, `None` for 0 or unknown indices.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&T> {
        self.values.get(index as usize).and_then(Option::as_ref)
    }

    /// Number of non-missing categories.
    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len() - 1
    }

    /// Largest valid category index (0 if the dictionary is empty).
    #[must_use]
    pub fn max_index(&self) -> u32 {
        (self.values.len() - 1) as u32
    }

    /// Iterates over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i as u32, v)))
    }

    /// Returns true if the dictionary encodes booleans.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.boolean
    }

    /// Index of the positive value of a boolean dictionary.
    #[must_use]
    pub fn positive_index(&self) -> Option<u32> {
        self.positive
    }

    /// Index of the negative value of a boolean dictionary.
    #[must_use]
    pub fn negative_index(&self) -> Option<u32> {
        if !self.boolean {
            return None;
        }
        (1..=self.max_index()).find(|&i| Some(i) != self.positive)
    }
}

impl<T: PartialEq> Dictionary<T> {
    /// Returns the index of `value`, if present.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<u32> {
        self.iter().find(|(_, v)| *v == value).map(|(i, _)| i)
    }

    /// Converts into a boolean dictionary with `positive` as positive value.
    ///
    /// Without a positive value the dictionary may hold at most one value,
    /// which becomes the negative value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if there are more than two values,
    /// or if `positive` is not part of the dictionary.
    pub fn into_boolean(mut self, positive: Option<&T>) -> Result<Self> {
        if self.size() > 2 {
            return Err(Error::InvalidArgument(format!(
                "boolean dictionary needs at most 2 values, found {}",
                self.size()
            )));
        }
        self.positive = match positive {
            Some(value) => Some(self.index_of(value).ok_or_else(|| {
                Error::InvalidArgument("positive value is not part of the dictionary".to_string())
            })?),
            None if self.size() > 1 => {
                return Err(Error::InvalidArgument(
                    "two values require a positive value".to_string(),
                ))
            }
            None => None,
        };
        self.boolean = true;
        Ok(self)
    }
}
