//! Column type descriptors and capability sets.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::ops::BitOr;

/// Values that can be stored in object and categorical columns.
pub trait ObjectValue: Clone + Send + Sync + fmt::Debug + 'static {}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> ObjectValue for T {}

/// Values that can be used as categories of a categorical column.
pub trait CategoryValue: ObjectValue + Eq + Hash {}

impl<T: ObjectValue + Eq + Hash> CategoryValue for T {}

/// Identifier of the declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnTypeId {
    /// 64-bit floating point values.
    Real,
    /// Integral values stored as doubles.
    Integer,
    /// Dictionary-encoded values.
    Categorical,
    /// Free-form objects.
    Object,
    /// Time of day with nanosecond precision.
    Time,
    /// Instants with second or nanosecond precision.
    DateTime,
}

impl ColumnTypeId {
    /// Returns the storage category of columns with this type.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Real | Self::Integer => Category::Numeric,
            Self::Categorical => Category::Categorical,
            Self::Object | Self::Time | Self::DateTime => Category::Object,
        }
    }
}

/// Storage category of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Values readable as doubles without a dictionary.
    Numeric,
    /// Packed category indices plus a dictionary.
    Categorical,
    /// One object per row.
    Object,
}

/// A single column capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Values can be read as doubles.
    NumericReadable,
    /// Values can be read as objects.
    ObjectReadable,
    /// Rows can be sorted.
    Sortable,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Self::NumericReadable => 0b001,
            Self::ObjectReadable => 0b010,
            Self::Sortable => 0b100,
        }
    }
}

/// Fixed-size set of capabilities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// The empty set.
    pub const NONE: Self = Self(0);

    /// Creates a set from capabilities.
    #[must_use]
    pub fn of(capabilities: &[Capability]) -> Self {
        capabilities.iter().fold(Self::NONE, |set, &c| set.with(c))
    }

    /// Returns the set extended by `capability`.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Returns true if `capability` is part of the set.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }
}

impl BitOr<Capability> for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Capability) -> Self {
        self.with(rhs)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all = [
            Capability::NumericReadable,
            Capability::ObjectReadable,
            Capability::Sortable,
        ];
        f.debug_set()
            .entries(all.iter().filter(|c| self.contains(**c)))
            .finish()
    }
}

/// Runtime identity of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
}

impl ElementType {
    /// Element type of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns true if this is the element type of `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Type name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Describes the element type of an object or categorical column.
///
/// The optional comparator makes the column sortable.
#[derive(Debug)]
pub struct ObjectType<T> {
    comparator: Option<fn(&T, &T) -> Ordering>,
}

impl<T> Clone for ObjectType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectType<T> {}

impl<T: ObjectValue> Default for ObjectType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ObjectValue> ObjectType<T> {
    /// Object type without ordering.
    #[must_use]
    pub const fn new() -> Self {
        Self { comparator: None }
    }

    /// Object type ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: fn(&T, &T) -> Ordering) -> Self {
        Self {
            comparator: Some(comparator),
        }
    }

    /// Object type ordered by the natural order of `T`.
    #[must_use]
    pub fn ordered() -> Self
    where
        T: Ord,
    {
        Self::with_comparator(<T as Ord>::cmp)
    }

    /// Returns the comparator, if any.
    #[must_use]
    pub fn comparator(&self) -> Option<fn(&T, &T) -> Ordering> {
        self.comparator
    }

    /// Returns the runtime element type.
    #[must_use]
    pub fn element(&self) -> ElementType {
        ElementType::of::<T>()
    }
}

/// Nominal (text) category type, ordered lexicographically.
#[must_use]
pub fn text() -> ObjectType<String> {
    ObjectType::ordered()
}

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnType {
    id: ColumnTypeId,
    element: Option<ElementType>,
}

impl ColumnType {
    /// Real column type.
    pub const REAL: Self = Self {
        id: ColumnTypeId::Real,
        element: None,
    };

    /// Integer column type.
    pub const INTEGER: Self = Self {
        id: ColumnTypeId::Integer,
        element: None,
    };

    pub(crate) fn new(id: ColumnTypeId, element: Option<ElementType>) -> Self {
        Self { id, element }
    }

    /// Type identifier.
    #[must_use]
    pub fn id(&self) -> ColumnTypeId {
        self.id
    }

    /// Storage category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.id.category()
    }

    /// Element type for object, categorical, time and date-time columns.
    #[must_use]
    pub fn element(&self) -> Option<ElementType> {
        self.element
    }
}
