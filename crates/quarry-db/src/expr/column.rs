//! Typed columns, untyped fields and projections.
//!
//! `Col<E, T>` ties a column name to its entity `E` and Rust type `T`, so a
//! column of one entity cannot be used in a filter or projection of another.
//! [`Field`] erases `T` for projections, updates and ordering.

use std::{fmt, hash, marker::PhantomData};

use crate::{
    error::{DbError, Result},
    expr::{Direction, Order},
    traits::Entity,
};

/// A typed reference to a column of entity `E`.
///
/// The type parameter `T` documents the expected Rust type of the column;
/// it is not enforced when binding values.
///
/// # Example
///
/// ```ignore
/// const NAME: Col<User, String> = Col::new("name");
/// ```
pub struct Col<E, T> {
    pub name: &'static str,
    _type: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Col<E, T> {
    /// Creates a new column reference.
    ///
    /// # Parameters
    ///
    /// - `name`: the actual column name in the database (e.g., `"user_name"`)
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    /// Erases the column type.
    pub const fn field(&self) -> Field<E> {
        Field::new_unchecked(self.name)
    }

    /// Ascending sort on this column.
    pub fn asc(&self) -> Order<E> {
        Order::new(self.field()).set_direction(Direction::Asc)
    }

    /// Descending sort on this column.
    pub fn desc(&self) -> Order<E> {
        Order::new(self.field()).set_direction(Direction::Desc)
    }
}

impl<E, T> Clone for Col<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Col<E, T> {}

impl<E, T> fmt::Debug for Col<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Col").field(&self.name).finish()
    }
}

impl<E, T> From<Col<E, T>> for Field<E> {
    fn from(col: Col<E, T>) -> Self {
        col.field()
    }
}

/// A column identifier of entity `E`.
pub struct Field<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Field<E> {
    pub(crate) const fn new_unchecked(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.name
    }
}

impl<E: Entity> Field<E> {
    /// Resolves a column name against the entity's schema.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArgument`] if the entity has no such column.
    pub fn parse(name: &str) -> Result<Self> {
        let schema = E::schema();
        schema
            .column(name.trim())
            .map(|c| Self::new_unchecked(c.name))
            .ok_or_else(|| {
                DbError::invalid(format!("unknown field '{}' for {}", name, schema.table))
            })
    }

    /// The entity's primary-key column.
    pub fn primary_key() -> Self {
        Self::new_unchecked(E::schema().primary_key)
    }
}

impl<E> Clone for Field<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Field<E> {}

impl<E> PartialEq for Field<E> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<E> Eq for Field<E> {}

impl<E> hash::Hash for Field<E> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<E> fmt::Display for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An ordered list of fields. Duplicates are kept and render duplicate columns.
pub struct FieldList<E> {
    fields: Vec<Field<E>>,
}

impl<E> FieldList<E> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Field<E>> + '_ {
        self.fields.iter().copied()
    }

    pub fn as_slice(&self) -> &[Field<E>] {
        &self.fields
    }

    /// Column names in list order.
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.as_str()).collect()
    }
}

impl<E: Entity> FieldList<E> {
    /// Every column of the entity, in schema order.
    pub fn all() -> Self {
        E::schema()
            .column_names()
            .map(Field::new_unchecked)
            .collect()
    }

    /// All columns except `excluded`, in schema order.
    pub fn all_except(excluded: &[Field<E>]) -> Self {
        Self::all()
            .iter()
            .filter(|f| !excluded.contains(f))
            .collect()
    }

    /// Parses a comma separated list of column names.
    pub fn parse(names: &str) -> Result<Self> {
        names
            .split(',')
            .filter(|n| !n.trim().is_empty())
            .map(Field::parse)
            .collect()
    }
}

impl<E> Default for FieldList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for FieldList<E> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<E> fmt::Debug for FieldList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

impl<E> PartialEq for FieldList<E> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<E> FromIterator<Field<E>> for FieldList<E> {
    fn from_iter<I: IntoIterator<Item = Field<E>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<E> From<Vec<Field<E>>> for FieldList<E> {
    fn from(fields: Vec<Field<E>>) -> Self {
        Self {
            fields,
        }
    }
}

impl<E> IntoIterator for FieldList<E> {
    type Item = Field<E>;
    type IntoIter = std::vec::IntoIter<Field<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
