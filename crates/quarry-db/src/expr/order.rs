//! ORDER BY entries.

use std::fmt;

use crate::expr::{column::Field, ops::Direction};

/// A column plus sort direction. Renders as `"<column> <direction>"`.
pub struct Order<E> {
    field: Field<E>,
    direction: Direction,
}

impl<E> Order<E> {
    /// Ascending order on `field`.
    pub fn new(field: impl Into<Field<E>>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn asc(field: impl Into<Field<E>>) -> Self {
        Self::new(field)
    }

    pub fn desc(field: impl Into<Field<E>>) -> Self {
        Self::new(field).set_direction(Direction::Desc)
    }

    /// Returns a copy with the direction replaced.
    pub fn set_direction(&self, direction: Direction) -> Self {
        Self {
            field: self.field,
            direction,
        }
    }

    /// The column name.
    pub fn value(&self) -> &'static str {
        self.field.as_str()
    }

    pub fn field(&self) -> Field<E> {
        self.field
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl<E> Clone for Order<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Order<E> {}

impl<E> PartialEq for Order<E> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.direction == other.direction
    }
}

impl<E> fmt::Debug for Order<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("column", &self.value())
            .field("direction", &self.direction)
            .finish()
    }
}

impl<E> fmt::Display for Order<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value(), self.direction)
    }
}
