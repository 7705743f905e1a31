//! Static per-entity table descriptors.
//!
//! A [`Schema`] is built once per entity type (normally by
//! [`define_entity!`](crate::define_entity)) and shared by every builder that
//! touches the entity. It maps each column name to a value extractor, which is
//! what INSERT and UPDATE rendering read entity values through, and to a
//! parser turning command-line text into a value of the column's type.

use rusqlite::types::Value;

use crate::error::{DbError, Result};

/// Rust types that can back a column, converting raw text into a bindable
/// value of that type.
pub trait ColumnType {
    fn parse_arg(raw: &str) -> Result<Value>;
}

fn mismatch(raw: &str, expected: &str) -> DbError {
    DbError::InvalidArgument(format!("expected {expected}, got '{raw}'"))
}

impl ColumnType for i64 {
    fn parse_arg(raw: &str) -> Result<Value> {
        raw.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| mismatch(raw, "an integer"))
    }
}

impl ColumnType for f64 {
    fn parse_arg(raw: &str) -> Result<Value> {
        match raw.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Real(f)),
            _ => Err(mismatch(raw, "a number")),
        }
    }
}

impl ColumnType for bool {
    fn parse_arg(raw: &str) -> Result<Value> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Integer(1)),
            "false" | "0" => Ok(Value::Integer(0)),
            _ => Err(mismatch(raw, "a boolean")),
        }
    }
}

/// Text is bound exactly as given.
impl ColumnType for String {
    fn parse_arg(raw: &str) -> Result<Value> {
        Ok(Value::Text(raw.to_owned()))
    }
}

/// `null` (any case) is SQL NULL; anything else is parsed as `T`.
impl<T: ColumnType> ColumnType for Option<T> {
    fn parse_arg(raw: &str) -> Result<Value> {
        if raw.trim().eq_ignore_ascii_case("null") {
            Ok(Value::Null)
        } else {
            T::parse_arg(raw)
        }
    }
}

/// A single column of an entity table.
pub struct Column<E> {
    /// Column name as it appears in SQL.
    pub name: &'static str,
    /// Whether the store assigns this column (e.g. an auto-increment key).
    /// Generated columns are left out of INSERT statements.
    pub generated: bool,
    /// Reads the column's current value from an entity.
    pub value: fn(&E) -> Value,
    /// Parses text into a value of the column's type.
    pub parse: fn(&str) -> Result<Value>,
}

/// Table descriptor for an entity type.
pub struct Schema<E: 'static> {
    pub table: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column<E>],
}

impl<E: 'static> Schema<E> {
    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&'static Column<E>> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Columns written by INSERT, in declaration order.
    pub fn insertable(&self) -> impl Iterator<Item = &'static Column<E>> + '_ {
        self.columns.iter().filter(|c| !c.generated)
    }
}
