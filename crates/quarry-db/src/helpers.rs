use rusqlite::{
    types::{FromSql, Value},
    Row,
};

/// Reads `column` from `row`, falling back to `T::default()` when the column
/// was not part of the projection.
pub fn get_or_default<T: FromSql + Default>(row: &Row, column: &str) -> rusqlite::Result<T> {
    match row.get(column) {
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(T::default()),
        other => other,
    }
}

/// Converts a bound SQLite value into JSON. Blobs become arrays of bytes.
pub fn to_json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => (*i).into(),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => s.clone().into(),
        Value::Blob(b) => b.clone().into(),
    }
}

/// Renders a SQLite value for plain-text display.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
