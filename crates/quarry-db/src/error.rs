//! Error types for quarry-db.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for builder validation and statement execution.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(quarry_db::invalid_argument),
        help("Check the fields, filter, ordering and pagination passed to the repository")
    )]
    InvalidArgument(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(
        code(quarry_db::query),
        help("The statement was rejected by the database; inspect the rendered SQL with -vv")
    )]
    QueryError(#[from] rusqlite::Error),

    #[error("{0} not found")]
    #[diagnostic(
        code(quarry_db::not_found),
        help("No row matched the filter; use `list` to inspect matching rows")
    )]
    NotFound(String),

    #[error("Operation cancelled")]
    #[diagnostic(code(quarry_db::cancelled))]
    Cancelled,

    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(quarry_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Unexpected result from the database: {0}")]
    #[diagnostic(code(quarry_db::unexpected_result))]
    UnexpectedResult(String),
}

impl DbError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DbError::InvalidArgument(msg.into())
    }

    /// Returns true when the error is [`DbError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}

/// Result type alias for quarry-db operations.
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DbError::NotFound("products".into());
        assert_eq!(err.to_string(), "products not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_query_error_keeps_source() {
        let err: DbError = rusqlite::Error::InvalidColumnName("nope".into()).into();
        assert!(matches!(err, DbError::QueryError(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_not_found());
    }
}
