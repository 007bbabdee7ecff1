//! Error types for querist-db.

use miette::Diagnostic;
use querist_config::error::ConfigError;
use thiserror::Error;

/// Error type for statement registration, binding and execution.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Prepared statement name taken: {0}")]
    #[diagnostic(
        code(querist_db::duplicate_statement),
        help("Use a different name or reuse the statement already registered")
    )]
    DuplicateStatement(String),

    #[error("Prepared statement not found: {0}")]
    #[diagnostic(
        code(querist_db::statement_not_found),
        help("Register the statement with `prepare_named` before binding it")
    )]
    StatementNotFound(String),

    #[error("Missing named parameters: {}", .0.join(", "))]
    #[diagnostic(
        code(querist_db::missing_parameters),
        help("Supply a value for every parameter the statement declares")
    )]
    MissingParameters(Vec<String>),

    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(querist_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(code(querist_db::query))]
    QueryError(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::NotADatabase
                ) =>
            {
                DbError::ConnectionError(err.to_string())
            }
            _ => DbError::QueryError(err.to_string()),
        }
    }
}

/// Result type alias for querist-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
