//! Error types for sqldb.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for every query building and execution failure.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(sqldb::connection),
        help("Check the host, credentials and that the database is reachable")
    )]
    Connection(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(
        code(sqldb::query),
        help("Inspect the statement with `last_sql()` or run with -vv")
    )]
    Query(String),

    #[error("Remote execution failed: {0}")]
    #[diagnostic(
        code(sqldb::remote),
        help("Check the remote endpoint URL and API key")
    )]
    Remote(String),

    #[error("No table selected for `{0}`")]
    #[diagnostic(
        code(sqldb::missing_table),
        help("Start the query with `db.table(name)`")
    )]
    MissingTable(&'static str),

    #[error("Unsupported operator: {0}")]
    #[diagnostic(
        code(sqldb::unsupported_operator),
        help("Use one of = == === != !== <> < <= > >= LIKE NOT LIKE")
    )]
    UnsupportedOperator(String),

    #[error("Row has no values")]
    #[diagnostic(
        code(sqldb::empty_row),
        help("Provide at least one column and value")
    )]
    EmptyRow,

    #[error("No columns staged for table `{0}`")]
    #[diagnostic(
        code(sqldb::no_columns),
        help("Add columns with `.column(name, type)` before `create()`")
    )]
    NoColumns(String),

    #[error("Column `{0}` declared before a table was selected")]
    #[diagnostic(
        code(sqldb::column_without_table),
        help("Call `.table(name)` before `.column(..)`")
    )]
    ColumnWithoutTable(String),

    #[error("Expected {expected} key value(s), got {given}")]
    #[diagnostic(
        code(sqldb::missing_keys),
        help("Pass one value per key column of the model")
    )]
    MissingKeys { expected: usize, given: usize },

    #[error("Unknown field: {0}")]
    #[diagnostic(code(sqldb::unknown_field))]
    UnknownField(String),

    #[error("Database name is not configured")]
    #[diagnostic(
        code(sqldb::missing_database_name),
        help("Set `name` in the connection profile")
    )]
    MissingDatabaseName,

    #[error("Invalid DSN: {0}")]
    #[diagnostic(
        code(sqldb::invalid_dsn),
        help("Use `sqlite:<path>`, `sqlite::memory:` or `mysql:dbname=<name>;host=<host>`")
    )]
    InvalidDsn(String),

    #[error("Backend not available: {0}")]
    #[diagnostic(
        code(sqldb::backend_unavailable),
        help("Rebuild with the `mysql` feature enabled")
    )]
    BackendUnavailable(String),

    #[error("Unsupported operation: {0}")]
    #[diagnostic(code(sqldb::unsupported))]
    Unsupported(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(sqldb::io), help("Check file permissions and disk space"))]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(message)) => DbError::Query(message),
            other => DbError::Query(other.to_string()),
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => DbError::Query(db.message().to_string()),
            e @ (sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::Configuration(_)) => DbError::Connection(e.to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

/// Result type alias for sqldb operations.
pub type Result<T> = std::result::Result<T, DbError>;
