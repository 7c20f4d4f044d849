//! Driver adapters.
//!
//! A [`Connection`] executes SQL text and hands back rows. Three adapters exist:
//!
//! - [`SqliteConnection`]: the embedded backend through rusqlite
//! - `MySqlConnection`: the server backend through sqlx, behind the `mysql` feature
//! - [`RemoteConnection`]: SQL posted to an HTTP endpoint answering with JSON

#[cfg(feature = "mysql")]
pub mod mysql;
pub mod remote;
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MySqlConnection;
pub use remote::RemoteConnection;
use sqldb_config::{BackendKind, DatabaseConfig};
pub use sqlite::SqliteConnection;

use crate::{dialect::Quote, error::Result, row::Row};

/// A live (or lazily opened) handle to one database.
///
/// `open` is idempotent. `execute` and `query` expect an open connection; the
/// [`crate::Database`] wrapper opens it on first use.
pub trait Connection: Quote + Send {
    fn open(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Runs a statement that returns no rows and reports the affected row count.
    fn execute(&mut self, sql: &str) -> Result<u64>;

    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// The id generated by the last insert, when the driver tracks it natively.
    ///
    /// `None` means the caller has to ask the backend with a query.
    fn last_insert_id(&mut self) -> Result<Option<i64>>;
}

/// Builds the adapter matching the transport and backend of `config`.
pub fn connect(config: &DatabaseConfig) -> Result<Box<dyn Connection>> {
    if config.is_remote() {
        return Ok(Box::new(RemoteConnection::new(config)));
    }

    match config.backend {
        BackendKind::Embedded => Ok(Box::new(SqliteConnection::new(config))),
        #[cfg(feature = "mysql")]
        BackendKind::Server => Ok(Box::new(MySqlConnection::new(config))),
        #[cfg(not(feature = "mysql"))]
        BackendKind::Server => Err(crate::error::DbError::BackendUnavailable(
            "server backend requires the `mysql` feature".into(),
        )),
    }
}
