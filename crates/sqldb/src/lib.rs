//! A database agnostic query builder.
//!
//! One chainable API renders SQL for a MySQL server or an embedded SQLite file and runs
//! it through a native driver or a remote HTTP endpoint.

pub mod connection;
pub mod database;
pub mod dialect;
pub mod dsn;
pub mod entity;
pub mod error;
pub mod macros;
pub mod query;
pub mod row;
pub mod value;

#[cfg(test)]
mod test_utils;

pub use database::Database;
pub use dialect::{Dialect, Quote};
pub use dsn::Dsn;
pub use entity::{Model, Record};
pub use error::{DbError, Result};
pub use query::{
    ColumnDef, ColumnInfo, ColumnType, Connector, JoinKind, QueryBuilder, QuerySpec,
    SortDirection, SqlPreview,
};
pub use row::Row;
pub use sqldb_config::{BackendKind, DatabaseConfig, Transport};
pub use value::Value;
