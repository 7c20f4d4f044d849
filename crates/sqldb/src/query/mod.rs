//! The query builder.
//!
//! A [`QueryBuilder`] borrows a [`crate::Database`], collects clauses through chained
//! setters and is consumed by exactly one terminal verb. The accumulated clauses never
//! outlive that verb, so every statement starts from an empty [`QuerySpec`].
//!
//! ```
//! use sqldb::{Connector, Database};
//!
//! let mut db = Database::in_memory().unwrap();
//! let sql = db
//!     .table("users")
//!     .filter("a", "=", "1")
//!     .filter_group([("b", "=", "2"), ("c", "=", "3")], Connector::Or)
//!     .sql()
//!     .select(&[])
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT * FROM 'users' WHERE a = '1' OR (b = '2' AND c = '3');");
//! ```
//!
//! # Submodules
//!
//! - [`clause`]: clause building blocks (predicates, joins, ordering, column definitions)
//! - [`spec`]: the frozen [`QuerySpec`]
//! - [`builder`]: chainable setters
//! - [`exec`]: terminal verbs that run against the database
//! - [`preview`]: the same verbs returning SQL text instead

pub mod builder;
pub mod clause;
pub mod exec;
pub mod preview;
pub mod spec;

pub use builder::QueryBuilder;
pub use clause::{
    ColumnDef, ColumnInfo, ColumnType, Condition, Connector, GroupEntry, JoinKind, JoinSpec,
    Limit, Operator, OrderClause, Predicate, SortDirection,
};
pub use preview::SqlPreview;
pub use spec::QuerySpec;
