//! SQL rendering per backend.
//!
//! A [`Dialect`] turns a [`QuerySpec`] into statement text. The shared shape of every
//! statement lives in the provided methods of the trait; the two implementations only
//! supply identifier quoting, type names and the few clauses whose syntax differs.
//!
//! Literal values never reach the SQL text unescaped. Every renderer takes a [`Quote`],
//! which is the connection's own escaping primitive, or one of the pure escapers
//! ([`ServerQuote`], [`EmbeddedQuote`]) when no connection is involved.

pub mod embedded;
pub mod server;

use std::fmt::Write as _;

pub use embedded::{EmbeddedDialect, EmbeddedQuote};
pub use server::{ServerDialect, ServerQuote};
use sqldb_config::BackendKind;

use crate::{
    query::{
        clause::{ColumnDef, ColumnInfo, ColumnType, Condition, JoinSpec, Operator, Predicate},
        spec::QuerySpec,
    },
    row::Row,
    value::Value,
};

/// Escapes a value into a SQL literal, quotes included.
pub trait Quote {
    fn quote(&self, value: &Value) -> String;
}

/// Returns the dialect for `kind`. Dialects are stateless and shared.
pub fn dialect_for(kind: BackendKind) -> &'static dyn Dialect {
    match kind {
        BackendKind::Server => &ServerDialect,
        BackendKind::Embedded => &EmbeddedDialect,
    }
}

pub(crate) fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{b:02X}");
    }
    out.push('\'');
    out
}

pub trait Dialect: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Quotes a table name, each dotted segment separately.
    fn quote_table(&self, name: &str) -> String;

    /// Quotes a column used inside an expression (WHERE, ORDER BY, JOIN, ...).
    fn quote_column(&self, name: &str) -> String;

    /// Quotes a column in the field list of an INSERT or UPDATE.
    fn quote_field(&self, name: &str) -> String;

    /// Native type name for a logical column type.
    fn column_type(&self, column_type: &ColumnType) -> String;

    /// Rewrites raw column attributes for this backend.
    fn column_props(&self, properties: &str) -> String;

    /// Renders one join against `base`, leading space included.
    fn render_join(&self, base: &str, join: &JoinSpec) -> String;

    /// The restriction of an UPDATE or DELETE: predicates, ordering and limit.
    fn render_scope(&self, table: &str, spec: &QuerySpec, q: &dyn Quote) -> String;

    fn describe_sql(&self, table: &str) -> String;

    fn tables_sql(&self, database: &str, q: &dyn Quote) -> String;

    fn last_insert_id_sql(&self) -> &'static str;

    /// Normalizes one row of backend column metadata.
    fn column_info(&self, row: &Row, unisex: bool) -> ColumnInfo;

    fn create_database_sql(&self, _name: &str) -> Option<String> {
        None
    }

    fn drop_database_sql(&self, _name: &str) -> Option<String> {
        None
    }

    fn list_databases_sql(&self) -> Option<&'static str> {
        None
    }

    /// Entries of a SELECT list. `*` and expressions pass through untouched.
    fn select_list(&self, columns: &[&str]) -> String {
        if columns.is_empty() {
            return "*".to_string();
        }
        columns
            .iter()
            .map(|c| {
                if c.contains(['(', ' ', '*']) {
                    c.to_string()
                } else {
                    self.quote_column(c)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn render_condition(&self, condition: &Condition, q: &dyn Quote) -> String {
        let column = self.quote_column(&condition.column);
        match (&condition.value, condition.operator) {
            (Value::Null, Operator::Eq) => format!("{column} IS NULL"),
            (Value::Null, Operator::Ne) => format!("{column} IS NOT NULL"),
            (value, op) => format!("{column} {op} {}", q.quote(value)),
        }
    }

    fn render_where(&self, predicates: &[Predicate], q: &dyn Quote) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            let first = parts.is_empty();
            match predicate {
                Predicate::Raw(sql) => parts.push(sql.clone()),
                Predicate::Simple(condition) => {
                    let sql = self.render_condition(condition, q);
                    if first {
                        parts.push(sql);
                    } else {
                        parts.push(format!("{} {sql}", condition.connector));
                    }
                }
                Predicate::Group {
                    conditions,
                    connector,
                } => {
                    if conditions.is_empty() {
                        continue;
                    }
                    let inner = conditions
                        .iter()
                        .enumerate()
                        .map(|(k, c)| {
                            let sql = self.render_condition(c, q);
                            if k == 0 {
                                sql
                            } else {
                                format!("{} {sql}", c.connector)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(" ");
                    if first {
                        parts.push(format!("({inner})"));
                    } else {
                        parts.push(format!("{connector} ({inner})"));
                    }
                }
            }
        }

        if parts.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", parts.join(" "))
    }

    fn render_joins(&self, base: &str, joins: &[JoinSpec]) -> String {
        joins.iter().map(|j| self.render_join(base, j)).collect()
    }

    fn render_group_by(&self, columns: &[String]) -> String {
        if columns.is_empty() {
            return String::new();
        }
        let cols = columns
            .iter()
            .map(|c| self.quote_column(c))
            .collect::<Vec<_>>();
        format!(" GROUP BY {}", cols.join(", "))
    }

    fn render_order_by(&self, spec: &QuerySpec) -> String {
        if spec.order_by().is_empty() {
            return String::new();
        }
        let cols = spec
            .order_by()
            .iter()
            .map(|o| format!("{} {}", self.quote_column(&o.column), o.direction))
            .collect::<Vec<_>>();
        format!(" ORDER BY {}", cols.join(", "))
    }

    fn render_limit(&self, spec: &QuerySpec) -> String {
        spec.limit()
            .map(|l| format!(" LIMIT {l}"))
            .unwrap_or_default()
    }

    fn render_column_def(&self, column: &ColumnDef) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_column(&column.name),
            self.column_type(&column.column_type)
        );
        if let Some(props) = &column.properties {
            let props = self.column_props(props);
            if !props.is_empty() {
                sql.push(' ');
                sql.push_str(&props);
            }
        }
        sql
    }

    fn render_create_table(&self, table: &str, columns: &[ColumnDef]) -> String {
        let defs = columns
            .iter()
            .map(|c| self.render_column_def(c))
            .collect::<Vec<_>>();
        format!("CREATE TABLE {}({});", self.quote_table(table), defs.join(","))
    }

    fn render_select(&self, table: &str, columns: &[&str], spec: &QuerySpec, q: &dyn Quote) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.select_list(columns), self.quote_table(table));
        sql.push_str(&self.render_joins(table, spec.joins()));
        sql.push_str(&self.render_where(spec.predicates(), q));
        sql.push_str(&self.render_group_by(spec.group_by()));
        sql.push_str(&self.render_order_by(spec));
        sql.push_str(&self.render_limit(spec));
        sql.push(';');
        sql
    }

    fn render_count(&self, table: &str, spec: &QuerySpec, q: &dyn Quote) -> String {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.quote_table(table));
        sql.push_str(&self.render_joins(table, spec.joins()));
        sql.push_str(&self.render_where(spec.predicates(), q));
        sql.push_str(&self.render_order_by(spec));
        sql.push_str(&self.render_limit(spec));
        sql.push(';');
        sql
    }

    fn render_insert(&self, table: &str, row: &Row, q: &dyn Quote) -> String {
        let fields = row.keys().map(|k| self.quote_field(k)).collect::<Vec<_>>();
        let values = row.values().map(|v| q.quote(v)).collect::<Vec<_>>();
        format!(
            "INSERT INTO {}({}) VALUES ({})",
            self.quote_table(table),
            fields.join(","),
            values.join(",")
        )
    }

    fn render_update(&self, table: &str, row: &Row, spec: &QuerySpec, q: &dyn Quote) -> String {
        let set = row
            .iter()
            .map(|(k, v)| format!("{}={}", self.quote_field(k), q.quote(v)))
            .collect::<Vec<_>>();
        format!(
            "UPDATE {} SET {}{};",
            self.quote_table(table),
            set.join(","),
            self.render_scope(table, spec, q)
        )
    }

    fn render_delete(&self, table: &str, spec: &QuerySpec, q: &dyn Quote) -> String {
        format!(
            "DELETE FROM {}{};",
            self.quote_table(table),
            self.render_scope(table, spec, q)
        )
    }

    fn render_drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {};", self.quote_table(table))
    }

    /// Highest value of `column`, read by the caller to compute the next id.
    fn render_next_id(&self, table: &str, column: &str) -> String {
        let column = self.quote_column(column);
        format!(
            "SELECT {column} FROM {} ORDER BY {column} DESC LIMIT 1",
            self.quote_table(table)
        )
    }
}

/// Maps a native type name onto the logical type names used by [`ColumnType`].
pub(crate) fn unisex_type(native: &str, float_markers: &[&str]) -> Option<&'static str> {
    let lower = native.to_ascii_lowercase();
    if lower.contains("int") {
        Some("INTEGER")
    } else if lower.contains("char") {
        Some("STRING")
    } else if lower.contains("text") {
        Some("TEXT")
    } else if float_markers.iter().any(|m| lower.contains(m)) {
        Some("FLOAT")
    } else if lower.contains("blob") {
        Some("BLOB")
    } else {
        None
    }
}
