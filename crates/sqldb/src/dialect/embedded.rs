//! SQLite flavoured rendering.
//!
//! Table names and INSERT/UPDATE field lists are single-quoted, columns inside
//! expressions stay bare. SQLite has no `ORDER BY`/`LIMIT` on UPDATE and DELETE in its
//! default build, so a restricted scope is expressed through a `rowid` subquery.

use std::sync::LazyLock;

use regex::Regex;
use sqldb_config::BackendKind;

use super::{hex_literal, unisex_type, Dialect, Quote};
use crate::{
    query::{
        clause::{ColumnInfo, ColumnType, JoinSpec},
        spec::QuerySpec,
    },
    row::Row,
    value::Value,
};

static AUTOINCREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAUTO_?INCREMENT\b").expect("unable to compile autoincrement regex")
});

/// Escapes by doubling single quotes, as `sqlite3_mprintf("%Q")` does.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedQuote;

impl Quote for EmbeddedQuote {
    fn quote(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Blob(bytes) => hex_literal(bytes),
            Value::Integer(i) => format!("'{i}'"),
            Value::Float(f) => format!("'{f}'"),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

fn single_quote(name: &str) -> String {
    name.split('.')
        .map(|segment| format!("'{}'", segment.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedDialect;

impl Dialect for EmbeddedDialect {
    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    fn quote_table(&self, name: &str) -> String {
        single_quote(name)
    }

    fn quote_column(&self, name: &str) -> String {
        name.to_string()
    }

    fn quote_field(&self, name: &str) -> String {
        format!("'{}'", name.replace('\'', "''"))
    }

    fn column_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::Float => "REAL".into(),
            ColumnType::Blob => "BLOB".into(),
            ColumnType::String | ColumnType::Text | ColumnType::Date | ColumnType::DateTime => {
                "TEXT".into()
            }
            ColumnType::Raw(raw) => raw.clone(),
        }
    }

    fn column_props(&self, properties: &str) -> String {
        AUTOINCREMENT_RE
            .replace_all(properties, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_join(&self, base: &str, join: &JoinSpec) -> String {
        let mut sql = format!(" {}JOIN {}", join.kind.keyword(), single_quote(&join.table));
        if let Some(alias) = &join.alias {
            sql.push_str(&format!(" AS {}", single_quote(alias)));
        }
        sql.push_str(&format!(
            " ON {base}.{}={}.{}",
            join.left,
            join.reference(),
            join.right
        ));
        sql
    }

    fn render_scope(&self, table: &str, spec: &QuerySpec, q: &dyn Quote) -> String {
        let filter = self.render_where(spec.predicates(), q);
        if spec.order_by().is_empty() && spec.limit().is_none() {
            return filter;
        }
        format!(
            " WHERE rowid IN (SELECT rowid FROM {}{filter}{}{})",
            single_quote(table),
            self.render_order_by(spec),
            self.render_limit(spec)
        )
    }

    fn describe_sql(&self, table: &str) -> String {
        format!("PRAGMA table_info({});", single_quote(table))
    }

    fn tables_sql(&self, _database: &str, _q: &dyn Quote) -> String {
        "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name ASC;".to_string()
    }

    fn last_insert_id_sql(&self) -> &'static str {
        "SELECT last_insert_rowid();"
    }

    fn column_info(&self, row: &Row, unisex: bool) -> ColumnInfo {
        let native = row
            .get("type")
            .and_then(Value::to_text)
            .unwrap_or_default();
        let column_type = if unisex {
            unisex_type(&native, &["real", "floa", "doub"])
                .map(str::to_string)
                .unwrap_or(native)
        } else {
            native
        };

        let not_null = row.get_i64("notnull").unwrap_or(0) == 1;
        let pk = row.get_i64("pk").unwrap_or(0) >= 1;

        let mut props = Vec::new();
        if not_null {
            props.push("NOT NULL");
        }
        if pk {
            props.push("PRIMARY KEY");
            if column_type.eq_ignore_ascii_case("INTEGER") {
                props.push("AUTOINCREMENT");
            }
        }

        ColumnInfo {
            name: row.get("name").and_then(Value::to_text).unwrap_or_default(),
            column_type,
            properties: props.join(" "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::clause::{
        ColumnDef, Condition, Connector, JoinKind, Limit, OrderClause, Predicate, SortDirection,
    };

    fn eq(column: &str, value: impl Into<Value>, connector: Connector) -> Predicate {
        Predicate::Simple(Condition::new(column, "=", value, connector).unwrap())
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(EmbeddedQuote.quote(&"O'Brien".into()), "'O''Brien'");
        assert_eq!(EmbeddedQuote.quote(&Value::Float(1.5)), "'1.5'");
        assert_eq!(EmbeddedQuote.quote(&Value::Null), "NULL");
    }

    #[test]
    fn test_create_table_strips_autoincrement() {
        let columns = vec![ColumnDef::new("Id", "INTEGER")];
        assert_eq!(
            EmbeddedDialect.render_create_table("t", &columns),
            "CREATE TABLE 't'(Id INTEGER);"
        );

        let columns = vec![
            ColumnDef::new("Id", "INTEGER").with_properties("NOT NULL PRIMARY KEY AUTO_INCREMENT"),
            ColumnDef::new("Name", "STRING"),
            ColumnDef::new("At", "datetime"),
            ColumnDef::new("Score", "float"),
        ];
        assert_eq!(
            EmbeddedDialect.render_create_table("t", &columns),
            "CREATE TABLE 't'(Id INTEGER NOT NULL PRIMARY KEY,Name TEXT,At TEXT,Score REAL);"
        );
    }

    #[test]
    fn test_insert_delete_select() {
        let row: Row = [("FirstName", "John"), ("LastName", "Doe")]
            .into_iter()
            .collect();
        assert_eq!(
            EmbeddedDialect.render_insert("tests", &row, &EmbeddedQuote),
            "INSERT INTO 'tests'('FirstName','LastName') VALUES ('John','Doe')"
        );

        let spec = QuerySpec {
            predicates: vec![eq("Id", 1, Connector::And)],
            ..Default::default()
        };
        assert_eq!(
            EmbeddedDialect.render_delete("tests", &spec, &EmbeddedQuote),
            "DELETE FROM 'tests' WHERE Id = '1';"
        );

        let spec = QuerySpec {
            predicates: vec![
                eq("FirstName", "Ben", Connector::And),
                eq("FirstName", "Sean", Connector::Or),
            ],
            ..Default::default()
        };
        assert_eq!(
            EmbeddedDialect.render_select("tests", &[], &spec, &EmbeddedQuote),
            "SELECT * FROM 'tests' WHERE FirstName = 'Ben' OR FirstName = 'Sean';"
        );
    }

    #[test]
    fn test_limited_update_uses_rowid() {
        let row: Row = [("a", 1)].into_iter().collect();
        let spec = QuerySpec {
            predicates: vec![eq("b", 2, Connector::And)],
            order_by: vec![OrderClause {
                column: "c".into(),
                direction: SortDirection::Desc,
            }],
            limit: Some(Limit::Count(1)),
            ..Default::default()
        };
        assert_eq!(
            EmbeddedDialect.render_update("t", &row, &spec, &EmbeddedQuote),
            "UPDATE 't' SET 'a'='1' WHERE rowid IN (SELECT rowid FROM 't' WHERE b = '2' ORDER BY c DESC LIMIT 1);"
        );
    }

    #[test]
    fn test_join_always_uses_on() {
        let join = JoinSpec {
            table: "orders".into(),
            left: "user_id".into(),
            right: "user_id".into(),
            kind: JoinKind::Inner,
            alias: Some("o".into()),
        };
        assert_eq!(
            EmbeddedDialect.render_join("users", &join),
            " INNER JOIN 'orders' AS 'o' ON users.user_id=o.user_id"
        );
    }

    #[test]
    fn test_statements() {
        assert_eq!(EmbeddedDialect.render_drop_table("t"), "DROP TABLE 't';");
        assert_eq!(
            EmbeddedDialect.render_next_id("tests", "Id"),
            "SELECT Id FROM 'tests' ORDER BY Id DESC LIMIT 1"
        );
        assert!(EmbeddedDialect.create_database_sql("x").is_none());
    }

    #[test]
    fn test_column_info() {
        let row: Row = [
            ("cid", Value::Integer(0)),
            ("name", Value::from("Id")),
            ("type", Value::from("INTEGER")),
            ("notnull", Value::Integer(1)),
            ("dflt_value", Value::Null),
            ("pk", Value::Integer(1)),
        ]
        .into_iter()
        .collect();

        let info = EmbeddedDialect.column_info(&row, true);
        assert_eq!(info.name, "Id");
        assert_eq!(info.column_type, "INTEGER");
        assert_eq!(info.properties, "NOT NULL PRIMARY KEY AUTOINCREMENT");

        let row: Row = [
            ("name", Value::from("Score")),
            ("type", Value::from("REAL")),
            ("notnull", Value::Integer(0)),
            ("pk", Value::Integer(0)),
        ]
        .into_iter()
        .collect();
        let info = EmbeddedDialect.column_info(&row, true);
        assert_eq!(info.column_type, "FLOAT");
        assert_eq!(info.properties, "");
    }
}
