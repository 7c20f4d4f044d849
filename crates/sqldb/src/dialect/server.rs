//! MySQL flavoured rendering: backtick identifiers, native types, `AUTO_INCREMENT`.

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
    Regex::new(r"(?i)\bAUTOINCREMENT\b").expect("unable to compile autoincrement regex")
});

/// Escapes the way `mysql_real_escape_string` does.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerQuote;

impl Quote for ServerQuote {
    fn quote(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Blob(bytes) => hex_literal(bytes),
            Value::Integer(i) => format!("'{i}'"),
            Value::Float(f) => format!("'{f}'"),
            Value::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('\'');
                for c in s.chars() {
                    match c {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x1a' => out.push_str("\\Z"),
                        c => out.push(c),
                    }
                }
                out.push('\'');
                out
            }
        }
    }
}

fn backtick(segment: &str) -> String {
    if segment == "*" {
        return segment.to_string();
    }
    format!("`{}`", segment.replace('`', "``"))
}

fn backtick_path(name: &str) -> String {
    name.split('.').map(backtick).collect::<Vec<_>>().join(".")
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ServerDialect;

impl Dialect for ServerDialect {
    fn kind(&self) -> BackendKind {
        BackendKind::Server
    }

    fn quote_table(&self, name: &str) -> String {
        backtick_path(name)
    }

    fn quote_column(&self, name: &str) -> String {
        backtick_path(name)
    }

    fn quote_field(&self, name: &str) -> String {
        backtick(name)
    }

    fn column_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer => "BIGINT".into(),
            ColumnType::String => "VARCHAR(255)".into(),
            ColumnType::Float => "DOUBLE".into(),
            ColumnType::Text => "LONGTEXT".into(),
            ColumnType::Blob => "LONGBLOB".into(),
            ColumnType::Date => "DATE".into(),
            ColumnType::DateTime => "DATETIME".into(),
            ColumnType::Raw(raw) => raw.clone(),
        }
    }

    fn column_props(&self, properties: &str) -> String {
        AUTOINCREMENT_RE
            .replace_all(properties.trim(), "AUTO_INCREMENT")
            .into_owned()
    }

    fn render_join(&self, base: &str, join: &JoinSpec) -> String {
        let mut sql = format!(" {}JOIN {}", join.kind.keyword(), backtick_path(&join.table));
        if let Some(alias) = &join.alias {
            sql.push_str(&format!(" AS {}", backtick(alias)));
        }
        if join.left == join.right {
            sql.push_str(&format!(" USING ({})", backtick(&join.left)));
        } else {
            sql.push_str(&format!(
                " ON {}.{}={}.{}",
                backtick_path(base),
                backtick(&join.left),
                backtick_path(join.reference()),
                backtick(&join.right)
            ));
        }
        sql
    }

    fn render_scope(&self, _table: &str, spec: &QuerySpec, q: &dyn Quote) -> String {
        let mut sql = self.render_where(spec.predicates(), q);
        sql.push_str(&self.render_order_by(spec));
        sql.push_str(&self.render_limit(spec));
        sql
    }

    fn describe_sql(&self, table: &str) -> String {
        format!("DESCRIBE {}", backtick_path(table))
    }

    fn tables_sql(&self, database: &str, q: &dyn Quote) -> String {
        format!(
            "SELECT TABLE_NAME FROM information_schema.TABLES WHERE TABLE_TYPE='BASE TABLE' AND TABLE_SCHEMA={};",
            q.quote(&Value::from(database))
        )
    }

    fn last_insert_id_sql(&self) -> &'static str {
        "SELECT LAST_INSERT_ID();"
    }

    fn column_info(&self, row: &Row, unisex: bool) -> ColumnInfo {
        let field = |name: &str| {
            row.get(name)
                .and_then(Value::to_text)
                .unwrap_or_default()
        };

        let native = field("Type");
        let column_type = if unisex {
            unisex_type(&native, &["float", "double", "real"])
                .map(str::to_string)
                .unwrap_or(native)
        } else {
            native
        };

        let null = field("Null").to_ascii_lowercase();
        let key = field("Key").to_ascii_lowercase();
        let auto = field("Extra").to_ascii_lowercase().contains("auto");

        let mut props = Vec::new();
        if null.contains("no") {
            props.push("NOT NULL");
        }
        if key.contains("pri") || (key.contains("uni") && auto) {
            props.push("PRIMARY KEY");
        } else if key.contains("uni") {
            props.push("UNIQUE");
        }
        if auto {
            props.push("AUTO_INCREMENT");
        }

        ColumnInfo {
            name: field("Field"),
            column_type,
            properties: props.join(" "),
        }
    }

    fn create_database_sql(&self, name: &str) -> Option<String> {
        Some(format!("CREATE DATABASE {};", backtick(name)))
    }

    fn drop_database_sql(&self, name: &str) -> Option<String> {
        Some(format!("DROP DATABASE {};", backtick(name)))
    }

    fn list_databases_sql(&self) -> Option<&'static str> {
        Some("SHOW DATABASES;")
    }
}
