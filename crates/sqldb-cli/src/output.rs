use nu_ansi_term::Color::{Cyan, DarkGray, Green};
use serde::Serialize;
use sqldb::{ColumnInfo, Row, Value};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::{error::CliResult, utils::Colored};

fn cell(value: &Value) -> String {
    match value {
        Value::Null => format!("{}", Colored(DarkGray, "NULL")),
        Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        other => other.to_string(),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints rows as a table titled `title`, or as a JSON array.
pub fn print_rows(title: &str, rows: &[Row], json: bool) -> CliResult<()> {
    if json {
        return print_json(rows);
    }

    let Some(first) = rows.first() else {
        info!("{}", Colored(DarkGray, "(no rows)"));
        return Ok(());
    };

    let mut builder = Builder::new();
    builder.push_record(first.keys().map(|k| format!("{}", Colored(Cyan, k))));
    for row in rows {
        builder.push_record(row.values().map(cell));
    }

    let table = builder
        .build()
        .with(Panel::header(format!("{title} ({} rows)", rows.len())))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    Ok(())
}

pub fn print_columns(table: &str, columns: &[ColumnInfo], json: bool) -> CliResult<()> {
    if json {
        return print_json(columns);
    }

    let mut builder = Builder::new();
    builder.push_record(["Name", "Type", "Properties"].map(|h| format!("{}", Colored(Cyan, h))));
    for column in columns {
        builder.push_record([
            format!("{}", Colored(Green, &column.name)),
            column.column_type.clone(),
            column.properties.clone(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(table))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    Ok(())
}

pub fn print_list(title: &str, items: &[String], json: bool) -> CliResult<()> {
    if json {
        return print_json(items);
    }

    let mut builder = Builder::new();
    for item in items {
        builder.push_record([item.as_str()]);
    }

    let table = builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    Ok(())
}
