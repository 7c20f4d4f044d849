use nu_ansi_term::Color::{Green, Red};
use sqldb::{Connector, Database, QueryBuilder, Value};
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    output::{print_json, print_rows},
    utils::Colored,
};

/// A `column operator value` filter given on the command line.
#[derive(Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub operator: String,
    pub value: Value,
}

/// Parses `Name = Ben`, `Age >= 18` or `Name NOT LIKE B%`. The bare word `NULL` is
/// the null value.
pub fn parse_filter(input: &str) -> CliResult<Filter> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let invalid = || CliError::InvalidFilter(input.to_string());

    let (operator, rest) = match tokens.as_slice() {
        [_, not, like, rest @ ..]
            if not.eq_ignore_ascii_case("not") && like.eq_ignore_ascii_case("like") =>
        {
            ("NOT LIKE".to_string(), rest)
        }
        [_, op, rest @ ..] => (op.to_string(), rest),
        _ => return Err(invalid()),
    };

    if rest.is_empty() {
        return Err(invalid());
    }

    let value = rest.join(" ");
    let value = if value.eq_ignore_ascii_case("null") {
        Value::Null
    } else {
        Value::Text(value)
    };

    Ok(Filter {
        column: tokens[0].to_string(),
        operator,
        value,
    })
}

fn apply_filters<'a>(
    builder: QueryBuilder<'a>,
    filters: &[String],
    or: bool,
) -> CliResult<QueryBuilder<'a>> {
    let connector = if or { Connector::Or } else { Connector::And };
    filters.iter().try_fold(builder, |b, raw| {
        let filter = parse_filter(raw)?;
        debug!("filter {} {} {}", filter.column, filter.operator, filter.value);
        Ok(b.filter_with(filter.column, &filter.operator, filter.value, connector))
    })
}

pub struct SelectOptions {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<String>,
    pub or: bool,
    pub order: Option<String>,
    pub desc: bool,
    pub limit: Option<u64>,
    pub sql: bool,
}

pub fn select(db: &mut Database, options: SelectOptions, json: bool) -> CliResult<()> {
    let mut builder = apply_filters(db.table(&options.table), &options.filters, options.or)?;
    if let Some(order) = &options.order {
        builder = builder.order_by(order, options.desc);
    }
    if let Some(limit) = options.limit {
        builder = builder.limit(limit);
    }

    let columns: Vec<&str> = options.columns.iter().map(String::as_str).collect();

    if options.sql {
        let sql = builder.sql().select(&columns)?;
        info!("{sql}");
        return Ok(());
    }

    let rows = builder.select(&columns)?;
    print_rows(&options.table, &rows, json)
}

pub fn count(
    db: &mut Database,
    table: &str,
    filters: &[String],
    or: bool,
    json: bool,
) -> CliResult<()> {
    let count = apply_filters(db.table(table), filters, or)?.num_rows()?;
    if json {
        return print_json(&count);
    }
    info!("{}", Colored(Green, count));
    Ok(())
}

pub fn query(db: &mut Database, sql: &str, json: bool) -> CliResult<()> {
    let rows = db.query(sql)?;
    print_rows("Result", &rows, json)
}

pub fn exec(db: &mut Database, sql: &str, json: bool) -> CliResult<()> {
    let affected = db.execute(sql)?;
    if json {
        return print_json(&affected);
    }
    info!("{} row(s) affected", Colored(Green, affected));
    Ok(())
}

pub fn exists(db: &mut Database, table: Option<&str>, json: bool) -> CliResult<()> {
    let (subject, found) = match table {
        Some(table) => (format!("Table `{table}`"), db.table(table).exists()?),
        None => (
            format!("Database `{}`", db.config().name),
            db.builder().exists()?,
        ),
    };

    if json {
        return print_json(&found);
    }
    if found {
        info!("{subject} {}", Colored(Green, "exists"));
    } else {
        info!("{subject} {}", Colored(Red, "does not exist"));
    }
    Ok(())
}
