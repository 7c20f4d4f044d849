use sqldb::Database;

use crate::{
    error::CliResult,
    output::{print_columns, print_list},
};

pub fn list_tables(db: &mut Database, json: bool) -> CliResult<()> {
    let tables = db.builder().tables()?;
    let title = match db.config().name.as_str() {
        "" => "Tables".to_string(),
        name => format!("Tables in {name}"),
    };
    print_list(&title, &tables, json)
}

pub fn list_columns(db: &mut Database, table: &str, unisex: bool, json: bool) -> CliResult<()> {
    let columns = db.table(table).columns(unisex)?;
    print_columns(table, &columns, json)
}
