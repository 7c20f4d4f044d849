//! Terminal verbs: render the collected clauses, run the statement, hand back the result.

use tracing::debug;

use crate::{
    error::{DbError, Result},
    query::{
        builder::QueryBuilder,
        clause::{ColumnDef, ColumnInfo},
    },
    row::Row,
    value::Value,
};

fn collect_row<I, K, V>(row: I) -> Result<Row>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let row: Row = row.into_iter().collect();
    if row.is_empty() {
        return Err(DbError::EmptyRow);
    }
    Ok(row)
}

impl QueryBuilder<'_> {
    /// Runs a SELECT. An empty `columns` slice selects `*`.
    pub fn select(self, columns: &[&str]) -> Result<Vec<Row>> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("select")?;
        let sql = db.dialect().render_select(table, columns, &spec, &*db);
        db.query(&sql)
    }

    /// Runs the SELECT limited to one row; `None` when nothing matched.
    pub fn select_one(self, columns: &[&str]) -> Result<Option<Row>> {
        let rows = self.limit(1).select(columns)?;
        Ok(rows.into_iter().next())
    }

    /// Values of a single column across the matching rows.
    pub fn select_column(self, column: &str) -> Result<Vec<Value>> {
        let rows = self.select(&[column])?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().next().map(|(_, v)| v).unwrap_or_default())
            .collect())
    }

    /// Inserts one row and returns the affected row count.
    pub fn insert<I, K, V>(self, row: I) -> Result<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("insert")?;
        let row = collect_row(row)?;
        let sql = db.dialect().render_insert(table, &row, &*db);
        db.execute(&sql)
    }

    /// Updates the rows matched by the collected predicates, ordering and limit.
    pub fn update<I, K, V>(self, row: I) -> Result<u64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("update")?;
        let row = collect_row(row)?;
        let sql = db.dialect().render_update(table, &row, &spec, &*db);
        db.execute(&sql)
    }

    pub fn delete(self) -> Result<u64> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("delete")?;
        let sql = db.dialect().render_delete(table, &spec, &*db);
        db.execute(&sql)
    }

    /// Creates the table from the staged columns or, with no table selected, the
    /// database itself.
    pub fn create(self) -> Result<()> {
        let (db, spec) = self.finish()?;
        let Some(table) = spec.table() else {
            return db.create_database();
        };

        let columns = spec.columns_for(table);
        if columns.is_empty() {
            return Err(DbError::NoColumns(table.to_string()));
        }
        let sql = db.dialect().render_create_table(table, columns);
        db.execute(&sql).map(|_| ())
    }

    /// Creates the table from `columns`, ignoring any staged ones.
    pub fn create_with(self, columns: &[ColumnDef]) -> Result<()> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("create")?;
        if columns.is_empty() {
            return Err(DbError::NoColumns(table.to_string()));
        }
        let sql = db.dialect().render_create_table(table, columns);
        db.execute(&sql).map(|_| ())
    }

    /// Drops the table or, with no table selected, the database.
    pub fn drop(self) -> Result<()> {
        let (db, spec) = self.finish()?;
        match spec.table() {
            Some(table) => {
                let sql = db.dialect().render_drop_table(table);
                db.execute(&sql).map(|_| ())
            }
            None => db.drop_database(),
        }
    }

    /// Whether the table (case-insensitive) or, with no table selected, the database
    /// exists.
    pub fn exists(self) -> Result<bool> {
        let (db, spec) = self.finish()?;
        match spec.table() {
            Some(table) => {
                let found = db
                    .list_tables()?
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(table));
                debug!("table `{table}` exists: {found}");
                Ok(found)
            }
            None => db.database_exists(),
        }
    }

    /// Column metadata of the table. With `unisex` the native types are mapped back
    /// onto the logical type names.
    pub fn columns(self, unisex: bool) -> Result<Vec<ColumnInfo>> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("columns")?;
        let dialect = db.dialect();
        let rows = db.query(&dialect.describe_sql(table))?;
        Ok(rows
            .iter()
            .map(|row| dialect.column_info(row, unisex))
            .collect())
    }

    pub fn tables(self) -> Result<Vec<String>> {
        let (db, _) = self.finish()?;
        db.list_tables()
    }

    /// `COUNT(*)` over the collected joins, predicates, ordering and limit.
    pub fn num_rows(self) -> Result<u64> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("num_rows")?;
        let sql = db.dialect().render_count(table, &spec, &*db);
        let rows = db.query(&sql)?;
        let count = rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    /// `max(column) + 1`, or `1` for an empty table.
    pub fn next_id(self, column: &str) -> Result<i64> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("next_id")?;
        let sql = db.dialect().render_next_id(table, column);
        let rows = db.query(&sql)?;
        let last = rows
            .first()
            .and_then(|row| row.get(column).or_else(|| row.values().next()))
            .and_then(Value::as_i64);
        Ok(last.map_or(1, |id| id + 1))
    }

    pub fn last_insert_id(self) -> Result<Option<i64>> {
        let (db, _) = self.finish()?;
        db.last_insert_id()
    }

    /// Like [`QueryBuilder::select`], restricted to the first `count` rows after `offset`.
    pub fn page(self, offset: u64, count: u64) -> Result<Vec<Row>> {
        let builder = match count {
            0 => self,
            _ if offset == 0 => self.limit(count),
            _ => self.limit_offset(offset, count),
        };
        builder.select(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::clause::Connector,
        row::Row,
        test_utils::server_database,
        Database,
    };

    fn tests_table(db: &mut Database) {
        db.table("tests")
            .column_props("Id", "INTEGER", "NOT NULL PRIMARY KEY AUTOINCREMENT")
            .column("FirstName", "STRING")
            .column("LastName", "STRING")
            .create()
            .unwrap();
    }

    fn add(db: &mut Database, first: &str, last: &str) {
        db.table("tests")
            .insert([("FirstName", first), ("LastName", last)])
            .unwrap();
    }

    #[test]
    fn test_create_then_exists() {
        let mut db = Database::in_memory().unwrap();
        db.table("T").column("c1", "INTEGER").create().unwrap();

        assert!(db.table("T").exists().unwrap());
        assert!(db.table("t").exists().unwrap());
        assert!(!db.table("other").exists().unwrap());
        assert_eq!(db.builder().tables().unwrap(), vec!["T".to_string()]);
    }

    #[test]
    fn test_ben_or_sean() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);
        add(&mut db, "John", "Doe");
        add(&mut db, "Ben", "Smith");
        add(&mut db, "Sean", "Parker");
        add(&mut db, "Tom", "Johnson");

        let rows = db
            .table("tests")
            .filter("FirstName", "=", "Ben")
            .or_filter("FirstName", "=", "Sean")
            .select(&[])
            .unwrap();

        assert_eq!(
            db.last_sql(),
            Some("SELECT * FROM 'tests' WHERE FirstName = 'Ben' OR FirstName = 'Sean';")
        );
        let names: Vec<_> = rows.iter().filter_map(|r| r.get_str("FirstName")).collect();
        assert_eq!(names, vec!["Ben", "Sean"]);
    }

    #[test]
    fn test_escaping_round_trip() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);
        add(&mut db, "O'Brien", "D'Arcy");

        let row = db
            .table("tests")
            .filter("FirstName", "=", "O'Brien")
            .select_one(&[])
            .unwrap()
            .unwrap();
        assert_eq!(row.get_str("FirstName"), Some("O'Brien"));
        assert_eq!(row.get_str("LastName"), Some("D'Arcy"));
        assert!(db.last_sql().unwrap().contains("'O''Brien'"));
    }

    #[test]
    fn test_last_insert_id_increases() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);

        add(&mut db, "A", "A");
        let first = db.builder().last_insert_id().unwrap().unwrap();
        add(&mut db, "B", "B");
        let second = db.builder().last_insert_id().unwrap().unwrap();

        assert_eq!(first, 1);
        assert!(second > first);
    }

    #[test]
    fn test_next_id() {
        let mut db = Database::in_memory().unwrap();
        db.table("ids").column("Id", "INTEGER").create().unwrap();

        assert_eq!(db.table("ids").next_id("Id").unwrap(), 1);
        db.table("ids").insert([("Id", 1)]).unwrap();
        assert_eq!(db.table("ids").next_id("Id").unwrap(), 2);
        assert_eq!(
            db.last_sql(),
            Some("SELECT Id FROM 'ids' ORDER BY Id DESC LIMIT 1")
        );
    }

    #[test]
    fn test_verbs_without_table() {
        let mut db = Database::in_memory().unwrap();
        assert!(matches!(
            db.builder().select(&[]),
            Err(DbError::MissingTable("select"))
        ));
        assert!(matches!(
            db.builder().insert([("a", 1)]),
            Err(DbError::MissingTable("insert"))
        ));
        assert!(matches!(
            db.builder().num_rows(),
            Err(DbError::MissingTable("num_rows"))
        ));
    }

    #[test]
    fn test_empty_row() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);
        assert!(matches!(
            db.table("tests").insert(Vec::<(&str, i64)>::new()),
            Err(DbError::EmptyRow)
        ));
    }

    #[test]
    fn test_update_delete_count() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);
        for name in ["A", "B", "C", "D"] {
            add(&mut db, name, "X");
        }

        let updated = db
            .table("tests")
            .filter("LastName", "=", "X")
            .order_by("Id", "desc")
            .limit(2)
            .update([("LastName", "Y")])
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(
            db.table("tests").filter("LastName", "=", "Y").num_rows().unwrap(),
            2
        );
        assert_eq!(
            db.table("tests")
                .filter("LastName", "=", "Y")
                .select_column("FirstName")
                .unwrap(),
            vec![Value::from("C"), Value::from("D")]
        );

        let deleted = db.table("tests").filter("Id", "=", 1).delete().unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(db.last_sql(), Some("DELETE FROM 'tests' WHERE Id = '1';"));
        assert_eq!(db.table("tests").num_rows().unwrap(), 3);
    }

    #[test]
    fn test_compound_where_and_null() {
        let mut db = Database::in_memory().unwrap();
        db.table("t")
            .column("a", "INTEGER")
            .column("b", "INTEGER")
            .column("c", "TEXT")
            .create()
            .unwrap();
        db.table("t")
            .insert([("a", Value::from(1)), ("b", 2.into()), ("c", Value::Null)])
            .unwrap();
        db.table("t")
            .insert([("a", Value::from(5)), ("b", 2.into()), ("c", "3".into())])
            .unwrap();

        let rows = db
            .table("t")
            .filter("a", "=", 9)
            .filter_group([("b", "=", "2"), ("c", "=", "3")], Connector::Or)
            .select(&[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            db.last_sql(),
            Some("SELECT * FROM 't' WHERE a = '9' OR (b = '2' AND c = '3');")
        );

        let nulls = db.table("t").filter("c", "=", Value::Null).num_rows().unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_columns_introspection() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);

        let columns = db.table("tests").columns(true).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Id", "FirstName", "LastName"]);
        assert_eq!(columns[0].column_type, "INTEGER");
        assert_eq!(columns[0].properties, "NOT NULL PRIMARY KEY AUTOINCREMENT");
        assert_eq!(columns[1].column_type, "TEXT");
    }

    #[test]
    fn test_drop_table() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);
        db.table("tests").drop().unwrap();
        assert_eq!(db.last_sql(), Some("DROP TABLE 'tests';"));
        assert!(!db.table("tests").exists().unwrap());
    }

    #[test]
    fn test_join_and_group() {
        let mut db = Database::in_memory().unwrap();
        db.execute("CREATE TABLE users (Id INTEGER, Name TEXT);").unwrap();
        db.execute("CREATE TABLE orders (UserId INTEGER, Total INTEGER);").unwrap();
        db.execute("INSERT INTO users VALUES (1, 'Ben'), (2, 'Sean');").unwrap();
        db.execute("INSERT INTO orders VALUES (1, 10), (1, 5), (2, 7);").unwrap();

        let rows = db
            .table("users")
            .join("orders", "Id", "UserId")
            .group_by("Name")
            .order_by("Name", "asc")
            .select(&["Name", "SUM(Total) AS Spent"])
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_i64("Spent"), Some(15));
        assert_eq!(rows[1].get_i64("Spent"), Some(7));
    }

    #[test]
    fn test_page() {
        let mut db = Database::in_memory().unwrap();
        tests_table(&mut db);
        for name in ["A", "B", "C"] {
            add(&mut db, name, "X");
        }

        let rows = db.table("tests").order_by("Id", "asc").page(1, 1).unwrap();
        assert_eq!(rows[0].get_str("FirstName"), Some("B"));
    }

    #[test]
    fn test_server_statements() {
        let (mut db, log) = server_database();

        db.table("t")
            .column_props("Id", "INTEGER", "PRIMARY KEY AUTOINCREMENT")
            .create()
            .unwrap();
        db.table("tests")
            .insert([("FirstName", "John"), ("LastName", "Doe")])
            .unwrap();
        db.table("tests").filter("Id", "=", 1).delete().unwrap();
        db.table("t").drop().unwrap();
        db.table("tests")
            .filter("Name", "=", "O'Brien")
            .num_rows()
            .unwrap();

        assert_eq!(
            log.statements(),
            vec![
                "CREATE TABLE `t`(`Id` BIGINT PRIMARY KEY AUTO_INCREMENT);",
                "INSERT INTO `tests`(`FirstName`,`LastName`) VALUES ('John','Doe')",
                "DELETE FROM `tests` WHERE `Id` = '1';",
                "DROP TABLE `t`;",
                r"SELECT COUNT(*) FROM `tests` WHERE `Name` = 'O\'Brien';",
            ]
        );
    }

    #[test]
    fn test_server_database_verbs() {
        let (mut db, log) = server_database();
        log.respond(vec![
            Row::from_iter([("Database", "information_schema")]),
            Row::from_iter([("Database", "Shop")]),
        ]);

        db.builder().create().unwrap();
        assert!(db.builder().exists().unwrap());
        db.builder().drop().unwrap();

        assert_eq!(
            log.statements(),
            vec![
                "CREATE DATABASE `shop`;",
                "SHOW DATABASES;",
                "DROP DATABASE `shop`;",
            ]
        );
        assert_eq!(log.connections(), vec!["shop", "", "", ""]);
    }

    #[test]
    fn test_server_last_insert_id_queries() {
        let (mut db, log) = server_database();
        log.respond(vec![Row::from_iter([("LAST_INSERT_ID()", 7)])]);

        assert_eq!(db.builder().last_insert_id().unwrap(), Some(7));
        assert_eq!(log.statements(), vec!["SELECT LAST_INSERT_ID();"]);
    }
}
