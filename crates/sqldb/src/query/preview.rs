//! Rendering without execution.

use crate::{
    database::Database,
    error::{DbError, Result},
    query::{
        clause::{ColumnDef, Limit},
        spec::QuerySpec,
    },
    row::Row,
    value::Value,
};

/// The terminal verbs of a [`crate::QueryBuilder`], returning the SQL text they
/// would send instead of running it.
///
/// Literals are escaped with the database's connection, so the text is exactly what
/// the executing verb would produce.
pub struct SqlPreview<'a> {
    db: &'a Database,
    spec: QuerySpec,
    error: Option<DbError>,
}

impl<'a> SqlPreview<'a> {
    pub(crate) fn new(db: &'a mut Database, spec: QuerySpec, error: Option<DbError>) -> Self {
        Self { db, spec, error }
    }

    fn finish(self) -> Result<(&'a Database, QuerySpec)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.db, self.spec)),
        }
    }

    pub fn select(self, columns: &[&str]) -> Result<String> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("select")?;
        Ok(db.dialect().render_select(table, columns, &spec, db))
    }

    pub fn select_one(mut self, columns: &[&str]) -> Result<String> {
        self.spec = self.spec.with_limit(Limit::Count(1));
        self.select(columns)
    }

    pub fn insert<I, K, V>(self, row: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("insert")?;
        let row: Row = row.into_iter().collect();
        if row.is_empty() {
            return Err(DbError::EmptyRow);
        }
        Ok(db.dialect().render_insert(table, &row, db))
    }

    pub fn update<I, K, V>(self, row: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("update")?;
        let row: Row = row.into_iter().collect();
        if row.is_empty() {
            return Err(DbError::EmptyRow);
        }
        Ok(db.dialect().render_update(table, &row, &spec, db))
    }

    pub fn delete(self) -> Result<String> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("delete")?;
        Ok(db.dialect().render_delete(table, &spec, db))
    }

    /// `CREATE TABLE` from the staged columns, or `CREATE DATABASE` for the server
    /// backend when no table is selected.
    pub fn create(self) -> Result<String> {
        let (db, spec) = self.finish()?;
        match spec.table() {
            Some(table) => {
                let columns: &[ColumnDef] = spec.columns_for(table);
                if columns.is_empty() {
                    return Err(DbError::NoColumns(table.to_string()));
                }
                Ok(db.dialect().render_create_table(table, columns))
            }
            None => db
                .dialect()
                .create_database_sql(&db.database_name()?)
                .ok_or_else(|| DbError::Unsupported("CREATE DATABASE on this backend".into())),
        }
    }

    pub fn drop(self) -> Result<String> {
        let (db, spec) = self.finish()?;
        match spec.table() {
            Some(table) => Ok(db.dialect().render_drop_table(table)),
            None => db
                .dialect()
                .drop_database_sql(&db.database_name()?)
                .ok_or_else(|| DbError::Unsupported("DROP DATABASE on this backend".into())),
        }
    }

    pub fn num_rows(self) -> Result<String> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("num_rows")?;
        Ok(db.dialect().render_count(table, &spec, db))
    }

    pub fn next_id(self, column: &str) -> Result<String> {
        let (db, spec) = self.finish()?;
        let table = spec.require_table("next_id")?;
        Ok(db.dialect().render_next_id(table, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::clause::{Connector, JoinKind},
        test_utils::server_database,
    };

    #[test]
    fn test_preview_executes_nothing() {
        let mut db = Database::in_memory().unwrap();
        let sql = db
            .table("tests")
            .filter("FirstName", "=", "Ben")
            .or_filter("FirstName", "=", "Sean")
            .sql()
            .select(&[])
            .unwrap();

        assert_eq!(
            sql,
            "SELECT * FROM 'tests' WHERE FirstName = 'Ben' OR FirstName = 'Sean';"
        );
        assert!(db.sql_log().is_empty());
        assert!(!db.is_open());
    }

    #[test]
    fn test_embedded_statements() {
        let mut db = Database::in_memory().unwrap();

        assert_eq!(
            db.table("t").column("Id", "INTEGER").sql().create().unwrap(),
            "CREATE TABLE 't'(Id INTEGER);"
        );
        assert_eq!(
            db.table("tests")
                .sql()
                .insert([("FirstName", "John"), ("LastName", "Doe")])
                .unwrap(),
            "INSERT INTO 'tests'('FirstName','LastName') VALUES ('John','Doe')"
        );
        assert_eq!(
            db.table("tests")
                .filter("Id", "=", 1)
                .order_by("Id", "desc")
                .limit(2)
                .sql()
                .update([("LastName", "Y")])
                .unwrap(),
            "UPDATE 'tests' SET 'LastName'='Y' WHERE rowid IN (SELECT rowid FROM 'tests' WHERE Id = '1' ORDER BY Id DESC LIMIT 2);"
        );
        assert_eq!(
            db.table("tests").sql().select_one(&["Id"]).unwrap(),
            "SELECT Id FROM 'tests' LIMIT 1;"
        );
        assert!(matches!(
            db.builder().sql().create(),
            Err(DbError::Unsupported(_))
        ));
    }

    #[test]
    fn test_server_statements() {
        let (mut db, log) = server_database();

        assert_eq!(
            db.table("users")
                .join_as("orders", "Id", "UserId", JoinKind::Left, None)
                .filter("Name", "LIKE", "B%")
                .filter_group([("Age", ">", 18)], Connector::Or)
                .sql()
                .num_rows()
                .unwrap(),
            "SELECT COUNT(*) FROM `users` LEFT JOIN `orders` ON `users`.`Id`=`orders`.`UserId` WHERE `Name` LIKE 'B%' OR (`Age` > '18');"
        );
        assert_eq!(
            db.table("tests").sql().next_id("Id").unwrap(),
            "SELECT `Id` FROM `tests` ORDER BY `Id` DESC LIMIT 1"
        );
        assert_eq!(db.builder().sql().create().unwrap(), "CREATE DATABASE `shop`;");
        assert_eq!(db.builder().sql().drop().unwrap(), "DROP DATABASE `shop`;");
        assert!(log.statements().is_empty());
    }

    #[test]
    fn test_deferred_error() {
        let mut db = Database::in_memory().unwrap();
        assert!(matches!(
            db.table("t").filter("a", "<=>", 1).sql().delete(),
            Err(DbError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            db.builder().sql().select(&[]),
            Err(DbError::MissingTable("select"))
        ));
    }
}
