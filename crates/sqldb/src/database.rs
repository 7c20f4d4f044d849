//! The database handle every query starts from.

use std::{fs, path::Path};

use sqldb_config::{BackendKind, DatabaseConfig};
use tracing::{debug, trace, warn};

use crate::{
    connection::{connect, Connection},
    dialect::{dialect_for, Dialect, Quote},
    dsn::Dsn,
    error::{DbError, Result},
    query::QueryBuilder,
    row::Row,
    value::Value,
};

/// Creates connections for a configuration. Swappable for tests and custom drivers.
pub type ConnectionFactory =
    Box<dyn Fn(&DatabaseConfig) -> Result<Box<dyn Connection>> + Send + Sync>;

/// A configured database: one dialect, one lazily opened connection and a log of the
/// statements sent through it.
///
/// ```
/// use sqldb::{Database, Value};
///
/// let mut db = Database::in_memory().unwrap();
/// db.table("users")
///     .column("Id", "INTEGER")
///     .column("Name", "STRING")
///     .create()
///     .unwrap();
/// db.table("users")
///     .insert([("Id", Value::from(1)), ("Name", Value::from("Ben"))])
///     .unwrap();
///
/// let ben = db.table("users").filter("Id", "=", 1).select_one(&[]).unwrap();
/// assert_eq!(ben.unwrap().get_str("Name"), Some("Ben"));
/// ```
pub struct Database {
    config: DatabaseConfig,
    dialect: &'static dyn Dialect,
    conn: Box<dyn Connection>,
    factory: ConnectionFactory,
    sql_log: Vec<String>,
}

impl Database {
    /// Builds an unopened handle. The connection opens on first use.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        Self::with_factory(config, Box::new(connect))
    }

    /// Like [`Database::new`], creating connections through `factory`.
    pub fn with_factory(config: DatabaseConfig, factory: ConnectionFactory) -> Result<Self> {
        let conn = factory(&config)?;
        Ok(Self {
            dialect: dialect_for(config.backend),
            config,
            conn,
            factory,
            sql_log: Vec::new(),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(DatabaseConfig::in_memory())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn backend(&self) -> BackendKind {
        self.config.backend
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    pub fn open(&mut self) -> Result<()> {
        self.conn.open()
    }

    pub fn close(&mut self) -> Result<()> {
        self.conn.close()
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_open()
    }

    /// Starts a query against `table`.
    pub fn table(&mut self, table: impl Into<String>) -> QueryBuilder<'_> {
        QueryBuilder::new(self).table(table)
    }

    /// Starts a query with no table, for the database-level verbs
    /// (`create`, `drop`, `exists`, `tables`).
    pub fn builder(&mut self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    /// Runs a statement that returns no rows.
    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        self.conn.open()?;
        debug!(sql, "executing statement");
        self.sql_log.push(sql.to_string());
        self.conn
            .execute(sql)
            .inspect_err(|err| warn!(sql, "statement failed: {err}"))
    }

    /// Runs a statement and collects its rows.
    pub fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.conn.open()?;
        debug!(sql, "executing query");
        self.sql_log.push(sql.to_string());
        self.conn
            .query(sql)
            .inspect_err(|err| warn!(sql, "query failed: {err}"))
    }

    /// Escapes `value` with the connection's quoting rules.
    pub fn quote(&self, value: impl Into<Value>) -> String {
        self.conn.quote(&value.into())
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.open()?;
        self.conn.begin()
    }

    pub fn commit(&mut self) -> Result<()> {
        self.conn.commit()
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.conn.rollback()
    }

    /// Every statement sent to the driver, oldest first.
    pub fn sql_log(&self) -> &[String] {
        &self.sql_log
    }

    pub fn last_sql(&self) -> Option<&str> {
        self.sql_log.last().map(String::as_str)
    }

    pub fn clear_sql_log(&mut self) {
        self.sql_log.clear();
    }

    /// The id generated by the most recent insert on this connection.
    pub fn last_insert_id(&mut self) -> Result<Option<i64>> {
        self.conn.open()?;
        if let Some(id) = self.conn.last_insert_id()? {
            return Ok(Some(id));
        }

        let sql = self.dialect.last_insert_id_sql();
        let rows = self.query(sql)?;
        Ok(rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(Value::as_i64))
    }

    /// Path of the embedded database file, `None` for in-memory and remote databases.
    fn database_file(&self) -> Result<Option<String>> {
        if self.config.is_remote() {
            return Ok(None);
        }
        match Dsn::derive(&self.config)? {
            Dsn::Sqlite { path } => Ok(Some(path)),
            _ => Ok(None),
        }
    }

    /// Schema name for the server backend; the DSN's `dbname` wins over the config.
    pub(crate) fn database_name(&self) -> Result<String> {
        if let Some(dsn) = &self.config.dsn {
            if let Dsn::MySql { dbname, .. } = Dsn::parse(dsn)? {
                if !dbname.is_empty() {
                    return Ok(dbname);
                }
            }
        }
        if self.config.name.trim().is_empty() {
            return Err(DbError::MissingDatabaseName);
        }
        Ok(self.config.name.clone())
    }

    /// Config reaching the same server as this one without selecting a schema.
    fn admin_config(&self) -> Result<DatabaseConfig> {
        let mut config = self.config.without_name();
        if let Some(dsn) = self.config.dsn.as_deref().filter(|d| !d.trim().is_empty()) {
            if let Dsn::MySql { host, port, .. } = Dsn::parse(dsn)? {
                let dsn = Dsn::MySql {
                    dbname: String::new(),
                    host,
                    port,
                };
                config.dsn = Some(dsn.to_string());
            }
        }
        Ok(config)
    }

    /// Runs `sql` through `run` on a short-lived schema-less connection.
    fn on_admin<T>(
        &mut self,
        sql: &str,
        run: impl FnOnce(&mut dyn Connection, &str) -> Result<T>,
    ) -> Result<T> {
        let mut admin = (self.factory)(&self.admin_config()?)?;
        admin.open()?;
        debug!(sql, "executing statement");
        self.sql_log.push(sql.to_string());
        let result = run(&mut *admin, sql);
        admin.close()?;
        result.inspect_err(|err| warn!(sql, "statement failed: {err}"))
    }

    pub(crate) fn create_database(&mut self) -> Result<()> {
        match self.dialect.create_database_sql(&self.database_name()?) {
            Some(sql) => {
                debug!("creating database `{}`", self.config.name);
                self.on_admin(&sql, |conn, sql| conn.execute(sql))?;
                self.conn.close()
            }
            None => self.conn.open(),
        }
    }

    pub(crate) fn drop_database(&mut self) -> Result<()> {
        if let Some(sql) = self.dialect.drop_database_sql(&self.database_name()?) {
            self.conn.close()?;
            self.on_admin(&sql, |conn, sql| conn.execute(sql))?;
            return Ok(());
        }

        if self.config.is_remote() {
            return Err(DbError::Unsupported(
                "dropping a database over the remote transport".into(),
            ));
        }

        self.conn.close()?;
        if let Some(path) = self.database_file()? {
            trace!("removing database file {path}");
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// On the server the check runs without selecting the schema, so a missing
    /// database reads as `false` instead of a failed connection.
    pub(crate) fn database_exists(&mut self) -> Result<bool> {
        if let Some(sql) = self.dialect.list_databases_sql() {
            let name = self.database_name()?;
            let rows = self.on_admin(sql, |conn, sql| conn.query(sql))?;
            return Ok(rows.iter().any(|row| {
                row.get("Database")
                    .or_else(|| row.values().next())
                    .and_then(Value::to_text)
                    .is_some_and(|db| db.eq_ignore_ascii_case(&name))
            }));
        }

        if self.config.is_remote() {
            return Err(DbError::Unsupported(
                "checking a database over the remote transport".into(),
            ));
        }

        match self.database_file()? {
            Some(path) => Ok(Path::new(&path).exists()),
            None => Ok(true),
        }
    }

    pub(crate) fn list_tables(&mut self) -> Result<Vec<String>> {
        let name = match self.backend() {
            BackendKind::Server => self.database_name()?,
            BackendKind::Embedded => String::new(),
        };
        let sql = self.dialect.tables_sql(&name, &*self);
        let rows = self.query(&sql)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.values().next().and_then(Value::to_text))
            .collect())
    }
}

impl Quote for Database {
    fn quote(&self, value: &Value) -> String {
        self.conn.quote(value)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(err) = self.conn.close() {
            warn!("failed to close connection: {err}");
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.config.backend)
            .field("name", &self.config.name)
            .field("open", &self.conn.is_open())
            .finish()
    }
}
