use rusqlite::types::ValueRef;
use sqldb_config::DatabaseConfig;
use tracing::trace;

use super::Connection;
use crate::{
    dialect::{EmbeddedQuote, Quote},
    dsn::Dsn,
    error::{DbError, Result},
    row::Row,
    value::Value,
};

/// Embedded backend adapter over a single rusqlite connection.
pub struct SqliteConnection {
    config: DatabaseConfig,
    conn: Option<rusqlite::Connection>,
}

impl SqliteConnection {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            config: config.clone(),
            conn: None,
        }
    }

    fn handle(&self) -> Result<&rusqlite::Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| DbError::Connection("connection is not open".into()))
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl Quote for SqliteConnection {
    fn quote(&self, value: &Value) -> String {
        EmbeddedQuote.quote(value)
    }
}

impl Connection for SqliteConnection {
    fn open(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = match Dsn::derive(&self.config)? {
            Dsn::SqliteMemory => rusqlite::Connection::open_in_memory(),
            Dsn::Sqlite { path } => rusqlite::Connection::open(&path),
            other => {
                return Err(DbError::InvalidDsn(format!(
                    "{other} cannot be opened by the embedded backend"
                )))
            }
        }
        .map_err(|e| DbError::Connection(e.to_string()))?;

        trace!("opened embedded database {}", self.config.name);
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| DbError::Connection(e.to_string()))?;
            trace!("closed embedded database {}", self.config.name);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let conn = self.handle()?;
        let affected = conn.execute(sql, [])?;
        Ok(affected as u64)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let conn = self.handle()?;
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut mapped = Row::new();
            for (i, name) in names.iter().enumerate() {
                mapped.set(name.as_str(), to_value(row.get_ref(i)?));
            }
            out.push(mapped);
        }
        Ok(out)
    }

    fn begin(&mut self) -> Result<()> {
        self.handle()?.execute_batch("BEGIN")?;
        trace!("transaction started");
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.handle()?.execute_batch("COMMIT")?;
        trace!("transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.handle()?.execute_batch("ROLLBACK")?;
        trace!("transaction rolled back");
        Ok(())
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(Some(self.handle()?.last_insert_rowid()))
    }
}
