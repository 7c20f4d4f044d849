//! Server backend adapter.
//!
//! sqlx is async only; every call is driven to completion on a private current-thread
//! runtime so the adapter keeps the same blocking contract as the others.

use sqldb_config::DatabaseConfig;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlRow},
    Column, Connection as _, Row as _,
};
use tokio::runtime::{Builder, Runtime};
use tracing::trace;

use super::Connection;
use crate::{
    dialect::{Quote, ServerQuote},
    dsn::Dsn,
    error::{DbError, Result},
    row::Row,
    value::Value,
};

pub struct MySqlConnection {
    config: DatabaseConfig,
    runtime: Option<Runtime>,
    conn: Option<sqlx::MySqlConnection>,
}

impl MySqlConnection {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            config: config.clone(),
            runtime: None,
            conn: None,
        }
    }

    fn options(&self) -> Result<MySqlConnectOptions> {
        let Dsn::MySql { dbname, host, port } = Dsn::derive(&self.config)? else {
            return Err(DbError::InvalidDsn(
                "the server backend needs a mysql: DSN".into(),
            ));
        };

        let mut options = MySqlConnectOptions::new()
            .host(&host)
            .username(&self.config.user)
            .password(&self.config.pass);
        if let Some(port) = port {
            options = options.port(port);
        }
        if !dbname.is_empty() {
            options = options.database(&dbname);
        }
        Ok(options)
    }

    fn parts(&mut self) -> Result<(&Runtime, &mut sqlx::MySqlConnection)> {
        match (&self.runtime, &mut self.conn) {
            (Some(runtime), Some(conn)) => Ok((runtime, conn)),
            _ => Err(DbError::Connection("connection is not open".into())),
        }
    }
}

fn convert_row(row: &MySqlRow) -> Row {
    let mut mapped = Row::new();

    for column in row.columns() {
        let name = column.name();
        let i = column.ordinal();

        let value = if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(i) {
            Value::Integer(v)
        } else if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(i) {
            i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Integer)
        } else if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(i) {
            Value::Float(v)
        } else if let Ok(Some(v)) = row.try_get::<Option<String>, _>(i) {
            Value::Text(v)
        } else if let Ok(Some(v)) = row.try_get::<Option<Vec<u8>>, _>(i) {
            Value::Blob(v)
        } else if let Ok(Some(v)) = row.try_get_unchecked::<Option<String>, _>(i) {
            Value::Text(v)
        } else {
            Value::Null
        };

        mapped.set(name, value);
    }

    mapped
}

impl Quote for MySqlConnection {
    fn quote(&self, value: &Value) -> String {
        ServerQuote.quote(value)
    }
}

impl Connection for MySqlConnection {
    fn open(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let options = self.options()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let conn = runtime
            .block_on(sqlx::MySqlConnection::connect_with(&options))
            .map_err(|e| DbError::Connection(e.to_string()))?;

        trace!("connected to server database `{}`", self.config.name);
        self.runtime = Some(runtime);
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let (Some(runtime), Some(conn)) = (self.runtime.take(), self.conn.take()) {
            runtime
                .block_on(conn.close())
                .map_err(|e| DbError::Connection(e.to_string()))?;
            trace!("disconnected from server database `{}`", self.config.name);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let (runtime, conn) = self.parts()?;
        let result = runtime.block_on(sqlx::raw_sql(sql).execute(conn))?;
        Ok(result.rows_affected())
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let (runtime, conn) = self.parts()?;
        let rows = runtime.block_on(sqlx::raw_sql(sql).fetch_all(conn))?;
        Ok(rows.iter().map(convert_row).collect())
    }

    fn begin(&mut self) -> Result<()> {
        self.execute("START TRANSACTION;")?;
        trace!("transaction started");
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.execute("COMMIT;")?;
        trace!("transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.execute("ROLLBACK;")?;
        trace!("transaction rolled back");
        Ok(())
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_require_mysql_dsn() {
        let mut config = DatabaseConfig::server("localhost", "shop", "root", "");
        config.dsn = Some("sqlite::memory:".into());

        let conn = MySqlConnection::new(&config);
        assert!(matches!(conn.options(), Err(DbError::InvalidDsn(_))));
    }

    #[test]
    fn test_unopened_connection_errors() {
        let config = DatabaseConfig::server("localhost", "shop", "root", "");
        let mut conn = MySqlConnection::new(&config);
        assert!(!conn.is_open());
        assert!(matches!(conn.execute("SELECT 1"), Err(DbError::Connection(_))));
        assert_eq!(conn.quote(&"O'Brien".into()), r"'O\'Brien'");
    }
}
