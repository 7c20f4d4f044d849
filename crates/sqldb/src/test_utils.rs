use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use sqldb_config::DatabaseConfig;

use crate::{
    connection::Connection,
    database::Database,
    dialect::{Quote, ServerQuote},
    dsn::Dsn,
    error::{DbError, Result},
    row::Row,
};

#[derive(Default)]
struct State {
    statements: Vec<String>,
    responses: VecDeque<Vec<Row>>,
    configs: Vec<DatabaseConfig>,
    schemas: Option<Vec<String>>,
}

/// Shared view of everything the recording connections saw.
#[derive(Clone, Default)]
pub struct SqlRecorder(Arc<Mutex<State>>);

impl SqlRecorder {
    pub fn statements(&self) -> Vec<String> {
        self.0.lock().unwrap().statements.clone()
    }

    /// Database names the connections were created for, in order.
    pub fn connections(&self) -> Vec<String> {
        self.configs().into_iter().map(|c| c.name).collect()
    }

    pub fn configs(&self) -> Vec<DatabaseConfig> {
        self.0.lock().unwrap().configs.clone()
    }

    /// Makes `open` fail for any schema other than `names`.
    pub fn only_schemas(&self, names: &[&str]) {
        self.0.lock().unwrap().schemas = Some(names.iter().map(|n| n.to_string()).collect());
    }

    /// Queues the rows returned by the next query.
    pub fn respond(&self, rows: Vec<Row>) {
        self.0.lock().unwrap().responses.push_back(rows);
    }
}

/// Connection that records SQL instead of sending it anywhere.
pub struct RecordingConnection {
    recorder: SqlRecorder,
    schema: String,
    open: bool,
}

impl Quote for RecordingConnection {
    fn quote(&self, value: &crate::Value) -> String {
        ServerQuote.quote(value)
    }
}

impl Connection for RecordingConnection {
    fn open(&mut self) -> Result<()> {
        let state = self.recorder.0.lock().unwrap();
        if let Some(schemas) = &state.schemas {
            if !self.schema.is_empty() && !schemas.contains(&self.schema) {
                return Err(DbError::Connection(format!(
                    "Unknown database '{}'",
                    self.schema
                )));
            }
        }
        drop(state);
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.recorder.0.lock().unwrap().statements.push(sql.to_string());
        Ok(1)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let mut state = self.recorder.0.lock().unwrap();
        state.statements.push(sql.to_string());
        Ok(state.responses.pop_front().unwrap_or_default())
    }

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }

    fn last_insert_id(&mut self) -> Result<Option<i64>> {
        Ok(None)
    }
}

/// A server-backend database named `shop` whose connections record their SQL.
pub fn server_database() -> (Database, SqlRecorder) {
    server_database_with(DatabaseConfig::server("localhost", "shop", "root", ""))
}

pub fn server_database_with(config: DatabaseConfig) -> (Database, SqlRecorder) {
    let recorder = SqlRecorder::default();
    let shared = recorder.clone();
    let db = Database::with_factory(
        config,
        Box::new(move |config| {
            let schema = match Dsn::derive(config)? {
                Dsn::MySql { dbname, .. } => dbname,
                _ => String::new(),
            };
            shared.0.lock().unwrap().configs.push(config.clone());
            Ok(Box::new(RecordingConnection {
                recorder: shared.clone(),
                schema,
                open: false,
            }))
        }),
    )
    .unwrap();
    (db, recorder)
}
