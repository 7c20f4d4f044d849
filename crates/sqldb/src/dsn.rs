//! Connection strings.
//!
//! A DSN is derived from the backend kind, host and name of a [`DatabaseConfig`], or
//! taken verbatim from its `dsn` override:
//!
//! * `sqlite::memory:`
//! * `sqlite:<dir>/<file>`
//! * `mysql:dbname=<name>;host=<host>[;port=<port>]`

use std::fmt;

use sqldb_config::{BackendKind, DatabaseConfig};
use sqldb_utils::path::database_file;

use crate::error::{DbError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dsn {
    SqliteMemory,
    Sqlite {
        path: String,
    },
    MySql {
        dbname: String,
        host: String,
        port: Option<u16>,
    },
}

impl Dsn {
    /// Builds the DSN for `config`, preferring its explicit override.
    pub fn derive(config: &DatabaseConfig) -> Result<Self> {
        if let Some(dsn) = config.dsn.as_deref().filter(|d| !d.trim().is_empty()) {
            return Self::parse(dsn);
        }

        match config.backend {
            BackendKind::Embedded if config.is_in_memory() => Ok(Dsn::SqliteMemory),
            BackendKind::Embedded => {
                if config.name.trim().is_empty() {
                    return Err(DbError::MissingDatabaseName);
                }
                Ok(Dsn::Sqlite {
                    path: database_file(&config.host, &config.name),
                })
            }
            BackendKind::Server => {
                let (host, port) = split_host_port(&config.host)?;
                Ok(Dsn::MySql {
                    dbname: config.name.clone(),
                    host,
                    port,
                })
            }
        }
    }

    pub fn parse(dsn: &str) -> Result<Self> {
        let dsn = dsn.trim();
        let invalid = || DbError::InvalidDsn(dsn.to_string());

        if dsn == "sqlite::memory:" {
            return Ok(Dsn::SqliteMemory);
        }

        if let Some(path) = dsn.strip_prefix("sqlite:") {
            if path.is_empty() {
                return Err(invalid());
            }
            return Ok(Dsn::Sqlite {
                path: path.to_string(),
            });
        }

        let params = dsn.strip_prefix("mysql:").ok_or_else(invalid)?;
        let mut dbname = String::new();
        let mut host = String::new();
        let mut port = None;

        for pair in params.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(invalid)?;
            match key.trim() {
                "dbname" => dbname = value.trim().to_string(),
                "host" => {
                    let (h, p) = split_host_port(value)?;
                    host = h;
                    port = p.or(port);
                }
                "port" => port = Some(value.trim().parse().map_err(|_| invalid())?),
                _ => {}
            }
        }

        Ok(Dsn::MySql { dbname, host, port })
    }
}

fn split_host_port(input: &str) -> Result<(String, Option<u16>)> {
    let input = input.trim();
    match input.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            let port = port
                .parse()
                .map_err(|_| DbError::InvalidDsn(input.to_string()))?;
            Ok((host.to_string(), Some(port)))
        }
        _ => Ok((input.to_string(), None)),
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dsn::SqliteMemory => write!(f, "sqlite::memory:"),
            Dsn::Sqlite { path } => write!(f, "sqlite:{path}"),
            Dsn::MySql { dbname, host, port } => {
                write!(f, "mysql:dbname={dbname};host={host}")?;
                if let Some(port) = port {
                    write!(f, ";port={port}")?;
                }
                Ok(())
            }
        }
    }
}
