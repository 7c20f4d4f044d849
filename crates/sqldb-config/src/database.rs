use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Marker name that selects an in-memory embedded database.
pub const IN_MEMORY: &str = ":memory:";

/// The two storage engines a connection can target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Networked relational server speaking the MySQL dialect.
    #[serde(alias = "mysql")]
    Server,
    /// File based engine speaking the SQLite dialect.
    #[default]
    #[serde(alias = "sqlite")]
    Embedded,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Server => write!(f, "server"),
            BackendKind::Embedded => write!(f, "embedded"),
        }
    }
}

/// How statements reach the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// A driver connection opened in process.
    #[default]
    Native,
    /// SQL text posted to an HTTP endpoint that executes it and answers with JSON.
    Remote,
}

/// Connection options for one database.
///
/// For the remote transport `host` is the endpoint URL and `pass` is sent as the API key.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Database (schema) name, or the file name for the embedded backend.
    #[serde(default)]
    pub name: String,

    /// Server host, the directory holding the embedded file, or the remote endpoint.
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub pass: String,

    /// Pre-built connection string used instead of the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,

    #[serde(default)]
    pub transport: Transport,

    /// Request timeout in seconds for the remote transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl DatabaseConfig {
    pub fn embedded(host: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Embedded,
            host: host.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::embedded("", IN_MEMORY)
    }

    pub fn server(
        host: impl Into<String>,
        name: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
    ) -> Self {
        Self {
            backend: BackendKind::Server,
            host: host.into(),
            name: name.into(),
            user: user.into(),
            pass: pass.into(),
            ..Default::default()
        }
    }

    pub fn remote(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Embedded,
            host: url.into(),
            pass: api_key.into(),
            transport: Transport::Remote,
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.backend == BackendKind::Embedded && self.name == IN_MEMORY
    }

    pub fn is_remote(&self) -> bool {
        self.transport == Transport::Remote
    }

    /// Copy of this config that connects to the server without selecting a schema.
    pub fn without_name(&self) -> Self {
        Self {
            name: String::new(),
            dsn: None,
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        db: DatabaseConfig,
    }

    #[test]
    fn test_backend_aliases() {
        let parsed: Wrapper = toml::from_str(
            r#"
            [db]
            backend = "mysql"
            name = "shop"
            host = "localhost"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.db.backend, BackendKind::Server);
        assert_eq!(parsed.db.transport, Transport::Native);

        let parsed: Wrapper = toml::from_str("[db]\nbackend = \"sqlite\"\n").unwrap();
        assert_eq!(parsed.db.backend, BackendKind::Embedded);
    }

    #[test]
    fn test_constructors() {
        assert!(DatabaseConfig::in_memory().is_in_memory());
        assert!(!DatabaseConfig::embedded("/tmp", "a.db").is_in_memory());

        let remote = DatabaseConfig::remote("https://db.example.com/api", "secret");
        assert!(remote.is_remote());
        assert_eq!(remote.pass, "secret");

        let server = DatabaseConfig::server("localhost", "shop", "root", "pw");
        let bare = server.without_name();
        assert!(bare.name.is_empty());
        assert_eq!(bare.user, "root");
    }

    #[test]
    fn test_timeout() {
        let mut config = DatabaseConfig::remote("https://x", "k");
        assert_eq!(config.timeout(), None);
        config.timeout = Some(5);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }
}
