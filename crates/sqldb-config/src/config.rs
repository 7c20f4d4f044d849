use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{LazyLock, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use sqldb_utils::path::{expand_vars, xdg_config_home, xdg_data_home};
use tracing::{debug, info};

use crate::{
    database::{BackendKind, DatabaseConfig},
    error::{ConfigError, Result},
};

/// Application configuration: a set of named connection profiles.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// The name of the profile used when none is requested.
    pub default_profile: String,

    /// A map of profile names to their connection options.
    pub profile: HashMap<String, DatabaseConfig>,
}

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("SQLDB_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("sqldb").join("config.toml"),
    })
});

/// Returns the config file location currently in effect.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Points the loader at another config file.
pub fn set_config_path(path: PathBuf) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path;
}

impl Config {
    /// A single embedded profile stored under `$XDG_DATA_HOME/sqldb`.
    pub fn default_config() -> Self {
        let data_dir = xdg_data_home().join("sqldb");
        let default_profile = DatabaseConfig::embedded(data_dir.display().to_string(), "sqldb.db");

        Self {
            default_profile: "default".to_string(),
            profile: HashMap::from([("default".to_string(), default_profile)]),
        }
    }

    /// Loads the configuration file, falling back to [`Config::default_config`] when it
    /// does not exist.
    pub fn new() -> Result<Self> {
        let path = config_path();

        let mut config = match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.resolve()?;
        Ok(config)
    }

    /// Validates every profile and expands variables in embedded directories.
    pub fn resolve(&mut self) -> Result<()> {
        if !self.profile.contains_key(&self.default_profile) {
            return Err(ConfigError::MissingDefaultProfile(
                self.default_profile.clone(),
            ));
        }

        for (name, db) in &mut self.profile {
            if db.is_remote() {
                let host = db.host.trim();
                if !(host.starts_with("http://") || host.starts_with("https://")) {
                    return Err(ConfigError::InvalidRemoteHost {
                        profile: name.clone(),
                        host: db.host.clone(),
                    });
                }
                continue;
            }

            match db.backend {
                BackendKind::Server if db.name.trim().is_empty() && db.dsn.is_none() => {
                    return Err(ConfigError::MissingDatabaseName(name.clone()));
                }
                BackendKind::Embedded if !db.host.is_empty() => {
                    db.host = expand_vars(&db.host)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn default_profile(&self) -> Result<&DatabaseConfig> {
        self.profile
            .get(&self.default_profile)
            .ok_or_else(|| ConfigError::MissingDefaultProfile(self.default_profile.clone()))
    }

    pub fn get_profile(&self, name: &str) -> Result<&DatabaseConfig> {
        self.profile
            .get(name)
            .ok_or(ConfigError::MissingProfile(name.to_string()))
    }

    /// Returns `name` when given, otherwise the default profile.
    pub fn select_profile(&self, name: Option<&str>) -> Result<&DatabaseConfig> {
        match name {
            Some(name) => self.get_profile(name),
            None => self.default_profile(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Writes the default configuration, refusing to replace an existing file.
pub fn generate_default_config() -> Result<()> {
    let path = config_path();

    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    Config::default_config().save()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;
    use crate::{database::Transport, test_utils::with_env};

    #[test]
    #[serial]
    fn test_default_config_creation() {
        with_env(vec![("XDG_DATA_HOME", "/data")], || {
            let config = Config::default_config();

            assert_eq!(config.default_profile, "default");
            let db = config.default_profile().unwrap();
            assert_eq!(db.backend, BackendKind::Embedded);
            assert_eq!(db.name, "sqldb.db");
            assert_eq!(db.host, "/data/sqldb");
        });
    }

    #[test]
    fn test_from_toml_profiles() {
        let config = Config::from_toml(
            r#"
            default_profile = "local"

            [profile.local]
            backend = "sqlite"
            name = "app.db"
            host = "/var/lib/app"

            [profile.prod]
            backend = "mysql"
            name = "shop"
            host = "db.internal"
            user = "app"
            pass = "secret"

            [profile.edge]
            transport = "remote"
            host = "https://edge.example.com/sql"
            pass = "key"
            timeout = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.default_profile().unwrap().name, "app.db");
        assert_eq!(config.get_profile("prod").unwrap().backend, BackendKind::Server);

        let edge = config.select_profile(Some("edge")).unwrap();
        assert_eq!(edge.transport, Transport::Remote);
        assert_eq!(edge.timeout, Some(10));

        assert!(matches!(
            config.get_profile("missing"),
            Err(ConfigError::MissingProfile(_))
        ));
    }

    #[test]
    fn test_resolve_missing_default_profile() {
        let mut config = Config::default_config();
        config.default_profile = "nonexistent".to_string();

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::MissingDefaultProfile(_))
        ));
    }

    #[test]
    fn test_resolve_server_without_name() {
        let mut config = Config::default_config();
        config.profile.insert(
            "prod".into(),
            DatabaseConfig::server("localhost", "", "root", ""),
        );

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::MissingDatabaseName(name)) if name == "prod"
        ));
    }

    #[test]
    fn test_resolve_remote_host() {
        let mut config = Config::default_config();
        config
            .profile
            .insert("edge".into(), DatabaseConfig::remote("ftp://nope", "k"));

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidRemoteHost { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_resolve_expands_embedded_host() {
        with_env(vec![("SQLDB_TEST_ROOT", "/opt/app")], || {
            let mut config = Config::default_config();
            config.profile.insert(
                "local".into(),
                DatabaseConfig::embedded("$SQLDB_TEST_ROOT/db", "a.db"),
            );
            config.resolve().unwrap();

            assert_eq!(config.get_profile("local").unwrap().host, "/opt/app/db");
        });
    }

    #[test]
    #[serial]
    fn test_generate_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let previous = config_path();
        set_config_path(path.clone());

        generate_default_config().unwrap();
        assert!(path.exists());

        let loaded = Config::new().unwrap();
        assert_eq!(loaded.default_profile, "default");

        assert!(matches!(
            generate_default_config(),
            Err(ConfigError::ConfigAlreadyExists)
        ));

        set_config_path(previous);
    }
}
