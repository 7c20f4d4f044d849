use miette::Diagnostic;
use sqldb_utils::error::{PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(sqldb_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(sqldb_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(sqldb_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Missing default profile: {0}")]
    #[diagnostic(
        code(sqldb_config::missing_default_profile),
        help("Ensure the default_profile field references an existing profile")
    )]
    MissingDefaultProfile(String),

    #[error("Missing profile: {0}")]
    #[diagnostic(
        code(sqldb_config::missing_profile),
        help("Add the profile to your configuration or use an existing one")
    )]
    MissingProfile(String),

    #[error("Profile `{0}` uses the server backend without a database name")]
    #[diagnostic(
        code(sqldb_config::missing_database_name),
        help("Set `name` in the profile to the schema you want to use")
    )]
    MissingDatabaseName(String),

    #[error("Profile `{profile}` uses the remote transport with host `{host}`")]
    #[diagnostic(
        code(sqldb_config::invalid_remote_host),
        help("The remote transport needs an http:// or https:// endpoint in `host`")
    )]
    InvalidRemoteHost { profile: String, host: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(sqldb_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(sqldb_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
