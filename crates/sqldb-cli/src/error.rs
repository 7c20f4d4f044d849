use miette::Diagnostic;
use sqldb::DbError;
use sqldb_config::error::ConfigError;
use sqldb_utils::error::PathError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid path: {0}")]
    #[diagnostic(code(sqldb_cli::path))]
    Path(#[from] PathError),

    #[error("Invalid filter `{0}`")]
    #[diagnostic(
        code(sqldb_cli::invalid_filter),
        help("Write filters as `column operator value`, e.g. `Name = Ben` or `Age >= 18`")
    )]
    InvalidFilter(String),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(sqldb_cli::json))]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
