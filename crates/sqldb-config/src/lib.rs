pub mod config;
pub mod database;
pub mod error;

pub use database::{BackendKind, DatabaseConfig, Transport};

#[cfg(test)]
pub mod test_utils;
