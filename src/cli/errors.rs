//! CLI error types

use thiserror::Error;

use crate::schema::SchemaError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("TDEF_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    #[error("TDEF_CLI_IO_ERROR: {0}")]
    Io(String),

    #[error("{0}")]
    Schema(#[from] SchemaError),
}

impl CliError {
    /// Config error
    pub fn config(message: impl Into<String>) -> Self {
        CliError::Config(message.into())
    }

    /// I/O error
    pub fn io(message: impl Into<String>) -> Self {
        CliError::Io(message.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}
