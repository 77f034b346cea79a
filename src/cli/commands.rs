//! CLI command implementations
//!
//! Each command loads the configuration, builds the catalog from the schema
//! directory, and reports through the JSON I/O layer. Catalog-load failures
//! are FATAL: the command logs the violated rule and exits non-zero without
//! publishing anything.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::observability::Logger;
use crate::schema::{RowValidator, SchemaLoader, TableCatalog};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the table descriptors (required)
    pub schema_dir: String,

    /// Reject row columns the definition does not declare (default true)
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config(format!("failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config(format!("invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_dir.is_empty() {
            return Err(CliError::config("schema_dir must not be empty"));
        }
        Ok(())
    }
}

/// Parses arguments and dispatches to the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Runs a single CLI command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Check { config } => check(&config),
        Command::Show { config, table } => show(&config, &table),
        Command::Validate { config, table } => validate(&config, &table),
    }
}

/// Load, validate, and resolve every descriptor; print a summary.
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let catalog = load_catalog(&config)?;

    let tables: Vec<serde_json::Value> = catalog
        .tables()
        .map(|table| {
            json!({
                "name": table.name,
                "columns": table.columns.len(),
                "references": table.referencing_columns().count(),
            })
        })
        .collect();

    write_response(json!({
        "schema_dir": config.schema_dir,
        "tables": tables,
    }))
}

/// Print one resolved definition as JSON.
pub fn show(config_path: &Path, table: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let catalog = load_catalog(&config)?;

    let definition = catalog
        .get(table)
        .ok_or_else(|| crate::schema::SchemaError::unknown_table(table))?;

    write_response(serde_json::to_value(definition)?)
}

/// Validate one row document from stdin against a table definition.
///
/// Row rejections are REJECT severity: the outcome is reported as an error
/// response, and the command itself succeeds.
pub fn validate(config_path: &Path, table: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let catalog = load_catalog(&config)?;

    let validator = if config.strict {
        RowValidator::new(&catalog)
    } else {
        RowValidator::new(&catalog).allow_undeclared()
    };

    let row = read_request()?;
    match validator.validate_insert(table, &row) {
        Ok(()) => write_response(json!({ "table": table, "valid": true })),
        Err(e) if !e.is_fatal() => {
            Logger::warn(
                "ROW_REJECTED",
                &[
                    ("table", table),
                    ("code", e.code().code()),
                    ("rule", e.rule()),
                ],
            );
            write_error(e.code().code(), e.message())
        }
        Err(e) => Err(e.into()),
    }
}

fn load_catalog(config: &Config) -> CliResult<TableCatalog> {
    let loader = SchemaLoader::new(&config.schema_dir);
    match loader.load_all() {
        Ok(catalog) => {
            for table in catalog.tables() {
                Logger::trace(
                    "TABLE_LOADED",
                    &[
                        ("table", &table.name),
                        ("columns", &table.columns.len().to_string()),
                    ],
                );
            }
            Logger::info(
                "CATALOG_PUBLISHED",
                &[
                    ("schema_dir", &config.schema_dir),
                    ("tables", &catalog.len().to_string()),
                ],
            );
            Ok(catalog)
        }
        Err(e) => {
            Logger::fatal(
                "CATALOG_LOAD_FAILED",
                &[
                    ("schema_dir", config.schema_dir.as_str()),
                    ("code", e.code().code()),
                    ("rule", e.rule()),
                    ("table", e.table().unwrap_or("")),
                    ("column", e.column().unwrap_or("")),
                ],
            );
            Err(e.into())
        }
    }
}
