//! CLI argument definitions using clap
//!
//! Commands:
//! - tabledef check --config <path>
//! - tabledef show --config <path> --table <name>
//! - tabledef validate --config <path> --table <name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabledef - loader and validator for declarative table-schema descriptors
#[derive(Parser, Debug)]
#[command(name = "tabledef")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, validate, and resolve every descriptor in the schema directory
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./tabledef.json")]
        config: PathBuf,
    },

    /// Print one resolved table definition as JSON
    Show {
        /// Path to configuration file
        #[arg(long, default_value = "./tabledef.json")]
        config: PathBuf,

        /// Table name
        #[arg(long)]
        table: String,
    },

    /// Validate a row document from stdin against a table definition
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./tabledef.json")]
        config: PathBuf,

        /// Table name
        #[arg(long)]
        table: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
