//! Table descriptor subsystem for tabledef
//!
//! Per SCHEMA.md, descriptors are declarative table definitions consumed by
//! an external provisioning/query layer.
//!
//! # Design Principles
//!
//! - Load is all-or-nothing; no partial catalog is ever published
//! - A published catalog is immutable and replaced wholesale on reload
//! - Every error names the violated rule, table, and column
//! - Deterministic validation and iteration order

mod document;
mod errors;
mod loader;
mod types;
mod validator;

pub use document::{parse_document, to_document};
pub use errors::{ErrorKind, RowDetails, SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{SchemaLoader, TableCatalog};
pub use types::{ColumnDefinition, ColumnType, Reference, TableDefinition, TypeInfo};
pub use validator::{check_table, RowValidator};
