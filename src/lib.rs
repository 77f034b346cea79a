//! tabledef - loader and validator for declarative table-schema descriptors
//!
//! Parses descriptor documents (SCHEMA.md) into table definitions, enforces
//! the catalog rules, resolves cross-table references, and publishes an
//! immutable catalog for an external provisioning/query layer.

pub mod cli;
pub mod observability;
pub mod schema;
