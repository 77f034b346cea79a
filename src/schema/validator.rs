//! Definition and row validation per SCHEMA.md §6
//!
//! `check_table` enforces the intra-table catalog rules at registration
//! time. `RowValidator` enforces required-on-write before the consumer
//! writes a row:
//! - every `nullable: false` column carries a non-null value
//! - no undeclared columns (strict mode)
//! - value types exactly match column types, no coercion
//! - String length refinements are honored
//! - DateTime values are RFC 3339
//!
//! Validation is deterministic and never mutates the row.

use std::collections::HashSet;

use serde_json::Value;

use super::errors::{RowDetails, SchemaError, SchemaErrorCode, SchemaResult};
use super::loader::TableCatalog;
use super::types::{ColumnDefinition, ColumnType, TableDefinition};

/// Checks the intra-table rules of SCHEMA.md §6.
///
/// Run by `TableCatalog::register`; cross-table rules (unique table names,
/// resolvable references) belong to the catalog.
pub fn check_table(definition: &TableDefinition) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for column in &definition.columns {
        if !seen.insert(column.name.as_str()) {
            return Err(SchemaError::invalid_definition(
                SchemaErrorCode::DuplicateColumn,
                &definition.name,
                format!("column '{}' is defined more than once", column.name),
            ));
        }
    }

    let primary_keys: Vec<&ColumnDefinition> = definition
        .columns
        .iter()
        .filter(|c| c.primary_key)
        .collect();
    match primary_keys.as_slice() {
        [] => {
            return Err(SchemaError::invalid_definition(
                SchemaErrorCode::MissingPrimaryKey,
                &definition.name,
                "no column is marked primary-key",
            ));
        }
        [primary] => {
            if primary.nullable {
                return Err(SchemaError::invalid_definition(
                    SchemaErrorCode::NullablePrimaryKey,
                    &definition.name,
                    format!("primary-key column '{}' must not be nullable", primary.name),
                ));
            }
        }
        many => {
            let names: Vec<&str> = many.iter().map(|c| c.name.as_str()).collect();
            return Err(SchemaError::invalid_definition(
                SchemaErrorCode::DuplicatePrimaryKey,
                &definition.name,
                format!("columns {} are all marked primary-key", names.join(", ")),
            ));
        }
    }

    let record_ids: Vec<&str> = definition
        .columns
        .iter()
        .filter(|c| c.record_id)
        .map(|c| c.name.as_str())
        .collect();
    match record_ids.as_slice() {
        [] => {
            return Err(SchemaError::invalid_definition(
                SchemaErrorCode::MissingRecordId,
                &definition.name,
                "no column is marked record-id",
            ));
        }
        [_] => {}
        many => {
            return Err(SchemaError::invalid_definition(
                SchemaErrorCode::DuplicateRecordId,
                &definition.name,
                format!("columns {} are all marked record-id", many.join(", ")),
            ));
        }
    }

    for column in &definition.columns {
        if let Some(length) = column.max_length() {
            if column.column_type != ColumnType::String {
                return Err(SchemaError::invalid_definition(
                    SchemaErrorCode::BadTypeInfo,
                    &definition.name,
                    format!(
                        "column '{}': length refinement is only valid on String, not {}",
                        column.name,
                        column.column_type.type_name()
                    ),
                ));
            }
            if length == 0 {
                return Err(SchemaError::invalid_definition(
                    SchemaErrorCode::BadTypeInfo,
                    &definition.name,
                    format!("column '{}': length refinement must be positive", column.name),
                ));
            }
        }
    }

    Ok(())
}

/// Validates row documents against registered definitions.
///
/// Rows are JSON objects keyed by column name. The validator borrows the
/// catalog and never mutates rows.
pub struct RowValidator<'a> {
    catalog: &'a TableCatalog,
    strict: bool,
}

impl<'a> RowValidator<'a> {
    /// Creates a strict validator: undeclared columns are rejected.
    pub fn new(catalog: &'a TableCatalog) -> Self {
        Self {
            catalog,
            strict: true,
        }
    }

    /// Allows columns the definition does not declare.
    pub fn allow_undeclared(mut self) -> Self {
        self.strict = false;
        self
    }

    /// Validates a row for insertion into the named table.
    ///
    /// # Errors
    ///
    /// Returns `TDEF_UNKNOWN_TABLE` when the catalog has no such table and
    /// `TDEF_ROW_REJECTED` with column-level details on any rule violation.
    pub fn validate_insert(&self, table: &str, row: &Value) -> SchemaResult<()> {
        let definition = self
            .catalog
            .get(table)
            .ok_or_else(|| SchemaError::unknown_table(table))?;

        let row_object = row.as_object().ok_or_else(|| {
            SchemaError::row_rejected(
                table,
                RowDetails::type_mismatch("$root", "object", json_type_name(row)),
            )
        })?;

        if self.strict {
            for key in row_object.keys() {
                if definition.column(key).is_none() {
                    return Err(SchemaError::row_rejected(
                        table,
                        RowDetails::undeclared_column(key),
                    ));
                }
            }
        }

        for column in &definition.columns {
            match row_object.get(&column.name) {
                Some(Value::Null) | None => {
                    if !column.nullable {
                        let details = match row_object.get(&column.name) {
                            Some(_) => RowDetails::null_value(&column.name),
                            None => RowDetails::missing_column(&column.name),
                        };
                        return Err(SchemaError::row_rejected(table, details));
                    }
                }
                Some(value) => check_value(table, column, value)?,
            }
        }

        Ok(())
    }
}

fn check_value(table: &str, column: &ColumnDefinition, value: &Value) -> SchemaResult<()> {
    let mismatch = || {
        SchemaError::row_rejected(
            table,
            RowDetails::type_mismatch(
                &column.name,
                column.column_type.type_name(),
                json_type_name(value),
            ),
        )
    };

    match column.column_type {
        ColumnType::String => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if let Some(max) = column.max_length() {
                let length = text.chars().count();
                if length > max as usize {
                    return Err(SchemaError::row_rejected(
                        table,
                        RowDetails::new(
                            &column.name,
                            format!("String of at most {} characters", max),
                            format!("{} characters", length),
                        ),
                    ));
                }
            }
        }
        ColumnType::Int => {
            if !value.is_i64() && !value.is_u64() {
                return Err(mismatch());
            }
        }
        ColumnType::Float => {
            if !value.is_number() {
                return Err(mismatch());
            }
        }
        ColumnType::Bool => {
            if !value.is_boolean() {
                return Err(mismatch());
            }
        }
        ColumnType::DateTime => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if chrono::DateTime::parse_from_rfc3339(text).is_err() {
                return Err(SchemaError::row_rejected(
                    table,
                    RowDetails::new(
                        &column.name,
                        "RFC 3339 DateTime",
                        format!("'{}'", text),
                    ),
                ));
            }
        }
    }

    Ok(())
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "Bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "Int"
            } else {
                "Float"
            }
        }
        Value::String(_) => "String",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
