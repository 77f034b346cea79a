//! Descriptor document parsing and serialization per SCHEMA.md §1-5
//!
//! Documents are YAML (JSON parses through the same path). This module owns
//! the wire shape only: kebab-case column keys, the closed primitive set,
//! and normalization of the `references` sequence-of-single-key-mappings
//! form into one `Reference` record. No I/O happens here; callers hand in
//! the document text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

use super::errors::{SchemaError, SchemaResult};
use super::types::{ColumnDefinition, ColumnType, Reference, TableDefinition, TypeInfo};

/// Default relationship kind when a reference omits `type`
const DEFAULT_REFERENCE_KIND: &str = "association";

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    table: Option<RawTable>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    name: Option<String>,
    columns: Option<Vec<RawColumn>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawColumn {
    name: Option<String>,
    #[serde(rename = "type")]
    column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_info: Option<RawTypeInfo>,
    #[serde(default, skip_serializing_if = "is_false")]
    primary_key: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    record_id: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    nullable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    references: Option<RawReferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    doc: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTypeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u32>,
}

/// The source configurations write references as a sequence of single-key
/// mappings; a plain mapping is accepted too and is what the serializer
/// emits.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawReferences {
    Inline(BTreeMap<String, YamlValue>),
    Entries(Vec<BTreeMap<String, YamlValue>>),
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_true(v: &bool) -> bool {
    *v
}

fn default_true() -> bool {
    true
}

/// Parses a descriptor document into a `TableDefinition`.
///
/// # Errors
///
/// Returns a parse-kind `SchemaError` when the text is not well-formed,
/// when `table.name`, `table.columns`, or a column's `name`/`type` is
/// absent, or when `type` names a primitive outside SCHEMA.md §4.
pub fn parse_document(text: &str) -> SchemaResult<TableDefinition> {
    let raw: RawDocument = serde_yaml::from_str(text)
        .map_err(|e| SchemaError::malformed("document", e.to_string()))?;
    normalize(raw)
}

/// Serializes a definition back to the document shape.
///
/// Re-parsing the output yields an equal (unresolved) definition.
pub fn to_document(definition: &TableDefinition) -> SchemaResult<String> {
    let raw = RawDocument {
        table: Some(RawTable {
            source: if definition.source.is_empty() {
                None
            } else {
                Some(definition.source.clone())
            },
            name: Some(definition.name.clone()),
            columns: Some(definition.columns.iter().map(raw_column).collect()),
        }),
    };
    serde_yaml::to_string(&raw)
        .map_err(|e| SchemaError::malformed(format!("table '{}'", definition.name), e.to_string()))
}

fn normalize(raw: RawDocument) -> SchemaResult<TableDefinition> {
    let table = raw
        .table
        .ok_or_else(|| SchemaError::missing_field("document", "table"))?;

    let name = table
        .name
        .ok_or_else(|| SchemaError::missing_field("table", "name"))?;

    let raw_columns = table
        .columns
        .ok_or_else(|| SchemaError::missing_field(format!("table '{}'", name), "columns"))?;

    let mut columns = Vec::with_capacity(raw_columns.len());
    for (index, raw_column) in raw_columns.into_iter().enumerate() {
        columns.push(normalize_column(&name, index, raw_column)?);
    }

    Ok(TableDefinition {
        source: table.source.unwrap_or_default(),
        name,
        columns,
    })
}

fn normalize_column(
    table: &str,
    index: usize,
    raw: RawColumn,
) -> SchemaResult<ColumnDefinition> {
    let name = raw.name.ok_or_else(|| {
        SchemaError::missing_field(format!("table '{}' column #{}", table, index + 1), "name")
            .with_table(table)
    })?;

    let type_name = raw.column_type.ok_or_else(|| {
        SchemaError::missing_field(format!("table '{}' column '{}'", table, name), "type")
            .with_table(table)
            .with_column(name.clone())
    })?;

    let column_type = ColumnType::parse(&type_name)
        .ok_or_else(|| SchemaError::unknown_type(&name, &type_name).with_table(table))?;

    let references = match raw.references {
        Some(raw_references) => Some(normalize_references(table, &name, raw_references)?),
        None => None,
    };

    Ok(ColumnDefinition {
        name,
        column_type,
        type_info: raw.type_info.map(|info| TypeInfo { length: info.length }),
        primary_key: raw.primary_key,
        record_id: raw.record_id,
        nullable: raw.nullable,
        indexed: raw.indexed,
        references,
        doc: raw.doc,
    })
}

fn normalize_references(
    table: &str,
    column: &str,
    raw: RawReferences,
) -> SchemaResult<Reference> {
    let location = format!("table '{}' column '{}' references", table, column);

    let merged = match raw {
        RawReferences::Inline(mapping) => mapping,
        RawReferences::Entries(entries) => {
            let mut merged = BTreeMap::new();
            for entry in entries {
                for (key, value) in entry {
                    if merged.insert(key.clone(), value).is_some() {
                        return Err(SchemaError::malformed(
                            location.as_str(),
                            format!("key '{}' appears more than once", key),
                        )
                        .with_table(table)
                        .with_column(column));
                    }
                }
            }
            merged
        }
    };

    let mut target: Option<String> = None;
    let mut kind: Option<String> = None;
    let mut foreign_key = false;

    for (key, value) in &merged {
        match key.as_str() {
            "table" => {
                target = Some(expect_string(&location, key, value, table, column)?);
            }
            "type" => {
                kind = Some(expect_string(&location, key, value, table, column)?);
            }
            "foreignkey" => {
                foreign_key = value.as_bool().ok_or_else(|| {
                    SchemaError::malformed(location.as_str(), format!("'{}' must be a boolean", key))
                        .with_table(table)
                        .with_column(column)
                })?;
            }
            other => {
                return Err(SchemaError::malformed(
                    location.as_str(),
                    format!("unknown key '{}'", other),
                )
                .with_table(table)
                .with_column(column));
            }
        }
    }

    let target = target.ok_or_else(|| {
        SchemaError::missing_field(location.as_str(), "table")
            .with_table(table)
            .with_column(column)
    })?;

    Ok(Reference::new(
        target,
        kind.unwrap_or_else(|| DEFAULT_REFERENCE_KIND.to_string()),
        foreign_key,
    ))
}

fn expect_string(
    location: &str,
    key: &str,
    value: &YamlValue,
    table: &str,
    column: &str,
) -> SchemaResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            SchemaError::malformed(location, format!("'{}' must be a string", key))
                .with_table(table)
                .with_column(column)
        })
}

fn raw_column(column: &ColumnDefinition) -> RawColumn {
    RawColumn {
        name: Some(column.name.clone()),
        column_type: Some(column.column_type.type_name().to_string()),
        type_info: column.type_info.as_ref().map(|info| RawTypeInfo {
            length: info.length,
        }),
        primary_key: column.primary_key,
        record_id: column.record_id,
        nullable: column.nullable,
        indexed: column.indexed,
        references: column.references.as_ref().map(|reference| {
            let mut mapping = BTreeMap::new();
            mapping.insert(
                "table".to_string(),
                YamlValue::String(reference.table.clone()),
            );
            mapping.insert(
                "type".to_string(),
                YamlValue::String(reference.kind.clone()),
            );
            mapping.insert("foreignkey".to_string(), YamlValue::Bool(reference.foreign_key));
            RawReferences::Inline(mapping)
        }),
        doc: column.doc.clone(),
    }
}
