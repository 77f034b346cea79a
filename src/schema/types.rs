//! Table definition model per SCHEMA.md
//!
//! Primitive types (SCHEMA.md §4):
//! - String: UTF-8 string, optional length refinement
//! - Int: 64-bit signed integer
//! - Float: 64-bit floating point
//! - Bool: Boolean
//! - DateTime: RFC 3339 timestamp

use serde::{Deserialize, Serialize};

/// Supported column types as defined in SCHEMA.md §4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// RFC 3339 timestamp
    DateTime,
}

impl ColumnType {
    /// Parses a primitive name from a descriptor document.
    ///
    /// The set is closed; anything unrecognized is a parse failure.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "String" => Some(ColumnType::String),
            "Int" => Some(ColumnType::Int),
            "Float" => Some(ColumnType::Float),
            "Bool" => Some(ColumnType::Bool),
            "DateTime" => Some(ColumnType::DateTime),
            _ => None,
        }
    }

    /// Returns the type name for documents and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::String => "String",
            ColumnType::Int => "Int",
            ColumnType::Float => "Float",
            ColumnType::Bool => "Bool",
            ColumnType::DateTime => "DateTime",
        }
    }
}

/// Optional type refinement (SCHEMA.md §3)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Maximum length, String columns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl TypeInfo {
    /// Length refinement for a String column
    pub fn length(length: u32) -> Self {
        Self {
            length: Some(length),
        }
    }
}

/// Relationship descriptor (SCHEMA.md §5)
///
/// `target_key` is filled in by reference resolution and never appears in
/// the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Target table name
    pub table: String,
    /// Relationship kind, e.g. "owner"
    pub kind: String,
    /// Whether the column is a foreign key into the target
    pub foreign_key: bool,
    /// Primary-key column of the target table, set by resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_key: Option<String>,
}

impl Reference {
    /// Creates an unresolved reference
    pub fn new(table: impl Into<String>, kind: impl Into<String>, foreign_key: bool) -> Self {
        Self {
            table: table.into(),
            kind: kind.into(),
            foreign_key,
            target_key: None,
        }
    }

    /// Returns whether resolution has recorded the target key
    pub fn is_resolved(&self) -> bool {
        self.target_key.is_some()
    }
}

/// A single column of a table definition (SCHEMA.md §3)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name, unique within the table
    pub name: String,
    /// Primitive type
    pub column_type: ColumnType,
    /// Optional refinement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_info: Option<TypeInfo>,
    /// At most one column per table
    #[serde(default)]
    pub primary_key: bool,
    /// Canonical record identifier; independent of `primary_key`
    #[serde(default)]
    pub record_id: bool,
    /// Defaults to true; false makes the column mandatory on write
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Consumer should build a lookup index
    #[serde(default)]
    pub indexed: bool,
    /// Optional relationship to another table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Reference>,
    /// Human-readable description, no runtime effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    /// Creates a nullable, unindexed column of the given type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            type_info: None,
            primary_key: false,
            record_id: false,
            nullable: true,
            indexed: false,
            references: None,
            doc: None,
        }
    }

    /// Marks the column as the table's primary key (implies non-nullable)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column as the canonical record identifier
    pub fn record_id(mut self) -> Self {
        self.record_id = true;
        self
    }

    /// Makes the column mandatory on write
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Requests a lookup index from the consumer
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Attaches a length refinement
    pub fn length(mut self, length: u32) -> Self {
        self.type_info = Some(TypeInfo::length(length));
        self
    }

    /// Attaches a relationship to another table
    pub fn references(
        mut self,
        table: impl Into<String>,
        kind: impl Into<String>,
        foreign_key: bool,
    ) -> Self {
        self.references = Some(Reference::new(table, kind, foreign_key));
        self
    }

    /// Attaches a description
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Maximum length refinement, if any
    pub fn max_length(&self) -> Option<u32> {
        self.type_info.as_ref().and_then(|info| info.length)
    }
}

/// Complete table definition (SCHEMA.md §1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Opaque datastore alias, resolved externally
    #[serde(default)]
    pub source: String,
    /// Table name, unique within the catalog
    pub name: String,
    /// Ordered column definitions; order matters for display/creation only
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// Creates a new table definition
    pub fn new(
        source: impl Into<String>,
        name: impl Into<String>,
        columns: Vec<ColumnDefinition>,
    ) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            columns,
        }
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the primary-key column, if the definition carries exactly one
    pub fn primary_key_column(&self) -> Option<&ColumnDefinition> {
        let mut found = self.columns.iter().filter(|c| c.primary_key);
        let first = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Returns the record-id column, if the definition carries exactly one
    pub fn record_id_column(&self) -> Option<&ColumnDefinition> {
        let mut found = self.columns.iter().filter(|c| c.record_id);
        let first = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Columns that are mandatory on write (`nullable: false`)
    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| !c.nullable)
    }

    /// Columns carrying an outgoing reference
    pub fn referencing_columns(&self) -> impl Iterator<Item = (&ColumnDefinition, &Reference)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref().map(|r| (c, r)))
    }

    /// Columns the consumer should index
    pub fn indexed_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TableDefinition {
        TableDefinition::new(
            "tracker",
            "issues",
            vec![
                ColumnDefinition::new("issue_id", ColumnType::String)
                    .length(40)
                    .primary_key()
                    .record_id()
                    .indexed(),
                ColumnDefinition::new("title", ColumnType::String)
                    .length(200)
                    .not_null(),
                ColumnDefinition::new("created_at", ColumnType::DateTime).not_null(),
                ColumnDefinition::new("closed_at", ColumnType::DateTime),
            ],
        )
    }

    #[test]
    fn test_type_name_round_trips() {
        for t in [
            ColumnType::String,
            ColumnType::Int,
            ColumnType::Float,
            ColumnType::Bool,
            ColumnType::DateTime,
        ] {
            assert_eq!(ColumnType::parse(t.type_name()), Some(t));
        }
    }

    #[test]
    fn test_unrecognized_type_rejected() {
        assert_eq!(ColumnType::parse("Blob"), None);
        assert_eq!(ColumnType::parse("string"), None);
        assert_eq!(ColumnType::parse(""), None);
    }

    #[test]
    fn test_primary_key_implies_non_nullable() {
        let col = ColumnDefinition::new("id", ColumnType::String).primary_key();
        assert!(col.primary_key);
        assert!(!col.nullable);
    }

    #[test]
    fn test_column_lookup() {
        let table = sample_table();
        assert!(table.column("title").is_some());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_primary_key_column() {
        let table = sample_table();
        assert_eq!(table.primary_key_column().unwrap().name, "issue_id");
        assert_eq!(table.record_id_column().unwrap().name, "issue_id");
    }

    #[test]
    fn test_primary_key_column_none_on_duplicates() {
        let table = TableDefinition::new(
            "tracker",
            "broken",
            vec![
                ColumnDefinition::new("a", ColumnType::String).primary_key(),
                ColumnDefinition::new("b", ColumnType::String).primary_key(),
            ],
        );
        assert!(table.primary_key_column().is_none());
    }

    #[test]
    fn test_required_columns() {
        let table = sample_table();
        let required: Vec<_> = table.required_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(required, vec!["issue_id", "title", "created_at"]);
    }

    #[test]
    fn test_reference_resolution_flag() {
        let mut reference = Reference::new("issues", "owner", true);
        assert!(!reference.is_resolved());
        reference.target_key = Some("issue_id".into());
        assert!(reference.is_resolved());
    }

    #[test]
    fn test_max_length() {
        let table = sample_table();
        assert_eq!(table.column("title").unwrap().max_length(), Some(200));
        assert_eq!(table.column("closed_at").unwrap().max_length(), None);
    }
}
