//! Catalog construction and descriptor directory loading per SCHEMA.md §7
//!
//! A catalog is loaded in one pass: parse every descriptor, register each
//! table, then resolve references. Any failure aborts the whole load; the
//! caller never observes a partial catalog. A published catalog is treated
//! as immutable and replaced wholesale on reload.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::document;
use super::errors::{SchemaError, SchemaErrorCode, SchemaResult};
use super::types::{Reference, TableDefinition};
use super::validator::check_table;

/// Descriptor file extensions the loader picks up
const DESCRIPTOR_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Name-keyed collection of table definitions, the schema namespace.
///
/// Iteration order is the table-name order, so output and error reporting
/// are deterministic.
#[derive(Debug, Default)]
pub struct TableCatalog {
    tables: BTreeMap<String, TableDefinition>,
}

impl TableCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition after checking the intra-table rules.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule from `check_table`, or
    /// `TDEF_DUPLICATE_TABLE` when the name is already taken.
    pub fn register(&mut self, definition: TableDefinition) -> SchemaResult<()> {
        check_table(&definition)?;

        if self.tables.contains_key(&definition.name) {
            return Err(SchemaError::duplicate_table(&definition.name));
        }

        self.tables.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Resolves every reference in the catalog.
    ///
    /// Each reference is rewritten with the target table's primary-key
    /// column, so consumers navigate relationships without re-parsing.
    ///
    /// # Errors
    ///
    /// Returns `TDEF_DANGLING_REFERENCE` naming the table, column, and
    /// missing target on the first unresolvable reference.
    pub fn resolve_references(&mut self) -> SchemaResult<()> {
        let mut resolutions: Vec<(String, String, String)> = Vec::new();

        for definition in self.tables.values() {
            for (column, reference) in definition.referencing_columns() {
                let target = self.tables.get(&reference.table).ok_or_else(|| {
                    SchemaError::dangling_reference(
                        &definition.name,
                        &column.name,
                        &reference.table,
                    )
                })?;

                // Registration guarantees exactly one primary key.
                let target_key = target.primary_key_column().ok_or_else(|| {
                    SchemaError::invalid_definition(
                        SchemaErrorCode::MissingPrimaryKey,
                        &target.name,
                        "no column is marked primary-key",
                    )
                })?;

                resolutions.push((
                    definition.name.clone(),
                    column.name.clone(),
                    target_key.name.clone(),
                ));
            }
        }

        for (table, column, target_key) in resolutions {
            if let Some(definition) = self.tables.get_mut(&table) {
                if let Some(column) = definition.columns.iter_mut().find(|c| c.name == column) {
                    if let Some(reference) = column.references.as_mut() {
                        reference.target_key = Some(target_key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Looks up a table by name.
    pub fn get(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.get(name)
    }

    /// Returns whether a table with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Follows a reference to its target definition.
    pub fn target_of(&self, reference: &Reference) -> Option<&TableDefinition> {
        self.tables.get(&reference.table)
    }

    /// Iterates all definitions in table-name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDefinition> {
        self.tables.values()
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns whether the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Loads every descriptor under a schema directory into a catalog.
pub struct SchemaLoader {
    schema_dir: PathBuf,
}

impl SchemaLoader {
    /// Creates a loader for the given schema directory.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads, validates, and resolves every descriptor in the directory.
    ///
    /// All-or-nothing: the catalog is returned only when every descriptor
    /// parsed, registered, and resolved.
    pub fn load_all(&self) -> SchemaResult<TableCatalog> {
        if !self.schema_dir.is_dir() {
            return Err(SchemaError::malformed(
                self.schema_dir.display().to_string(),
                "schema directory does not exist",
            ));
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(
                self.schema_dir.display().to_string(),
                format!("failed to read schema directory: {}", e),
            )
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    self.schema_dir.display().to_string(),
                    format!("failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            let is_descriptor = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| DESCRIPTOR_EXTENSIONS.contains(&ext))
                .unwrap_or(false);
            if is_descriptor {
                paths.push(path);
            }
        }
        // Deterministic registration and error order regardless of readdir order.
        paths.sort();

        let mut catalog = TableCatalog::new();
        for path in &paths {
            let definition = self.load_descriptor_file(path)?;
            catalog.register(definition)?;
        }

        catalog.resolve_references()?;
        Ok(catalog)
    }

    fn load_descriptor_file(&self, path: &Path) -> SchemaResult<TableDefinition> {
        let text = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(
                path.display().to_string(),
                format!("failed to read file: {}", e),
            )
        })?;
        document::parse_document(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ColumnDefinition, ColumnType};
    use std::fs;
    use tempfile::TempDir;

    fn issues_definition() -> TableDefinition {
        TableDefinition::new(
            "tracker",
            "issues",
            vec![ColumnDefinition::new("issue_id", ColumnType::String)
                .primary_key()
                .record_id()],
        )
    }

    fn comments_definition() -> TableDefinition {
        TableDefinition::new(
            "tracker",
            "comments",
            vec![
                ColumnDefinition::new("comment_id", ColumnType::String)
                    .primary_key()
                    .record_id(),
                ColumnDefinition::new("issue_id", ColumnType::String)
                    .not_null()
                    .references("issues", "owner", true),
            ],
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = TableCatalog::new();
        catalog.register(issues_definition()).unwrap();

        assert!(catalog.contains("issues"));
        assert_eq!(catalog.get("issues").unwrap().name, "issues");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let mut catalog = TableCatalog::new();
        catalog.register(issues_definition()).unwrap();

        let err = catalog.register(issues_definition()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DuplicateTable);
        assert_eq!(err.rule(), "unique-table-names");
    }

    #[test]
    fn test_register_runs_table_checks() {
        let mut catalog = TableCatalog::new();
        let no_pk = TableDefinition::new(
            "tracker",
            "broken",
            vec![ColumnDefinition::new("title", ColumnType::String)],
        );
        let err = catalog.register(no_pk).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MissingPrimaryKey);
    }

    #[test]
    fn test_resolve_references() {
        let mut catalog = TableCatalog::new();
        catalog.register(issues_definition()).unwrap();
        catalog.register(comments_definition()).unwrap();

        catalog.resolve_references().unwrap();

        let comments = catalog.get("comments").unwrap();
        let reference = comments.column("issue_id").unwrap().references.as_ref().unwrap();
        assert!(reference.is_resolved());
        assert_eq!(reference.target_key.as_deref(), Some("issue_id"));

        let target = catalog.target_of(reference).unwrap();
        assert_eq!(target.name, "issues");
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut catalog = TableCatalog::new();
        catalog.register(comments_definition()).unwrap();

        let err = catalog.resolve_references().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DanglingReference);
        assert_eq!(err.table(), Some("comments"));
        assert_eq!(err.column(), Some("issue_id"));
        assert!(err.message().contains("issues"));
    }

    #[test]
    fn test_self_reference_resolves() {
        let mut catalog = TableCatalog::new();
        let issues = TableDefinition::new(
            "tracker",
            "issues",
            vec![
                ColumnDefinition::new("issue_id", ColumnType::String)
                    .primary_key()
                    .record_id(),
                ColumnDefinition::new("parent_id", ColumnType::String).references(
                    "issues",
                    "parent",
                    true,
                ),
            ],
        );
        catalog.register(issues).unwrap();
        catalog.resolve_references().unwrap();

        let reference = catalog
            .get("issues")
            .unwrap()
            .column("parent_id")
            .unwrap()
            .references
            .as_ref()
            .unwrap();
        assert_eq!(reference.target_key.as_deref(), Some("issue_id"));
    }

    #[test]
    fn test_load_all_from_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("issues.yaml"),
            "
table:
  source: tracker
  name: issues
  columns:
    - name: issue_id
      type: String
      primary-key: true
      record-id: true
      nullable: false
",
        )
        .unwrap();
        fs::write(
            tmp.path().join("comments.yaml"),
            "
table:
  source: tracker
  name: comments
  columns:
    - name: comment_id
      type: String
      primary-key: true
      record-id: true
      nullable: false
    - name: issue_id
      type: String
      nullable: false
      references:
        - table: issues
        - type: owner
        - foreignkey: true
",
        )
        .unwrap();
        // Non-descriptor files are skipped.
        fs::write(tmp.path().join("notes.txt"), "not a descriptor").unwrap();

        let catalog = SchemaLoader::new(tmp.path()).load_all().unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog
            .get("comments")
            .unwrap()
            .column("issue_id")
            .unwrap()
            .references
            .as_ref()
            .unwrap()
            .is_resolved());
    }

    #[test]
    fn test_load_all_is_all_or_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("issues.yaml"),
            "
table:
  name: issues
  columns:
    - name: issue_id
      type: String
      primary-key: true
      record-id: true
      nullable: false
",
        )
        .unwrap();
        fs::write(
            tmp.path().join("broken.yaml"),
            "
table:
  name: broken
  columns:
    - type: String
",
        )
        .unwrap();

        let err = SchemaLoader::new(tmp.path()).load_all().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ParseMissingField);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_directory_rejected() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent");
        let err = SchemaLoader::new(&missing).load_all().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ParseMalformed);
    }

    #[test]
    fn test_empty_directory_yields_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        let catalog = SchemaLoader::new(tmp.path()).load_all().unwrap();
        assert!(catalog.is_empty());
    }
}
