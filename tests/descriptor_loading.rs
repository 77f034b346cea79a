//! Descriptor loading scenarios
//!
//! End-to-end loads of the issue-tracker descriptors: parse from disk,
//! register, resolve, and round-trip back through the document shape.

use std::fs;

use tabledef::schema::{parse_document, to_document, SchemaLoader, TableCatalog};
use tempfile::TempDir;

const ISSUES_DESCRIPTOR: &str = "
table:
  source: tracker
  name: issues
  columns:
    - name: issue_id
      type: String
      type-info: { length: 40 }
      primary-key: true
      record-id: true
      nullable: false
      indexed: true
      doc: Stable identifier assigned at creation.
    - name: title
      type: String
      type-info: { length: 200 }
      nullable: false
    - name: description
      type: String
      type-info: { length: 4000 }
    - name: status
      type: String
      type-info: { length: 32 }
      nullable: false
      indexed: true
    - name: priority
      type: String
      type-info: { length: 16 }
      indexed: true
    - name: issue_type
      type: String
      type-info: { length: 32 }
    - name: reporter
      type: String
      type-info: { length: 64 }
      nullable: false
    - name: assignee
      type: String
      type-info: { length: 64 }
      indexed: true
    - name: project
      type: String
      type-info: { length: 64 }
      nullable: false
      indexed: true
    - name: resolution
      type: String
      type-info: { length: 64 }
    - name: created_at
      type: DateTime
      nullable: false
      indexed: true
    - name: updated_at
      type: DateTime
      nullable: false
    - name: closed_at
      type: DateTime
";

const COMMENTS_DESCRIPTOR: &str = "
table:
  source: tracker
  name: comments
  columns:
    - name: comment_id
      type: String
      type-info: { length: 40 }
      primary-key: true
      record-id: true
      nullable: false
      indexed: true
    - name: issue_id
      type: String
      type-info: { length: 40 }
      nullable: false
      indexed: true
      references:
        - table: issues
        - type: owner
        - foreignkey: true
      doc: Owning issue of this comment.
    - name: author
      type: String
      type-info: { length: 64 }
      nullable: false
    - name: body
      type: String
      type-info: { length: 2000 }
      nullable: false
    - name: created_at
      type: DateTime
      nullable: false
";

fn write_descriptors(tmp: &TempDir) {
    fs::write(tmp.path().join("issues.yaml"), ISSUES_DESCRIPTOR).unwrap();
    fs::write(tmp.path().join("comments.yaml"), COMMENTS_DESCRIPTOR).unwrap();
}

#[test]
fn test_issues_descriptor_shape() {
    let issues = parse_document(ISSUES_DESCRIPTOR).unwrap();

    assert_eq!(issues.source, "tracker");
    assert_eq!(issues.columns.len(), 13);
    assert_eq!(issues.primary_key_column().unwrap().name, "issue_id");
    assert_eq!(issues.record_id_column().unwrap().name, "issue_id");
    assert_eq!(issues.referencing_columns().count(), 0);

    let indexed: Vec<&str> = issues.indexed_columns().map(|c| c.name.as_str()).collect();
    assert_eq!(
        indexed,
        vec![
            "issue_id",
            "status",
            "priority",
            "assignee",
            "project",
            "created_at"
        ]
    );
}

#[test]
fn test_comments_descriptor_shape() {
    let comments = parse_document(COMMENTS_DESCRIPTOR).unwrap();

    assert_eq!(comments.columns.len(), 5);
    assert_eq!(comments.primary_key_column().unwrap().name, "comment_id");

    let reference = comments
        .column("issue_id")
        .unwrap()
        .references
        .as_ref()
        .unwrap();
    assert_eq!(reference.table, "issues");
    assert_eq!(reference.kind, "owner");
    assert!(reference.foreign_key);
    assert!(!reference.is_resolved());
}

#[test]
fn test_load_tracker_catalog_from_disk() {
    let tmp = TempDir::new().unwrap();
    write_descriptors(&tmp);

    let catalog = SchemaLoader::new(tmp.path()).load_all().unwrap();
    assert_eq!(catalog.len(), 2);

    let issues = catalog.get("issues").unwrap();
    assert_eq!(issues.columns.len(), 13);

    let comments = catalog.get("comments").unwrap();
    let reference = comments
        .column("issue_id")
        .unwrap()
        .references
        .as_ref()
        .unwrap();
    assert!(reference.is_resolved());
    assert_eq!(reference.target_key.as_deref(), Some("issue_id"));
    assert_eq!(catalog.target_of(reference).unwrap().name, "issues");
}

#[test]
fn test_comments_alone_fail_to_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("comments.yaml"), COMMENTS_DESCRIPTOR).unwrap();

    let err = SchemaLoader::new(tmp.path()).load_all().unwrap_err();
    assert_eq!(err.rule(), "resolvable-references");
    assert!(err.is_fatal());
}

#[test]
fn test_parse_then_register_succeeds_for_valid_documents() {
    let mut catalog = TableCatalog::new();
    catalog
        .register(parse_document(ISSUES_DESCRIPTOR).unwrap())
        .unwrap();
    catalog
        .register(parse_document(COMMENTS_DESCRIPTOR).unwrap())
        .unwrap();
    catalog.resolve_references().unwrap();

    for table in catalog.tables() {
        assert!(table.primary_key_column().is_some());
    }
}

#[test]
fn test_round_trip_issues() {
    let issues = parse_document(ISSUES_DESCRIPTOR).unwrap();
    let reparsed = parse_document(&to_document(&issues).unwrap()).unwrap();
    assert_eq!(issues, reparsed);
}

#[test]
fn test_round_trip_comments() {
    let comments = parse_document(COMMENTS_DESCRIPTOR).unwrap();
    let reparsed = parse_document(&to_document(&comments).unwrap()).unwrap();
    assert_eq!(comments, reparsed);
}

#[test]
fn test_reload_replaces_catalog_wholesale() {
    let tmp = TempDir::new().unwrap();
    write_descriptors(&tmp);

    let loader = SchemaLoader::new(tmp.path());
    let first = loader.load_all().unwrap();
    assert_eq!(first.len(), 2);

    // Drop a descriptor and reload; the new catalog reflects only what is
    // on disk now, and the dangling reference aborts the load.
    fs::remove_file(tmp.path().join("issues.yaml")).unwrap();
    let err = loader.load_all().unwrap_err();
    assert!(err.is_fatal());

    // The previously published catalog is untouched by the failed reload.
    assert_eq!(first.len(), 2);
    assert!(first.contains("issues"));
}
