//! Error types for descriptor loading and validation
//!
//! Error codes:
//! - TDEF_PARSE_MALFORMED (FATAL)
//! - TDEF_PARSE_MISSING_FIELD (FATAL)
//! - TDEF_PARSE_UNKNOWN_TYPE (FATAL)
//! - TDEF_DUPLICATE_COLUMN (FATAL)
//! - TDEF_MISSING_PRIMARY_KEY / TDEF_DUPLICATE_PRIMARY_KEY (FATAL)
//! - TDEF_MISSING_RECORD_ID / TDEF_DUPLICATE_RECORD_ID (FATAL)
//! - TDEF_NULLABLE_PRIMARY_KEY (FATAL)
//! - TDEF_BAD_TYPE_INFO (FATAL)
//! - TDEF_DUPLICATE_TABLE (FATAL)
//! - TDEF_DANGLING_REFERENCE (FATAL)
//! - TDEF_UNKNOWN_TABLE (REJECT)
//! - TDEF_ROW_REJECTED (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected; the catalog stays up
    Reject,
    /// Catalog load must abort; nothing is published
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Broad error kind: parse-time vs catalog validation vs row rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Document could not be turned into a definition
    Parse,
    /// Definition is structurally parseable but semantically invalid
    Validation,
    /// A row document failed write validation
    Row,
}

/// Closed set of error codes for descriptor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Document is not valid YAML/JSON or has the wrong shape
    ParseMalformed,
    /// A required field is absent
    ParseMissingField,
    /// `type` names a primitive outside the recognized set
    ParseUnknownType,
    /// Two columns in one table share a name
    DuplicateColumn,
    /// No column carries `primary-key: true`
    MissingPrimaryKey,
    /// More than one column carries `primary-key: true`
    DuplicatePrimaryKey,
    /// No column carries `record-id: true`
    MissingRecordId,
    /// More than one column carries `record-id: true`
    DuplicateRecordId,
    /// The primary-key column is nullable
    NullablePrimaryKey,
    /// `type-info` refinement is invalid for the column's type
    BadTypeInfo,
    /// A table with this name is already registered
    DuplicateTable,
    /// A reference targets a table absent from the catalog
    DanglingReference,
    /// Lookup of a table the catalog does not hold
    UnknownTable,
    /// Row document violates the definition
    RowRejected,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::ParseMalformed => "TDEF_PARSE_MALFORMED",
            SchemaErrorCode::ParseMissingField => "TDEF_PARSE_MISSING_FIELD",
            SchemaErrorCode::ParseUnknownType => "TDEF_PARSE_UNKNOWN_TYPE",
            SchemaErrorCode::DuplicateColumn => "TDEF_DUPLICATE_COLUMN",
            SchemaErrorCode::MissingPrimaryKey => "TDEF_MISSING_PRIMARY_KEY",
            SchemaErrorCode::DuplicatePrimaryKey => "TDEF_DUPLICATE_PRIMARY_KEY",
            SchemaErrorCode::MissingRecordId => "TDEF_MISSING_RECORD_ID",
            SchemaErrorCode::DuplicateRecordId => "TDEF_DUPLICATE_RECORD_ID",
            SchemaErrorCode::NullablePrimaryKey => "TDEF_NULLABLE_PRIMARY_KEY",
            SchemaErrorCode::BadTypeInfo => "TDEF_BAD_TYPE_INFO",
            SchemaErrorCode::DuplicateTable => "TDEF_DUPLICATE_TABLE",
            SchemaErrorCode::DanglingReference => "TDEF_DANGLING_REFERENCE",
            SchemaErrorCode::UnknownTable => "TDEF_UNKNOWN_TABLE",
            SchemaErrorCode::RowRejected => "TDEF_ROW_REJECTED",
        }
    }

    /// Returns the broad kind for this code
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaErrorCode::ParseMalformed
            | SchemaErrorCode::ParseMissingField
            | SchemaErrorCode::ParseUnknownType => ErrorKind::Parse,
            SchemaErrorCode::UnknownTable | SchemaErrorCode::RowRejected => ErrorKind::Row,
            _ => ErrorKind::Validation,
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::UnknownTable | SchemaErrorCode::RowRejected => Severity::Reject,
            _ => Severity::Fatal,
        }
    }

    /// Returns the catalog rule violated by this error (SCHEMA.md §6)
    pub fn rule(&self) -> &'static str {
        match self {
            SchemaErrorCode::ParseMalformed
            | SchemaErrorCode::ParseMissingField
            | SchemaErrorCode::ParseUnknownType => "well-formed-document",
            SchemaErrorCode::DuplicateColumn => "unique-column-names",
            SchemaErrorCode::MissingPrimaryKey | SchemaErrorCode::DuplicatePrimaryKey => {
                "single-primary-key"
            }
            SchemaErrorCode::MissingRecordId | SchemaErrorCode::DuplicateRecordId => {
                "single-record-id"
            }
            SchemaErrorCode::NullablePrimaryKey => "non-nullable-primary-key",
            SchemaErrorCode::BadTypeInfo => "string-length-refinement",
            SchemaErrorCode::DuplicateTable => "unique-table-names",
            SchemaErrorCode::DanglingReference | SchemaErrorCode::UnknownTable => {
                "resolvable-references"
            }
            SchemaErrorCode::RowRejected => "required-on-write",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Field-level details for a rejected row
#[derive(Debug, Clone)]
pub struct RowDetails {
    /// Column name
    pub column: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl RowDetails {
    pub fn new(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            expected: "value to be present".into(),
            actual: "missing".into(),
        }
    }

    pub fn undeclared_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            expected: "no undeclared columns".into(),
            actual: "undeclared column present".into(),
        }
    }

    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn null_value(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            expected: "non-null value".into(),
            actual: "null".into(),
        }
    }
}

impl fmt::Display for RowDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}': expected {}, got {}",
            self.column, self.expected, self.actual
        )
    }
}

/// Schema error with full context
#[derive(Debug)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Table name if applicable
    table: Option<String>,
    /// Column name if applicable
    column: Option<String>,
    /// Row details if applicable
    details: Option<RowDetails>,
}

impl SchemaError {
    /// Create a malformed-document error
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::ParseMalformed,
            message: format!("Malformed descriptor {}: {}", context.into(), reason.into()),
            table: None,
            column: None,
            details: None,
        }
    }

    /// Create a missing-field error; `location` names the table or column
    pub fn missing_field(location: impl Into<String>, field: &str) -> Self {
        Self {
            code: SchemaErrorCode::ParseMissingField,
            message: format!("{}: required field '{}' is absent", location.into(), field),
            table: None,
            column: None,
            details: None,
        }
    }

    /// Create an unknown-primitive error
    pub fn unknown_type(column: impl Into<String>, found: impl Into<String>) -> Self {
        let col = column.into();
        Self {
            code: SchemaErrorCode::ParseUnknownType,
            message: format!(
                "column '{}': '{}' is not a recognized primitive type",
                col,
                found.into()
            ),
            table: None,
            column: Some(col),
            details: None,
        }
    }

    /// Create a definition-validation error against a named table
    pub fn invalid_definition(
        code: SchemaErrorCode,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let name = table.into();
        Self {
            code,
            message: format!("table '{}': {}", name, message.into()),
            table: Some(name),
            column: None,
            details: None,
        }
    }

    /// Create a duplicate-table error
    pub fn duplicate_table(table: impl Into<String>) -> Self {
        let name = table.into();
        Self {
            code: SchemaErrorCode::DuplicateTable,
            message: format!("table '{}' is already registered", name),
            table: Some(name),
            column: None,
            details: None,
        }
    }

    /// Create a dangling-reference error
    pub fn dangling_reference(
        table: impl Into<String>,
        column: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let table = table.into();
        let column = column.into();
        Self {
            code: SchemaErrorCode::DanglingReference,
            message: format!(
                "table '{}' column '{}' references unknown table '{}'",
                table,
                column,
                target.into()
            ),
            table: Some(table),
            column: Some(column),
            details: None,
        }
    }

    /// Create an unknown-table error
    pub fn unknown_table(table: impl Into<String>) -> Self {
        let name = table.into();
        Self {
            code: SchemaErrorCode::UnknownTable,
            message: format!("table '{}' is not in the catalog", name),
            table: Some(name),
            column: None,
            details: None,
        }
    }

    /// Create a row-rejected error
    pub fn row_rejected(table: impl Into<String>, details: RowDetails) -> Self {
        let name = table.into();
        Self {
            code: SchemaErrorCode::RowRejected,
            message: format!("row rejected for table '{}': {}", name, details),
            table: Some(name),
            column: Some(details.column.clone()),
            details: Some(details),
        }
    }

    /// Attaches column context to an error built without it
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Attaches table context to an error built without it
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the broad error kind
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the violated rule name
    pub fn rule(&self) -> &'static str {
        self.code.rule()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the column name if applicable
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns row details if applicable
    pub fn details(&self) -> Option<&RowDetails> {
        self.details.as_ref()
    }

    /// Returns whether this error aborts a catalog load
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} [rule: {}]",
            self.code.severity(),
            self.code.code(),
            self.message,
            self.code.rule()
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
