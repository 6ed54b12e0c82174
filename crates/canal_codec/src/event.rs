//! Change events consumed by the encoder.
//!
//! Events are produced upstream and are read-only here. A row event's kind
//! is derived from which images it carries:
//!
//! | `pre_columns` | `columns` | kind   |
//! |---------------|-----------|--------|
//! | none          | some      | Insert |
//! | some          | some      | Update |
//! | some          | none      | Delete |

use serde::{Deserialize, Serialize};

/// Fully qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TableName {
    /// Schema (database) name.
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Upstream table id.
    #[serde(default)]
    pub table_id: i64,
}

impl TableName {
    /// Creates a table name with a zero table id.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            table_id: 0,
        }
    }

    /// Sets the table id.
    #[must_use]
    pub fn with_table_id(mut self, table_id: i64) -> Self {
        self.table_id = table_id;
        self
    }
}

/// MySQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// TINYINT.
    Tiny,
    /// SMALLINT.
    Short,
    /// MEDIUMINT.
    Int24,
    /// INT.
    Long,
    /// BIGINT.
    LongLong,
    /// FLOAT.
    Float,
    /// DOUBLE.
    Double,
    /// DECIMAL.
    Decimal,
    /// VARCHAR / VARBINARY.
    Varchar,
    /// CHAR / BINARY.
    String,
    /// TEXT / BLOB family.
    Blob,
    /// DATE.
    Date,
    /// DATETIME.
    Datetime,
    /// TIMESTAMP.
    Timestamp,
    /// TIME.
    Time,
    /// YEAR.
    Year,
    /// BIT.
    Bit,
    /// JSON.
    Json,
    /// ENUM.
    Enum,
    /// SET.
    Set,
}

/// Column attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFlags {
    /// Column is the row handle.
    pub handle_key: bool,
    /// Column is part of the primary key.
    pub primary_key: bool,
    /// Column accepts NULL.
    pub nullable: bool,
    /// Column holds binary data.
    pub binary: bool,
    /// Numeric column is unsigned.
    pub unsigned: bool,
}

/// A column value as captured upstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnValue {
    /// SQL NULL.
    #[default]
    Null,
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    #[serde(rename = "uint")]
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// Text, including decimals and temporal values in their string form.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl ColumnValue {
    /// Returns true for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

/// One column of a row image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    pub kind: ColumnKind,
    /// Value.
    #[serde(default)]
    pub value: ColumnValue,
    /// Attribute flags.
    #[serde(default)]
    pub flags: ColumnFlags,
}

impl Column {
    /// Creates a column with no flags set.
    pub fn new(name: impl Into<String>, kind: ColumnKind, value: ColumnValue) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            flags: ColumnFlags::default(),
        }
    }

    /// Marks the column as handle and primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.flags.handle_key = true;
        self.flags.primary_key = true;
        self
    }

    /// Marks the column as binary.
    #[must_use]
    pub fn binary(mut self) -> Self {
        self.flags.binary = true;
        self
    }

    /// Marks the column as unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.flags.unsigned = true;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.flags.nullable = true;
        self
    }

    /// Returns true if the column identifies the row.
    pub fn is_key(&self) -> bool {
        self.flags.handle_key || self.flags.primary_key
    }
}

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Row was inserted.
    Insert,
    /// Row was updated.
    Update,
    /// Row was deleted.
    Delete,
}

/// A committed row change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowChangedEvent {
    /// Commit timestamp (TSO).
    pub commit_ts: u64,
    /// Table the row belongs to.
    pub table: TableName,
    /// After image.
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
    /// Before image.
    #[serde(default)]
    pub pre_columns: Option<Vec<Column>>,
}

impl RowChangedEvent {
    /// Creates an insert event.
    pub fn insert(commit_ts: u64, table: TableName, columns: Vec<Column>) -> Self {
        Self {
            commit_ts,
            table,
            columns: Some(columns),
            pre_columns: None,
        }
    }

    /// Creates an update event.
    pub fn update(
        commit_ts: u64,
        table: TableName,
        pre_columns: Vec<Column>,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            commit_ts,
            table,
            columns: Some(columns),
            pre_columns: Some(pre_columns),
        }
    }

    /// Creates a delete event.
    pub fn delete(commit_ts: u64, table: TableName, pre_columns: Vec<Column>) -> Self {
        Self {
            commit_ts,
            table,
            columns: None,
            pre_columns: Some(pre_columns),
        }
    }

    /// Returns the change kind, or `None` if the event carries no image.
    pub fn kind(&self) -> Option<RowKind> {
        match (&self.pre_columns, &self.columns) {
            (None, Some(_)) => Some(RowKind::Insert),
            (Some(_), Some(_)) => Some(RowKind::Update),
            (Some(_), None) => Some(RowKind::Delete),
            (None, None) => None,
        }
    }
}

/// Kind of DDL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlKind {
    /// CREATE DATABASE.
    CreateSchema,
    /// DROP DATABASE.
    DropSchema,
    /// CREATE TABLE.
    CreateTable,
    /// DROP TABLE.
    DropTable,
    /// TRUNCATE TABLE.
    TruncateTable,
    /// RENAME TABLE.
    RenameTable,
    /// ALTER TABLE ... ADD COLUMN.
    AddColumn,
    /// ALTER TABLE ... DROP COLUMN.
    DropColumn,
    /// ALTER TABLE ... MODIFY COLUMN.
    ModifyColumn,
    /// CREATE INDEX.
    AddIndex,
    /// DROP INDEX.
    DropIndex,
    /// Anything else.
    Other,
}

/// A committed DDL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdlEvent {
    /// Commit timestamp (TSO).
    pub commit_ts: u64,
    /// Statement text.
    pub query: String,
    /// Statement kind.
    pub kind: DdlKind,
    /// Table the statement applies to. The table part is empty for schema DDL.
    pub table: TableName,
    /// Schema version after the statement.
    #[serde(default)]
    pub schema_version: u64,
}

impl DdlEvent {
    /// Creates a DDL event.
    pub fn new(commit_ts: u64, kind: DdlKind, table: TableName, query: impl Into<String>) -> Self {
        Self {
            commit_ts,
            query: query.into(),
            kind,
            table,
            schema_version: 0,
        }
    }
}

/// Any event in an upstream change stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Row change.
    Row(RowChangedEvent),
    /// Schema change.
    Ddl(DdlEvent),
    /// Resolved timestamp watermark.
    Checkpoint(u64),
}
