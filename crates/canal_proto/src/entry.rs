//! Entry schema: one change event in Canal's native representation.
//!
//! Tag numbers follow `EntryProtocol.proto`.

use crate::error::ProtoResult;
use prost::Message;

/// Version written into every entry header.
pub const HEADER_VERSION: i32 = 1;

/// A single change event.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Entry {
    /// Event metadata.
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    /// Entry kind.
    #[prost(enumeration = "EntryType", optional, tag = "2")]
    pub entry_type: Option<i32>,
    /// Serialized [`RowChange`] for `EntryType::RowData`.
    #[prost(bytes = "vec", tag = "3")]
    pub store_value: Vec<u8>,
}

impl Entry {
    /// Decodes the [`RowChange`] stored in this entry.
    pub fn row_change(&self) -> ProtoResult<RowChange> {
        Ok(RowChange::decode(self.store_value.as_slice())?)
    }
}

/// Event metadata shared by row and DDL entries.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Header {
    /// Header version.
    #[prost(int32, optional, tag = "1")]
    pub version: Option<i32>,
    /// Binlog file name.
    #[prost(string, tag = "2")]
    pub logfile_name: String,
    /// Binlog offset.
    #[prost(int64, tag = "3")]
    pub logfile_offset: i64,
    /// Server id.
    #[prost(int64, tag = "4")]
    pub server_id: i64,
    /// Character encoding of text values.
    #[prost(string, tag = "5")]
    pub serveren_code: String,
    /// Commit time in milliseconds since the Unix epoch.
    #[prost(int64, tag = "6")]
    pub execute_time: i64,
    /// Source database flavour.
    #[prost(enumeration = "SourceType", optional, tag = "7")]
    pub source_type: Option<i32>,
    /// Schema name.
    #[prost(string, tag = "8")]
    pub schema_name: String,
    /// Table name.
    #[prost(string, tag = "9")]
    pub table_name: String,
    /// Event length.
    #[prost(int64, tag = "10")]
    pub event_length: i64,
    /// Event kind.
    #[prost(enumeration = "EventType", optional, tag = "11")]
    pub event_type: Option<i32>,
    /// Free-form properties.
    #[prost(message, repeated, tag = "12")]
    pub props: Vec<Pair>,
    /// GTID.
    #[prost(string, tag = "13")]
    pub gtid: String,
}

/// A single column image.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Column {
    /// Column position.
    #[prost(int32, tag = "1")]
    pub index: i32,
    /// `java.sql.Types` code.
    #[prost(int32, tag = "2")]
    pub sql_type: i32,
    /// Column name.
    #[prost(string, tag = "3")]
    pub name: String,
    /// Part of the key.
    #[prost(bool, tag = "4")]
    pub is_key: bool,
    /// Changed by this event.
    #[prost(bool, tag = "5")]
    pub updated: bool,
    /// SQL NULL.
    #[prost(bool, optional, tag = "6")]
    pub is_null: Option<bool>,
    /// Free-form properties.
    #[prost(message, repeated, tag = "7")]
    pub props: Vec<Pair>,
    /// Value rendered as text.
    #[prost(string, tag = "8")]
    pub value: String,
    /// Value length.
    #[prost(int32, tag = "9")]
    pub length: i32,
    /// MySQL type name.
    #[prost(string, tag = "10")]
    pub mysql_type: String,
}

/// Before and after images of one row.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RowData {
    /// Columns before the change.
    #[prost(message, repeated, tag = "1")]
    pub before_columns: Vec<Column>,
    /// Columns after the change.
    #[prost(message, repeated, tag = "2")]
    pub after_columns: Vec<Column>,
    /// Free-form properties.
    #[prost(message, repeated, tag = "3")]
    pub props: Vec<Pair>,
}

/// Payload of a `RowData` entry: either row images or a DDL statement.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RowChange {
    /// Table id.
    #[prost(int64, tag = "1")]
    pub table_id: i64,
    /// Event kind.
    #[prost(enumeration = "EventType", optional, tag = "2")]
    pub event_type: Option<i32>,
    /// Set for DDL statements.
    #[prost(bool, tag = "10")]
    pub is_ddl: bool,
    /// DDL statement text.
    #[prost(string, tag = "11")]
    pub sql: String,
    /// Row images.
    #[prost(message, repeated, tag = "12")]
    pub row_datas: Vec<RowData>,
    /// Free-form properties.
    #[prost(message, repeated, tag = "13")]
    pub props: Vec<Pair>,
    /// Schema the DDL ran in.
    #[prost(string, tag = "14")]
    pub ddl_schema_name: String,
}

/// Key/value property.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Pair {
    /// Key.
    #[prost(string, tag = "1")]
    pub key: String,
    /// Value.
    #[prost(string, tag = "2")]
    pub value: String,
}

impl Pair {
    /// Creates a property pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Entry kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EntryType {
    /// proto2 compatibility placeholder.
    CompatibleProto2 = 0,
    /// Transaction begin marker.
    TransactionBegin = 1,
    /// Row data or DDL.
    RowData = 2,
    /// Transaction end marker.
    TransactionEnd = 3,
    /// Heartbeat.
    Heartbeat = 4,
    /// GTID log event.
    GtidLog = 5,
}

/// Event kind carried in headers and row changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    /// proto2 compatibility placeholder.
    CompatibleProto2 = 0,
    /// Row insert.
    Insert = 1,
    /// Row update.
    Update = 2,
    /// Row delete.
    Delete = 3,
    /// CREATE TABLE.
    Create = 4,
    /// ALTER TABLE.
    Alter = 5,
    /// DROP TABLE.
    Erase = 6,
    /// Any other statement.
    Query = 7,
    /// TRUNCATE TABLE.
    Truncate = 8,
    /// RENAME TABLE.
    Rename = 9,
    /// CREATE INDEX.
    Cindex = 10,
    /// DROP INDEX.
    Dindex = 11,
    /// GTID.
    Gtid = 12,
    /// XA commit.
    Xacommit = 13,
    /// XA rollback.
    Xarollback = 14,
    /// Master heartbeat.
    Mheartbeat = 15,
}

impl EventType {
    /// Upper-case name as it appears in the proto file.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CompatibleProto2 => "EVENTTYPECOMPATIBLEPROTO2",
            EventType::Insert => "INSERT",
            EventType::Update => "UPDATE",
            EventType::Delete => "DELETE",
            EventType::Create => "CREATE",
            EventType::Alter => "ALTER",
            EventType::Erase => "ERASE",
            EventType::Query => "QUERY",
            EventType::Truncate => "TRUNCATE",
            EventType::Rename => "RENAME",
            EventType::Cindex => "CINDEX",
            EventType::Dindex => "DINDEX",
            EventType::Gtid => "GTID",
            EventType::Xacommit => "XACOMMIT",
            EventType::Xarollback => "XAROLLBACK",
            EventType::Mheartbeat => "MHEARTBEAT",
        }
    }
}

/// Source database flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SourceType {
    /// proto2 compatibility placeholder.
    CompatibleProto2 = 0,
    /// Oracle.
    Oracle = 1,
    /// MySQL.
    Mysql = 2,
    /// PostgreSQL.
    Pgsql = 3,
}
