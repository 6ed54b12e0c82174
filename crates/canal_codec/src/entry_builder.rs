//! Conversion of change events into Canal entries.

use crate::config::DEFAULT_SERVER_ENCODING;
use crate::error::{CodecError, CodecResult};
use crate::event::{Column, ColumnKind, ColumnValue, DdlEvent, DdlKind, RowChangedEvent, RowKind};
use canal_proto::{
    Entry, EntryType, EventType, Header, Pair, RowChange, RowData, SourceType, HEADER_VERSION,
};
use prost::Message;

/// Number of logical bits in a TSO timestamp.
const TSO_LOGICAL_BITS: u32 = 18;

/// `java.sql.Types` codes used in `Column.sqlType`.
mod java_type {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const BIGINT: i32 = -5;
    pub const VARBINARY: i32 = -3;
    pub const BINARY: i32 = -2;
    pub const CHAR: i32 = 1;
    pub const DECIMAL: i32 = 3;
    pub const INTEGER: i32 = 4;
    pub const SMALLINT: i32 = 5;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const VARCHAR: i32 = 12;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const BLOB: i32 = 2004;
    pub const CLOB: i32 = 2005;
}

/// Converts change events into protocol entries.
///
/// Implementations are pure: no state, no side effects beyond returning an
/// error for events they cannot represent.
pub trait EntryBuilder {
    /// Builds the entry for a row change.
    fn from_row_event(&self, event: &RowChangedEvent) -> CodecResult<Entry>;

    /// Builds the entry for a DDL statement.
    fn from_ddl_event(&self, event: &DdlEvent) -> CodecResult<Entry>;
}

/// The stock Canal entry builder.
#[derive(Debug, Clone)]
pub struct CanalEntryBuilder {
    server_encoding: String,
}

impl CanalEntryBuilder {
    /// Creates a builder announcing UTF-8 text.
    pub fn new() -> Self {
        Self {
            server_encoding: DEFAULT_SERVER_ENCODING.to_string(),
        }
    }

    /// Sets the encoding written into entry headers.
    #[must_use]
    pub fn with_server_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.server_encoding = encoding.into();
        self
    }

    fn build_header(
        &self,
        commit_ts: u64,
        schema: &str,
        table: &str,
        event_type: EventType,
        rows_count: Option<usize>,
    ) -> Header {
        let props = rows_count
            .map(|n| vec![Pair::new("rowsCount", n.to_string())])
            .unwrap_or_default();

        Header {
            version: Some(HEADER_VERSION),
            serveren_code: self.server_encoding.clone(),
            execute_time: physical_millis(commit_ts),
            source_type: Some(SourceType::Mysql as i32),
            schema_name: schema.to_string(),
            table_name: table.to_string(),
            event_type: Some(event_type as i32),
            props,
            ..Default::default()
        }
    }

    fn build_row_data(&self, event: &RowChangedEvent) -> CodecResult<RowData> {
        let before_columns = match &event.pre_columns {
            Some(columns) => build_columns(columns, false)?,
            None => Vec::new(),
        };
        let after_columns = match &event.columns {
            Some(columns) => build_columns(columns, true)?,
            None => Vec::new(),
        };

        Ok(RowData {
            before_columns,
            after_columns,
            props: Vec::new(),
        })
    }
}

impl Default for CanalEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryBuilder for CanalEntryBuilder {
    fn from_row_event(&self, event: &RowChangedEvent) -> CodecResult<Entry> {
        let kind = event.kind().ok_or_else(|| {
            CodecError::conversion_failed(format!(
                "row event for {}.{} carries neither columns nor pre-columns",
                event.table.schema, event.table.table
            ))
        })?;
        let event_type = match kind {
            RowKind::Insert => EventType::Insert,
            RowKind::Update => EventType::Update,
            RowKind::Delete => EventType::Delete,
        };

        let row_change = RowChange {
            table_id: event.table.table_id,
            event_type: Some(event_type as i32),
            is_ddl: false,
            row_datas: vec![self.build_row_data(event)?],
            ..Default::default()
        };
        let header = self.build_header(
            event.commit_ts,
            &event.table.schema,
            &event.table.table,
            event_type,
            Some(1),
        );

        Ok(Entry {
            header: Some(header),
            entry_type: Some(EntryType::RowData as i32),
            store_value: row_change.encode_to_vec(),
        })
    }

    fn from_ddl_event(&self, event: &DdlEvent) -> CodecResult<Entry> {
        if event.query.trim().is_empty() {
            return Err(CodecError::conversion_failed(format!(
                "DDL event for {}.{} has an empty query",
                event.table.schema, event.table.table
            )));
        }

        let event_type = ddl_event_type(event.kind);
        let row_change = RowChange {
            table_id: event.table.table_id,
            event_type: Some(event_type as i32),
            is_ddl: true,
            sql: event.query.clone(),
            ddl_schema_name: event.table.schema.clone(),
            ..Default::default()
        };
        let header = self.build_header(
            event.commit_ts,
            &event.table.schema,
            &event.table.table,
            event_type,
            None,
        );

        Ok(Entry {
            header: Some(header),
            entry_type: Some(EntryType::RowData as i32),
            store_value: row_change.encode_to_vec(),
        })
    }
}

/// Milliseconds since the Unix epoch encoded in the physical part of a TSO.
pub fn physical_millis(ts: u64) -> i64 {
    (ts >> TSO_LOGICAL_BITS) as i64
}

fn ddl_event_type(kind: DdlKind) -> EventType {
    match kind {
        DdlKind::CreateTable => EventType::Create,
        DdlKind::DropTable => EventType::Erase,
        DdlKind::TruncateTable => EventType::Truncate,
        DdlKind::RenameTable => EventType::Rename,
        DdlKind::AddIndex => EventType::Cindex,
        DdlKind::DropIndex => EventType::Dindex,
        DdlKind::AddColumn | DdlKind::DropColumn | DdlKind::ModifyColumn => EventType::Alter,
        DdlKind::CreateSchema | DdlKind::DropSchema | DdlKind::Other => EventType::Query,
    }
}

fn build_columns(columns: &[Column], updated: bool) -> CodecResult<Vec<canal_proto::Column>> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| build_column(index, column, updated))
        .collect()
}

fn build_column(index: usize, column: &Column, updated: bool) -> CodecResult<canal_proto::Column> {
    let value = format_value(column)?;
    let index = i32::try_from(index)
        .map_err(|_| CodecError::conversion_failed("too many columns in row"))?;

    Ok(canal_proto::Column {
        index,
        sql_type: java_sql_type(column),
        name: column.name.clone(),
        is_key: column.is_key(),
        updated,
        is_null: Some(column.value.is_null()),
        value,
        mysql_type: mysql_type(column),
        ..Default::default()
    })
}

fn format_value(column: &Column) -> CodecResult<String> {
    let text = match &column.value {
        ColumnValue::Null => String::new(),
        ColumnValue::Int(v) => v.to_string(),
        ColumnValue::UInt(v) => v.to_string(),
        ColumnValue::Float(v) => {
            if !v.is_finite() {
                return Err(CodecError::conversion_failed(format!(
                    "column {} holds a non-finite float",
                    column.name
                )));
            }
            v.to_string()
        }
        ColumnValue::Text(s) => s.clone(),
        // Binary values travel as ISO-8859-1 text, one char per byte.
        ColumnValue::Bytes(b) if column.flags.binary => b.iter().map(|&c| char::from(c)).collect(),
        ColumnValue::Bytes(b) => String::from_utf8(b.clone()).map_err(|e| {
            CodecError::conversion_failed(format!(
                "column {} is not valid UTF-8: {}",
                column.name, e
            ))
        })?,
    };
    Ok(text)
}

fn java_sql_type(column: &Column) -> i32 {
    let flags = column.flags;
    match column.kind {
        ColumnKind::Tiny if flags.unsigned && exceeds_signed(&column.value, i8::MAX as u64) => {
            java_type::SMALLINT
        }
        ColumnKind::Tiny => java_type::TINYINT,
        ColumnKind::Short if flags.unsigned && exceeds_signed(&column.value, i16::MAX as u64) => {
            java_type::INTEGER
        }
        ColumnKind::Short => java_type::SMALLINT,
        ColumnKind::Int24 | ColumnKind::Long
            if flags.unsigned && exceeds_signed(&column.value, i32::MAX as u64) =>
        {
            java_type::BIGINT
        }
        ColumnKind::Int24 | ColumnKind::Long => java_type::INTEGER,
        ColumnKind::LongLong
            if flags.unsigned && exceeds_signed(&column.value, i64::MAX as u64) =>
        {
            java_type::DECIMAL
        }
        ColumnKind::LongLong => java_type::BIGINT,
        ColumnKind::Float => java_type::REAL,
        ColumnKind::Double => java_type::DOUBLE,
        ColumnKind::Decimal => java_type::DECIMAL,
        ColumnKind::Varchar if flags.binary => java_type::VARBINARY,
        ColumnKind::Varchar => java_type::VARCHAR,
        ColumnKind::String if flags.binary => java_type::BINARY,
        ColumnKind::String => java_type::CHAR,
        ColumnKind::Blob if flags.binary => java_type::BLOB,
        ColumnKind::Blob => java_type::CLOB,
        ColumnKind::Date => java_type::DATE,
        ColumnKind::Datetime | ColumnKind::Timestamp => java_type::TIMESTAMP,
        ColumnKind::Time => java_type::TIME,
        ColumnKind::Year | ColumnKind::Json => java_type::VARCHAR,
        ColumnKind::Bit | ColumnKind::Set => java_type::BIT,
        ColumnKind::Enum => java_type::INTEGER,
    }
}

fn exceeds_signed(value: &ColumnValue, signed_max: u64) -> bool {
    matches!(value, ColumnValue::UInt(v) if *v > signed_max)
}

fn mysql_type(column: &Column) -> String {
    let flags = column.flags;
    let name = match column.kind {
        ColumnKind::Tiny => "tinyint",
        ColumnKind::Short => "smallint",
        ColumnKind::Int24 => "mediumint",
        ColumnKind::Long => "int",
        ColumnKind::LongLong => "bigint",
        ColumnKind::Float => "float",
        ColumnKind::Double => "double",
        ColumnKind::Decimal => "decimal",
        ColumnKind::Varchar if flags.binary => "varbinary",
        ColumnKind::Varchar => "varchar",
        ColumnKind::String if flags.binary => "binary",
        ColumnKind::String => "char",
        ColumnKind::Blob if flags.binary => "blob",
        ColumnKind::Blob => "text",
        ColumnKind::Date => "date",
        ColumnKind::Datetime => "datetime",
        ColumnKind::Timestamp => "timestamp",
        ColumnKind::Time => "time",
        ColumnKind::Year => "year",
        ColumnKind::Bit => "bit",
        ColumnKind::Json => "json",
        ColumnKind::Enum => "enum",
        ColumnKind::Set => "set",
    };

    let numeric = matches!(
        column.kind,
        ColumnKind::Tiny
            | ColumnKind::Short
            | ColumnKind::Int24
            | ColumnKind::Long
            | ColumnKind::LongLong
            | ColumnKind::Float
            | ColumnKind::Double
            | ColumnKind::Decimal
    );
    if numeric && flags.unsigned {
        format!("{name} unsigned")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TableName;

    fn users() -> TableName {
        TableName::new("app", "users").with_table_id(12)
    }

    fn id(v: i64) -> Column {
        Column::new("id", ColumnKind::LongLong, ColumnValue::Int(v)).primary_key()
    }

    fn name(v: &str) -> Column {
        Column::new("name", ColumnKind::Varchar, ColumnValue::Text(v.into()))
    }

    #[test]
    fn insert_entry() {
        let ts = (1_700_000_000_000u64 << 18) | 5;
        let event = RowChangedEvent::insert(ts, users(), vec![id(1), name("alice")]);
        let entry = CanalEntryBuilder::new().from_row_event(&event).unwrap();

        assert_eq!(entry.entry_type, Some(EntryType::RowData as i32));
        let header = entry.header.clone().unwrap();
        assert_eq!(header.version, Some(1));
        assert_eq!(header.schema_name, "app");
        assert_eq!(header.table_name, "users");
        assert_eq!(header.execute_time, 1_700_000_000_000);
        assert_eq!(header.serveren_code, "UTF-8");
        assert_eq!(header.source_type, Some(SourceType::Mysql as i32));
        assert_eq!(header.event_type, Some(EventType::Insert as i32));
        assert_eq!(header.props, vec![Pair::new("rowsCount", "1")]);

        let rc = entry.row_change().unwrap();
        assert!(!rc.is_ddl);
        assert_eq!(rc.table_id, 12);
        assert_eq!(rc.row_datas.len(), 1);
        let row = &rc.row_datas[0];
        assert!(row.before_columns.is_empty());
        assert_eq!(row.after_columns.len(), 2);

        let id_col = &row.after_columns[0];
        assert_eq!(id_col.index, 0);
        assert_eq!(id_col.name, "id");
        assert_eq!(id_col.value, "1");
        assert!(id_col.is_key);
        assert!(id_col.updated);
        assert_eq!(id_col.is_null, Some(false));
        assert_eq!(id_col.sql_type, java_type::BIGINT);
        assert_eq!(id_col.mysql_type, "bigint");

        let name_col = &row.after_columns[1];
        assert_eq!(name_col.index, 1);
        assert_eq!(name_col.value, "alice");
        assert!(!name_col.is_key);
        assert_eq!(name_col.sql_type, java_type::VARCHAR);
    }

    #[test]
    fn update_and_delete_images() {
        let builder = CanalEntryBuilder::new();

        let update = RowChangedEvent::update(1, users(), vec![id(1), name("a")], vec![id(1), name("b")]);
        let rc = builder.from_row_event(&update).unwrap().row_change().unwrap();
        assert_eq!(rc.event_type, Some(EventType::Update as i32));
        let row = &rc.row_datas[0];
        assert_eq!(row.before_columns.len(), 2);
        assert_eq!(row.after_columns.len(), 2);
        assert!(row.before_columns.iter().all(|c| !c.updated));
        assert!(row.after_columns.iter().all(|c| c.updated));
        assert_eq!(row.before_columns[1].value, "a");
        assert_eq!(row.after_columns[1].value, "b");

        let delete = RowChangedEvent::delete(1, users(), vec![id(9)]);
        let rc = builder.from_row_event(&delete).unwrap().row_change().unwrap();
        assert_eq!(rc.event_type, Some(EventType::Delete as i32));
        assert_eq!(rc.row_datas[0].before_columns[0].value, "9");
        assert!(rc.row_datas[0].after_columns.is_empty());
    }

    #[test]
    fn row_without_images_fails() {
        let event = RowChangedEvent {
            commit_ts: 1,
            table: users(),
            columns: None,
            pre_columns: None,
        };
        let err = CanalEntryBuilder::new().from_row_event(&event).unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn null_and_binary_values() {
        let event = RowChangedEvent::insert(
            1,
            users(),
            vec![
                Column::new("note", ColumnKind::Blob, ColumnValue::Null).nullable(),
                Column::new("raw", ColumnKind::Blob, ColumnValue::Bytes(vec![0x41, 0xE9, 0xFF])).binary(),
                Column::new("txt", ColumnKind::Blob, ColumnValue::Bytes(b"hi".to_vec())),
            ],
        );
        let rc = CanalEntryBuilder::new().from_row_event(&event).unwrap().row_change().unwrap();
        let cols = &rc.row_datas[0].after_columns;

        assert_eq!(cols[0].is_null, Some(true));
        assert_eq!(cols[0].value, "");
        assert_eq!(cols[0].mysql_type, "text");
        assert_eq!(cols[0].sql_type, java_type::CLOB);

        assert_eq!(cols[1].value, "A\u{e9}\u{ff}");
        assert_eq!(cols[1].mysql_type, "blob");
        assert_eq!(cols[1].sql_type, java_type::BLOB);

        assert_eq!(cols[2].value, "hi");
    }

    #[test]
    fn invalid_text_bytes_fail() {
        let event = RowChangedEvent::insert(
            1,
            users(),
            vec![Column::new("txt", ColumnKind::Varchar, ColumnValue::Bytes(vec![0xC3, 0x28]))],
        );
        assert!(CanalEntryBuilder::new().from_row_event(&event).unwrap_err().is_conversion());
    }

    #[test]
    fn non_finite_float_fails() {
        let event = RowChangedEvent::insert(
            1,
            users(),
            vec![Column::new("f", ColumnKind::Double, ColumnValue::Float(f64::NAN))],
        );
        assert!(CanalEntryBuilder::new().from_row_event(&event).is_err());
    }

    #[test]
    fn unsigned_promotion() {
        let big = Column::new("u", ColumnKind::LongLong, ColumnValue::UInt(u64::MAX)).unsigned();
        assert_eq!(java_sql_type(&big), java_type::DECIMAL);
        assert_eq!(mysql_type(&big), "bigint unsigned");

        let small = Column::new("u", ColumnKind::LongLong, ColumnValue::UInt(3)).unsigned();
        assert_eq!(java_sql_type(&small), java_type::BIGINT);

        let tiny = Column::new("t", ColumnKind::Tiny, ColumnValue::UInt(200)).unsigned();
        assert_eq!(java_sql_type(&tiny), java_type::SMALLINT);
    }

    #[test]
    fn ddl_entry() {
        let event = DdlEvent::new(
            5 << 18,
            DdlKind::CreateTable,
            users(),
            "CREATE TABLE users (id BIGINT PRIMARY KEY)",
        );
        let entry = CanalEntryBuilder::new()
            .with_server_encoding("GBK")
            .from_ddl_event(&event)
            .unwrap();

        let header = entry.header.clone().unwrap();
        assert_eq!(header.execute_time, 5);
        assert_eq!(header.serveren_code, "GBK");
        assert_eq!(header.event_type, Some(EventType::Create as i32));
        assert!(header.props.is_empty());

        let rc = entry.row_change().unwrap();
        assert!(rc.is_ddl);
        assert_eq!(rc.sql, "CREATE TABLE users (id BIGINT PRIMARY KEY)");
        assert_eq!(rc.ddl_schema_name, "app");
        assert!(rc.row_datas.is_empty());
    }

    #[test]
    fn ddl_event_types() {
        assert_eq!(ddl_event_type(DdlKind::DropTable), EventType::Erase);
        assert_eq!(ddl_event_type(DdlKind::TruncateTable), EventType::Truncate);
        assert_eq!(ddl_event_type(DdlKind::RenameTable), EventType::Rename);
        assert_eq!(ddl_event_type(DdlKind::AddIndex), EventType::Cindex);
        assert_eq!(ddl_event_type(DdlKind::DropIndex), EventType::Dindex);
        assert_eq!(ddl_event_type(DdlKind::ModifyColumn), EventType::Alter);
        assert_eq!(ddl_event_type(DdlKind::CreateSchema), EventType::Query);
        assert_eq!(ddl_event_type(DdlKind::Other), EventType::Query);
    }

    #[test]
    fn empty_ddl_query_fails() {
        let event = DdlEvent::new(1, DdlKind::Other, users(), "  ");
        assert!(CanalEntryBuilder::new().from_ddl_event(&event).unwrap_err().is_conversion());
    }
}
