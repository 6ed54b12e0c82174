//! Property-based test generators using proptest.
//!
//! Generated events are always accepted by the stock entry builder.

use canal_codec::{
    ChangeEvent, Column, ColumnFlags, ColumnKind, ColumnValue, DdlEvent, DdlKind,
    RowChangedEvent, TableName,
};
use proptest::prelude::*;

/// Strategy for generating identifiers.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating table names.
pub fn table_name_strategy() -> impl Strategy<Value = TableName> {
    (identifier_strategy(), identifier_strategy(), any::<u16>())
        .prop_map(|(schema, table, id)| TableName::new(schema, table).with_table_id(i64::from(id)))
}

/// Strategy for generating a column with a value that fits its kind.
pub fn column_strategy() -> impl Strategy<Value = Column> {
    let value_and_kind = prop_oneof![
        any::<i64>().prop_map(|v| (ColumnKind::LongLong, ColumnValue::Int(v), false, false)),
        any::<u64>().prop_map(|v| (ColumnKind::LongLong, ColumnValue::UInt(v), false, true)),
        (-1.0e9f64..1.0e9f64).prop_map(|v| (ColumnKind::Double, ColumnValue::Float(v), false, false)),
        ".{0,32}".prop_map(|v| (ColumnKind::Varchar, ColumnValue::Text(v), false, false)),
        prop::collection::vec(any::<u8>(), 0..32)
            .prop_map(|v| (ColumnKind::Blob, ColumnValue::Bytes(v), true, false)),
        Just((ColumnKind::Datetime, ColumnValue::Null, false, false)),
    ];

    (identifier_strategy(), value_and_kind, any::<bool>()).prop_map(
        |(name, (kind, value, binary, unsigned), key)| Column {
            name,
            kind,
            value,
            flags: ColumnFlags {
                handle_key: key,
                primary_key: key,
                nullable: true,
                binary,
                unsigned,
            },
        },
    )
}

/// Strategy for generating a row image.
pub fn columns_strategy() -> impl Strategy<Value = Vec<Column>> {
    prop::collection::vec(column_strategy(), 1..6)
}

/// Strategy for generating insert, update and delete events.
pub fn row_event_strategy() -> impl Strategy<Value = RowChangedEvent> {
    (
        any::<u64>(),
        table_name_strategy(),
        columns_strategy(),
        columns_strategy(),
        0..3u8,
    )
        .prop_map(|(ts, table, before, after, kind)| match kind {
            0 => RowChangedEvent::insert(ts, table, after),
            1 => RowChangedEvent::update(ts, table, before, after),
            _ => RowChangedEvent::delete(ts, table, before),
        })
}

/// Strategy for generating DDL kinds.
pub fn ddl_kind_strategy() -> impl Strategy<Value = DdlKind> {
    prop_oneof![
        Just(DdlKind::CreateSchema),
        Just(DdlKind::DropSchema),
        Just(DdlKind::CreateTable),
        Just(DdlKind::DropTable),
        Just(DdlKind::TruncateTable),
        Just(DdlKind::RenameTable),
        Just(DdlKind::AddColumn),
        Just(DdlKind::DropColumn),
        Just(DdlKind::ModifyColumn),
        Just(DdlKind::AddIndex),
        Just(DdlKind::DropIndex),
        Just(DdlKind::Other),
    ]
}

/// Strategy for generating DDL events.
pub fn ddl_event_strategy() -> impl Strategy<Value = DdlEvent> {
    (any::<u64>(), ddl_kind_strategy(), table_name_strategy(), "[A-Z]{3,8} [a-z ]{1,40}")
        .prop_map(|(ts, kind, table, query)| DdlEvent::new(ts, kind, table, query))
}

/// Strategy for generating a mixed change stream.
pub fn change_event_strategy() -> impl Strategy<Value = ChangeEvent> {
    prop_oneof![
        6 => row_event_strategy().prop_map(ChangeEvent::Row),
        1 => ddl_event_strategy().prop_map(ChangeEvent::Ddl),
        1 => any::<u64>().prop_map(ChangeEvent::Checkpoint),
    ]
}

/// Strategy for generating a sequence of change events.
pub fn change_stream_strategy(
    min_events: usize,
    max_events: usize,
) -> impl Strategy<Value = Vec<ChangeEvent>> {
    prop::collection::vec(change_event_strategy(), min_events..max_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canal_codec::{CanalEntryBuilder, EntryBuilder};

    proptest! {
        #[test]
        fn generated_rows_convert(event in row_event_strategy()) {
            prop_assert!(CanalEntryBuilder::new().from_row_event(&event).is_ok());
        }

        #[test]
        fn generated_ddls_convert(event in ddl_event_strategy()) {
            prop_assert!(CanalEntryBuilder::new().from_ddl_event(&event).is_ok());
        }
    }
}
