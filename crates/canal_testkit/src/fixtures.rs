//! Fixture events and callback helpers.

use canal_codec::{
    Callback, Column, ColumnKind, ColumnValue, DdlEvent, DdlKind, RowChangedEvent, TableName,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Builds a TSO timestamp from physical milliseconds and a logical counter.
pub fn tso(physical_ms: u64, logical: u64) -> u64 {
    (physical_ms << 18) | (logical & ((1 << 18) - 1))
}

/// The `shop.orders` table.
pub fn orders_table() -> TableName {
    TableName::new("shop", "orders").with_table_id(101)
}

/// Row image of an order.
pub fn order_columns(id: i64, amount: &str, note: Option<&str>) -> Vec<Column> {
    vec![
        Column::new("id", ColumnKind::LongLong, ColumnValue::Int(id)).primary_key(),
        Column::new("amount", ColumnKind::Decimal, ColumnValue::Text(amount.to_string())),
        Column::new(
            "note",
            ColumnKind::Varchar,
            note.map_or(ColumnValue::Null, |n| ColumnValue::Text(n.to_string())),
        )
        .nullable(),
    ]
}

/// Insert of order `id`.
pub fn insert_order(id: i64) -> RowChangedEvent {
    RowChangedEvent::insert(
        tso(1_700_000_000_000 + id as u64, 0),
        orders_table(),
        order_columns(id, "9.99", Some("new")),
    )
}

/// Update of order `id` from one amount to another.
pub fn update_order(id: i64, from: &str, to: &str) -> RowChangedEvent {
    RowChangedEvent::update(
        tso(1_700_000_000_000 + id as u64, 1),
        orders_table(),
        order_columns(id, from, None),
        order_columns(id, to, None),
    )
}

/// Delete of order `id`.
pub fn delete_order(id: i64) -> RowChangedEvent {
    RowChangedEvent::delete(
        tso(1_700_000_000_000 + id as u64, 2),
        orders_table(),
        order_columns(id, "0", None),
    )
}

/// A row event the stock entry builder rejects.
pub fn unconvertible_row() -> RowChangedEvent {
    RowChangedEvent {
        commit_ts: tso(1_700_000_000_000, 0),
        table: orders_table(),
        columns: None,
        pre_columns: None,
    }
}

/// `CREATE TABLE shop.orders`.
pub fn create_orders_ddl() -> DdlEvent {
    DdlEvent::new(
        tso(1_699_999_999_000, 0),
        DdlKind::CreateTable,
        orders_table(),
        "CREATE TABLE orders (id BIGINT PRIMARY KEY, amount DECIMAL(10,2), note VARCHAR(64))",
    )
}

/// Records the order in which callbacks fire.
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    fired: Arc<Mutex<Vec<usize>>>,
}

impl CallbackRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callback that records `id` when fired.
    pub fn callback(&self, id: usize) -> Callback {
        let fired = Arc::clone(&self.fired);
        Box::new(move || fired.lock().push(id))
    }

    /// Ids fired so far, in firing order.
    pub fn fired(&self) -> Vec<usize> {
        self.fired.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canal_codec::RowKind;

    #[test]
    fn fixture_kinds() {
        assert_eq!(insert_order(1).kind(), Some(RowKind::Insert));
        assert_eq!(update_order(1, "1", "2").kind(), Some(RowKind::Update));
        assert_eq!(delete_order(1).kind(), Some(RowKind::Delete));
        assert_eq!(unconvertible_row().kind(), None);
    }

    #[test]
    fn tso_layout() {
        assert_eq!(tso(5, 3) >> 18, 5);
        assert_eq!(tso(5, 3) & 0x3FFFF, 3);
    }

    #[test]
    fn recorder_keeps_order() {
        let recorder = CallbackRecorder::new();
        let a = recorder.callback(2);
        let b = recorder.callback(1);
        b();
        a();
        assert_eq!(recorder.fired(), vec![1, 2]);
    }
}
