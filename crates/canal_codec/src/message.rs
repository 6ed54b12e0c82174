//! Output unit handed to the transport layer.

use crate::event::DdlEvent;
use std::fmt;

/// Completion notification fired once the transport has delivered a row.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Wire protocol of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Canal packet format.
    Canal,
}

impl Protocol {
    /// Protocol name as used in sink configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Canal => "canal",
        }
    }
}

/// What a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// A batch of row changes.
    Row,
    /// A single DDL statement.
    Ddl,
    /// A resolved timestamp.
    Resolved,
}

/// An encoded message ready to publish.
pub struct MqMessage {
    /// Protocol the value is framed in.
    pub protocol: Protocol,
    /// Partitioning key, unused by Canal.
    pub key: Option<Vec<u8>>,
    /// Serialized packet.
    pub value: Vec<u8>,
    /// Commit timestamp for DDL messages, zero for row batches.
    pub ts: u64,
    /// Schema for DDL messages.
    pub schema: Option<String>,
    /// Table for DDL messages.
    pub table: Option<String>,
    /// Message kind.
    pub message_type: MessageType,
    /// Number of rows in the packet.
    pub rows_count: usize,
    /// Fired after the message is delivered.
    pub callback: Option<Callback>,
}

impl MqMessage {
    /// Creates a row batch message.
    pub fn row(value: Vec<u8>, rows_count: usize) -> Self {
        Self {
            protocol: Protocol::Canal,
            key: None,
            value,
            ts: 0,
            schema: None,
            table: None,
            message_type: MessageType::Row,
            rows_count,
            callback: None,
        }
    }

    /// Creates a DDL message.
    pub fn ddl(value: Vec<u8>, event: &DdlEvent) -> Self {
        Self {
            protocol: Protocol::Canal,
            key: None,
            value,
            ts: event.commit_ts,
            schema: Some(event.table.schema.clone()),
            table: Some(event.table.table.clone()),
            message_type: MessageType::Ddl,
            rows_count: 0,
            callback: None,
        }
    }

    /// Returns the size of key plus value in bytes.
    pub fn length(&self) -> usize {
        self.key.as_ref().map_or(0, Vec::len) + self.value.len()
    }

    /// Removes and returns the callback.
    pub fn take_callback(&mut self) -> Option<Callback> {
        self.callback.take()
    }

    /// Fires the callback, at most once.
    pub fn ack(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl fmt::Debug for MqMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqMessage")
            .field("protocol", &self.protocol)
            .field("key", &self.key)
            .field("value_len", &self.value.len())
            .field("ts", &self.ts)
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("message_type", &self.message_type)
            .field("rows_count", &self.rows_count)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DdlKind, TableName};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn row_message() {
        let msg = MqMessage::row(vec![1, 2, 3], 3);
        assert_eq!(msg.protocol.as_str(), "canal");
        assert_eq!(msg.message_type, MessageType::Row);
        assert_eq!(msg.rows_count, 3);
        assert_eq!(msg.ts, 0);
        assert!(msg.key.is_none());
        assert_eq!(msg.length(), 3);
    }

    #[test]
    fn ddl_message() {
        let event = DdlEvent::new(99, DdlKind::DropTable, TableName::new("s", "t"), "DROP TABLE t");
        let msg = MqMessage::ddl(vec![0; 8], &event);
        assert_eq!(msg.message_type, MessageType::Ddl);
        assert_eq!(msg.ts, 99);
        assert_eq!(msg.schema.as_deref(), Some("s"));
        assert_eq!(msg.table.as_deref(), Some("t"));
        assert_eq!(msg.rows_count, 0);
    }

    #[test]
    fn ack_fires_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut msg = MqMessage::row(vec![], 1);
        msg.callback = Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        msg.ack();
        msg.ack();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(msg.take_callback().is_none());
    }

    #[test]
    fn debug_hides_payload() {
        let msg = MqMessage::row(vec![0; 64], 1);
        let debug = format!("{msg:?}");
        assert!(debug.contains("value_len: 64"));
        assert!(debug.contains("has_callback: false"));
    }
}
