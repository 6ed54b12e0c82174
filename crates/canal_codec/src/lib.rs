//! # Canal Codec
//!
//! Batching encoder that turns database change events into Canal packets.
//!
//! This crate provides:
//! - The change event model ([`RowChangedEvent`], [`DdlEvent`], [`ChangeEvent`])
//! - [`EntryBuilder`] and its stock implementation [`CanalEntryBuilder`]
//! - [`CanalBatchEncoder`], which accumulates rows and frames them as one packet
//! - [`MqMessage`], the unit handed to the transport layer
//!
//! This is a pure encoding crate with no I/O operations.
//!
//! ## Usage
//!
//! ```
//! use canal_codec::{
//!     CanalBatchEncoder, Column, ColumnKind, ColumnValue, EventBatchEncoder,
//!     RowChangedEvent, TableName,
//! };
//!
//! let mut encoder = CanalBatchEncoder::new();
//! let event = RowChangedEvent::insert(
//!     1 << 18,
//!     TableName::new("shop", "orders"),
//!     vec![Column::new("id", ColumnKind::Long, ColumnValue::Int(1)).primary_key()],
//! );
//! encoder.append_row_changed_event(&event, None).unwrap();
//!
//! let messages = encoder.build();
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].rows_count, 1);
//! assert!(encoder.build().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod encoder;
mod entry_builder;
mod error;
mod event;
mod message;

pub use config::{Config, DEFAULT_MAX_BATCH_SIZE, DEFAULT_SERVER_ENCODING};
pub use encoder::{CanalBatchEncoder, CanalBatchEncoderBuilder, EncoderBuilder, EventBatchEncoder};
pub use entry_builder::{physical_millis, CanalEntryBuilder, EntryBuilder};
pub use error::{CodecError, CodecResult};
pub use event::{
    ChangeEvent, Column, ColumnFlags, ColumnKind, ColumnValue, DdlEvent, DdlKind, RowChangedEvent,
    RowKind, TableName,
};
pub use message::{Callback, MessageType, MqMessage, Protocol};

pub use canal_proto;
