//! Batching encoder that frames row changes into Canal packets.
//!
//! The encoder has two durable states:
//!
//! - **Empty**: no pending rows, [`build`] produces nothing.
//! - **Accumulating**: one or more pending rows, [`build`] produces exactly
//!   one packet and returns the encoder to Empty.
//!
//! DDL and checkpoint encoding never touch the pending batch.
//!
//! The encoder is meant for a single owner processing one ordered stream.
//! Shard events across several encoders instead of sharing one.
//!
//! [`build`]: EventBatchEncoder::build

use crate::config::Config;
use crate::entry_builder::{CanalEntryBuilder, EntryBuilder};
use crate::error::{CodecError, CodecResult};
use crate::event::{DdlEvent, RowChangedEvent};
use crate::message::{Callback, MqMessage};
use canal_proto::{Messages, Packet, PacketType, PACKET_VERSION};
use prost::Message;
use tracing::{debug, error, trace, warn};

/// Encodes a stream of change events into transport messages.
pub trait EventBatchEncoder {
    /// Encodes a resolved timestamp.
    ///
    /// Returns `Ok(None)` when the protocol has no representation for it.
    fn encode_checkpoint_event(&mut self, ts: u64) -> CodecResult<Option<MqMessage>>;

    /// Appends a row change to the pending batch.
    ///
    /// On error the pending batch is left exactly as it was.
    fn append_row_changed_event(
        &mut self,
        event: &RowChangedEvent,
        callback: Option<Callback>,
    ) -> CodecResult<()>;

    /// Encodes a DDL statement into a standalone message.
    fn encode_ddl_event(&mut self, event: &DdlEvent) -> CodecResult<MqMessage>;

    /// Flushes the pending batch.
    ///
    /// Returns an empty vector when nothing is pending.
    fn build(&mut self) -> Vec<MqMessage>;

    /// Number of rows waiting for the next [`build`](Self::build).
    fn row_count(&self) -> usize;

    /// Returns true once the pending batch reached the configured size.
    fn is_full(&self) -> bool;
}

/// Creates encoders, one per ordered stream.
pub trait EncoderBuilder {
    /// Encoder type produced.
    type Encoder: EventBatchEncoder;

    /// Creates a fresh, empty encoder.
    fn build(&self) -> Self::Encoder;
}

/// Batch encoder for the Canal packet format.
pub struct CanalBatchEncoder<B = CanalEntryBuilder> {
    /// Serialized entries awaiting flush, in append order.
    messages: Messages,
    /// Callbacks registered alongside appended rows.
    callbacks: Vec<Callback>,
    /// Envelope whose body buffer is retained across flushes.
    packet: Packet,
    entry_builder: B,
    max_batch_size: usize,
}

impl CanalBatchEncoder<CanalEntryBuilder> {
    /// Creates an encoder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates an encoder from a configuration.
    pub fn with_config(config: &Config) -> Self {
        let entry_builder =
            CanalEntryBuilder::new().with_server_encoding(config.server_encoding.clone());
        Self::with_entry_builder(config, entry_builder)
    }
}

impl Default for CanalBatchEncoder<CanalEntryBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: EntryBuilder> CanalBatchEncoder<B> {
    /// Creates an encoder around a custom entry builder.
    pub fn with_entry_builder(config: &Config, entry_builder: B) -> Self {
        Self {
            messages: Messages::default(),
            callbacks: Vec::new(),
            packet: Packet::messages(Vec::with_capacity(config.body_capacity)),
            entry_builder,
            max_batch_size: config.max_batch_size.max(1),
        }
    }

    /// Returns the entry builder.
    pub fn entry_builder(&self) -> &B {
        &self.entry_builder
    }

    /// Serializes the pending messages into the retained packet body.
    ///
    /// The body is resized to the exact encoded length, growing with zeros
    /// or truncating while keeping its capacity, and then filled in place.
    fn refresh_packet_body(&mut self) -> CodecResult<()> {
        let new_size = self.messages.encoded_len();
        let body = &mut self.packet.body;
        if new_size > body.len() {
            body.resize(new_size, 0);
        } else {
            body.truncate(new_size);
        }

        let mut buf: &mut [u8] = body.as_mut_slice();
        self.messages.encode(&mut buf)?;
        if !buf.is_empty() {
            return Err(CodecError::encode_failed(format!(
                "packet body left {} unwritten bytes",
                buf.len()
            )));
        }
        Ok(())
    }

    /// Restores the envelope fields for the next cycle. The body is kept.
    fn reset_packet(&mut self) {
        self.packet.magic_number = None;
        self.packet.version = Some(PACKET_VERSION);
        self.packet.r#type = PacketType::Messages as i32;
        self.packet.compression = None;
    }

    /// Drops all pending rows and callbacks.
    fn reset(&mut self) {
        self.messages.batch_id = 0;
        self.messages.messages.clear();
        self.callbacks.clear();
        self.reset_packet();
    }
}

impl<B: EntryBuilder> EventBatchEncoder for CanalBatchEncoder<B> {
    fn encode_checkpoint_event(&mut self, ts: u64) -> CodecResult<Option<MqMessage>> {
        // Canal has no resolved-timestamp message.
        trace!(ts, "ignoring checkpoint event");
        Ok(None)
    }

    fn append_row_changed_event(
        &mut self,
        event: &RowChangedEvent,
        callback: Option<Callback>,
    ) -> CodecResult<()> {
        let entry = self.entry_builder.from_row_event(event)?;
        self.messages.messages.push(entry.encode_to_vec());
        if let Some(callback) = callback {
            self.callbacks.push(callback);
        }
        Ok(())
    }

    fn encode_ddl_event(&mut self, event: &DdlEvent) -> CodecResult<MqMessage> {
        let entry = self.entry_builder.from_ddl_event(event)?;
        let messages = Messages {
            batch_id: 0,
            messages: vec![entry.encode_to_vec()],
        };
        let packet = Packet::messages(messages.encode_to_vec());
        Ok(MqMessage::ddl(packet.encode_to_vec(), event))
    }

    fn build(&mut self) -> Vec<MqMessage> {
        let rows_count = self.messages.messages.len();
        if rows_count == 0 {
            return Vec::new();
        }

        if let Err(err) = self.refresh_packet_body() {
            error!(error = %err, rows_count, "failed to generate canal packet");
            panic!("failed to generate canal packet: {err}");
        }

        let mut message = MqMessage::row(self.packet.encode_to_vec(), rows_count);

        let callbacks = std::mem::take(&mut self.callbacks);
        if callbacks.len() == rows_count {
            message.callback = Some(Box::new(move || {
                for callback in callbacks {
                    callback();
                }
            }));
        } else if !callbacks.is_empty() {
            // TODO: report the mismatch to the caller instead of dropping the set.
            warn!(
                rows_count,
                callbacks = callbacks.len(),
                "callback count does not match row count, dropping callbacks"
            );
        }

        debug!(
            rows_count,
            bytes = message.value.len(),
            "built canal packet"
        );
        self.reset();
        vec![message]
    }

    fn row_count(&self) -> usize {
        self.messages.messages.len()
    }

    fn is_full(&self) -> bool {
        self.row_count() >= self.max_batch_size
    }
}

/// Builds [`CanalBatchEncoder`]s sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct CanalBatchEncoderBuilder {
    config: Config,
}

impl CanalBatchEncoderBuilder {
    /// Creates a builder.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration handed to each encoder.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl EncoderBuilder for CanalBatchEncoderBuilder {
    type Encoder = CanalBatchEncoder;

    fn build(&self) -> Self::Encoder {
        CanalBatchEncoder::with_config(&self.config)
    }
}
