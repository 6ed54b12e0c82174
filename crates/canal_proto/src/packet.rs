//! Outer packet envelope and the message collection it carries.
//!
//! Tag numbers follow `CanalProtocol.proto`. The proto declares the version,
//! magic number and compression as single-field `oneof`s; a proto3
//! `optional` field has the same wire shape, so they are modelled as
//! `Option`s here.

use crate::PACKET_VERSION;

/// Outer envelope of everything sent over a Canal connection or topic.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Packet {
    /// Magic number, unset in practice.
    #[prost(int32, optional, tag = "1")]
    pub magic_number: Option<i32>,
    /// Protocol version marker.
    #[prost(int32, optional, tag = "2")]
    pub version: Option<i32>,
    /// What the body holds.
    #[prost(enumeration = "PacketType", tag = "3")]
    pub r#type: i32,
    /// Body compression, unset means none.
    #[prost(enumeration = "Compression", optional, tag = "4")]
    pub compression: Option<i32>,
    /// Serialized payload, a [`Messages`] for `PacketType::Messages`.
    #[prost(bytes = "vec", tag = "5")]
    pub body: Vec<u8>,
}

impl Packet {
    /// Creates a message-collection packet around an already serialized body.
    pub fn messages(body: Vec<u8>) -> Self {
        Self {
            magic_number: None,
            version: Some(PACKET_VERSION),
            r#type: PacketType::Messages as i32,
            compression: None,
            body,
        }
    }

    /// Returns true if this packet carries a message collection.
    pub fn is_messages(&self) -> bool {
        self.r#type == PacketType::Messages as i32
    }
}

/// Counted collection of independently serialized entries.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Messages {
    /// Batch id, always zero for pushed batches.
    #[prost(int64, tag = "1")]
    pub batch_id: i64,
    /// Serialized entries in delivery order.
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub messages: Vec<Vec<u8>>,
}

/// Packet type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PacketType {
    /// proto2 compatibility placeholder.
    CompatibleProto2 = 0,
    /// Handshake.
    Handshake = 1,
    /// Client authentication.
    ClientAuthentication = 2,
    /// Ack.
    Ack = 3,
    /// Subscription.
    Subscription = 4,
    /// Unsubscription.
    Unsubscription = 5,
    /// Get.
    Get = 6,
    /// Collection of messages.
    Messages = 7,
    /// Client ack.
    ClientAck = 8,
    /// Shutdown.
    Shutdown = 9,
    /// Dump.
    Dump = 10,
    /// Heartbeat.
    Heartbeat = 11,
    /// Client rollback.
    ClientRollback = 12,
}

/// Body compression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Compression {
    /// proto2 compatibility placeholder.
    CompatibleProto2 = 0,
    /// No compression.
    None = 1,
    /// zlib.
    Zlib = 2,
    /// gzip.
    Gzip = 3,
    /// LZF.
    Lzf = 4,
}
