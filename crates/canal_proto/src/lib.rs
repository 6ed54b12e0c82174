//! # Canal Proto
//!
//! Wire schema for the Canal packet format.
//!
//! This crate provides:
//! - [`Packet`], the versioned outer envelope
//! - [`Messages`], the counted collection of serialized entries
//! - [`Entry`] and the row/DDL payload types it carries
//! - Decoding helpers that walk a packet down to its entries
//!
//! Messages are plain `prost` types with the tag numbers of the upstream
//! `.proto` files, so bytes produced here are readable by any Canal client.
//!
//! ## Usage
//!
//! ```
//! use canal_proto::{decode_entries, Messages, Packet};
//! use prost::Message;
//!
//! let body = Messages { batch_id: 0, messages: vec![] }.encode_to_vec();
//! let bytes = Packet::messages(body).encode_to_vec();
//!
//! let entries = decode_entries(&bytes).unwrap();
//! assert!(entries.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod error;
mod packet;

pub use entry::{
    Column, Entry, EntryType, EventType, Header, Pair, RowChange, RowData, SourceType,
    HEADER_VERSION,
};
pub use error::{ProtoError, ProtoResult};
pub use packet::{Compression, Messages, Packet, PacketType};

use prost::Message;

/// Packet version marker written on every outgoing packet.
pub const PACKET_VERSION: i32 = 1;

/// Decodes a serialized [`Packet`].
pub fn decode_packet(bytes: &[u8]) -> ProtoResult<Packet> {
    Ok(Packet::decode(bytes)?)
}

/// Decodes the [`Messages`] body of a message-collection packet.
///
/// # Errors
///
/// Fails if the packet is not a message collection, carries an unknown
/// version, or the body is not a valid `Messages`.
pub fn decode_messages(packet: &Packet) -> ProtoResult<Messages> {
    if !packet.is_messages() {
        return Err(ProtoError::UnexpectedPacketType {
            expected: PacketType::Messages as i32,
            actual: packet.r#type,
        });
    }
    if let Some(version) = packet.version {
        if version != PACKET_VERSION {
            return Err(ProtoError::UnsupportedVersion { version });
        }
    }
    Ok(Messages::decode(packet.body.as_slice())?)
}

/// Decodes a serialized [`Entry`].
pub fn decode_entry(bytes: &[u8]) -> ProtoResult<Entry> {
    Ok(Entry::decode(bytes)?)
}

/// Decodes a serialized [`RowChange`].
pub fn decode_row_change(bytes: &[u8]) -> ProtoResult<RowChange> {
    Ok(RowChange::decode(bytes)?)
}

/// Decodes a serialized packet all the way down to its entries, in order.
pub fn decode_entries(packet_bytes: &[u8]) -> ProtoResult<Vec<Entry>> {
    let packet = decode_packet(packet_bytes)?;
    let messages = decode_messages(&packet)?;
    messages
        .messages
        .iter()
        .map(|bytes| decode_entry(bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_for(table: &str) -> Entry {
        Entry {
            header: Some(Header {
                version: Some(HEADER_VERSION),
                table_name: table.to_string(),
                ..Default::default()
            }),
            entry_type: Some(EntryType::RowData as i32),
            store_value: Vec::new(),
        }
    }

    #[test]
    fn decode_entries_preserves_order() {
        let entries = vec![entry_for("a"), entry_for("b"), entry_for("c")];
        let messages = Messages {
            batch_id: 0,
            messages: entries.iter().map(|e| e.encode_to_vec()).collect(),
        };
        let bytes = Packet::messages(messages.encode_to_vec()).encode_to_vec();

        let decoded = decode_entries(&bytes).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn rejects_non_message_packets() {
        let packet = Packet {
            r#type: PacketType::Heartbeat as i32,
            ..Packet::messages(Vec::new())
        };
        let err = decode_messages(&packet).unwrap_err();
        assert_eq!(
            err,
            ProtoError::UnexpectedPacketType {
                expected: 7,
                actual: 11
            }
        );
    }

    #[test]
    fn rejects_unknown_version() {
        let packet = Packet {
            version: Some(2),
            ..Packet::messages(Vec::new())
        };
        assert_eq!(
            decode_messages(&packet).unwrap_err(),
            ProtoError::UnsupportedVersion { version: 2 }
        );
    }

    #[test]
    fn truncated_packet_fails() {
        let bytes = Packet::messages(vec![1, 2, 3, 4]).encode_to_vec();
        assert!(decode_packet(&bytes[..bytes.len() - 2]).is_err());
    }
}
