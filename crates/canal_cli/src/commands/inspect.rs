//! Inspect command implementation.

use super::read_frames;
use canal_proto::{decode_messages, decode_packet, decode_row_change, EventType, PacketType};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Summary of one packet.
#[derive(Debug, Serialize)]
pub struct PacketInfo {
    /// Position in the file.
    pub index: usize,
    /// Packet version marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    /// Packet type name.
    pub packet_type: String,
    /// Entries carried by the packet.
    pub entries: Vec<EntryInfo>,
}

/// Summary of one entry.
#[derive(Debug, Serialize)]
pub struct EntryInfo {
    /// Schema name.
    pub schema: String,
    /// Table name.
    pub table: String,
    /// Event type name.
    pub event_type: String,
    /// Commit time in milliseconds.
    pub execute_time: i64,
    /// DDL statement, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Number of columns in the row images.
    pub columns: usize,
}

/// Runs the inspect command.
pub fn run(input: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Inspecting {:?}", input);

    let data = std::fs::read(input)?;
    let packets = inspect_bytes(&data)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&packets)?);
        }
        _ => {
            print_text_output(&packets);
        }
    }

    Ok(())
}

/// Decodes every packet in a framed buffer.
pub fn inspect_bytes(data: &[u8]) -> Result<Vec<PacketInfo>, Box<dyn std::error::Error>> {
    read_frames(data)?
        .iter()
        .enumerate()
        .map(|(index, frame)| inspect_packet(index, frame))
        .collect()
}

fn inspect_packet(index: usize, frame: &[u8]) -> Result<PacketInfo, Box<dyn std::error::Error>> {
    let packet = decode_packet(frame)?;
    let packet_type = PacketType::try_from(packet.r#type)
        .map(|t| format!("{t:?}"))
        .unwrap_or_else(|_| format!("Unknown({})", packet.r#type));

    let mut entries = Vec::new();
    for bytes in decode_messages(&packet)?.messages {
        let entry = canal_proto::decode_entry(&bytes)?;
        let header = entry.header.unwrap_or_default();
        let row_change = decode_row_change(&entry.store_value)?;

        let event_type = row_change
            .event_type
            .and_then(|t| EventType::try_from(t).ok())
            .map_or("UNKNOWN", |t| t.as_str())
            .to_string();
        let columns = row_change
            .row_datas
            .iter()
            .map(|r| r.before_columns.len().max(r.after_columns.len()))
            .sum();

        entries.push(EntryInfo {
            schema: header.schema_name,
            table: header.table_name,
            event_type,
            execute_time: header.execute_time,
            sql: row_change.is_ddl.then_some(row_change.sql),
            columns,
        });
    }

    Ok(PacketInfo {
        index,
        version: packet.version,
        packet_type,
        entries,
    })
}

fn print_text_output(packets: &[PacketInfo]) {
    for packet in packets {
        println!(
            "packet #{} version={} type={} entries={}",
            packet.index,
            packet.version.map_or("-".to_string(), |v| v.to_string()),
            packet.packet_type,
            packet.entries.len()
        );
        for entry in &packet.entries {
            match &entry.sql {
                Some(sql) => println!(
                    "  {} {}.{} @{}: {}",
                    entry.event_type, entry.schema, entry.table, entry.execute_time, sql
                ),
                None => println!(
                    "  {} {}.{} @{}: {} columns",
                    entry.event_type, entry.schema, entry.table, entry.execute_time, entry.columns
                ),
            }
        }
    }
    println!("Total: {} packets", packets.len());
}
