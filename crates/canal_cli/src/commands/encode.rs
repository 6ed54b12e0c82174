//! Encode command implementation.

use super::write_frame;
use bytes::BytesMut;
use canal_codec::{CanalBatchEncoder, ChangeEvent, Config, EventBatchEncoder, MqMessage};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info};

/// Counters reported after encoding.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Packets written.
    pub packets: usize,
    /// Row events encoded.
    pub rows: usize,
    /// DDL events encoded.
    pub ddls: usize,
    /// Checkpoint events skipped.
    pub checkpoints: usize,
}

/// Runs the encode command.
pub fn run(
    input: &Path,
    output: &Path,
    max_batch_size: usize,
) -> Result<EncodeSummary, Box<dyn std::error::Error>> {
    info!("Encoding {:?} into {:?}", input, output);

    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };

    let (frames, summary) = encode_stream(reader, max_batch_size)?;
    let mut file = File::create(output)?;
    file.write_all(&frames)?;
    file.sync_all()?;

    Ok(summary)
}

/// Encodes every event read from `reader` into framed packets.
pub fn encode_stream(
    reader: impl BufRead,
    max_batch_size: usize,
) -> Result<(BytesMut, EncodeSummary), Box<dyn std::error::Error>> {
    let mut encoder = CanalBatchEncoder::with_config(&Config::new().max_batch_size(max_batch_size));
    let mut out = BytesMut::new();
    let mut summary = EncodeSummary::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: ChangeEvent = serde_json::from_str(&line)
            .map_err(|e| format!("line {}: invalid change event: {}", line_no + 1, e))?;

        match event {
            ChangeEvent::Row(row) => {
                encoder
                    .append_row_changed_event(&row, None)
                    .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
                summary.rows += 1;
                if encoder.is_full() {
                    flush(&mut encoder, &mut out, &mut summary)?;
                }
            }
            ChangeEvent::Ddl(ddl) => {
                // Rows committed before the DDL go out first.
                flush(&mut encoder, &mut out, &mut summary)?;
                let message = encoder
                    .encode_ddl_event(&ddl)
                    .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
                emit(&message, &mut out, &mut summary)?;
                summary.ddls += 1;
            }
            ChangeEvent::Checkpoint(ts) => {
                if let Some(message) = encoder.encode_checkpoint_event(ts)? {
                    emit(&message, &mut out, &mut summary)?;
                }
                summary.checkpoints += 1;
            }
        }
    }
    flush(&mut encoder, &mut out, &mut summary)?;

    Ok((out, summary))
}

fn flush(
    encoder: &mut CanalBatchEncoder,
    out: &mut BytesMut,
    summary: &mut EncodeSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    for message in encoder.build() {
        emit(&message, out, summary)?;
    }
    Ok(())
}

fn emit(
    message: &MqMessage,
    out: &mut BytesMut,
    summary: &mut EncodeSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(
        message_type = ?message.message_type,
        rows = message.rows_count,
        bytes = message.value.len(),
        "writing packet"
    );
    write_frame(out, &message.value)?;
    summary.packets += 1;
    Ok(())
}
