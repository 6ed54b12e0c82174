//! CLI command implementations.

pub mod encode;
pub mod inspect;

use bytes::{Buf, BufMut, BytesMut};

/// Size of the big-endian length prefix in front of every packet.
pub const FRAME_HEADER_LEN: usize = 4;

/// Appends one length-prefixed packet to `out`.
pub fn write_frame(out: &mut BytesMut, packet: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let len = u32::try_from(packet.len()).map_err(|_| "packet larger than 4 GiB")?;
    out.reserve(FRAME_HEADER_LEN + packet.len());
    out.put_u32(len);
    out.put_slice(packet);
    Ok(())
}

/// Splits a framed file back into packets.
pub fn read_frames(mut data: &[u8]) -> Result<Vec<Vec<u8>>, Box<dyn std::error::Error>> {
    let mut frames = Vec::new();
    while data.has_remaining() {
        if data.remaining() < FRAME_HEADER_LEN {
            return Err("truncated frame header".into());
        }
        let len = data.get_u32() as usize;
        if data.remaining() < len {
            return Err(format!(
                "truncated frame: expected {} bytes, {} left",
                len,
                data.remaining()
            )
            .into());
        }
        frames.push(data[..len].to_vec());
        data.advance(len);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_round_trip() {
        let mut out = BytesMut::new();
        write_frame(&mut out, b"abc").unwrap();
        write_frame(&mut out, b"").unwrap();
        write_frame(&mut out, &[7u8; 300]).unwrap();

        assert_eq!(&out[..4], &[0, 0, 0, 3]);
        let frames = read_frames(&out).unwrap();
        assert_eq!(frames, vec![b"abc".to_vec(), vec![], vec![7u8; 300]]);
    }

    #[test]
    fn truncated_input_fails() {
        let mut out = BytesMut::new();
        write_frame(&mut out, b"abcdef").unwrap();
        assert!(read_frames(&out[..out.len() - 1]).is_err());
        assert!(read_frames(&out[..2]).is_err());
        assert!(read_frames(&[]).unwrap().is_empty());
    }
}
