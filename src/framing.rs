//! Framing of a finished TF1 payload for a byte-oriented link with no
//! length delimiting of its own. One handshake frame announces the total
//! payload length, then one chunk frame per slice carries the bytes,
//! numbered consecutively from 1. No acknowledgement, retry, or checksum
//! lives at this layer; reliability is the transport's problem.

use std::fmt;

/// First byte of every frame.
pub const FRAME_HEAD: u8 = 0xAA;
/// Fourth byte of every frame.
pub const FRAME_TAIL: u8 = 0x5A;
/// Command byte of the handshake frame.
pub const CMD_TF1_HANDSHAKE: u8 = 17;
/// Command byte of a chunk frame.
pub const CMD_TF1_CHUNK: u8 = 18;
/// Default 3-byte file tag.
pub const TF1_TAG: &[u8; 3] = b"TF1";

/// Byte count of a chunk frame before its payload slice.
const CHUNK_HEADER_LEN: usize = 12;

/// Things that can go wrong while framing a payload.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    /// The requested chunk size was zero.
    ZeroChunkSize,
    /// A chunk frame's total length would not fit its 16-bit length
    /// field.
    FrameTooLong(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FrameError::ZeroChunkSize => write!(f, "chunk size must be positive"),
            FrameError::FrameTooLong(len) => {
                write!(f, "frame of {} bytes exceeds the 16-bit length field", len)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Splits `payload` into consecutive slices of at most `chunk_size`
/// bytes, covering it exactly once in order.
pub fn split_chunks(payload: &[u8], chunk_size: usize) -> Result<Vec<&[u8]>, FrameError> {
    if chunk_size == 0 {
        return Err(FrameError::ZeroChunkSize);
    }
    Ok(payload.chunks(chunk_size).collect())
}

fn write_tag(frame: &mut [u8], tag: &[u8]) {
    for (slot, byte) in frame[8..11].iter_mut().zip(tag.iter()) {
        *slot = *byte;
    }
}

/// Builds the fixed 16-byte handshake frame declaring the total payload
/// length about to follow.
pub fn handshake_frame(total_length: u32, tag: &[u8], file_type: u8) -> [u8; 16] {
    let mut frame = [0u8; 16];
    frame[0] = FRAME_HEAD;
    frame[1] = CMD_TF1_HANDSHAKE;
    frame[2] = 0;
    frame[3] = FRAME_TAIL;
    // Frame length, fixed at 16 for the handshake.
    frame[4..8].copy_from_slice(&16u32.to_le_bytes());
    write_tag(&mut frame, tag);
    frame[11] = file_type;
    frame[12..16].copy_from_slice(&total_length.to_le_bytes());
    frame
}

/// Builds one numbered chunk frame: a 12-byte header followed by the raw
/// chunk. Sequence numbers are caller-assigned, 1-based by convention,
/// and wrap at 65536.
pub fn chunk_frame(
    sequence: u16,
    chunk: &[u8],
    tag: &[u8],
    file_type: u8,
) -> Result<Vec<u8>, FrameError> {
    let frame_len = CHUNK_HEADER_LEN + chunk.len();
    if frame_len > u16::MAX as usize {
        return Err(FrameError::FrameTooLong(frame_len));
    }
    let mut frame = vec![0u8; frame_len];
    frame[0] = FRAME_HEAD;
    frame[1] = CMD_TF1_CHUNK;
    frame[2] = 0;
    frame[3] = FRAME_TAIL;
    frame[4..6].copy_from_slice(&(frame_len as u16).to_le_bytes());
    frame[6..8].copy_from_slice(&sequence.to_le_bytes());
    write_tag(&mut frame, tag);
    frame[11] = file_type;
    frame[CHUNK_HEADER_LEN..].copy_from_slice(chunk);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{distributions::Standard, Rng};

    #[test]
    fn chunks_cover_the_payload_for_every_size() {
        let payload: Vec<u8> = (0..=255).collect();
        for chunk_size in 1..=payload.len() {
            let chunks = split_chunks(&payload, chunk_size).unwrap();
            let rejoined: Vec<u8> = chunks.concat();
            assert_eq!(rejoined, payload, "chunk size {}", chunk_size);
            assert!(chunks[..chunks.len() - 1]
                .iter()
                .all(|c| c.len() == chunk_size));
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert_eq!(split_chunks(&[1, 2, 3], 0), Err(FrameError::ZeroChunkSize));
    }

    #[test]
    fn chunking_a_random_payload_loses_nothing() {
        let payload: Vec<u8> = rand::thread_rng()
            .sample_iter(Standard)
            .take(10_000)
            .collect();
        let chunks = split_chunks(&payload, 500).unwrap();
        assert_eq!(chunks.len(), 20);
        assert_eq!(chunks.concat(), payload);
    }

    #[test]
    fn handshake_frame_layout() {
        let frame = handshake_frame(0x0004_0302, TF1_TAG, 0);
        assert_eq!(frame.len(), 16);
        assert_eq!(frame[0], FRAME_HEAD);
        assert_eq!(frame[1], CMD_TF1_HANDSHAKE);
        assert_eq!(frame[2], 0);
        assert_eq!(frame[3], FRAME_TAIL);
        assert_eq!(&frame[4..8], &[16, 0, 0, 0]);
        assert_eq!(&frame[8..11], b"TF1");
        assert_eq!(frame[11], 0);
        assert_eq!(&frame[12..16], &[0x02, 0x03, 0x04, 0x00]);
    }

    #[test]
    fn chunk_frame_layout() {
        let chunk = [9u8, 8, 7, 6, 5];
        let frame = chunk_frame(0x0102, &chunk, TF1_TAG, 3).unwrap();
        assert_eq!(frame.len(), 12 + chunk.len());
        assert_eq!(frame[0], FRAME_HEAD);
        assert_eq!(frame[1], CMD_TF1_CHUNK);
        assert_eq!(frame[3], FRAME_TAIL);
        assert_eq!(&frame[4..6], &[17, 0]);
        assert_eq!(&frame[6..8], &[0x02, 0x01]);
        assert_eq!(&frame[8..11], b"TF1");
        assert_eq!(frame[11], 3);
        assert_eq!(&frame[12..], &chunk[..]);
    }

    #[test]
    fn oversized_chunk_frame_is_rejected() {
        let chunk = vec![0u8; 65524];
        assert_eq!(
            chunk_frame(1, &chunk, TF1_TAG, 0),
            Err(FrameError::FrameTooLong(65536))
        );
        // One byte shorter still fits.
        assert!(chunk_frame(1, &chunk[..65523], TF1_TAG, 0).is_ok());
    }

    #[test]
    fn short_tags_leave_zero_padding() {
        let frame = handshake_frame(1, b"A", 0);
        assert_eq!(&frame[8..11], &[b'A', 0, 0]);
    }
}
