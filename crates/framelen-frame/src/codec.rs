use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Record header: magic (2) + length (4) + flags (1) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Magic bytes: "FL" (0x46 0x4C).
pub const MAGIC: [u8; 2] = [0x46, 0x4C];

/// Flag bit: the frame carries the user marker.
pub const FLAG_USER: u8 = 0x01;

/// Default maximum payload size: 1 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024;

/// A complete frame as seen by the producer or consumer of a word stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Frame bytes in transfer order.
    pub data: Bytes,
    /// True if any word of the frame carried the user marker.
    pub user: bool,
}

impl Frame {
    /// Create a frame without the user marker.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            user: false,
        }
    }

    /// Create a frame carrying the user marker.
    pub fn flagged(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            user: true,
        }
    }

    /// Frame length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The size of this frame as a record (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.data.len()
    }
}

/// Encode a frame into the record format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬──────────┬─────────────────┐
/// │ Magic (2B)   │ Length    │ Flags    │ Payload          │
/// │ 0x46 0x4C    │ (4B LE)  │ (1B)     │ (Length bytes)   │
/// │ "FL"         │          │ bit0=user│                  │
/// └──────────────┴───────────┴──────────┴─────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    let payload = frame.data.as_ref();
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(payload.len() as u32);
    dst.put_u8(if frame.user { FLAG_USER } else { 0 });
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame record from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete record yet.
/// On success, consumes the record bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let payload_len = u32::from_le_bytes([src[2], src[3], src[4], src[5]]) as usize;
    let flags = src[6];

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let data = src.split_to(payload_len).freeze();

    Ok(Some(Frame {
        data,
        user: flags & FLAG_USER != 0,
    }))
}

/// Configuration for the frame record codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 1 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
