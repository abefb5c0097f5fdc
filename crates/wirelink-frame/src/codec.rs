use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// First sync byte opening every frame.
pub const SYNC0: u8 = 0xA5;
/// Second sync byte.
pub const SYNC1: u8 = 0x5A;
/// Protocol version carried in every frame header.
pub const VERSION: u8 = 1;

/// Header length excluding the two sync bytes:
/// version (1) + flags (1) + session (2) + frag_index (2) + frag_count (2) + payload_len (2).
pub const HEADER_LEN: usize = 10;
/// CRC-32 trailer length.
pub const CRC_LEN: usize = 4;

/// Maximum payload bytes per fragment.
pub const MAX_PAYLOAD: usize = 128;
/// Maximum declared fragment count per message.
pub const MAX_FRAGMENTS: usize = 64;
/// Maximum reassembled message size, matching the device-side buffer.
pub const MAX_MESSAGE: usize = 2048;

/// First fragment of a message.
pub const FLAG_START: u8 = 1 << 0;
/// Non-initial, non-terminal fragment.
pub const FLAG_MIDDLE: u8 = 1 << 1;
/// Last fragment of a message.
pub const FLAG_END: u8 = 1 << 2;
/// The message is a response rather than a request.
pub const FLAG_RESPONSE: u8 = 1 << 4;

/// A reassembled logical message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Correlates a request with its response and groups fragments.
    pub session: u16,
    /// The full payload, fragments concatenated in index order.
    pub payload: Bytes,
    /// Set when the sender marked the message as a response.
    pub is_response: bool,
}

impl Message {
    /// Create a new message.
    pub fn new(session: u16, payload: impl Into<Bytes>, is_response: bool) -> Self {
        Self {
            session,
            payload: payload.into(),
            is_response,
        }
    }
}

/// Encode a logical message into its wire frames.
///
/// The payload is split into `ceil(len / MAX_PAYLOAD)` fragments — minimum
/// one, so an empty message still produces a frame. Each fragment carries
/// START/MIDDLE/END flags by position (a single-fragment message carries
/// both START and END), the RESPONSE flag when `is_response`, and a CRC-32
/// over the post-sync header concatenated with the fragment payload.
///
/// Feeding the appended bytes through [`Decoder::feed`](crate::Decoder::feed)
/// reproduces exactly one `(session, payload, is_response)` message, assuming
/// no corruption in transit.
pub fn encode_message(
    session: u16,
    payload: &[u8],
    is_response: bool,
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_MESSAGE {
        return Err(FrameError::MessageTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE,
        });
    }

    let frag_count = payload.len().div_ceil(MAX_PAYLOAD).max(1);
    dst.reserve(frag_count * (2 + HEADER_LEN + CRC_LEN) + payload.len());

    for frag_index in 0..frag_count {
        let start = frag_index * MAX_PAYLOAD;
        let end = payload.len().min(start + MAX_PAYLOAD);
        let frag = &payload[start..end];

        let mut flags = 0u8;
        if frag_index == 0 {
            flags |= FLAG_START;
        }
        if frag_index == frag_count - 1 {
            flags |= FLAG_END;
        } else {
            flags |= FLAG_MIDDLE;
        }
        if is_response {
            flags |= FLAG_RESPONSE;
        }

        let mut header = [0u8; HEADER_LEN];
        header[0] = VERSION;
        header[1] = flags;
        header[2..4].copy_from_slice(&session.to_le_bytes());
        header[4..6].copy_from_slice(&(frag_index as u16).to_le_bytes());
        header[6..8].copy_from_slice(&(frag_count as u16).to_le_bytes());
        header[8..10].copy_from_slice(&(frag.len() as u16).to_le_bytes());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header);
        hasher.update(frag);
        let crc = hasher.finalize();

        dst.put_u8(SYNC0);
        dst.put_u8(SYNC1);
        dst.put_slice(&header);
        dst.put_slice(frag);
        dst.put_u32_le(crc);
    }

    Ok(())
}
