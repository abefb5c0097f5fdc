//! CRC-checked frame codec for lossy byte links.
//!
//! This is the core value-add layer of wirelink. A logical message is split
//! into one or more wire frames, each carrying:
//! - Two sync bytes (0xA5 0x5A) for stream resynchronization
//! - A 10-byte little-endian header (version, flags, session, fragment
//!   position, payload length)
//! - Up to 128 payload bytes
//! - A CRC-32 (IEEE) trailer over header and payload
//!
//! The decoder consumes the stream byte by byte through an explicit state
//! machine, drops corrupt frames silently, and reassembles fragments back
//! into whole messages. Chunking on the wire never matters: feeding one byte
//! at a time and feeding the whole stream at once produce the same messages.

pub mod codec;
pub mod decoder;
pub mod error;

pub use codec::{
    encode_message, Message, CRC_LEN, FLAG_END, FLAG_MIDDLE, FLAG_RESPONSE, FLAG_START, HEADER_LEN,
    MAX_FRAGMENTS, MAX_MESSAGE, MAX_PAYLOAD, SYNC0, SYNC1, VERSION,
};
pub use decoder::{Decoder, DecoderStats};
pub use error::{FrameError, Result};
