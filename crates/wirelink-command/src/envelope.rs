use std::fmt;

use crate::error::{CommandError, Result};

/// Request envelope header: cmd_id (2) + payload_len (2), little-endian.
pub const REQUEST_HEADER_LEN: usize = 4;
/// Response envelope header: cmd_id (2) + status (2) + payload_len (2).
pub const RESPONSE_HEADER_LEN: usize = 6;

/// Application status code carried in every response envelope.
///
/// Zero is success; any nonzero value is an application-defined error code.
/// The codes the device firmware uses by convention have names here, but
/// unknown codes are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u16);

impl Status {
    /// Command succeeded.
    pub const OK: Status = Status(0);
    /// Malformed or out-of-range request payload.
    pub const INVALID: Status = Status(1);
    /// Command id not registered on the device.
    pub const UNSUPPORTED: Status = Status(2);
    /// Requested region outside permitted bounds.
    pub const BOUNDS: Status = Status(3);
    /// Device busy with a previous operation.
    pub const BUSY: Status = Status(4);
    /// Internal device failure.
    pub const INTERNAL: Status = Status(5);

    /// True when the status denotes success.
    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// The raw status code.
    pub fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::OK => write!(f, "ok"),
            Status::INVALID => write!(f, "invalid"),
            Status::UNSUPPORTED => write!(f, "unsupported"),
            Status::BOUNDS => write!(f, "bounds"),
            Status::BUSY => write!(f, "busy"),
            Status::INTERNAL => write!(f, "internal"),
            Status(code) => write!(f, "status {code}"),
        }
    }
}

/// Build a request envelope: `cmd_id: u16, len: u16, payload[len]`.
pub fn pack_request(cmd_id: u16, payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= u16::MAX as usize);
    let mut out = Vec::with_capacity(REQUEST_HEADER_LEN + payload.len());
    out.extend_from_slice(&cmd_id.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Parse a request envelope back into `(cmd_id, payload)`.
pub fn parse_request(data: &[u8]) -> Result<(u16, &[u8])> {
    if data.len() < REQUEST_HEADER_LEN {
        return Err(CommandError::ShortRequest(data.len()));
    }
    let cmd_id = u16::from_le_bytes([data[0], data[1]]);
    let declared = u16::from_le_bytes([data[2], data[3]]) as usize;
    let available = data.len() - REQUEST_HEADER_LEN;
    if declared > available {
        return Err(CommandError::TruncatedPayload {
            declared,
            available,
        });
    }
    Ok((
        cmd_id,
        &data[REQUEST_HEADER_LEN..REQUEST_HEADER_LEN + declared],
    ))
}

/// Build a response envelope: `cmd_id: u16, status: u16, len: u16, payload[len]`.
pub fn pack_response(cmd_id: u16, status: Status, payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= u16::MAX as usize);
    let mut out = Vec::with_capacity(RESPONSE_HEADER_LEN + payload.len());
    out.extend_from_slice(&cmd_id.to_le_bytes());
    out.extend_from_slice(&status.0.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Parse a response envelope back into `(cmd_id, status, payload)`.
pub fn parse_response(data: &[u8]) -> Result<(u16, Status, &[u8])> {
    if data.len() < RESPONSE_HEADER_LEN {
        return Err(CommandError::ShortResponse(data.len()));
    }
    let cmd_id = u16::from_le_bytes([data[0], data[1]]);
    let status = Status(u16::from_le_bytes([data[2], data[3]]));
    let declared = u16::from_le_bytes([data[4], data[5]]) as usize;
    let available = data.len() - RESPONSE_HEADER_LEN;
    if declared > available {
        return Err(CommandError::TruncatedPayload {
            declared,
            available,
        });
    }
    Ok((
        cmd_id,
        status,
        &data[RESPONSE_HEADER_LEN..RESPONSE_HEADER_LEN + declared],
    ))
}
