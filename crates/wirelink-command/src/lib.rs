//! Request/response correlation and the typed command layer.
//!
//! This is the "just works" layer above the frame codec. A [`Requester`]
//! writes a request message, then polls the channel until the response with
//! the matching session id reassembles or the deadline passes. A
//! [`CommandClient`] speaks the command envelope on top of that: a small
//! little-endian header carrying a command id and (for responses) a status
//! code, plus typed operations with response shape checks.

pub mod client;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod requester;

pub use client::{CommandClient, DEFAULT_TIMEOUT, REBOOT_TIMEOUT};
pub use envelope::{
    pack_request, pack_response, parse_request, parse_response, Status, REQUEST_HEADER_LEN,
    RESPONSE_HEADER_LEN,
};
pub use error::{CommandError, Result};
pub use requester::{Requester, DEFAULT_POLL_INTERVAL};
