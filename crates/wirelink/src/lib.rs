//! Reliable framed messaging over serial and BLE device links.
//!
//! wirelink turns an unreliable, MTU-limited byte stream — a UART, or a BLE
//! notification channel chunked to ~20 bytes — into a reliable channel of
//! whole, integrity-checked messages, with request/response correlation and
//! a typed command client on top.
//!
//! # Crate Structure
//!
//! - [`channel`] — Duplex byte-channel plumbing (ports, notify bridging)
//! - [`frame`] — CRC-checked frame codec with fragmentation and resync
//! - [`command`] — Request/response correlation and the typed command client

/// Re-export channel types.
pub mod channel {
    pub use wirelink_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use wirelink_frame::*;
}

/// Re-export command types.
pub mod command {
    pub use wirelink_command::*;
}
