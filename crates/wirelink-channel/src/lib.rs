//! Duplex byte-channel plumbing for device links.
//!
//! This is the lowest layer of wirelink. It knows nothing about frames or
//! commands — it only produces `Read + Write` byte streams with one shared
//! contract the layers above rely on:
//!
//! - `Ok(0)` from `read` means the channel is closed.
//! - `WouldBlock`/`TimedOut` means no data yet; keep polling.

pub mod duplex;
pub mod error;
pub mod notify;

#[cfg(unix)]
pub mod port;

pub use duplex::Duplex;
pub use error::{ChannelError, Result};
pub use notify::{NotifyBuffer, DEFAULT_POLL_INTERVAL};

#[cfg(unix)]
pub use port::LinkPort;
