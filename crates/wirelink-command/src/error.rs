use std::time::Duration;

/// Errors surfaced by the request/response and command layers.
///
/// Framing errors never appear here — the frame decoder drops corrupt input
/// silently. What does surface is per-call and leaves the decoder ready for
/// the next frame.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Frame-level encode error (message over the reassembly limit).
    #[error("frame error: {0}")]
    Frame(#[from] wirelink_frame::FrameError),

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel reported end of stream.
    #[error("channel closed")]
    ChannelClosed,

    /// No matching response arrived within the deadline.
    ///
    /// Distinct from decode failures so callers can retry the whole request.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// A request envelope had fewer bytes than its fixed 4-byte header.
    #[error("short request header ({0} bytes, need 4)")]
    ShortRequest(usize),

    /// A response envelope had fewer bytes than its fixed 6-byte header.
    #[error("short response header ({0} bytes, need 6)")]
    ShortResponse(usize),

    /// An envelope declared more payload than the message carries.
    #[error("envelope payload truncated (declared {declared}, available {available})")]
    TruncatedPayload { declared: usize, available: usize },

    /// The device answered with a nonzero status code.
    #[error("command 0x{cmd_id:04x} failed: {status}")]
    Device {
        cmd_id: u16,
        status: crate::envelope::Status,
    },

    /// A well-formed response did not match the operation's expected shape.
    #[error("unexpected response shape for command 0x{cmd_id:04x}: {reason}")]
    UnexpectedShape { cmd_id: u16, reason: &'static str },

    /// A request argument was out of range before anything hit the wire.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, CommandError>;
