use std::path::PathBuf;

/// Errors that can occur opening or bridging byte channels.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to open the specified device path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel has been closed.
    #[error("channel closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ChannelError>;
