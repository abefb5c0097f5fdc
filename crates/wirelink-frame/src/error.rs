/// Errors that can occur during frame encoding.
///
/// Decoding has no error type: the link is assumed lossy, so the decoder
/// drops invalid input silently and resynchronizes (see
/// [`DecoderStats`](crate::DecoderStats) for the drop counters).
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The message exceeds the reassembly limit of the receiving side.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
