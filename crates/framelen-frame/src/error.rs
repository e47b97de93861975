use framelen_transport::TransportError;

/// Errors that can occur while framing, splitting or reassembling frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The record header contains an invalid magic number.
    #[error("invalid frame record magic (expected 0x464C \"FL\")")]
    InvalidMagic,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frame records.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete record was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// Words were left over without a terminating `last` word.
    #[error("unterminated frame ({words} words, {bytes} bytes without last)")]
    UnterminatedFrame { words: usize, bytes: usize },

    /// A word violated the transport contract.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
