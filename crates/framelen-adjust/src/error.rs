use framelen_frame::FrameError;
use framelen_transport::TransportError;

/// Invalid adjuster configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The minimum length is above the maximum.
    #[error("length_min ({min}) exceeds length_max ({max})")]
    InvertedBounds { min: usize, max: usize },

    /// The word width is out of range.
    #[error("invalid word width: {0}")]
    Width(#[from] TransportError),
}

/// Errors that can occur while adjusting a word stream.
#[derive(Debug, thiserror::Error)]
pub enum AdjustError {
    /// Configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An input word violated the transport contract.
    #[error("malformed input word: {0}")]
    MalformedWord(#[source] TransportError),

    /// A word was offered while the adjuster was not ready for it.
    #[error("adjuster not ready for input")]
    NotReady,

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The bench made no progress within its watchdog limit.
    #[error("stalled after {cycles} cycles without draining")]
    Stalled { cycles: u64 },

    /// Output did not satisfy the length-adjustment contract.
    #[error("verification failed: {0}")]
    Verification(String),
}

pub type Result<T> = std::result::Result<T, AdjustError>;
