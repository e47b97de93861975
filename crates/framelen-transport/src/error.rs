/// Errors that can occur on the word transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The requested word width is outside the supported lane range.
    #[error("invalid word width ({lanes} lanes, expected 1..={max})")]
    InvalidWidth { lanes: usize, max: usize },

    /// A word's byte mask violates the transport contract.
    #[error("malformed byte mask {keep:#04x} on {lanes}-lane word (last={last})")]
    MalformedKeep { keep: u8, lanes: usize, last: bool },

    /// More bytes were supplied than a single word can carry.
    #[error("word payload too large ({len} bytes, max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// A producer offered a word while the previous one was still pending.
    #[error("link occupied (previous word not yet accepted)")]
    LinkOccupied,
}

pub type Result<T> = std::result::Result<T, TransportError>;
