//! Frames as the producer and consumer see them.
//!
//! The adjuster works one word at a time; this crate sits on either side of
//! it. A [`Frame`] is split into words with [`FrameWords`] and rebuilt with
//! [`FrameAssembler`]. Frames also have a record format for files and pipes:
//! - A 2-byte magic number ("FL") for stream synchronization
//! - A 4-byte little-endian payload length
//! - A 1-byte flags field (bit 0 = user marker)

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod reader;
pub mod words;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::FrameCodec;
pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, FLAG_USER, HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, Frames};
pub use words::{frames_to_words, words_to_frames, FrameAssembler, FrameWords};
pub use writer::FrameWriter;
