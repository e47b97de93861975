//! Word-at-a-time handshake transport.
//!
//! This is the lowest layer of framelen. A stream of frames travels as
//! [`Word`]s, one per successful handshake: the producer offers a word, the
//! consumer accepts it, and a transfer happens only when both agree.
//!
//! - [`Word`] / [`WordWidth`]: the transfer unit and its lane geometry
//! - [`Link`]: a depth-one handshake register (occupied = `valid`)
//! - [`Upstream`] / [`Downstream`]: the two halves of a handshake
//! - [`Source`] / [`Sink`]: stall-injecting endpoints used by the bench

pub mod endpoint;
pub mod error;
pub mod link;
pub mod traits;
pub mod word;

pub use endpoint::{Pauser, Sink, Source, StallPolicy};
pub use error::{Result, TransportError};
pub use link::Link;
pub use traits::{Downstream, Upstream};
pub use word::{keep_mask, Word, WordWidth, MAX_LANES};
