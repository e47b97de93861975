//! Streaming frame-length enforcement.
//!
//! Frames shorter than a configured minimum are zero-padded, frames longer
//! than a maximum are truncated, and every frame yields a status record.
//!
//! # Crate Structure
//!
//! - [`transport`]: words, depth-one handshake links, stalling endpoints
//! - [`frame`]: whole frames, word splitting and the frame record format
//! - [`adjust`]: the adjuster, stream adapters and the verification bench

/// Re-export transport types.
pub mod transport {
    pub use framelen_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use framelen_frame::*;
}

/// Re-export adjuster types.
pub mod adjust {
    pub use framelen_adjust::*;
}
