//! Frame-length enforcement over a word stream.
//!
//! Every frame leaves the [`Adjuster`] with a length in `[length_min,
//! length_max]`: short frames are zero-padded, long frames are truncated, and
//! a [`FrameStatus`] record reports what happened. Input, output and status
//! each use their own depth-one handshake, so any of the three parties may
//! stall on any cycle.
//!
//! [`bench`] drives the adjuster cycle by cycle against stalling endpoints
//! and checks the output; [`AdjustWords`] and [`adjust_frames`] run it
//! without timing.

pub mod adjuster;
pub mod bench;
pub mod config;
pub mod error;
pub mod status;
pub mod stream;

pub use adjuster::{Adjuster, State};
pub use bench::{
    check, sweep, Bench, BenchConfig, CaseFailure, Outcome, Scenario, StallRegime, SweepConfig,
    SweepReport, DEFAULT_WATCHDOG,
};
pub use config::{AdjustConfig, LengthBounds};
pub use error::{AdjustError, ConfigError, Result};
pub use status::FrameStatus;
#[cfg(feature = "async")]
pub use stream::AdjustStream;
pub use stream::{adjust_frames, AdjustWords, Adjusted, AdjustedFrame};
