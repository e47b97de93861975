use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod adjust;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pad or truncate frames to a length range and report per-frame status.
    Adjust(AdjustArgs),
    /// Run the stall-injecting verification sweep.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Adjust(args) => adjust::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct AdjustArgs {
    /// Minimum output length in bytes.
    #[arg(long, env = "FRAMELEN_MIN")]
    pub min: usize,
    /// Maximum output length in bytes.
    #[arg(long, env = "FRAMELEN_MAX")]
    pub max: usize,
    /// Bytes per word (1-8).
    #[arg(long, env = "FRAMELEN_WIDTH", default_value = "1")]
    pub width: usize,
    /// Frame payload as hex; repeat for multiple frames.
    #[arg(
        long = "frame",
        value_name = "HEX",
        conflicts_with = "input",
        required_unless_present = "input"
    )]
    pub frames: Vec<String>,
    /// Read frames from a frame record file.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// Set the user marker on these frame indices (comma-separated).
    #[arg(long = "user-on", value_name = "IDX", value_delimiter = ',')]
    pub user_on: Vec<usize>,
    /// Write adjusted frames as frame records.
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Bytes per word (1-8).
    #[arg(long, env = "FRAMELEN_WIDTH", default_value = "1")]
    pub width: usize,
    /// Seed for the randomized stall regime.
    #[arg(long, default_value = "1")]
    pub seed: u64,
    /// Largest length_max swept.
    #[arg(long, default_value = "5")]
    pub max_length: usize,
    /// Largest payload length swept.
    #[arg(long, default_value = "5")]
    pub max_payload: usize,
    /// Cycle budget per case before declaring a stall.
    #[arg(long, default_value = "100000")]
    pub watchdog: u64,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
