use std::fmt;
use std::io;

use framelen_adjust::{AdjustError, ConfigError};
use framelen_frame::FrameError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const VERIFICATION_FAILED: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::InvalidMagic
        | FrameError::PayloadTooLarge { .. }
        | FrameError::ConnectionClosed
        | FrameError::UnterminatedFrame { .. }
        | FrameError::Transport(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}

pub fn adjust_error(context: &str, err: AdjustError) -> CliError {
    match err {
        AdjustError::Config(err) => config_error(context, err),
        AdjustError::Frame(err) => frame_error(context, err),
        AdjustError::MalformedWord(_) | AdjustError::Transport(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        AdjustError::Stalled { .. } | AdjustError::Verification(_) => {
            CliError::new(VERIFICATION_FAILED, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_is_usage() {
        let err = adjust_error(
            "bad bounds",
            AdjustError::Config(ConfigError::InvertedBounds { min: 5, max: 2 }),
        );
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("bad bounds: "));
    }

    #[test]
    fn truncated_record_is_data_invalid() {
        let err = frame_error("read failed", FrameError::ConnectionClosed);
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_file_is_failure() {
        let err = io_error(
            "open failed",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn stall_is_verification_failure() {
        let err = adjust_error("bench", AdjustError::Stalled { cycles: 10 });
        assert_eq!(err.code, VERIFICATION_FAILED);
    }
}
