use serde::Serialize;

/// Per-frame adjustment summary, one for every input frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FrameStatus {
    /// Zero bytes were appended to reach the minimum.
    pub pad: bool,
    /// Bytes beyond the maximum were dropped.
    pub truncate: bool,
    /// Bytes emitted on the output.
    pub output_length: usize,
    /// Bytes received on the input.
    pub original_length: usize,
}
