use framelen_transport::WordWidth;

use crate::error::ConfigError;

/// Inclusive output length range `[min, max]`, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    min: usize,
    max: usize,
}

impl LengthBounds {
    /// Create bounds, rejecting `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Never pads, never truncates.
    pub const fn unbounded() -> Self {
        Self {
            min: 0,
            max: usize::MAX,
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, len: usize) -> bool {
        self.min <= len && len <= self.max
    }
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Adjuster configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustConfig {
    /// Length range applied to each frame, latched at its first word.
    pub bounds: LengthBounds,
    /// Lanes per word on both input and output.
    pub width: WordWidth,
}

impl AdjustConfig {
    /// Validate raw values into a configuration.
    pub fn new(min: usize, max: usize, lanes: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            bounds: LengthBounds::new(min, max)?,
            width: WordWidth::new(lanes)?,
        })
    }
}
