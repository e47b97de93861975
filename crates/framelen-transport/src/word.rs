use crate::error::{Result, TransportError};

/// Widest supported word, in byte lanes.
pub const MAX_LANES: usize = 8;

/// Mask with the low `lanes` bits set (saturating at [`MAX_LANES`]).
pub const fn keep_mask(lanes: usize) -> u8 {
    if lanes >= MAX_LANES {
        u8::MAX
    } else {
        ((1u16 << lanes) - 1) as u8
    }
}

/// Number of byte lanes in every word of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordWidth(u8);

impl WordWidth {
    /// One byte per word.
    pub const BYTE: Self = Self(1);

    /// Create a width of `lanes` bytes (1..=8).
    pub fn new(lanes: usize) -> Result<Self> {
        if lanes == 0 || lanes > MAX_LANES {
            return Err(TransportError::InvalidWidth {
                lanes,
                max: MAX_LANES,
            });
        }
        Ok(Self(lanes as u8))
    }

    /// Lane count.
    pub fn lanes(self) -> usize {
        self.0 as usize
    }

    /// Byte mask with every lane valid.
    pub fn full_mask(self) -> u8 {
        keep_mask(self.lanes())
    }

    /// Check a word against the transport contract for this width.
    ///
    /// The mask must be contiguous from lane 0 and fit the width. Words
    /// without `last` must be full; a `last` word may be partial or empty.
    pub fn check(self, word: &Word) -> Result<()> {
        let keep = word.keep;
        let contiguous = (u16::from(keep) & (u16::from(keep) + 1)) == 0;
        let fits = keep & !self.full_mask() == 0;
        let complete = word.last || keep == self.full_mask();

        if contiguous && fits && complete {
            Ok(())
        } else {
            Err(TransportError::MalformedKeep {
                keep,
                lanes: self.lanes(),
                last: word.last,
            })
        }
    }
}

impl Default for WordWidth {
    fn default() -> Self {
        Self::BYTE
    }
}

impl TryFrom<usize> for WordWidth {
    type Error = TransportError;

    fn try_from(lanes: usize) -> Result<Self> {
        Self::new(lanes)
    }
}

/// One handshake transfer: a chunk of byte lanes plus framing sideband.
///
/// Lanes outside `keep` are always zero, so two words carrying the same
/// bytes compare equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Word {
    /// Lane payload; lane `i` is `data[i]`.
    pub data: [u8; MAX_LANES],
    /// Byte-validity mask, contiguous from lane 0.
    pub keep: u8,
    /// Final word of a frame.
    pub last: bool,
    /// Upstream error/annotation marker.
    pub user: bool,
}

impl Word {
    /// Build a word carrying `bytes` in its low lanes.
    pub fn from_bytes(bytes: &[u8], last: bool, user: bool) -> Result<Self> {
        if bytes.len() > MAX_LANES {
            return Err(TransportError::PayloadTooLarge {
                len: bytes.len(),
                max: MAX_LANES,
            });
        }
        let mut data = [0u8; MAX_LANES];
        data[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            data,
            keep: keep_mask(bytes.len()),
            last,
            user,
        })
    }

    /// A word of `lanes` zero bytes.
    pub fn zeroed(lanes: usize, last: bool, user: bool) -> Self {
        Self {
            data: [0u8; MAX_LANES],
            keep: keep_mask(lanes),
            last,
            user,
        }
    }

    /// Number of valid bytes.
    pub fn len(&self) -> usize {
        self.keep.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.keep == 0
    }

    /// The valid bytes, in lane order.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Keep only the first `lanes` valid bytes.
    pub fn truncated(mut self, lanes: usize) -> Self {
        let lanes = lanes.min(self.len());
        self.data[lanes..].fill(0);
        self.keep = keep_mask(lanes);
        self
    }

    /// Widen the mask to `lanes` bytes, filling new lanes with zeros.
    pub fn padded(mut self, lanes: usize) -> Self {
        let lanes = lanes.min(MAX_LANES);
        let start = self.len();
        if lanes > start {
            self.data[start..lanes].fill(0);
            self.keep = keep_mask(lanes);
        }
        self
    }

    pub fn with_last(mut self, last: bool) -> Self {
        self.last = last;
        self
    }

    pub fn with_user(mut self, user: bool) -> Self {
        self.user = user;
        self
    }
}
