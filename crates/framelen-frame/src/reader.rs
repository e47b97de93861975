use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frame records from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Ok(None)` on a clean end of stream between records and
    /// `Err(FrameError::ConnectionClosed)` if the stream ends mid-record.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.config.max_payload_size)? {
                trace!(len = frame.len(), user = frame.user, "decoded frame record");
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Iterate over the remaining frames, stopping after the first error.
    pub fn frames(&mut self) -> Frames<'_, T> {
        Frames {
            reader: self,
            failed: false,
        }
    }

    /// Read every remaining frame.
    pub fn read_all(&mut self) -> Result<Vec<Frame>> {
        self.frames().collect()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Iterator returned by [`FrameReader::frames`].
pub struct Frames<'a, T> {
    reader: &'a mut FrameReader<T>,
    failed: bool,
}

impl<T: Read> Iterator for Frames<'_, T> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.read_frame() {
            Ok(frame) => frame.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
