use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frame records to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and write one frame record, then flush.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        self.encode(frame)?;
        self.write_buf()?;
        self.flush()
    }

    /// Encode a batch of frames, write them in one pass and flush once.
    ///
    /// Nothing is written if any frame exceeds the payload limit.
    pub fn write_frames<'a, I>(&mut self, frames: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        self.buf.clear();
        let mut count = 0;
        for frame in frames {
            self.encode(frame)?;
            count += 1;
        }
        self.write_buf()?;
        self.flush()?;
        Ok(count)
    }

    fn encode(&mut self, frame: &Frame) -> Result<()> {
        let max = self.config.max_payload_size;
        if frame.len() > max {
            self.buf.clear();
            return Err(FrameError::PayloadTooLarge {
                size: frame.len(),
                max,
            });
        }
        encode_frame(frame, &mut self.buf)
    }

    fn write_buf(&mut self) -> Result<()> {
        let mut rest = &self.buf[..];
        while !rest.is_empty() {
            match self.inner.write(rest) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => rest = &rest[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
