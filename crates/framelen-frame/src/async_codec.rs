use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// `tokio_util` codec for the frame record format.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    config: FrameConfig,
}

impl FrameCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        decode_frame(src, self.config.max_payload_size)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        if frame.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: frame.len(),
                max: self.config.max_payload_size,
            });
        }
        encode_frame(&frame, dst)
    }
}
