//! Conversion between whole frames and word streams.

use bytes::{Bytes, BytesMut};
use framelen_transport::{keep_mask, Word, WordWidth};

use crate::codec::Frame;
use crate::error::{FrameError, Result};

/// Splits one frame into words of a fixed width.
///
/// Every word but the last is full. The last word carries the remaining
/// bytes and the frame's user marker. An empty frame becomes a single empty
/// `last` word.
#[derive(Debug, Clone)]
pub struct FrameWords {
    data: Bytes,
    user: bool,
    width: WordWidth,
    pos: usize,
    done: bool,
}

impl FrameWords {
    pub fn new(frame: &Frame, width: WordWidth) -> Self {
        Self {
            data: frame.data.clone(),
            user: frame.user,
            width,
            pos: 0,
            done: false,
        }
    }
}

impl Iterator for FrameWords {
    type Item = Word;

    fn next(&mut self) -> Option<Word> {
        if self.done {
            return None;
        }
        let take = (self.data.len() - self.pos).min(self.width.lanes());
        let end = self.pos + take;
        let last = end == self.data.len();

        let mut word = Word::zeroed(0, last, last && self.user);
        word.data[..take].copy_from_slice(&self.data[self.pos..end]);
        word.keep = keep_mask(take);

        self.pos = end;
        self.done = last;
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let lanes = self.width.lanes();
        let remaining = self.data.len() - self.pos;
        let words = remaining.div_ceil(lanes).max(1);
        (words, Some(words))
    }
}

/// Split a sequence of frames into one continuous word stream.
pub fn frames_to_words<'a, I>(frames: I, width: WordWidth) -> impl Iterator<Item = Word> + 'a
where
    I: IntoIterator<Item = &'a Frame>,
    I::IntoIter: 'a,
{
    frames
        .into_iter()
        .flat_map(move |frame| FrameWords::new(frame, width))
}

/// Reassembles frames from a word stream.
///
/// The frame's user flag is the OR of every word's marker.
#[derive(Debug)]
pub struct FrameAssembler {
    width: WordWidth,
    buf: BytesMut,
    user: bool,
    words: usize,
}

impl FrameAssembler {
    pub fn new(width: WordWidth) -> Self {
        Self {
            width,
            buf: BytesMut::new(),
            user: false,
            words: 0,
        }
    }

    /// Add one word. Returns the completed frame when `word.last` is set.
    pub fn push(&mut self, word: Word) -> Result<Option<Frame>> {
        self.width.check(&word)?;

        self.buf.extend_from_slice(word.bytes());
        self.user |= word.user;
        self.words += 1;

        if !word.last {
            return Ok(None);
        }

        let frame = Frame {
            data: self.buf.split().freeze(),
            user: self.user,
        };
        self.user = false;
        self.words = 0;
        Ok(Some(frame))
    }

    /// No partial frame buffered.
    pub fn is_idle(&self) -> bool {
        self.words == 0
    }

    /// Check that the stream ended on a frame boundary.
    pub fn finish(self) -> Result<()> {
        if self.words == 0 {
            return Ok(());
        }
        Err(FrameError::UnterminatedFrame {
            words: self.words,
            bytes: self.buf.len(),
        })
    }
}

/// Reassemble a complete word stream into frames.
pub fn words_to_frames<I>(words: I, width: WordWidth) -> Result<Vec<Frame>>
where
    I: IntoIterator<Item = Word>,
{
    let mut assembler = FrameAssembler::new(width);
    let mut frames = Vec::new();
    for word in words {
        if let Some(frame) = assembler.push(word)? {
            frames.push(frame);
        }
    }
    assembler.finish()?;
    Ok(frames)
}
