//! The frame-length adjuster.
//!
//! Words enter through [`Downstream::accept`] and leave through two
//! independent depth-one links: adjusted words on the data link and one
//! [`FrameStatus`] per frame on the status link. Nothing larger than a single
//! word is ever buffered.
//!
//! Flow control:
//! - a word that may produce output is accepted only while the data link is
//!   vacant;
//! - a `last` word is accepted only while the status link is vacant, so at
//!   most one status record is pending and the data path can run at most one
//!   frame ahead of the status path;
//! - while padding, input is not accepted and [`Adjuster::step`] emits the
//!   synthesized words.

use framelen_transport::{Downstream, Link, Upstream, Word, WordWidth};
use tracing::{debug, trace};

use crate::config::{AdjustConfig, LengthBounds};
use crate::error::{AdjustError, Result};
use crate::status::FrameStatus;

/// Position of the adjuster within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between frames.
    Idle,
    /// Forwarding words, still within the maximum.
    Forward,
    /// Maximum reached; remaining input words are consumed and dropped.
    Truncate,
    /// Input frame ended short; emitting zero words up to the minimum.
    Pad,
}

/// Streaming frame-length adjuster.
#[derive(Debug)]
pub struct Adjuster {
    width: WordWidth,
    bounds: LengthBounds,
    active: LengthBounds,
    state: State,
    seen: usize,
    emitted: usize,
    user_seen: bool,
    padded: bool,
    pad_remaining: usize,
    held: Option<Word>,
    output: Link<Word>,
    status: Link<FrameStatus>,
    frames: u64,
}

impl Adjuster {
    /// Create an idle adjuster with both output links vacant.
    pub fn new(config: AdjustConfig) -> Self {
        Self {
            width: config.width,
            bounds: config.bounds,
            active: config.bounds,
            state: State::Idle,
            seen: 0,
            emitted: 0,
            user_seen: false,
            padded: false,
            pad_remaining: 0,
            held: None,
            output: Link::new(),
            status: Link::new(),
            frames: 0,
        }
    }

    /// Replace the length bounds. Takes effect at the next frame's first word.
    pub fn set_bounds(&mut self, bounds: LengthBounds) {
        self.bounds = bounds;
    }

    /// Bounds the next frame will use.
    pub fn bounds(&self) -> LengthBounds {
        self.bounds
    }

    /// Lanes per word on input and output.
    pub fn width(&self) -> WordWidth {
        self.width
    }

    /// Position within the current frame.
    pub fn state(&self) -> State {
        self.state
    }

    /// Frames whose status record has been produced.
    pub fn frames_completed(&self) -> u64 {
        self.frames
    }

    /// Between frames with nothing pending on either output link.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle && self.output.is_vacant() && self.status.is_vacant()
    }

    /// Return to `Idle`, dropping counters, flags and pending output.
    pub fn reset(&mut self) {
        self.active = self.bounds;
        self.state = State::Idle;
        self.clear_frame();
        self.output.clear();
        self.status.clear();
        debug!("adjuster reset");
    }

    /// The data link's pending word, if any (`valid` + payload).
    pub fn output(&self) -> Option<&Word> {
        self.output.peek()
    }

    /// Downstream accepts the pending data word.
    pub fn take_output(&mut self) -> Option<Word> {
        self.output.take()
    }

    /// The status link's pending record, if any.
    pub fn status(&self) -> Option<&FrameStatus> {
        self.status.peek()
    }

    /// Status consumer accepts the pending record.
    pub fn take_status(&mut self) -> Option<FrameStatus> {
        self.status.take()
    }

    /// Input `ready` for the offered word.
    pub fn is_ready_for(&self, word: &Word) -> bool {
        let status_ok = !word.last || self.status.is_vacant();
        match self.state {
            State::Pad => false,
            State::Truncate => !word.last || (self.output.is_vacant() && status_ok),
            State::Idle | State::Forward => self.output.is_vacant() && status_ok,
        }
    }

    /// Advance synthesized padding by one word if the data link has room.
    ///
    /// Returns `Ok(true)` if a word was emitted.
    pub fn step(&mut self) -> Result<bool> {
        if self.state != State::Pad || self.output.is_valid() {
            return Ok(false);
        }

        let lanes = self.pad_remaining.min(self.width.lanes());
        self.pad_remaining -= lanes;
        self.emitted += lanes;

        if self.pad_remaining > 0 {
            self.output.offer(Word::zeroed(lanes, false, false))?;
        } else {
            self.output.offer(Word::zeroed(lanes, true, self.user_seen))?;
            self.finish_frame()?;
        }
        Ok(true)
    }

    /// Transfer one input word.
    pub fn accept(&mut self, word: Word) -> Result<()> {
        self.width
            .check(&word)
            .map_err(AdjustError::MalformedWord)?;
        if !self.is_ready_for(&word) {
            return Err(AdjustError::NotReady);
        }
        // Lanes beyond `keep` are zeroed before anything is forwarded.
        let word = word.truncated(word.len());

        if self.state == State::Idle {
            self.active = self.bounds;
            self.state = State::Forward;
            trace!(
                min = self.active.min(),
                max = self.active.max(),
                "frame start"
            );
        }

        self.seen += word.len();
        self.user_seen |= word.user;
        trace!(
            len = word.len(),
            last = word.last,
            user = word.user,
            seen = self.seen,
            state = ?self.state,
            "accepted word"
        );

        match self.state {
            State::Truncate => self.drop_word(word),
            _ => self.forward_word(word),
        }
    }

    fn forward_word(&mut self, word: Word) -> Result<()> {
        let n = word.len();
        let room = self.active.max() - self.emitted;

        // A non-last word that fills the maximum exactly is followed by more
        // words, so the frame ends on output here.
        if n > room || (n == room && !word.last) {
            let tail = word.truncated(room).with_last(true);
            self.emitted = self.active.max();
            if word.last {
                self.output.offer(tail.with_user(self.user_seen))?;
                return self.finish_frame();
            }
            self.held = Some(tail);
            self.state = State::Truncate;
            return Ok(());
        }

        self.emitted += n;
        if !word.last {
            self.output.offer(word)?;
            return Ok(());
        }

        if self.emitted >= self.active.min() {
            self.output.offer(word.with_user(self.user_seen))?;
            return self.finish_frame();
        }

        // Short frame: zero-fill the rest of this word first so that only the
        // final word of the output frame can be partial.
        self.padded = true;
        let fill = (self.active.min() - self.emitted).min(self.width.lanes() - n);
        self.emitted += fill;
        let widened = word.padded(n + fill);

        if self.emitted == self.active.min() {
            self.output.offer(widened.with_user(self.user_seen))?;
            return self.finish_frame();
        }

        // The marker moves to the last synthesized word.
        self.output
            .offer(widened.with_last(false).with_user(false))?;
        self.pad_remaining = self.active.min() - self.emitted;
        self.state = State::Pad;
        Ok(())
    }

    fn drop_word(&mut self, word: Word) -> Result<()> {
        if !word.last {
            return Ok(());
        }
        if let Some(tail) = self.held.take() {
            self.output.offer(tail.with_user(self.user_seen))?;
        }
        self.finish_frame()
    }

    fn finish_frame(&mut self) -> Result<()> {
        let record = FrameStatus {
            pad: self.padded,
            truncate: self.seen > self.active.max(),
            output_length: self.emitted,
            original_length: self.seen,
        };
        self.status.offer(record)?;
        self.frames += 1;
        debug!(
            frame = self.frames,
            pad = record.pad,
            truncate = record.truncate,
            output_length = record.output_length,
            original_length = record.original_length,
            "frame complete"
        );

        self.state = State::Idle;
        self.clear_frame();
        Ok(())
    }

    fn clear_frame(&mut self) {
        self.seen = 0;
        self.emitted = 0;
        self.user_seen = false;
        self.padded = false;
        self.pad_remaining = 0;
        self.held = None;
    }
}

impl Default for Adjuster {
    fn default() -> Self {
        Self::new(AdjustConfig::default())
    }
}

impl Downstream<Word> for Adjuster {
    type Error = AdjustError;

    fn is_ready_for(&self, item: &Word) -> bool {
        Adjuster::is_ready_for(self, item)
    }

    fn accept(&mut self, item: Word) -> Result<()> {
        Adjuster::accept(self, item)
    }
}

impl Upstream<Word> for Adjuster {
    fn peek(&self) -> Option<&Word> {
        self.output()
    }

    fn take(&mut self) -> Option<Word> {
        self.take_output()
    }
}

impl Upstream<FrameStatus> for Adjuster {
    fn peek(&self) -> Option<&FrameStatus> {
        self.status()
    }

    fn take(&mut self) -> Option<FrameStatus> {
        self.take_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjuster(min: usize, max: usize, lanes: usize) -> Adjuster {
        Adjuster::new(AdjustConfig::new(min, max, lanes).unwrap())
    }

    fn byte(value: u8, last: bool) -> Word {
        Word::from_bytes(&[value], last, false).unwrap()
    }

    /// Feed one frame of single-byte words, draining both links eagerly.
    fn run(adj: &mut Adjuster, bytes: &[u8], user_on_last: bool) -> (Vec<Word>, FrameStatus) {
        let marked = user_on_last.then(|| bytes.len().saturating_sub(1));
        run_marked(adj, bytes, marked)
    }

    /// Like `run`, with the user marker on the word at `marked` only.
    fn run_marked(
        adj: &mut Adjuster,
        bytes: &[u8],
        marked: Option<usize>,
    ) -> (Vec<Word>, FrameStatus) {
        let mut out = Vec::new();
        let mut status = None;
        for (i, &b) in bytes.iter().enumerate() {
            let last = i + 1 == bytes.len();
            adj.accept(byte(b, last).with_user(marked == Some(i)))
                .unwrap();
            out.extend(adj.take_output());
            while adj.step().unwrap() {
                out.extend(adj.take_output());
            }
            if let Some(s) = adj.take_status() {
                status = Some(s);
            }
        }
        (out, status.expect("status record"))
    }

    fn payload(words: &[Word]) -> Vec<u8> {
        words.iter().flat_map(|w| w.bytes().to_vec()).collect()
    }

    #[test]
    fn within_bounds_passes_through() {
        let mut adj = adjuster(2, 4, 1);
        let (out, status) = run(&mut adj, &[0, 1, 2], false);

        assert_eq!(payload(&out), vec![0, 1, 2]);
        assert!(out.last().unwrap().last);
        assert_eq!(
            status,
            FrameStatus {
                pad: false,
                truncate: false,
                output_length: 3,
                original_length: 3,
            }
        );
    }

    #[test]
    fn short_frame_is_padded() {
        let mut adj = adjuster(2, 4, 1);
        let (out, status) = run(&mut adj, &[0], false);

        assert_eq!(payload(&out), vec![0, 0]);
        assert_eq!(out.len(), 2);
        assert!(!out[0].last && out[1].last);
        assert_eq!(
            status,
            FrameStatus {
                pad: true,
                truncate: false,
                output_length: 2,
                original_length: 1,
            }
        );
    }

    #[test]
    fn long_frame_is_truncated() {
        let mut adj = adjuster(2, 4, 1);
        let (out, status) = run(&mut adj, &[0, 1, 2, 3, 4], false);

        assert_eq!(payload(&out), vec![0, 1, 2, 3]);
        assert!(out[3].last);
        assert_eq!(
            status,
            FrameStatus {
                pad: false,
                truncate: true,
                output_length: 4,
                original_length: 5,
            }
        );
    }

    #[test]
    fn exact_bounds_set_no_flags() {
        let mut adj = adjuster(2, 4, 1);
        let (_, at_min) = run(&mut adj, &[7, 8], false);
        let (_, at_max) = run(&mut adj, &[7, 8, 9, 10], false);

        assert!(!at_min.pad && !at_min.truncate);
        assert!(!at_max.pad && !at_max.truncate);
        assert_eq!(at_max.output_length, 4);
    }

    #[test]
    fn back_to_back_frames_do_not_interfere() {
        let mut adj = adjuster(2, 4, 1);
        let (_, first) = run(&mut adj, &[0, 1, 2], false);
        let (out, second) = run(&mut adj, &[0, 1, 2], false);

        assert_eq!(first, second);
        assert_eq!(payload(&out), vec![0, 1, 2]);
        assert_eq!(adj.frames_completed(), 2);
        assert!(adj.is_idle());
    }

    #[test]
    fn user_marker_lands_on_final_word() {
        let mut adj = adjuster(2, 4, 1);
        let (out, status) = run(&mut adj, &[0, 1, 2], true);
        assert!(out.last().unwrap().user);
        assert!(out[..2].iter().all(|w| !w.user));
        assert_eq!(status.output_length, 3);
    }

    #[test]
    fn user_marker_survives_padding() {
        let mut adj = adjuster(4, 4, 1);
        let (out, _) = run(&mut adj, &[9], true);
        assert_eq!(out.len(), 4);
        assert!(out[3].user && out[3].last);
    }

    #[test]
    fn user_marker_after_truncation_point_is_kept() {
        let mut adj = adjuster(0, 2, 1);
        let (out, status) = run(&mut adj, &[0, 1, 2, 3], true);
        assert_eq!(out.len(), 2);
        assert!(out[1].user && out[1].last);
        assert!(status.truncate);
    }

    #[test]
    fn early_marker_reaches_final_word_in_bounds() {
        let mut adj = adjuster(2, 4, 1);
        let (out, status) = run_marked(&mut adj, &[0, 1, 2], Some(0));
        assert_eq!(payload(&out), vec![0, 1, 2]);
        assert!(out[0].user);
        assert!(out[2].user && out[2].last);
        assert!(!status.pad && !status.truncate);
    }

    #[test]
    fn early_marker_reaches_final_word_when_truncated() {
        let mut adj = adjuster(0, 2, 1);
        let (out, status) = run_marked(&mut adj, &[0, 1, 2, 3], Some(0));
        assert_eq!(payload(&out), vec![0, 1]);
        assert!(out[1].user && out[1].last);
        assert!(status.truncate);
    }

    #[test]
    fn marker_on_dropped_word_reaches_final_word() {
        let mut adj = adjuster(0, 2, 1);
        let (out, _) = run_marked(&mut adj, &[0, 1, 2, 3], Some(2));
        assert_eq!(out.len(), 2);
        assert!(!out[0].user);
        assert!(out[1].user && out[1].last);
    }

    #[test]
    fn early_marker_reaches_final_word_when_padded() {
        let mut adj = adjuster(4, 4, 1);
        let (out, status) = run_marked(&mut adj, &[7, 8], Some(0));
        assert_eq!(payload(&out), vec![7, 8, 0, 0]);
        assert!(out[3].user && out[3].last);
        assert!(out[1..3].iter().all(|w| !w.user));
        assert!(status.pad);
    }

    #[test]
    fn unmarked_frame_never_gains_marker() {
        let mut adj = adjuster(4, 4, 1);
        let (out, _) = run_marked(&mut adj, &[7], None);
        assert!(out.iter().all(|w| !w.user));
    }

    #[test]
    fn stray_lanes_beyond_keep_are_cleared() {
        let mut adj = adjuster(0, 8, 4);
        let mut word = Word::from_bytes(&[1, 2], true, false).unwrap();
        word.data[2] = 0xAA;
        word.data[7] = 0x55;

        adj.accept(word).unwrap();
        let out = adj.take_output().unwrap();
        assert_eq!(out, Word::from_bytes(&[1, 2], true, false).unwrap());
    }

    #[test]
    fn zero_min_never_pads() {
        let mut adj = adjuster(0, 4, 1);
        let (out, status) = run(&mut adj, &[5], false);
        assert_eq!(payload(&out), vec![5]);
        assert!(!status.pad);
    }

    #[test]
    fn wide_words_pad_within_final_word_first() {
        let mut adj = adjuster(6, 16, 4);
        adj.accept(Word::from_bytes(&[1], true, false).unwrap())
            .unwrap();

        let first = adj.take_output().unwrap();
        assert_eq!(first.bytes(), &[1, 0, 0, 0]);
        assert!(!first.last);
        assert_eq!(adj.state(), State::Pad);
        assert!(adj.status().is_none());

        assert!(adj.step().unwrap());
        let second = adj.take_output().unwrap();
        assert_eq!(second.bytes(), &[0, 0]);
        assert!(second.last);

        let status = adj.take_status().unwrap();
        assert_eq!(status.output_length, 6);
        assert_eq!(status.original_length, 1);
        assert!(status.pad);
    }

    #[test]
    fn wide_word_truncated_mid_word() {
        let mut adj = adjuster(0, 6, 4);
        adj.accept(Word::from_bytes(&[0, 1, 2, 3], false, false).unwrap())
            .unwrap();
        assert_eq!(adj.take_output().unwrap().bytes(), &[0, 1, 2, 3]);

        adj.accept(Word::from_bytes(&[4, 5, 6, 7], false, false).unwrap())
            .unwrap();
        assert!(adj.output().is_none());
        assert_eq!(adj.state(), State::Truncate);

        adj.accept(Word::from_bytes(&[8], true, false).unwrap())
            .unwrap();
        let tail = adj.take_output().unwrap();
        assert_eq!(tail.bytes(), &[4, 5]);
        assert!(tail.last);

        let status = adj.take_status().unwrap();
        assert!(status.truncate);
        assert_eq!(status.output_length, 6);
        assert_eq!(status.original_length, 9);
    }

    #[test]
    fn empty_last_word_after_exact_fill_is_not_truncation() {
        let mut adj = adjuster(0, 2, 2);
        adj.accept(Word::from_bytes(&[1, 2], false, false).unwrap())
            .unwrap();
        adj.accept(Word::zeroed(0, true, false)).unwrap();

        let word = adj.take_output().unwrap();
        assert_eq!(word.bytes(), &[1, 2]);
        assert!(word.last);
        let status = adj.take_status().unwrap();
        assert!(!status.truncate);
        assert_eq!(status.original_length, 2);
    }

    #[test]
    fn empty_frame_with_zero_min_is_one_empty_word() {
        let mut adj = adjuster(0, 4, 4);
        adj.accept(Word::zeroed(0, true, false)).unwrap();

        let word = adj.take_output().unwrap();
        assert!(word.is_empty() && word.last);
        assert_eq!(adj.take_status().unwrap().output_length, 0);
    }

    #[test]
    fn empty_frame_padded_from_first_word() {
        let mut adj = adjuster(3, 8, 2);
        adj.accept(Word::zeroed(0, true, true)).unwrap();

        let first = adj.take_output().unwrap();
        assert_eq!(first.len(), 2);
        assert!(!first.last && !first.user);
        assert!(adj.step().unwrap());
        let second = adj.take_output().unwrap();
        assert_eq!(second.len(), 1);
        assert!(second.last && second.user);
    }

    #[test]
    fn zero_max_emits_empty_terminator() {
        let mut adj = adjuster(0, 0, 1);
        let (out, status) = run(&mut adj, &[1, 2], false);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_empty() && out[0].last);
        assert!(status.truncate);
        assert_eq!(status.output_length, 0);
    }

    #[test]
    fn stalled_data_link_blocks_input() {
        let mut adj = adjuster(0, 8, 1);
        adj.accept(byte(1, false)).unwrap();

        assert!(!adj.is_ready_for(&byte(2, false)));
        let err = adj.accept(byte(2, false)).unwrap_err();
        assert!(matches!(err, AdjustError::NotReady));
        assert_eq!(adj.output().unwrap().bytes(), &[1]);
    }

    #[test]
    fn pending_status_stalls_only_the_next_last_word() {
        let mut adj = adjuster(0, 8, 1);
        adj.accept(byte(1, true)).unwrap();
        adj.take_output().unwrap();
        assert!(adj.status().is_some());

        // Next frame's body flows while the record is pending.
        assert!(adj.is_ready_for(&byte(2, false)));
        adj.accept(byte(2, false)).unwrap();
        adj.take_output().unwrap();

        assert!(!adj.is_ready_for(&byte(3, true)));
        adj.take_status().unwrap();
        assert!(adj.is_ready_for(&byte(3, true)));
    }

    #[test]
    fn padding_waits_for_data_link() {
        let mut adj = adjuster(3, 3, 1);
        adj.accept(byte(1, true)).unwrap();
        assert_eq!(adj.state(), State::Pad);
        assert!(!adj.step().unwrap());
        assert!(!adj.is_ready_for(&byte(9, false)));

        adj.take_output().unwrap();
        assert!(adj.step().unwrap());
        assert!(!adj.step().unwrap());
    }

    #[test]
    fn truncate_state_drops_without_output_room() {
        let mut adj = adjuster(0, 1, 1);
        adj.accept(byte(1, false)).unwrap();
        assert_eq!(adj.state(), State::Truncate);

        // Held tail; dropped words do not need the data link.
        assert!(adj.is_ready_for(&byte(2, false)));
        adj.accept(byte(2, false)).unwrap();
        adj.accept(byte(3, true)).unwrap();
        assert_eq!(adj.take_output().unwrap().bytes(), &[1]);
    }

    #[test]
    fn bounds_latched_per_frame() {
        let mut adj = adjuster(0, 8, 1);
        adj.accept(byte(1, false)).unwrap();
        adj.take_output();
        adj.set_bounds(LengthBounds::new(0, 1).unwrap());

        adj.accept(byte(2, true)).unwrap();
        adj.take_output();
        let status = adj.take_status().unwrap();
        assert!(!status.truncate);
        assert_eq!(status.output_length, 2);

        let (_, next) = run(&mut adj, &[1, 2], false);
        assert!(next.truncate);
    }

    #[test]
    fn malformed_word_rejected() {
        let mut adj = adjuster(0, 8, 4);
        let partial = Word::from_bytes(&[1, 2], false, false).unwrap();
        let err = adj.accept(partial).unwrap_err();
        assert!(matches!(err, AdjustError::MalformedWord(_)));
        assert_eq!(adj.state(), State::Idle);
    }

    #[test]
    fn reset_clears_everything() {
        let mut adj = adjuster(4, 8, 1);
        adj.accept(byte(1, true)).unwrap();
        assert_eq!(adj.state(), State::Pad);

        adj.reset();
        assert!(adj.is_idle());
        assert!(adj.output().is_none());
        assert!(adj.status().is_none());

        let (out, status) = run(&mut adj, &[1, 2, 3, 4], false);
        assert_eq!(out.len(), 4);
        assert!(!status.pad);
    }
}
