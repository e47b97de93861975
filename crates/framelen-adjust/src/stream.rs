//! Pull-based adapters over the adjuster.
//!
//! [`AdjustWords`] turns any word iterator into a lazy sequence of adjusted
//! words and status records. Both links are drained before the next input
//! word is pulled, so the adjuster is always ready when it is offered one.

use framelen_frame::{frames_to_words, Frame, FrameAssembler};
use framelen_transport::Word;

use crate::adjuster::Adjuster;
use crate::config::AdjustConfig;
use crate::error::{AdjustError, Result};
use crate::status::FrameStatus;

/// One item produced by the adjuster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjusted {
    /// An output word.
    Word(Word),
    /// The status record of the frame whose final word was just produced.
    Status(FrameStatus),
}

/// Take whatever the adjuster has ready, advancing padding as needed.
///
/// Returns `Ok(None)` once the adjuster needs another input word.
fn drain(adjuster: &mut Adjuster) -> Result<Option<Adjusted>> {
    loop {
        if let Some(word) = adjuster.take_output() {
            return Ok(Some(Adjusted::Word(word)));
        }
        if let Some(status) = adjuster.take_status() {
            return Ok(Some(Adjusted::Status(status)));
        }
        if !adjuster.step()? {
            return Ok(None);
        }
    }
}

/// Iterator adapter running a word stream through an [`Adjuster`].
#[derive(Debug)]
pub struct AdjustWords<I> {
    inner: I,
    adjuster: Adjuster,
}

impl<I> AdjustWords<I>
where
    I: Iterator<Item = Word>,
{
    pub fn new(inner: I, config: AdjustConfig) -> Self {
        Self::with_adjuster(inner, Adjuster::new(config))
    }

    pub fn with_adjuster(inner: I, adjuster: Adjuster) -> Self {
        Self { inner, adjuster }
    }

    pub fn adjuster(&self) -> &Adjuster {
        &self.adjuster
    }

    pub fn into_inner(self) -> (I, Adjuster) {
        (self.inner, self.adjuster)
    }
}

impl<I> Iterator for AdjustWords<I>
where
    I: Iterator<Item = Word>,
{
    type Item = Result<Adjusted>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match drain(&mut self.adjuster) {
                Ok(Some(item)) => return Some(Ok(item)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
            let word = self.inner.next()?;
            if let Err(err) = self.adjuster.accept(word) {
                return Some(Err(err));
            }
        }
    }
}

/// A frame as it left the adjuster, with its status record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedFrame {
    pub frame: Frame,
    pub status: FrameStatus,
}

/// Run whole frames through a fresh adjuster.
pub fn adjust_frames(frames: &[Frame], config: AdjustConfig) -> Result<Vec<AdjustedFrame>> {
    let words = frames_to_words(frames, config.width);
    let mut assembler = FrameAssembler::new(config.width);
    let mut pending: Option<Frame> = None;
    let mut out = Vec::with_capacity(frames.len());

    for item in AdjustWords::new(words, config) {
        match item? {
            Adjusted::Word(word) => {
                if let Some(frame) = assembler.push(word)? {
                    pending = Some(frame);
                }
            }
            Adjusted::Status(status) => {
                let frame = pending.take().ok_or_else(|| {
                    AdjustError::Verification("status record before frame end".to_string())
                })?;
                out.push(AdjustedFrame { frame, status });
            }
        }
    }

    assembler.finish()?;
    Ok(out)
}

#[cfg(feature = "async")]
mod stream_impl {
    use std::pin::Pin;
    use std::task::{ready, Context, Poll};

    use futures_core::Stream;

    use super::*;

    /// Async counterpart of [`AdjustWords`] over a `Stream` of words.
    #[derive(Debug)]
    pub struct AdjustStream<S> {
        inner: S,
        adjuster: Adjuster,
    }

    impl<S> AdjustStream<S> {
        pub fn new(inner: S, config: AdjustConfig) -> Self {
            Self {
                inner,
                adjuster: Adjuster::new(config),
            }
        }

        pub fn adjuster(&self) -> &Adjuster {
            &self.adjuster
        }
    }

    impl<S> Stream for AdjustStream<S>
    where
        S: Stream<Item = Word> + Unpin,
    {
        type Item = Result<Adjusted>;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let this = self.get_mut();
            loop {
                match drain(&mut this.adjuster) {
                    Ok(Some(item)) => return Poll::Ready(Some(Ok(item))),
                    Ok(None) => {}
                    Err(err) => return Poll::Ready(Some(Err(err))),
                }
                let word = match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                    Some(word) => word,
                    None => return Poll::Ready(None),
                };
                if let Err(err) = this.adjuster.accept(word) {
                    return Poll::Ready(Some(Err(err)));
                }
            }
        }
    }
}

#[cfg(feature = "async")]
pub use stream_impl::AdjustStream;

#[cfg(test)]
mod tests {
    use framelen_frame::FrameWords;
    use framelen_transport::WordWidth;

    use super::*;

    fn config(min: usize, max: usize, lanes: usize) -> AdjustConfig {
        AdjustConfig::new(min, max, lanes).unwrap()
    }

    #[test]
    fn status_follows_final_word() {
        let frame = Frame::new(vec![0, 1, 2]);
        let words = FrameWords::new(&frame, WordWidth::BYTE);
        let items: Vec<Adjusted> = AdjustWords::new(words, config(2, 4, 1))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(items.len(), 4);
        assert!(matches!(items[2], Adjusted::Word(w) if w.last));
        assert!(matches!(items[3], Adjusted::Status(s) if s.original_length == 3));
    }

    #[test]
    fn adjust_frames_scenarios() {
        let frames = vec![
            Frame::new(vec![0, 1, 2]),
            Frame::new(vec![0]),
            Frame::new(vec![0, 1, 2, 3, 4]),
        ];
        let out = adjust_frames(&frames, config(2, 4, 1)).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].frame.data.as_ref(), &[0, 1, 2]);
        assert_eq!(out[1].frame.data.as_ref(), &[0, 0]);
        assert!(out[1].status.pad);
        assert_eq!(out[2].frame.data.as_ref(), &[0, 1, 2, 3]);
        assert!(out[2].status.truncate);
    }

    #[test]
    fn adjust_frames_is_deterministic() {
        let frames: Vec<Frame> = (0..6u8)
            .map(|n| Frame::new((0..n).collect::<Vec<u8>>()))
            .collect();
        let a = adjust_frames(&frames, config(2, 4, 2)).unwrap();
        let b = adjust_frames(&frames, config(2, 4, 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_input_surfaces_as_error() {
        let words = vec![Word::from_bytes(&[1], false, false).unwrap()];
        let mut iter = AdjustWords::new(words.into_iter(), config(0, 8, 2));
        assert!(matches!(
            iter.next(),
            Some(Err(AdjustError::MalformedWord(_)))
        ));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut iter = AdjustWords::new(std::iter::empty(), AdjustConfig::default());
        assert!(iter.next().is_none());
        assert!(iter.adjuster().is_idle());
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn async_stream_matches_iterator() {
        use futures_util::StreamExt;

        let frames = vec![Frame::flagged(vec![1, 2, 3, 4, 5]), Frame::new(vec![9])];
        let cfg = config(2, 4, 2);
        let words: Vec<Word> = frames_to_words(&frames, cfg.width).collect();

        let sync: Vec<Adjusted> = AdjustWords::new(words.clone().into_iter(), cfg)
            .collect::<Result<_>>()
            .unwrap();
        let stream = AdjustStream::new(futures_util::stream::iter(words), cfg);
        let async_items: Vec<Adjusted> = stream
            .map(|item| item.unwrap())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(sync, async_items);
    }
}
