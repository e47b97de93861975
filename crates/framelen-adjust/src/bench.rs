//! Cycle-level verification bench.
//!
//! A [`Bench`] wires a stalling word [`Source`], an [`Adjuster`], a data
//! [`Sink`] and a status [`Sink`] together and advances them one cycle at a
//! time. Each party pauses according to its own [`StallPolicy`], so content
//! must match the no-stall run regardless of timing. [`check`] holds the
//! per-frame contract and [`sweep`] runs the full bounds/length/regime matrix.

use std::fmt;

use framelen_frame::{Frame, FrameAssembler, FrameWords};
use framelen_transport::{Sink, Source, StallPolicy, Word, WordWidth};
use serde::Serialize;
use tracing::{debug, warn};

use crate::adjuster::Adjuster;
use crate::config::{AdjustConfig, LengthBounds};
use crate::error::{AdjustError, Result};
use crate::status::FrameStatus;

/// Default cycle budget for draining one batch of frames.
pub const DEFAULT_WATCHDOG: u64 = 100_000;

/// Which external parties withhold their handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StallRegime {
    /// Nobody stalls.
    None,
    /// The input producer pauses in bursts.
    Source,
    /// The data consumer pauses in bursts.
    Sink,
    /// The status consumer pauses in bursts.
    Status,
    /// All three pause on independent pseudo-random cycles.
    All { seed: u64 },
}

impl StallRegime {
    /// Policies for (source, data sink, status sink).
    pub fn policies(self) -> (StallPolicy, StallPolicy, StallPolicy) {
        let never = StallPolicy::Never;
        let bursty = StallPolicy::BURSTY;
        match self {
            Self::None => (never, never, never),
            Self::Source => (bursty, never, never),
            Self::Sink => (never, bursty, never),
            Self::Status => (never, never, bursty),
            Self::All { seed } => (
                random(seed),
                random(seed.wrapping_add(1)),
                random(seed.wrapping_add(2)),
            ),
        }
    }

    /// The regimes a sweep runs.
    pub fn all(seed: u64) -> [Self; 5] {
        [
            Self::None,
            Self::Source,
            Self::Sink,
            Self::Status,
            Self::All { seed },
        ]
    }
}

fn random(seed: u64) -> StallPolicy {
    StallPolicy::Random { seed, percent: 50 }
}

impl fmt::Display for StallRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Source => write!(f, "source"),
            Self::Sink => write!(f, "sink"),
            Self::Status => write!(f, "status"),
            Self::All { seed } => write!(f, "all(seed={seed})"),
        }
    }
}

/// Bench configuration.
#[derive(Debug, Clone, Copy)]
pub struct BenchConfig {
    pub adjust: AdjustConfig,
    pub regime: StallRegime,
    /// Cycles allowed per [`Bench::run`] before reporting a stall.
    pub watchdog: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            adjust: AdjustConfig::default(),
            regime: StallRegime::None,
            watchdog: DEFAULT_WATCHDOG,
        }
    }
}

/// One output frame as observed by the data and status consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub frame: Frame,
    /// User marker on the frame's final output word.
    pub final_user: bool,
    pub status: FrameStatus,
}

/// Source, adjuster and two sinks advanced in lockstep.
#[derive(Debug)]
pub struct Bench {
    width: WordWidth,
    watchdog: u64,
    source: Source<Word>,
    adjuster: Adjuster,
    data: Sink<Word>,
    status: Sink<FrameStatus>,
    cycles: u64,
}

impl Bench {
    pub fn new(config: BenchConfig) -> Self {
        let (source, data, status) = config.regime.policies();
        Self {
            width: config.adjust.width,
            watchdog: config.watchdog,
            source: Source::new(source),
            adjuster: Adjuster::new(config.adjust),
            data: Sink::new(data),
            status: Sink::new(status),
            cycles: 0,
        }
    }

    pub fn set_bounds(&mut self, bounds: LengthBounds) {
        self.adjuster.set_bounds(bounds);
    }

    pub fn adjuster(&self) -> &Adjuster {
        &self.adjuster
    }

    /// Total cycles run.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Queue a frame on the source.
    pub fn send(&mut self, frame: &Frame) {
        self.source.send(FrameWords::new(frame, self.width));
    }

    /// Advance one cycle: consumers first, then padding, then the producer.
    pub fn tick(&mut self) -> Result<()> {
        self.data.tick(&mut self.adjuster);
        self.status.tick(&mut self.adjuster);
        self.adjuster.step()?;
        self.source.tick(&mut self.adjuster)?;
        self.cycles += 1;
        Ok(())
    }

    /// Every queued word consumed and every output taken.
    pub fn is_drained(&self) -> bool {
        self.source.is_idle() && self.adjuster.is_idle()
    }

    /// Tick until drained, then return the observed frames in order.
    pub fn run(&mut self) -> Result<Vec<Outcome>> {
        let start = self.cycles;
        while !self.is_drained() {
            if self.cycles - start >= self.watchdog {
                warn!(
                    cycles = self.watchdog,
                    state = ?self.adjuster.state(),
                    pending = self.source.pending(),
                    "bench watchdog expired"
                );
                return Err(AdjustError::Stalled {
                    cycles: self.watchdog,
                });
            }
            self.tick()?;
        }
        debug!(cycles = self.cycles - start, "bench drained");
        self.take_outcomes()
    }

    fn take_outcomes(&mut self) -> Result<Vec<Outcome>> {
        let mut assembler = FrameAssembler::new(self.width);
        let mut frames = Vec::new();
        for word in self.data.drain() {
            let final_user = word.user;
            if let Some(frame) = assembler.push(word)? {
                frames.push((frame, final_user));
            }
        }
        assembler.finish()?;

        let statuses: Vec<FrameStatus> = self.status.drain().collect();
        if statuses.len() != frames.len() {
            return Err(AdjustError::Verification(format!(
                "{} output frames but {} status records",
                frames.len(),
                statuses.len()
            )));
        }

        Ok(frames
            .into_iter()
            .zip(statuses)
            .map(|((frame, final_user), status)| Outcome {
                frame,
                final_user,
                status,
            })
            .collect())
    }

    /// External reset: adjuster back to idle, queues emptied.
    pub fn reset(&mut self) {
        self.adjuster.reset();
        self.source.clear();
        self.data.clear();
        self.status.clear();
    }
}

fn fail(message: String) -> Result<()> {
    Err(AdjustError::Verification(message))
}

/// Check one input frame against what the consumers observed.
pub fn check(input: &Frame, outcome: &Outcome, bounds: LengthBounds) -> Result<()> {
    let original = input.len();
    let emitted = outcome.frame.len();
    let status = &outcome.status;

    if !bounds.contains(emitted) {
        return fail(format!(
            "output length {emitted} outside [{}, {}]",
            bounds.min(),
            bounds.max()
        ));
    }

    let common = emitted.min(original);
    if outcome.frame.data[..common] != input.data[..common] {
        return fail(format!("first {common} bytes differ from input"));
    }
    if outcome.frame.data[common..].iter().any(|&b| b != 0) {
        return fail("padding bytes are not zero".to_string());
    }

    if input.user != outcome.final_user {
        return fail(format!(
            "user marker {} on input but {} on final output word",
            input.user, outcome.final_user
        ));
    }
    if !input.user && outcome.frame.user {
        return fail("user marker appeared on output".to_string());
    }

    let expected = FrameStatus {
        pad: original < bounds.min(),
        truncate: original > bounds.max(),
        output_length: emitted,
        original_length: original,
    };
    if *status != expected {
        return fail(format!("status {status:?}, expected {expected:?}"));
    }
    Ok(())
}

/// Frame patterns a sweep sends per case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// One frame.
    Single,
    /// Two identical frames back to back.
    BackToBack,
    /// Two frames back to back, the first carrying the user marker.
    UserMarked,
}

impl Scenario {
    pub const ALL: [Self; 3] = [Self::Single, Self::BackToBack, Self::UserMarked];

    /// Frames for a payload of `len` bytes counting up from zero.
    pub fn frames(self, len: usize) -> Vec<Frame> {
        let payload: Vec<u8> = (0..len).map(|i| i as u8).collect();
        match self {
            Self::Single => vec![Frame::new(payload)],
            Self::BackToBack => vec![Frame::new(payload.clone()), Frame::new(payload)],
            Self::UserMarked => vec![Frame::flagged(payload.clone()), Frame::new(payload)],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::BackToBack => write!(f, "back_to_back"),
            Self::UserMarked => write!(f, "user_marked"),
        }
    }
}

/// Sweep dimensions.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    pub width: WordWidth,
    /// `length_max` runs over `1..=max_length`, `length_min` over `0..=length_max`.
    pub max_length: usize,
    /// Payload lengths run over `1..=max_payload`.
    pub max_payload: usize,
    /// Seed for the randomized regime.
    pub seed: u64,
    pub watchdog: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            width: WordWidth::BYTE,
            max_length: 5,
            max_payload: 5,
            seed: 1,
            watchdog: DEFAULT_WATCHDOG,
        }
    }
}

/// A failed sweep case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseFailure {
    pub length_min: usize,
    pub length_max: usize,
    pub payload: usize,
    pub scenario: Scenario,
    pub regime: String,
    pub message: String,
}

/// Sweep results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub lanes: usize,
    pub cases: usize,
    pub frames: usize,
    pub cycles: u64,
    pub failures: Vec<CaseFailure>,
}

impl SweepReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every bounds × payload × scenario × regime combination.
///
/// One bench per regime is reused across cases, so state left behind by one
/// frame would show up in the next.
pub fn sweep(config: SweepConfig) -> SweepReport {
    let mut report = SweepReport {
        lanes: config.width.lanes(),
        ..SweepReport::default()
    };

    for regime in StallRegime::all(config.seed) {
        let mut bench = Bench::new(BenchConfig {
            adjust: AdjustConfig {
                bounds: LengthBounds::unbounded(),
                width: config.width,
            },
            regime,
            watchdog: config.watchdog,
        });

        for max in 1..=config.max_length {
            for min in 0..=max {
                let Ok(bounds) = LengthBounds::new(min, max) else {
                    continue;
                };
                bench.set_bounds(bounds);

                for payload in 1..=config.max_payload {
                    for scenario in Scenario::ALL {
                        let frames = scenario.frames(payload);
                        report.cases += 1;
                        report.frames += frames.len();

                        if let Err(err) = run_case(&mut bench, &frames, bounds) {
                            debug!(%regime, %scenario, min, max, payload, error = %err, "case failed");
                            report.failures.push(CaseFailure {
                                length_min: min,
                                length_max: max,
                                payload,
                                scenario,
                                regime: regime.to_string(),
                                message: err.to_string(),
                            });
                            bench.reset();
                        }
                    }
                }
            }
        }
        report.cycles += bench.cycles();
    }
    report
}

fn run_case(bench: &mut Bench, frames: &[Frame], bounds: LengthBounds) -> Result<()> {
    for frame in frames {
        bench.send(frame);
    }
    let outcomes = bench.run()?;
    if outcomes.len() != frames.len() {
        return fail(format!(
            "sent {} frames, received {}",
            frames.len(),
            outcomes.len()
        ));
    }
    for (input, outcome) in frames.iter().zip(&outcomes) {
        check(input, outcome, bounds)?;
    }
    Ok(())
}
