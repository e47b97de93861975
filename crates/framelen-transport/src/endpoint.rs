//! Stall-injecting endpoints.
//!
//! A [`Source`] offers queued items to a [`Downstream`] and a [`Sink`] takes
//! items from an [`Upstream`]. Each consults its own [`Pauser`] once per
//! cycle, so the three parties around an adjuster stall independently.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::traits::{Downstream, Upstream};

/// When an endpoint withholds `valid` (source) or `ready` (sink).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StallPolicy {
    /// Always participate.
    #[default]
    Never,
    /// Pause for `paused` cycles, then run for `running` cycles, repeating.
    Periodic { paused: u32, running: u32 },
    /// Pause on a seeded pseudo-random `percent` of cycles.
    Random { seed: u64, percent: u8 },
}

impl StallPolicy {
    /// Three cycles paused out of every four.
    pub const BURSTY: Self = Self::Periodic {
        paused: 3,
        running: 1,
    };

    pub fn pauser(self) -> Pauser {
        Pauser::new(self)
    }
}

/// Per-cycle pause decisions for one endpoint.
#[derive(Debug, Clone)]
pub struct Pauser {
    policy: StallPolicy,
    cycle: u64,
    rng: Option<StdRng>,
}

impl Pauser {
    pub fn new(policy: StallPolicy) -> Self {
        let rng = match policy {
            StallPolicy::Random { seed, .. } => Some(StdRng::seed_from_u64(seed)),
            _ => None,
        };
        Self {
            policy,
            cycle: 0,
            rng,
        }
    }

    /// Advance one cycle and report whether the endpoint is paused in it.
    pub fn paused(&mut self) -> bool {
        let cycle = self.cycle;
        self.cycle = self.cycle.wrapping_add(1);

        match self.policy {
            StallPolicy::Never => false,
            StallPolicy::Periodic { paused, running } => {
                let period = u64::from(paused) + u64::from(running);
                period != 0 && cycle % period < u64::from(paused)
            }
            StallPolicy::Random { percent, .. } => match self.rng.as_mut() {
                Some(rng) => rng.gen_range(0..100u8) < percent.min(100),
                None => false,
            },
        }
    }

    pub fn policy(&self) -> StallPolicy {
        self.policy
    }
}

/// Producer endpoint: offers queued items in order.
#[derive(Debug)]
pub struct Source<T> {
    queue: VecDeque<T>,
    pauser: Pauser,
    sent: u64,
}

impl<T> Source<T> {
    pub fn new(policy: StallPolicy) -> Self {
        Self {
            queue: VecDeque::new(),
            pauser: policy.pauser(),
            sent: 0,
        }
    }

    /// Queue items for transmission.
    pub fn send(&mut self, items: impl IntoIterator<Item = T>) {
        self.queue.extend(items);
    }

    /// Run one cycle against `dst`.
    ///
    /// Returns `Ok(true)` if an item was transferred.
    pub fn tick<D>(&mut self, dst: &mut D) -> Result<bool, D::Error>
    where
        D: Downstream<T>,
    {
        if self.pauser.paused() {
            return Ok(false);
        }
        let ready = match self.queue.front() {
            Some(item) => dst.is_ready_for(item),
            None => return Ok(false),
        };
        if !ready {
            return Ok(false);
        }
        if let Some(item) = self.queue.pop_front() {
            dst.accept(item)?;
            self.sent += 1;
            trace!(sent = self.sent, "source transfer");
        }
        Ok(true)
    }

    /// Nothing left to offer.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Consumer endpoint: takes items when not paused and keeps them in order.
#[derive(Debug)]
pub struct Sink<T> {
    received: VecDeque<T>,
    pauser: Pauser,
}

impl<T> Sink<T> {
    pub fn new(policy: StallPolicy) -> Self {
        Self {
            received: VecDeque::new(),
            pauser: policy.pauser(),
        }
    }

    /// Run one cycle against `src`. Returns `true` if an item was taken.
    pub fn tick<U>(&mut self, src: &mut U) -> bool
    where
        U: Upstream<T>,
    {
        if self.pauser.paused() {
            return false;
        }
        match src.take() {
            Some(item) => {
                self.received.push_back(item);
                true
            }
            None => false,
        }
    }

    /// Oldest received item.
    pub fn recv(&mut self) -> Option<T> {
        self.received.pop_front()
    }

    pub fn len(&self) -> usize {
        self.received.len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.received.drain(..)
    }

    pub fn clear(&mut self) {
        self.received.clear();
    }
}
