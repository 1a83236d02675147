//! Injectable random index sources.
//!
//! Target and hint picks go through [`RandomSource`] so tests can replay
//! an exact pick sequence and the CLI can reproduce a game from a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::instrument;

/// Uniform index picker.
pub trait RandomSource: Send + std::fmt::Debug {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Thread-local entropy, fresh on every pick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible picks from a fixed seed.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    inner: StdRng,
    seed: u64,
}

impl SeededRandom {
    /// Creates a source seeded with `seed`.
    #[instrument]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this source started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}

/// Replays a scripted sequence of picks.
///
/// Each scripted value is reduced modulo `len`; once the script runs out
/// every pick is `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: VecDeque<usize>,
}

impl ScriptedRandom {
    /// Creates a source that returns `picks` in order.
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: picks.into_iter().collect(),
        }
    }

    /// Picks not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.script.pop_front().map_or(0, |value| value % len)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}
