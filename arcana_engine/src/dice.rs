//! Injectable randomness for the concentration save.
//!
//! The kernel never touches a global RNG. Callers hand in a `DieRoller`;
//! tests and replays use `FixedRoller`, live sessions a `SeededRoller`.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait DieRoller {
    /// A raw d20 result in `1..=20`.
    fn roll_d20(&mut self) -> i32;
}

/// Reproducible ChaCha8-backed roller.
pub struct SeededRoller {
    rng: ChaCha8Rng,
}

impl SeededRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DieRoller for SeededRoller {
    fn roll_d20(&mut self) -> i32 {
        self.rng.random_range(1..=20)
    }
}

/// Replays a recorded sequence, then keeps returning `fallback`.
#[derive(Debug, Clone)]
pub struct FixedRoller {
    rolls: VecDeque<i32>,
    fallback: i32,
}

impl FixedRoller {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 10,
        }
    }

    /// Always returns `value`.
    pub fn constant(value: i32) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: value,
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DieRoller for FixedRoller {
    fn roll_d20(&mut self) -> i32 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}

/// Any closure works as a roller.
impl<F: FnMut() -> i32> DieRoller for F {
    fn roll_d20(&mut self) -> i32 {
        self()
    }
}
