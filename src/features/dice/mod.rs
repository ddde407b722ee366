//! # Feature: Dice
//!
//! Random number rolls and coin flips.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use rand::Rng;

use crate::core::{BotError, BotResult};

pub const HEADS: &str = ":regional_indicator_h:";
pub const TAILS: &str = ":regional_indicator_t:";

/// Inclusive range a roll draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollRange {
    pub low: i64,
    pub high: i64,
}

impl RollRange {
    /// `lo hi` rolls in `[lo, hi]`, `n` in `[0, n]`, anything else is a d6
    pub fn parse(args: &[&str]) -> BotResult<Self> {
        let number = |s: &str| {
            s.parse::<i64>()
                .map_err(|_| BotError::invalid("An error occured"))
        };
        let (low, high) = match args {
            [lo, hi] => (number(lo)?, number(hi)?),
            [n] => (0, number(n)?),
            _ => (1, 6),
        };
        if low > high {
            return Err(BotError::invalid("An error occured"));
        }
        Ok(Self { low, high })
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.random_range(self.low..=self.high)
    }
}

pub fn flip<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    if rng.random_bool(0.5) {
        HEADS
    } else {
        TAILS
    }
}
