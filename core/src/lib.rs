#![no_std]

extern crate alloc;

use core::time::Duration;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use deck::*;
pub use engine::*;
pub use error::*;
pub use schedule::*;
pub use scoreboard::*;
pub use shuffle::*;
pub use types::*;
pub use view::*;

mod card;
mod deck;
mod engine;
mod error;
mod schedule;
mod scoreboard;
mod shuffle;
mod types;
mod view;

/// Move limits for each star tier, inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarThresholds {
    pub three_star_max_moves: MoveCount,
    pub two_star_max_moves: MoveCount,
}

impl StarThresholds {
    pub const fn rating_for(&self, moves: MoveCount) -> StarRating {
        if moves <= self.three_star_max_moves {
            StarRating::Three
        } else if moves <= self.two_star_max_moves {
            StarRating::Two
        } else {
            StarRating::One
        }
    }
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self {
            three_star_max_moves: 13,
            two_star_max_moves: 21,
        }
    }
}

/// Timings and scoring rules of a game. Timings are presentation concerns, the logical flow of
/// the engine does not depend on their values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Time a completed pair stays face-up before it is resolved, zero resolves immediately.
    pub reveal_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub stars: StarThresholds,
}

impl GameConfig {
    pub const DEFAULT_REVEAL_DELAY_MS: u64 = 300;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(self) -> Result<Self> {
        if self.tick_interval_ms == 0 {
            return Err(GameError::InvalidConfig("tick interval must be positive"));
        }
        if self.stars.three_star_max_moves > self.stars.two_star_max_moves {
            return Err(GameError::InvalidConfig(
                "three star limit must not exceed two star limit",
            ));
        }
        Ok(self)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: Self::DEFAULT_REVEAL_DELAY_MS,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            stars: StarThresholds::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    NoChange,
    Revealed,
    PairCompleted,
}

impl SelectOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Revealed => true,
            Self::PairCompleted => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PairOutcome {
    Mismatch,
    Matched,
    AllMatched,
}

impl PairOutcome {
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Matched | Self::AllMatched)
    }
}
