use core::fmt;
use serde::{Deserialize, Serialize};

/// Position of a card within the deck.
pub type CardId = u8;

/// Count type used for moves.
pub type MoveCount = u32;

/// Count type used for elapsed seconds.
pub type Seconds = u32;

/// Number of distinct suits, and so of pairs in a deck.
pub const PAIR_COUNT: u8 = 8;

/// Number of cards in a deck.
pub const DECK_SIZE: usize = 2 * PAIR_COUNT as usize;

/// Coarse score tier derived from the move count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StarRating {
    One = 1,
    Two = 2,
    Three = 3,
}

impl StarRating {
    pub const fn count(self) -> u8 {
        self as u8
    }
}

impl Default for StarRating {
    fn default() -> Self {
        Self::Three
    }
}

impl From<StarRating> for u8 {
    fn from(rating: StarRating) -> Self {
        rating.count()
    }
}

impl TryFrom<u8> for StarRating {
    type Error = crate::GameError;

    fn try_from(value: u8) -> crate::Result<Self> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(crate::GameError::InvalidStarRating(value)),
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Identifies one game between restarts. Scheduled work is tagged with the generation it was
/// created for so that work outliving its game can be recognized and dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u32);

impl Generation {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
