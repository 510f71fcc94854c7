use thiserror::Error;

use crate::{CardId, Suit};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid card id {0}")]
    InvalidCardId(CardId),
    #[error("Suit {0} does not appear exactly twice")]
    InvalidLayout(Suit),
    #[error("Pair evaluation needs exactly two revealed cards, found {0}")]
    IncompletePair(usize),
    #[error("Invalid star rating {0}")]
    InvalidStarRating(u8),
    #[error("Invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;
