use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Result of resolving the pending pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PairEvaluation {
    pub pair: [CardId; 2],
    pub outcome: PairOutcome,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
    pending: SmallVec<[CardId; 2]>,
    matched_pairs: u8,
}

impl Deck {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.reset(rng);
        deck
    }

    /// Builds a deck with a fixed layout, every suit must appear exactly twice.
    pub fn from_suits(suits: [Suit; DECK_SIZE]) -> Result<Self> {
        for suit in Suit::ALL {
            if suits.iter().filter(|&&s| s == suit).count() != 2 {
                return Err(GameError::InvalidLayout(suit));
            }
        }

        let mut deck = Self::ordered();
        deck.assign_suits(suits);
        Ok(deck)
    }

    fn ordered() -> Self {
        Self {
            cards: core::array::from_fn(|i| Card::new(i as CardId, Suit::ALL[i / 2])),
            pending: SmallVec::new(),
            matched_pairs: 0,
        }
    }

    /// Deals a freshly shuffled layout onto the same slots and turns every card face-down.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut suits: [Suit; DECK_SIZE] = core::array::from_fn(|i| Suit::ALL[i / 2]);
        shuffle(&mut suits, rng);
        self.assign_suits(suits);
        log::debug!("Deck reset: {:?}", suits);
    }

    fn assign_suits(&mut self, suits: [Suit; DECK_SIZE]) {
        for (card, suit) in self.cards.iter_mut().zip(suits) {
            *card = Card::new(card.id(), suit);
        }
        self.pending.clear();
        self.matched_pairs = 0;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(usize::from(id))
    }

    /// Cards revealed this turn and not yet evaluated, in selection order.
    pub fn pending(&self) -> &[CardId] {
        &self.pending
    }

    pub fn matched_pairs(&self) -> u8 {
        self.matched_pairs
    }

    pub fn is_cleared(&self) -> bool {
        self.matched_pairs == PAIR_COUNT
    }

    pub fn validate_id(&self, id: CardId) -> Result<CardId> {
        if usize::from(id) < DECK_SIZE {
            Ok(id)
        } else {
            Err(GameError::InvalidCardId(id))
        }
    }

    pub fn select(&mut self, id: CardId) -> Result<SelectOutcome> {
        let id = self.validate_id(id)?;

        if self.pending.len() >= 2 {
            log::warn!("Pair already pending, ignoring card {}", id);
            return Ok(SelectOutcome::NoChange);
        }

        let card = &mut self.cards[usize::from(id)];
        Ok(match card.state() {
            CardState::Hidden => {
                card.set_state(CardState::Revealed);
                self.pending.push(id);
                if self.pending.len() == 2 {
                    SelectOutcome::PairCompleted
                } else {
                    SelectOutcome::Revealed
                }
            }
            CardState::Revealed | CardState::Matched => SelectOutcome::NoChange,
        })
    }

    pub fn evaluate_pending_pair(&mut self) -> Result<PairEvaluation> {
        let pair: [CardId; 2] = match self.pending.as_slice() {
            &[first, second] => [first, second],
            other => return Err(GameError::IncompletePair(other.len())),
        };
        self.pending.clear();

        let [first, second] = pair.map(usize::from);
        let matched = self.cards[first].suit() == self.cards[second].suit();
        let next_state = if matched {
            CardState::Matched
        } else {
            CardState::Hidden
        };
        self.cards[first].set_state(next_state);
        self.cards[second].set_state(next_state);

        let outcome = if !matched {
            PairOutcome::Mismatch
        } else {
            self.matched_pairs += 1;
            if self.is_cleared() {
                PairOutcome::AllMatched
            } else {
                PairOutcome::Matched
            }
        };
        log::debug!("Evaluated pair {:?}: {:?}", pair, outcome);

        Ok(PairEvaluation { pair, outcome })
    }
}
