use std::collections::HashMap;

use clap::ValueEnum;
use concentration_core::{CardId, CardState, Deck, Suit, ViewEvent};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlayerKind {
    /// Knows where every suit lies
    Perfect,
    /// Remembers every card it has seen
    Memory,
    /// Picks any face-down card
    Random,
}

/// Simulated player. Only [`PlayerKind::Perfect`] looks at the suits in the deck, the others
/// learn suits from the reveal events like a person watching the screen.
pub trait Player {
    fn observe(&mut self, event: &ViewEvent);

    fn choose(&mut self, deck: &Deck) -> Option<CardId>;
}

pub fn new_player(kind: PlayerKind, seed: u64) -> Box<dyn Player> {
    let rng = SmallRng::seed_from_u64(seed);
    match kind {
        PlayerKind::Perfect => Box::new(PerfectPlayer),
        PlayerKind::Memory => Box::new(MemoryPlayer {
            rng,
            seen: HashMap::new(),
        }),
        PlayerKind::Random => Box::new(RandomPlayer { rng }),
    }
}

fn hidden_cards(deck: &Deck) -> impl Iterator<Item = CardId> + '_ {
    deck.cards()
        .iter()
        .filter(|card| card.state() == CardState::Hidden)
        .map(|card| card.id())
}

struct PerfectPlayer;

impl Player for PerfectPlayer {
    fn observe(&mut self, _event: &ViewEvent) {}

    fn choose(&mut self, deck: &Deck) -> Option<CardId> {
        match deck.pending() {
            [] => hidden_cards(deck).next(),
            [first] => {
                let suit = deck.card(*first)?.suit();
                hidden_cards(deck).find(|&id| deck.card(id).is_some_and(|c| c.suit() == suit))
            }
            _ => None,
        }
    }
}

struct MemoryPlayer {
    rng: SmallRng,
    seen: HashMap<CardId, Suit>,
}

impl MemoryPlayer {
    fn known_pair(&self, deck: &Deck) -> Option<CardId> {
        let mut by_suit: HashMap<Suit, CardId> = HashMap::new();
        let mut ids: Vec<_> = hidden_cards(deck)
            .filter(|id| self.seen.contains_key(id))
            .collect();
        ids.sort_unstable();
        for id in ids {
            let suit = self.seen[&id];
            if by_suit.insert(suit, id).is_some() {
                return Some(id);
            }
        }
        None
    }

    fn unseen(&mut self, deck: &Deck) -> Option<CardId> {
        let unseen: Vec<_> = hidden_cards(deck)
            .filter(|id| !self.seen.contains_key(id))
            .collect();
        match unseen.choose(&mut self.rng) {
            Some(&id) => Some(id),
            None => {
                let hidden: Vec<_> = hidden_cards(deck).collect();
                hidden.choose(&mut self.rng).copied()
            }
        }
    }
}

impl Player for MemoryPlayer {
    fn observe(&mut self, event: &ViewEvent) {
        match *event {
            ViewEvent::CardRevealed { id, suit } => {
                self.seen.insert(id, suit);
            }
            ViewEvent::CardMatched { id } => {
                self.seen.remove(&id);
            }
            ViewEvent::GameReset => self.seen.clear(),
            _ => {}
        }
    }

    fn choose(&mut self, deck: &Deck) -> Option<CardId> {
        match deck.pending() {
            [] => self.known_pair(deck).or_else(|| self.unseen(deck)),
            [first] => {
                let suit = self.seen.get(first).copied();
                let partner = hidden_cards(deck)
                    .find(|id| id != first && suit.is_some() && self.seen.get(id).copied() == suit);
                partner.or_else(|| self.unseen(deck))
            }
            _ => None,
        }
    }
}

struct RandomPlayer {
    rng: SmallRng,
}

impl Player for RandomPlayer {
    fn observe(&mut self, _event: &ViewEvent) {}

    fn choose(&mut self, deck: &Deck) -> Option<CardId> {
        let hidden: Vec<_> = hidden_cards(deck).collect();
        hidden.choose(&mut self.rng).copied()
    }
}
