use core::fmt;
use serde::{Deserialize, Serialize};

use crate::CardId;

/// Symbol printed on a card face, every suit appears on exactly two cards of a deck.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Suit {
    Diamond,
    Anchor,
    Bolt,
    Bicycle,
    PaperPlane,
    Cube,
    Leaf,
    Bomb,
}

impl Suit {
    pub const ALL: [Suit; 8] = [
        Suit::Diamond,
        Suit::Anchor,
        Suit::Bolt,
        Suit::Bicycle,
        Suit::PaperPlane,
        Suit::Cube,
        Suit::Leaf,
        Suit::Bomb,
    ];

    pub const fn name(self) -> &'static str {
        use Suit::*;
        match self {
            Diamond => "diamond",
            Anchor => "anchor",
            Bolt => "bolt",
            Bicycle => "bicycle",
            PaperPlane => "paper-plane",
            Cube => "cube",
            Leaf => "leaf",
            Bomb => "bomb",
        }
    }

    /// Icon class used by the web front-end for this suit.
    pub const fn icon_class(self) -> &'static str {
        use Suit::*;
        match self {
            Diamond => "fa fa-diamond",
            Anchor => "fa fa-anchor",
            Bolt => "fa fa-bolt",
            Bicycle => "fa fa-bicycle",
            PaperPlane => "fa fa-paper-plane-o",
            Cube => "fa fa-cube",
            Leaf => "fa fa-leaf",
            Bomb => "fa fa-bomb",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

impl CardState {
    /// Whether the face of the card is visible to the player.
    pub const fn is_face_up(self) -> bool {
        match self {
            Self::Hidden => false,
            Self::Revealed => true,
            Self::Matched => true,
        }
    }
}

impl Default for CardState {
    fn default() -> Self {
        Self::Hidden
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    suit: Suit,
    state: CardState,
}

impl Card {
    pub const fn new(id: CardId, suit: Suit) -> Self {
        Self {
            id,
            suit,
            state: CardState::Hidden,
        }
    }

    pub const fn id(&self) -> CardId {
        self.id
    }

    pub const fn suit(&self) -> Suit {
        self.suit
    }

    pub const fn state(&self) -> CardState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: CardState) {
        self.state = state;
    }
}
