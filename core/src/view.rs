use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rendering instruction emitted by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    CardRevealed { id: CardId, suit: Suit },
    CardHidden { id: CardId },
    CardMatched { id: CardId },
    MovesChanged { moves: MoveCount },
    TimeChanged { seconds: Seconds },
    StarsChanged { stars: StarRating },
    GameOver { result: GameResult },
    GameReset,
}

/// Receives everything the engine wants shown on screen.
pub trait View {
    fn notify(&mut self, event: ViewEvent);
}

impl View for () {
    fn notify(&mut self, _event: ViewEvent) {}
}

impl View for Vec<ViewEvent> {
    fn notify(&mut self, event: ViewEvent) {
        self.push(event);
    }
}

impl<V: View + ?Sized> View for &mut V {
    fn notify(&mut self, event: ViewEvent) {
        (**self).notify(event)
    }
}
