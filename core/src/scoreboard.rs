use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Final score of a won game. Copied out of the scoreboard so later changes to the scoreboard
/// do not reach a result that is already displayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub moves: MoveCount,
    pub elapsed_secs: Seconds,
    pub stars: StarRating,
}

/// Moves, elapsed time and star rating of the current game. Owns the repeating tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Scoreboard {
    moves: MoveCount,
    elapsed: Duration,
    stars: StarRating,
    thresholds: StarThresholds,
    tick_interval: Duration,
    timer: Option<Task>,
}

impl Scoreboard {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            moves: 0,
            elapsed: Duration::ZERO,
            stars: StarRating::Three,
            thresholds: config.stars,
            tick_interval: config.tick_interval(),
            timer: None,
        }
    }

    pub fn moves(&self) -> MoveCount {
        self.moves
    }

    /// Whole seconds counted so far.
    pub fn elapsed_secs(&self) -> Seconds {
        Seconds::try_from(self.elapsed.as_secs()).unwrap_or(Seconds::MAX)
    }

    pub fn stars(&self) -> StarRating {
        self.stars
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Starts ticking unless already running. Returns whether a timer was started.
    pub fn start_timer_once(
        &mut self,
        scheduler: &mut impl Scheduler,
        generation: Generation,
    ) -> bool {
        if self.timer.is_some() {
            return false;
        }

        let task = Task::tick(generation);
        scheduler.schedule(task, Timing::Every(self.tick_interval));
        self.timer = Some(task);
        log::debug!("Timer started for game {}", generation);
        true
    }

    /// Returns whether a running timer was stopped.
    pub fn stop_timer(&mut self, scheduler: &mut impl Scheduler) -> bool {
        match self.timer.take() {
            Some(task) => {
                scheduler.cancel(task);
                log::debug!("Timer stopped at {:?}", self.elapsed);
                true
            }
            None => false,
        }
    }

    /// Counts one tick period if the timer runs, returning the elapsed whole seconds.
    pub fn tick(&mut self) -> Option<Seconds> {
        self.timer?;
        self.elapsed = self.elapsed.saturating_add(self.tick_interval);
        log::trace!("Tick: {:?}", self.elapsed);
        Some(self.elapsed_secs())
    }

    /// Counts a completed pair and returns whether the star rating dropped.
    pub fn record_move(&mut self) -> bool {
        self.moves = self.moves.saturating_add(1);
        let stars = self.thresholds.rating_for(self.moves).min(self.stars);
        let changed = stars != self.stars;
        self.stars = stars;
        changed
    }

    pub fn reset(&mut self, scheduler: &mut impl Scheduler) {
        self.stop_timer(scheduler);
        self.moves = 0;
        self.elapsed = Duration::ZERO;
        self.stars = StarRating::Three;
    }

    pub fn snapshot(&self) -> GameResult {
        GameResult {
            moves: self.moves,
            elapsed_secs: self.elapsed_secs(),
            stars: self.stars,
        }
    }
}
