use core::time::Duration;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> OneRevealed
/// - OneRevealed -> Evaluating
/// - Evaluating -> Idle
/// - Evaluating -> GameOver
/// - any -> Idle on restart
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No card of the current turn is face-up
    Idle,
    /// First card of the turn is face-up
    OneRevealed,
    /// Pair is face-up, waiting for the reveal delay before being resolved
    Evaluating,
    /// Every pair was found
    GameOver,
}

impl EngineState {
    pub const fn accepts_selection(self) -> bool {
        matches!(self, Self::Idle | Self::OneRevealed)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Runs one game after another, reacting to card selections and to the tasks it scheduled.
///
/// The engine never waits: delays are requested from the [`Scheduler`] and resumed through
/// [`Engine::run_task`]. Every task is tagged with the current [`Generation`], and a restart
/// moves to a new generation, so a task from an earlier game is dropped even when the host
/// fails to cancel it.
#[derive(Debug)]
pub struct Engine<V, S> {
    config: GameConfig,
    rng: SmallRng,
    deck: Deck,
    scoreboard: Scoreboard,
    state: EngineState,
    generation: Generation,
    pending_evaluation: Option<Task>,
    result: Option<GameResult>,
    view: V,
    scheduler: S,
}

impl<V: View, S: Scheduler> Engine<V, S> {
    /// Deals the first game. The seed decides the layout of this and every following game.
    pub fn new(config: GameConfig, seed: u64, view: V, scheduler: S) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let deck = Deck::new(&mut rng);
        let mut engine = Self {
            config,
            rng,
            deck,
            scoreboard: Scoreboard::new(&config),
            state: EngineState::Idle,
            generation: Generation::default(),
            pending_evaluation: None,
            result: None,
            view,
            scheduler,
        };
        log::debug!("New engine, seed {}", seed);
        engine.announce_reset();
        engine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Result of the current game once it is over.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn select_card(&mut self, id: CardId) -> SelectOutcome {
        use SelectOutcome::*;

        if !self.state.accepts_selection() {
            log::debug!("Ignoring card {} while {:?}", id, self.state);
            return NoChange;
        }

        let outcome = match self.deck.select(id) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("Ignoring selection: {}", err);
                return NoChange;
            }
        };

        match outcome {
            NoChange => {}
            Revealed => {
                self.scoreboard
                    .start_timer_once(&mut self.scheduler, self.generation);
                self.notify_revealed(id);
                self.state = EngineState::OneRevealed;
            }
            PairCompleted => {
                self.notify_revealed(id);
                self.state = EngineState::Evaluating;
                self.record_move();
                self.schedule_evaluation();
            }
        }
        outcome
    }

    /// Handles a task the scheduler fired. Returns whether it belonged to the current game and
    /// was acted upon.
    pub fn run_task(&mut self, task: Task) -> bool {
        if task.generation != self.generation {
            log::debug!(
                "Dropping stale {:?} from game {}, current game is {}",
                task.kind,
                task.generation,
                self.generation
            );
            return false;
        }

        match task.kind {
            TaskKind::Tick => {
                let before = self.scoreboard.elapsed_secs();
                match self.scoreboard.tick() {
                    Some(seconds) => {
                        if seconds != before {
                            self.view.notify(ViewEvent::TimeChanged { seconds });
                        }
                        true
                    }
                    None => false,
                }
            }
            TaskKind::EvaluatePair => {
                if self.pending_evaluation.take() != Some(task) {
                    log::debug!("No evaluation pending, ignoring {:?}", task);
                    return false;
                }
                self.evaluate_pair();
                true
            }
        }
    }

    /// Abandons the current game, whatever its state, and deals a new one.
    pub fn restart(&mut self) {
        if let Some(task) = self.pending_evaluation.take() {
            self.scheduler.cancel(task);
        }
        self.scoreboard.reset(&mut self.scheduler);
        self.generation = self.generation.next();
        self.deck.reset(&mut self.rng);
        self.state = EngineState::Idle;
        self.result = None;
        log::debug!("Restarted as game {}", self.generation);
        self.announce_reset();
    }

    fn announce_reset(&mut self) {
        self.view.notify(ViewEvent::GameReset);
        self.view.notify(ViewEvent::MovesChanged {
            moves: self.scoreboard.moves(),
        });
        self.view.notify(ViewEvent::TimeChanged {
            seconds: self.scoreboard.elapsed_secs(),
        });
        self.view.notify(ViewEvent::StarsChanged {
            stars: self.scoreboard.stars(),
        });
    }

    fn notify_revealed(&mut self, id: CardId) {
        if let Some(card) = self.deck.card(id) {
            let suit = card.suit();
            self.view.notify(ViewEvent::CardRevealed { id, suit });
        }
    }

    fn record_move(&mut self) {
        let stars_changed = self.scoreboard.record_move();
        self.view.notify(ViewEvent::MovesChanged {
            moves: self.scoreboard.moves(),
        });
        if stars_changed {
            self.view.notify(ViewEvent::StarsChanged {
                stars: self.scoreboard.stars(),
            });
        }
    }

    fn schedule_evaluation(&mut self) {
        let delay = self.config.reveal_delay();
        if delay.is_zero() {
            self.evaluate_pair();
            return;
        }

        let task = Task::evaluate_pair(self.generation);
        self.scheduler.schedule(task, Timing::Once(delay));
        self.pending_evaluation = Some(task);
    }

    fn evaluate_pair(&mut self) {
        let evaluation = match self.deck.evaluate_pending_pair() {
            Ok(evaluation) => evaluation,
            Err(err) => {
                log::warn!("Could not evaluate pair: {}", err);
                self.state = EngineState::Idle;
                return;
            }
        };

        match evaluation.outcome {
            PairOutcome::Mismatch => {
                for id in evaluation.pair {
                    self.view.notify(ViewEvent::CardHidden { id });
                }
                self.state = EngineState::Idle;
            }
            PairOutcome::Matched => {
                for id in evaluation.pair {
                    self.view.notify(ViewEvent::CardMatched { id });
                }
                self.state = EngineState::Idle;
            }
            PairOutcome::AllMatched => {
                for id in evaluation.pair {
                    self.view.notify(ViewEvent::CardMatched { id });
                }
                self.end_game();
            }
        }
    }

    fn end_game(&mut self) {
        if self.state.is_finished() {
            return;
        }

        self.scoreboard.stop_timer(&mut self.scheduler);
        let result = self.scoreboard.snapshot();
        self.state = EngineState::GameOver;
        self.result = Some(result);
        log::debug!("Game {} over: {:?}", self.generation, result);
        self.view.notify(ViewEvent::GameOver { result });
    }
}

impl<V: View> Engine<V, VirtualScheduler> {
    /// Moves the virtual clock forward by `by`, running every task that falls due on the way.
    /// Returns the number of tasks handed to [`Engine::run_task`].
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now() + by;
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
            ran += 1;
        }
        self.scheduler.advance_to(until);
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    type TestEngine = Engine<Vec<ViewEvent>, VirtualScheduler>;

    fn engine(reveal_delay_ms: u64) -> TestEngine {
        let config = GameConfig {
            reveal_delay_ms,
            ..Default::default()
        };
        Engine::new(config, 11, Vec::new(), VirtualScheduler::new())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Ids of the two cards holding `suit`.
    fn pair_of(engine: &TestEngine, suit: Suit) -> [CardId; 2] {
        let mut ids = engine
            .deck()
            .cards()
            .iter()
            .filter(|card| card.suit() == suit)
            .map(|card| card.id());
        [ids.next().unwrap(), ids.next().unwrap()]
    }

    /// Two cards with different suits.
    fn mismatched(engine: &TestEngine) -> [CardId; 2] {
        [pair_of(engine, Suit::Diamond)[0], pair_of(engine, Suit::Bomb)[0]]
    }

    #[test]
    fn new_engine_announces_fresh_board() {
        let engine = engine(300);

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(
            engine.view(),
            &[
                ViewEvent::GameReset,
                ViewEvent::MovesChanged { moves: 0 },
                ViewEvent::TimeChanged { seconds: 0 },
                ViewEvent::StarsChanged {
                    stars: StarRating::Three
                },
            ]
        );
        assert_eq!(engine.scheduler().scheduled_count(), 0);
    }

    #[test]
    fn first_reveal_starts_timer() {
        let mut engine = engine(300);
        let [a, _] = pair_of(&engine, Suit::Cube);

        assert_eq!(engine.select_card(a), SelectOutcome::Revealed);

        assert_eq!(engine.state(), EngineState::OneRevealed);
        assert!(engine.scoreboard().is_timer_active());
        assert_eq!(
            engine.view().last(),
            Some(&ViewEvent::CardRevealed {
                id: a,
                suit: Suit::Cube
            })
        );

        engine.advance(ms(2500));
        assert_eq!(engine.scoreboard().elapsed_secs(), 2);
        assert_eq!(
            engine.view().last(),
            Some(&ViewEvent::TimeChanged { seconds: 2 })
        );
    }

    #[test]
    fn sub_second_ticks_report_whole_seconds() {
        let config = GameConfig {
            tick_interval_ms: 250,
            ..Default::default()
        };
        let mut engine = Engine::new(config, 11, Vec::new(), VirtualScheduler::new());
        engine.view_mut().clear();

        engine.select_card(0);
        assert_eq!(engine.advance(ms(2000)), 8);

        assert_eq!(engine.scoreboard().elapsed_secs(), 2);
        let times: Vec<_> = engine
            .view()
            .iter()
            .filter_map(|event| match event {
                ViewEvent::TimeChanged { seconds } => Some(*seconds),
                _ => None,
            })
            .collect();
        assert_eq!(times, [1, 2]);
    }

    #[test]
    fn completing_pair_counts_move_before_delay() {
        let mut engine = engine(300);
        let [a, b] = pair_of(&engine, Suit::Leaf);
        engine.select_card(a);

        assert_eq!(engine.select_card(b), SelectOutcome::PairCompleted);

        assert_eq!(engine.state(), EngineState::Evaluating);
        assert_eq!(engine.scoreboard().moves(), 1);
        assert_eq!(
            engine.view().last(),
            Some(&ViewEvent::MovesChanged { moves: 1 })
        );
        assert_eq!(engine.deck().card(a).unwrap().state(), CardState::Revealed);

        engine.advance(ms(300));

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.deck().card(a).unwrap().state(), CardState::Matched);
        assert_eq!(engine.deck().card(b).unwrap().state(), CardState::Matched);
        assert_eq!(
            &engine.view()[engine.view().len() - 2..],
            &[
                ViewEvent::CardMatched { id: a },
                ViewEvent::CardMatched { id: b }
            ]
        );
    }

    #[test]
    fn mismatch_hides_both_cards() {
        let mut engine = engine(300);
        let [a, b] = mismatched(&engine);
        engine.select_card(a);
        engine.select_card(b);

        engine.advance(ms(300));

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.deck().card(a).unwrap().state(), CardState::Hidden);
        assert_eq!(engine.deck().card(b).unwrap().state(), CardState::Hidden);
        assert!(engine.view().contains(&ViewEvent::CardHidden { id: a }));
        assert!(engine.view().contains(&ViewEvent::CardHidden { id: b }));
    }

    #[test]
    fn selections_while_evaluating_are_ignored() {
        let mut engine = engine(300);
        let [a, b] = mismatched(&engine);
        let [c, _] = pair_of(&engine, Suit::Anchor);
        engine.select_card(a);
        engine.select_card(b);
        let events = engine.view().len();

        assert_eq!(engine.select_card(c), SelectOutcome::NoChange);

        assert_eq!(engine.view().len(), events);
        assert_eq!(engine.deck().card(c).unwrap().state(), CardState::Hidden);
        assert_eq!(engine.deck().pending(), &[a, b]);
    }

    #[test]
    fn invalid_and_repeated_selections_are_no_ops() {
        let mut engine = engine(300);
        let [a, _] = pair_of(&engine, Suit::Bolt);

        assert_eq!(engine.select_card(200), SelectOutcome::NoChange);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(!engine.scoreboard().is_timer_active());

        engine.select_card(a);
        assert_eq!(engine.select_card(a), SelectOutcome::NoChange);
        assert_eq!(engine.deck().pending(), &[a]);
        assert_eq!(engine.state(), EngineState::OneRevealed);
    }

    #[test]
    fn zero_delay_resolves_synchronously() {
        let mut engine = engine(0);
        let [a, b] = pair_of(&engine, Suit::Bicycle);
        engine.select_card(a);

        engine.select_card(b);

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.deck().matched_pairs(), 1);
        assert!(!engine.scheduler().is_scheduled(Task::evaluate_pair(engine.generation())));
    }

    #[test]
    fn restart_during_evaluation_discards_pending_pair() {
        let mut engine = engine(300);
        let [a, b] = pair_of(&engine, Suit::Diamond);
        let stale = Task::evaluate_pair(engine.generation());
        engine.select_card(a);
        engine.select_card(b);

        engine.restart();
        engine.advance(ms(5000));

        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.deck().matched_pairs(), 0);
        assert!(
            engine
                .deck()
                .cards()
                .iter()
                .all(|card| card.state() == CardState::Hidden)
        );
        assert_eq!(engine.scoreboard().moves(), 0);
        assert_eq!(engine.scoreboard().elapsed_secs(), 0);
        assert!(!engine.scoreboard().is_timer_active());
        assert_eq!(engine.scheduler().scheduled_count(), 0);

        // a host that missed the cancellation still cannot reach the new game
        assert!(!engine.run_task(stale));
        assert!(!engine.run_task(Task::tick(Generation::default())));
        assert_eq!(engine.deck().matched_pairs(), 0);
        assert_eq!(engine.scoreboard().elapsed_secs(), 0);
    }

    #[test]
    fn restart_ends_with_reset_announcement() {
        let mut engine = engine(300);
        let [a, _] = pair_of(&engine, Suit::Bomb);
        engine.select_card(a);
        engine.view_mut().clear();

        engine.restart();
        engine.restart();

        assert_eq!(engine.generation(), Generation::new(2));
        assert_eq!(engine.view().len(), 8);
        assert_eq!(engine.view()[4], ViewEvent::GameReset);
    }

    #[test]
    fn restart_deals_new_layout_from_same_seed_stream() {
        let mut a = engine(300);
        let mut b = engine(300);

        assert_eq!(a.deck().cards(), b.deck().cards());
        a.restart();
        b.restart();
        assert_eq!(a.deck().cards(), b.deck().cards());
    }

    #[test]
    fn perfect_game_is_over_with_three_stars() {
        let mut engine = engine(300);

        for suit in Suit::ALL {
            let [a, b] = pair_of(&engine, suit);
            engine.select_card(a);
            engine.select_card(b);
            engine.advance(ms(700));
        }

        // ticks at 1s..=5s, the last pair resolves at 5.2s
        let expected = GameResult {
            moves: 8,
            elapsed_secs: 5,
            stars: StarRating::Three,
        };
        assert_eq!(engine.state(), EngineState::GameOver);
        assert_eq!(engine.result(), Some(expected));
        assert_eq!(
            engine.view().last(),
            Some(&ViewEvent::GameOver { result: expected })
        );
        assert!(!engine.scoreboard().is_timer_active());
        assert_eq!(engine.scheduler().scheduled_count(), 0);
    }

    #[test]
    fn game_over_ignores_selections_and_freezes_result() {
        let mut engine = engine(0);
        for suit in Suit::ALL {
            let [a, b] = pair_of(&engine, suit);
            engine.select_card(a);
            engine.select_card(b);
        }
        let result = engine.result().unwrap();

        assert_eq!(engine.select_card(0), SelectOutcome::NoChange);
        engine.advance(ms(10_000));
        assert_eq!(engine.result(), Some(result));

        engine.restart();
        assert_eq!(engine.result(), None);
        assert_eq!(result.moves, 8);
    }
}
