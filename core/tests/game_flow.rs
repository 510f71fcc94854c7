use std::time::Duration;

use concentration_core::*;

type TestEngine = Engine<Vec<ViewEvent>, VirtualScheduler>;

fn new_engine(seed: u64) -> TestEngine {
    Engine::new(GameConfig::default(), seed, Vec::new(), VirtualScheduler::new())
}

fn pair_of(engine: &TestEngine, suit: Suit) -> [CardId; 2] {
    let ids: Vec<CardId> = engine
        .deck()
        .cards()
        .iter()
        .filter(|card| card.suit() == suit)
        .map(|card| card.id())
        .collect();
    [ids[0], ids[1]]
}

fn play_turn(engine: &mut TestEngine, first: CardId, second: CardId) {
    assert_eq!(engine.select_card(first), SelectOutcome::Revealed);
    assert_eq!(engine.select_card(second), SelectOutcome::PairCompleted);
    engine.advance(Duration::from_millis(engine.config().reveal_delay_ms));
}

#[test]
fn thirteen_moves_keep_three_stars() {
    let mut engine = new_engine(2024);

    // five misses first, then every pair in order
    for i in 0..5 {
        let [a, _] = pair_of(&engine, Suit::ALL[i]);
        let [b, _] = pair_of(&engine, Suit::ALL[i + 1]);
        play_turn(&mut engine, a, b);
        assert_eq!(engine.state(), EngineState::Idle);
    }
    for suit in Suit::ALL {
        let [a, b] = pair_of(&engine, suit);
        play_turn(&mut engine, a, b);
    }

    let result = engine.result().expect("game should be over");
    assert_eq!(engine.state(), EngineState::GameOver);
    assert_eq!(engine.deck().matched_pairs(), PAIR_COUNT);
    assert_eq!(result.moves, 13);
    assert_eq!(result.stars, StarRating::Three);
    assert!(
        !engine
            .view()
            .iter()
            .any(|event| matches!(event, ViewEvent::StarsChanged { stars } if *stars != StarRating::Three))
    );
}

#[test]
fn one_extra_miss_costs_a_star() {
    let mut engine = new_engine(5);

    for i in 0..6 {
        let [a, _] = pair_of(&engine, Suit::ALL[i]);
        let [b, _] = pair_of(&engine, Suit::ALL[i + 1]);
        play_turn(&mut engine, a, b);
    }
    assert_eq!(
        engine.view().last(),
        Some(&ViewEvent::CardHidden {
            id: pair_of(&engine, Suit::ALL[6])[0]
        })
    );

    for suit in Suit::ALL {
        let [a, b] = pair_of(&engine, suit);
        play_turn(&mut engine, a, b);
    }

    assert_eq!(engine.result().map(|r| (r.moves, r.stars)), Some((14, StarRating::Two)));
    assert!(engine.view().contains(&ViewEvent::StarsChanged {
        stars: StarRating::Two
    }));
}

#[test]
fn result_survives_restart() {
    let mut engine = new_engine(77);
    for suit in Suit::ALL {
        let [a, b] = pair_of(&engine, suit);
        play_turn(&mut engine, a, b);
    }
    let over = engine
        .view()
        .iter()
        .find_map(|event| match event {
            ViewEvent::GameOver { result } => Some(*result),
            _ => None,
        })
        .expect("game over event");

    engine.restart();
    let [a, _] = pair_of(&engine, Suit::Leaf);
    engine.select_card(a);
    engine.advance(Duration::from_secs(3));

    assert_eq!(over.moves, 8);
    assert_eq!(over.stars, StarRating::Three);
    assert_eq!(engine.scoreboard().elapsed_secs(), 3);
    assert_eq!(engine.result(), None);
}

#[test]
fn late_evaluation_never_reaches_new_game() {
    let mut engine = new_engine(9);
    let [a, b] = pair_of(&engine, Suit::Anchor);
    engine.select_card(a);
    engine.select_card(b);
    let stale = Task::evaluate_pair(engine.generation());

    engine.restart();
    let [c, _] = pair_of(&engine, Suit::Bolt);
    engine.select_card(c);
    let before = engine.deck().clone();

    assert!(!engine.run_task(stale));
    assert_eq!(engine.deck(), &before);
    assert_eq!(engine.state(), EngineState::OneRevealed);
}

#[test]
fn events_render_as_json_lines() {
    let mut engine = new_engine(1);
    let [a, _] = pair_of(&engine, Suit::Cube);
    engine.select_card(a);

    let lines: Vec<String> = engine
        .view()
        .iter()
        .map(|event| serde_json::to_string(event).unwrap())
        .collect();

    assert_eq!(lines[0], r#"{"event":"game_reset"}"#);
    assert_eq!(
        lines.last().unwrap(),
        &format!(r#"{{"event":"card_revealed","id":{a},"suit":"cube"}}"#)
    );
}
