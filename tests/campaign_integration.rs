//! AI vs AI campaign integration tests on the shipped scenario

use std::path::Path;

use wrzesien::ai::AiRoster;
use wrzesien::core::config::GameConfig;
use wrzesien::core::types::Nation;
use wrzesien::engine::state::GameState;
use wrzesien::engine::turn::Controller;
use wrzesien::engine::victory::VictoryReason;
use wrzesien::scenario::Scenario;

fn ai_game(seed: u64, max_turns: u32, polska: &str, niemcy: &str) -> GameState {
    let path = Path::new("data/scenarios/wrzesien.json");
    let mut scenario = Scenario::load(path).expect("Should load shipped scenario");
    scenario.set_controllers(Nation::Polska, Controller::Ai { personality: polska.into() });
    scenario.set_controllers(Nation::Niemcy, Controller::Ai { personality: niemcy.into() });

    let mut config = GameConfig::load("data/game_config.toml".as_ref()).expect("Should load shipped config");
    config.game.seed = seed;
    config.game.max_turns = max_turns;
    GameState::from_scenario(&scenario, path.parent().unwrap(), config).unwrap()
}

fn play_out(state: &mut GameState) -> usize {
    let mut roster = AiRoster::from_state(state, Path::new("data/ai_personalities")).unwrap();
    assert_eq!(roster.len(), state.players.len());

    let mut decisions = 0;
    while !state.is_over() {
        let player = state.current_player().unwrap().id;
        let ai = roster.get_mut(player).expect("every seat is AI controlled");
        decisions += state.run_ai_turn(ai).unwrap().len();
    }
    decisions
}

#[test]
fn test_ai_game_runs_to_an_outcome() {
    let mut state = ai_game(1939, 8, "default", "default");
    let decisions = play_out(&mut state);

    let outcome = state.outcome.expect("game should be decided");
    assert!(decisions > 0);
    assert!(state.turn() <= 9);
    if let VictoryReason::Points { polska, niemcy } = outcome.reason {
        assert_eq!(outcome.winner.is_none(), polska == niemcy);
    }
    assert!(!state.events.is_empty());
}

#[test]
fn test_same_seed_same_game() {
    let mut a = ai_game(7, 6, "aggressive", "cautious");
    let mut b = ai_game(7, 6, "aggressive", "cautious");
    play_out(&mut a);
    play_out(&mut b);

    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.events.len(), b.events.len());
    let positions = |s: &GameState| -> Vec<_> { s.tokens.iter().map(|t| (t.id.clone(), t.position, t.combat_value)).collect() };
    assert_eq!(positions(&a), positions(&b));
}

#[test]
fn test_ai_spends_and_fights() {
    let mut state = ai_game(11, 10, "aggressive", "aggressive");
    play_out(&mut state);

    let purchased = state
        .events
        .events
        .iter()
        .any(|e| matches!(e.kind, wrzesien::engine::GameEventKind::Purchased { .. }));
    let allocated = state
        .events
        .events
        .iter()
        .any(|e| matches!(e.kind, wrzesien::engine::GameEventKind::Allocation { .. }));
    assert!(purchased, "commanders should buy reinforcements");
    assert!(allocated, "generals should fund commanders");
}
