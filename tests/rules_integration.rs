//! Rules integration tests through the public API on a small hand-built board

use wrzesien::board::{Board, HexCoord, KeyPoint, KeyPointKind};
use wrzesien::core::config::GameConfig;
use wrzesien::core::error::{GameError, MoveRejection};
use wrzesien::core::types::{Nation, Owner, PlayerId, Role, TokenId};
use wrzesien::engine::victory::VictoryReason;
use wrzesien::engine::{give, purchase, resolve_attack, resolve_move, GameState, Player};
use wrzesien::engine::turn::Controller;
use wrzesien::tokens::{BlueprintCatalog, Token};

const GENERAL_PL: PlayerId = PlayerId(1);
const COMMANDER_PL: PlayerId = PlayerId(2);
const GENERAL_DE: PlayerId = PlayerId(4);
const COMMANDER_DE: PlayerId = PlayerId(5);

fn catalog() -> BlueprintCatalog {
    let mut entries = Vec::new();
    for nation in ["Polska", "Niemcy"] {
        entries.push(format!(
            r#"{{"key": "{n}_P_Kompania", "nation": "{n}", "kind": "P", "size": "Kompania", "label": "inf",
                "stats": {{"movement": 3.0, "attack_range": 1, "attack_value": 6, "combat_value": 10,
                          "defense_value": 6, "sight": 2, "upkeep": 2, "price": 20}}}}"#,
            n = nation
        ));
        entries.push(format!(
            r#"{{"key": "{n}_P_Pluton", "nation": "{n}", "kind": "P", "size": "Pluton", "label": "plt",
                "stats": {{"movement": 3.0, "attack_range": 1, "attack_value": 3, "combat_value": 5,
                          "defense_value": 3, "sight": 2, "upkeep": 1, "price": 10}}}}"#,
            n = nation
        ));
        entries.push(format!(
            r#"{{"key": "{n}_TS_Pluton", "nation": "{n}", "kind": "TS", "size": "Pluton", "label": "tank",
                "stats": {{"movement": 5.0, "attack_range": 1, "attack_value": 10, "combat_value": 8,
                          "defense_value": 7, "sight": 2, "fuel_capacity": 10, "upkeep": 3, "price": 35}}}}"#,
            n = nation
        ));
    }
    BlueprintCatalog::from_json(&format!("[{}]", entries.join(","))).unwrap()
}

fn players() -> Vec<Player> {
    let seat = |id, nation, role| Player {
        id,
        nation,
        role,
        name: format!("{}", id),
        controller: Controller::Human,
    };
    vec![
        seat(COMMANDER_DE, Nation::Niemcy, Role::Commander),
        seat(GENERAL_PL, Nation::Polska, Role::General),
        seat(GENERAL_DE, Nation::Niemcy, Role::General),
        seat(COMMANDER_PL, Nation::Polska, Role::Commander),
    ]
}

/// 10x10 plain, fixed dice, PL spawns top-left and DE bottom-right
fn game(tokens: &[(&str, PlayerId, &str, (i32, i32))], key_point: Option<(i32, i32)>) -> GameState {
    let mut board = Board::new(10, 10);
    board.spawn_points.insert(Nation::Polska, vec![HexCoord::new(0, 0), HexCoord::new(1, 0)]);
    board.spawn_points.insert(Nation::Niemcy, vec![HexCoord::new(9, 9)]);
    if let Some((q, r)) = key_point {
        board.key_points.push(KeyPoint {
            coord: HexCoord::new(q, r),
            kind: KeyPointKind::City,
            value: 100,
        });
    }

    let mut config = GameConfig::default();
    config.combat.roll_min = 1.0;
    config.combat.roll_max = 1.0;

    let catalog = catalog();
    let mut state = GameState::new(board, catalog, players(), config);
    for (id, commander, blueprint, (q, r)) in tokens {
        let nation = state.player(*commander).unwrap().nation;
        let blueprint = state.catalog.get(blueprint).unwrap().clone();
        let mut token = Token::from_blueprint(TokenId::new(*id), Owner::new(*commander, nation), &blueprint);
        token.position = Some(HexCoord::new(*q, *r));
        state.tokens.insert(token).unwrap();
    }
    state.start();
    state
}

fn end_turns_until(state: &mut GameState, player: PlayerId) {
    while state.current_player().unwrap().id != player {
        state.end_player_turn().unwrap();
    }
}

#[test]
fn test_turn_order_follows_player_ids() {
    let mut state = game(&[("pl", COMMANDER_PL, "Polska_P_Kompania", (2, 2)), ("de", COMMANDER_DE, "Niemcy_P_Kompania", (8, 8))], None);
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(state.current_player().unwrap().id);
        state.end_player_turn().unwrap();
    }
    assert_eq!(seen, vec![GENERAL_PL, COMMANDER_PL, GENERAL_DE, COMMANDER_DE]);
    assert_eq!(state.turn(), 2);
}

#[test]
fn test_funding_purchase_and_deployment() {
    let mut state = game(&[("pl", COMMANDER_PL, "Polska_P_Kompania", (2, 2)), ("de", COMMANDER_DE, "Niemcy_P_Kompania", (8, 8))], None);
    let income = state.config.economy.base_income;
    assert_eq!(state.treasury.balance(GENERAL_PL), income);

    give(&mut state, GENERAL_PL, COMMANDER_PL, 30).unwrap();
    assert!(matches!(
        give(&mut state, GENERAL_PL, COMMANDER_DE, 1),
        Err(GameError::WrongRole(_))
    ));
    state.end_player_turn().unwrap();

    let id = purchase(&mut state, COMMANDER_PL, "Polska_P_Kompania").unwrap();
    assert!(matches!(
        purchase(&mut state, COMMANDER_PL, "Niemcy_P_Kompania"),
        Err(GameError::BlueprintNotFound(_))
    ));
    assert_eq!(state.treasury.balance(COMMANDER_PL), 10);
    assert!(state.tokens.get(&id).unwrap().position.is_none());

    end_turns_until(&mut state, GENERAL_PL);
    assert_eq!(state.turn(), 2);
    assert_eq!(state.tokens.get(&id).unwrap().position, Some(HexCoord::new(0, 0)));
    assert!(state.pending.is_empty());
    // upkeep is charged before deployment, so only "pl" paid this round
    assert_eq!(state.treasury.balance(COMMANDER_PL), 8);
}

#[test]
fn test_key_point_pays_and_depletes() {
    let state = game(
        &[("pl", COMMANDER_PL, "Polska_P_Kompania", (5, 5)), ("de", COMMANDER_DE, "Niemcy_P_Kompania", (8, 8))],
        Some((5, 5)),
    );
    let income = state.config.economy.base_income;
    assert_eq!(state.treasury.balance(GENERAL_PL), income + 10);
    assert_eq!(state.treasury.balance(GENERAL_DE), income);
    assert_eq!(state.board.key_point_at(HexCoord::new(5, 5)).unwrap().value, 90);
}

#[test]
fn test_upkeep_shortfall_wears_tokens_down() {
    let mut state = game(&[("pl", COMMANDER_PL, "Polska_P_Kompania", (2, 2)), ("de", COMMANDER_DE, "Niemcy_P_Kompania", (8, 8))], None);
    let pl = TokenId::new("pl");
    let start_cv = state.tokens.get(&pl).unwrap().combat_value;
    end_turns_until(&mut state, COMMANDER_DE);
    state.end_player_turn().unwrap();
    assert_eq!(state.turn(), 2);
    // an empty treasury costs one CV per unpaid token each round
    assert_eq!(state.tokens.get(&pl).unwrap().combat_value, start_cv - 1);
}

#[test]
fn test_move_respects_terrain_and_enemies() {
    let mut state = game(&[("pl", COMMANDER_PL, "Polska_P_Kompania", (2, 2)), ("de", COMMANDER_DE, "Niemcy_P_Kompania", (3, 2))], None);
    end_turns_until(&mut state, COMMANDER_PL);
    let pl = TokenId::new("pl");

    let rejected = resolve_move(&mut state, COMMANDER_PL, &pl, HexCoord::new(3, 2));
    assert!(matches!(
        rejected,
        Err(GameError::IllegalMove { reason: MoveRejection::EnemyOccupied, .. })
    ));

    let report = resolve_move(&mut state, COMMANDER_PL, &pl, HexCoord::new(2, 4)).unwrap();
    assert_eq!(report.destination(), Some(HexCoord::new(2, 4)));
    assert!((report.cost - 2.0).abs() < 1e-6);
    assert!(resolve_move(&mut state, COMMANDER_PL, &pl, HexCoord::new(2, 5)).is_ok());
    assert!(matches!(
        resolve_move(&mut state, COMMANDER_PL, &pl, HexCoord::new(2, 6)),
        Err(GameError::IllegalMove { .. })
    ));
}

#[test]
fn test_destroying_last_enemy_wins() {
    let mut state = game(
        &[("tank", COMMANDER_PL, "Polska_TS_Pluton", (4, 4)), ("weak", COMMANDER_DE, "Niemcy_P_Pluton", (5, 4))],
        None,
    );
    end_turns_until(&mut state, COMMANDER_PL);

    let report = resolve_attack(&mut state, COMMANDER_PL, &TokenId::new("tank"), &TokenId::new("weak")).unwrap();
    assert!(report.defender_eliminated);
    assert!(!report.counterattack);
    assert_eq!(state.victory_points_of(Nation::Polska), 10);

    let outcome = state.outcome.expect("Niemcy have nothing left");
    assert_eq!(outcome.winner, Some(Nation::Polska));
    assert_eq!(outcome.reason, VictoryReason::Annihilation);
    assert!(matches!(state.end_player_turn(), Err(GameError::GameOver)));
}

#[test]
fn test_round_limit_decides_on_points() {
    let mut state = game(&[("pl", COMMANDER_PL, "Polska_P_Kompania", (2, 2)), ("de", COMMANDER_DE, "Niemcy_P_Kompania", (8, 8))], Some((2, 2)));
    state.turns.max_turns = 2;
    while !state.is_over() {
        state.end_player_turn().unwrap();
    }
    let outcome = state.outcome.unwrap();
    assert_eq!(outcome.winner, Some(Nation::Polska));
    assert!(matches!(outcome.reason, VictoryReason::Points { .. }));
}
