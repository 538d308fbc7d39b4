//! Complete game state and the round loop
//!
//! Round structure:
//! 1. `begin_round`: income, key point payouts, upkeep, deployments,
//!    visibility refresh, victory check
//! 2. each player in order acts, then calls `end_player_turn`
//! 3. after the last player the next round begins; once `max_turns` rounds
//!    have been played the game is decided on points

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::{AiDecision, PlayerAi};
use crate::board::hex::HexCoord;
use crate::board::map::Board;
use crate::board::visibility::NationVisibility;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Nation, PlayerId, Role, TokenId, Turn};
use crate::economy::deployment::{deploy_pending, PendingDeployment};
use crate::economy::key_points::collect_key_point_income;
use crate::economy::treasury::Treasury;
use crate::economy::upkeep::charge_upkeep;
use crate::engine::events::{EventLog, GameEventKind};
use crate::engine::turn::{Player, TurnManager};
use crate::engine::victory::{check_victory, Outcome};
use crate::tokens::blueprint::BlueprintCatalog;
use crate::tokens::registry::TokenRegistry;
use crate::tokens::token::Token;

/// Why a token left the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Destroyed in battle; the opponent scores its price
    Combat,
    /// Starved by unpaid upkeep
    Attrition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub tokens: TokenRegistry,
    pub players: Vec<Player>,
    pub treasury: Treasury,
    pub pending: Vec<PendingDeployment>,
    pub victory_points: BTreeMap<Nation, u32>,
    pub visibility: BTreeMap<Nation, NationVisibility>,
    pub catalog: BlueprintCatalog,
    pub config: GameConfig,
    pub turns: TurnManager,
    pub rng: ChaCha8Rng,
    pub events: EventLog,
    pub outcome: Option<Outcome>,
}

impl GameState {
    /// Create a game; players act in ascending id order
    pub fn new(
        board: Board,
        catalog: BlueprintCatalog,
        mut players: Vec<Player>,
        config: GameConfig,
    ) -> Self {
        players.sort_by_key(|p| p.id);
        let order = players.iter().map(|p| p.id).collect();
        let rng = ChaCha8Rng::seed_from_u64(config.game.seed);
        let turns = TurnManager::new(order, config.game.max_turns);

        let visibility = Nation::all()
            .into_iter()
            .map(|n| (n, NationVisibility::new()))
            .collect();

        Self {
            board,
            tokens: TokenRegistry::new(),
            players,
            treasury: Treasury::new(),
            pending: Vec::new(),
            victory_points: BTreeMap::new(),
            visibility,
            catalog,
            config,
            turns,
            rng,
            events: EventLog::new(),
            outcome: None,
        }
    }

    /// Run the first round's bookkeeping and open the first player's turn
    pub fn start(&mut self) {
        self.begin_round();
        self.begin_player_turn();
    }

    pub fn turn(&self) -> Turn {
        self.turns.turn
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    // ===== Players =====

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    pub fn current_player(&self) -> Result<&Player> {
        let id = self
            .turns
            .current_player()
            .ok_or_else(|| GameError::Scenario("game has no players".into()))?;
        self.player(id)
    }

    pub fn general_of(&self, nation: Nation) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.nation == nation && p.is_general())
            .map(|p| p.id)
    }

    pub fn commanders_of(&self, nation: Nation) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.nation == nation && p.is_commander())
            .map(|p| p.id)
            .collect()
    }

    /// Check that `player` may act now in the given role
    pub fn require_active(&self, player: PlayerId, role: Role) -> Result<&Player> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if self.turns.current_player() != Some(player) {
            return Err(GameError::NotYourTurn(player));
        }
        let p = self.player(player)?;
        if p.role != role {
            return Err(GameError::WrongRole(player));
        }
        Ok(p)
    }

    /// Fetch a token commanded by `player`
    pub fn require_owned(&self, player: PlayerId, token_id: &TokenId) -> Result<&Token> {
        let token = self.tokens.get(token_id)?;
        if token.owner.commander != player {
            return Err(GameError::NotOwner {
                token: token_id.clone(),
                player,
            });
        }
        Ok(token)
    }

    // ===== Score =====

    pub fn victory_points_of(&self, nation: Nation) -> u32 {
        self.victory_points.get(&nation).copied().unwrap_or(0)
    }

    fn award_victory_points(&mut self, nation: Nation, amount: u32) {
        *self.victory_points.entry(nation).or_insert(0) += amount;
    }

    // ===== Visibility =====

    /// (position, sight) of every on-board token of a nation
    pub fn observers(&self, nation: Nation) -> Vec<(HexCoord, u32)> {
        self.tokens
            .deployed(nation)
            .filter_map(|t| t.position.map(|p| (p, t.sight_range())))
            .collect()
    }

    pub fn refresh_visibility(&mut self) {
        for nation in Nation::all() {
            let observers = self.observers(nation);
            self.visibility
                .entry(nation)
                .or_default()
                .refresh(&self.board, observers);
        }
    }

    pub fn is_visible_to(&self, nation: Nation, coord: HexCoord) -> bool {
        self.visibility
            .get(&nation)
            .map(|v| v.is_visible(coord))
            .unwrap_or(false)
    }

    /// Enemy tokens the nation can currently see
    pub fn visible_enemies(&self, nation: Nation) -> Vec<&Token> {
        self.tokens
            .deployed(nation.opponent())
            .filter(|t| t.position.map(|p| self.is_visible_to(nation, p)).unwrap_or(false))
            .collect()
    }

    // ===== Token lifecycle =====

    /// Take a token out of the game
    pub fn remove_token(&mut self, id: &TokenId, cause: RemovalCause) -> Option<Token> {
        let token = self.tokens.remove(id)?;
        self.pending.retain(|order| &order.token_id != id);

        let turn = self.turn();
        let nation = token.nation();
        if cause == RemovalCause::Combat {
            self.award_victory_points(nation.opponent(), token.stats.price);
        }

        info!("{} of {} eliminated ({:?})", token.id, nation, cause);
        self.events.push(
            GameEventKind::Eliminated {
                token: token.id.clone(),
                nation,
            },
            format!("{} ({}) eliminated", token.label, token.owner),
            turn,
        );
        Some(token)
    }

    // ===== Turn flow =====

    /// Economy and housekeeping at the start of every round
    pub fn begin_round(&mut self) {
        let turn = self.turn();
        info!("=== Round {} ===", turn);
        self.events
            .push(GameEventKind::RoundStarted, format!("Round {}", turn), turn);

        let base_income = self.config.economy.base_income;
        for nation in Nation::all() {
            if let Some(general) = self.general_of(nation) {
                self.treasury.credit(general, base_income);
                self.events.push(
                    GameEventKind::Income {
                        player: general,
                        amount: base_income,
                    },
                    format!("General {} receives {} PE", general, base_income),
                    turn,
                );
            }
        }

        let payouts = collect_key_point_income(
            &mut self.board,
            &self.tokens,
            self.config.economy.kp_income_rate,
        );
        for payout in payouts {
            if let Some(general) = self.general_of(payout.nation) {
                self.treasury.credit(general, payout.amount);
            }
            debug!(
                "Key point {} pays {} PE to {}",
                payout.coord, payout.amount, payout.nation
            );
            self.events.push(
                GameEventKind::KeyPointIncome {
                    coord: payout.coord,
                    nation: payout.nation,
                    amount: payout.amount,
                },
                format!(
                    "Key point {} yields {} PE for {}",
                    payout.coord, payout.amount, payout.nation
                ),
                turn,
            );
        }

        let commanders: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_commander())
            .map(|p| p.id)
            .collect();
        for commander in commanders {
            let report = charge_upkeep(&mut self.treasury, &mut self.tokens, commander);
            if report.shortfall() > 0 {
                self.events.push(
                    GameEventKind::UpkeepShortfall {
                        commander,
                        shortfall: report.shortfall(),
                    },
                    format!(
                        "Commander {} could not pay {} PE of upkeep",
                        commander,
                        report.shortfall()
                    ),
                    turn,
                );
            }
            for id in &report.unpaid {
                let starved = self.tokens.get(id).map(|t| !t.is_alive()).unwrap_or(false);
                if starved {
                    self.remove_token(id, RemovalCause::Attrition);
                }
            }
        }

        for (token, at) in deploy_pending(&mut self.pending, &mut self.tokens, &self.board) {
            info!("{} deployed at {}", token, at);
            self.events.push(
                GameEventKind::Deployed {
                    token: token.clone(),
                    at,
                },
                format!("{} deployed at {}", token, at),
                turn,
            );
        }

        self.refresh_visibility();
        self.update_outcome();
    }

    /// Reset the action state of the current commander's tokens
    pub fn begin_player_turn(&mut self) {
        let Ok(player) = self.current_player() else {
            return;
        };
        let (id, is_commander) = (player.id, player.is_commander());
        debug!("Turn {} - player {} ({})", self.turn(), id, player.name);

        if is_commander {
            for token in self.tokens.iter_mut().filter(|t| t.owner.commander == id) {
                token.start_turn();
            }
        }
    }

    /// Finish the current player's turn; returns true when a new round began
    pub fn end_player_turn(&mut self) -> Result<bool> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }

        let new_round = self.turns.advance();
        if new_round {
            if self.turns.turns_exhausted() {
                self.update_outcome();
            } else {
                self.begin_round();
            }
        }

        if !self.is_over() {
            self.begin_player_turn();
        }
        Ok(new_round)
    }

    /// Let an AI play the current turn, then pass to the next player
    pub fn run_ai_turn(&mut self, ai: &mut dyn PlayerAi) -> Result<Vec<AiDecision>> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let current = self.current_player()?.id;
        if ai.player() != current {
            return Err(GameError::NotYourTurn(ai.player()));
        }

        let decisions = ai.play_turn(self)?;
        if !self.is_over() {
            self.end_player_turn()?;
        }
        Ok(decisions)
    }

    /// Record the outcome the first time a victory condition holds
    pub fn update_outcome(&mut self) -> Option<Outcome> {
        if self.outcome.is_none() {
            if let Some(outcome) = check_victory(self) {
                info!("Game over: {}", outcome);
                self.events.push(
                    GameEventKind::GameEnded { outcome },
                    outcome.to_string(),
                    self.turn(),
                );
                self.outcome = Some(outcome);
            }
        }
        self.outcome
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::board::map::{KeyPoint, KeyPointKind};
    use crate::tokens::blueprint::fixtures as blueprints;

    #[test]
    fn test_require_active_checks_turn_and_role() {
        let state = state();
        assert!(state.require_active(COMMANDER_PL, Role::Commander).is_ok());
        assert!(matches!(
            state.require_active(COMMANDER_DE, Role::Commander),
            Err(GameError::NotYourTurn(_))
        ));
        assert!(matches!(
            state.require_active(COMMANDER_PL, Role::General),
            Err(GameError::WrongRole(_))
        ));
    }

    #[test]
    fn test_begin_round_pays_income_and_upkeep() {
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(2, 2));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(9, 9));
        state.treasury.credit(COMMANDER_PL, 10);

        state.begin_round();

        assert_eq!(state.treasury.balance(GENERAL_PL), 40);
        assert_eq!(state.treasury.balance(GENERAL_DE), 40);
        assert_eq!(state.treasury.balance(COMMANDER_PL), 8);
    }

    #[test]
    fn test_key_point_income_goes_to_general() {
        let mut state = state();
        state.board.key_points.push(KeyPoint {
            coord: HexCoord::new(5, 5),
            kind: KeyPointKind::City,
            value: 50,
        });
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(5, 5));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(9, 9));

        state.begin_round();

        assert_eq!(state.treasury.balance(GENERAL_PL), 45);
        assert_eq!(state.board.key_points[0].value, 45);
    }

    #[test]
    fn test_starved_token_removed_without_points() {
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(2, 2));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(9, 9));
        state.tokens.get_mut(&TokenId::new("pl")).unwrap().combat_value = 1;

        state.begin_round();

        assert!(!state.tokens.contains(&TokenId::new("pl")));
        assert_eq!(state.victory_points_of(Nation::Niemcy), 0);
        assert_eq!(
            state.outcome.map(|o| o.winner),
            Some(Some(Nation::Niemcy))
        );
    }

    #[test]
    fn test_end_player_turn_cycles_and_starts_round() {
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(2, 2));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(9, 9));
        state.turns.set_current(GENERAL_PL);

        let mut rounds = 0;
        for _ in 0..4 {
            if state.end_player_turn().unwrap() {
                rounds += 1;
            }
        }
        assert_eq!(rounds, 1);
        assert_eq!(state.turn(), 2);
        assert_eq!(state.current_player().unwrap().id, GENERAL_PL);
        assert_eq!(state.treasury.balance(GENERAL_PL), 40);
    }

    #[test]
    fn test_commander_turn_resets_tokens() {
        let mut state = state();
        let id = place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(2, 2));
        {
            let t = state.tokens.get_mut(&id).unwrap();
            t.has_moved = true;
            t.movement_left = 0.0;
        }
        state.turns.set_current(GENERAL_PL);
        state.end_player_turn().unwrap();

        let t = state.tokens.get(&id).unwrap();
        assert!(!t.has_moved);
        assert_eq!(t.movement_left, 3.0);
    }

    #[test]
    fn test_visible_enemies_respects_sight() {
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(2, 2));
        place(&mut state, "near", COMMANDER_DE, blueprints::infantry, HexCoord::new(4, 2));
        place(&mut state, "far", COMMANDER_DE, blueprints::infantry, HexCoord::new(10, 10));

        let seen: Vec<&str> = state
            .visible_enemies(Nation::Polska)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(seen, vec!["near"]);
    }

    #[test]
    fn test_game_over_blocks_turns() {
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(2, 2));
        state.update_outcome();
        assert!(state.is_over());
        assert!(matches!(state.end_player_turn(), Err(GameError::GameOver)));
    }
}
