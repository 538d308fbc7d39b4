//! Scenario files: map, blueprints, players and the opening deployment
//!
//! A scenario is a JSON file whose map and blueprint paths are resolved
//! relative to a base directory (usually the scenario's own directory).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::hex::HexCoord;
use crate::board::map::Board;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Nation, Owner, PlayerId, Role, TokenId};
use crate::engine::state::GameState;
use crate::engine::turn::{Controller, Player};
use crate::tokens::blueprint::BlueprintCatalog;
use crate::tokens::token::Token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioPlayer {
    pub id: u8,
    pub nation: Nation,
    pub role: Role,
    pub name: String,
    #[serde(default)]
    pub controller: Controller,
    /// PE in the player's treasury before the first round
    #[serde(default)]
    pub starting_pe: u32,
}

/// A token on the board at the start of the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioToken {
    pub blueprint: String,
    /// Legacy owner form, e.g. `"2 (Polska)"`
    pub owner: String,
    pub q: i32,
    pub r: i32,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub map: PathBuf,
    pub blueprints: PathBuf,
    pub players: Vec<ScenarioPlayer>,
    #[serde(default)]
    pub tokens: Vec<ScenarioToken>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate_players()?;
        Ok(scenario)
    }

    fn validate_players(&self) -> Result<()> {
        let mut ids: Vec<u8> = self.players.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(GameError::Scenario("duplicate player id".into()));
        }
        for nation in Nation::all() {
            let generals = self
                .players
                .iter()
                .filter(|p| p.nation == nation && p.role == Role::General)
                .count();
            if generals != 1 {
                return Err(GameError::Scenario(format!(
                    "{} needs exactly one general, found {}",
                    nation, generals
                )));
            }
            if !self
                .players
                .iter()
                .any(|p| p.nation == nation && p.role == Role::Commander)
            {
                return Err(GameError::Scenario(format!("{} has no commander", nation)));
            }
        }
        Ok(())
    }

    /// Hand every player of a nation to the same controller
    pub fn set_controllers(&mut self, nation: Nation, controller: Controller) {
        for player in self.players.iter_mut().filter(|p| p.nation == nation) {
            player.controller = controller.clone();
        }
    }

    fn players(&self) -> Vec<Player> {
        self.players
            .iter()
            .map(|p| Player {
                id: PlayerId(p.id),
                nation: p.nation,
                role: p.role,
                name: p.name.clone(),
                controller: p.controller.clone(),
            })
            .collect()
    }
}

impl GameState {
    /// Build and start a game from a scenario
    pub fn from_scenario(scenario: &Scenario, base_dir: &Path, config: GameConfig) -> Result<Self> {
        config.validate()?;
        let board = Board::from_map_file(&base_dir.join(&scenario.map))?;
        let catalog = BlueprintCatalog::load(&base_dir.join(&scenario.blueprints))?;

        let mut state = GameState::new(board, catalog, scenario.players(), config);
        for p in &scenario.players {
            state.treasury.credit(PlayerId(p.id), p.starting_pe);
        }
        for placement in &scenario.tokens {
            state.place_scenario_token(placement)?;
        }

        info!(
            "Scenario '{}': {} players, {} tokens on a {}x{} map",
            scenario.name,
            state.players.len(),
            state.tokens.len(),
            state.board.width,
            state.board.height
        );
        state.start();
        Ok(state)
    }

    fn place_scenario_token(&mut self, placement: &ScenarioToken) -> Result<()> {
        let owner: Owner = placement.owner.parse()?;
        let coord = HexCoord::new(placement.q, placement.r);
        let fail = |what: String| -> Result<()> {
            Err(GameError::Scenario(format!(
                "token {} at {}: {}",
                placement.blueprint, coord, what
            )))
        };

        let player = self.player(owner.commander)?;
        if player.role != Role::Commander {
            return fail(format!("owner {} is not a commander", owner.commander));
        }
        if player.nation != owner.nation {
            return fail(format!("player {} does not fight for {}", owner.commander, owner.nation));
        }
        let blueprint = self.catalog.get(&placement.blueprint)?.clone();
        if blueprint.nation != owner.nation {
            return fail(format!("blueprint belongs to {}", blueprint.nation));
        }
        if !self.board.in_bounds(coord) {
            return fail("outside the map".into());
        }
        if !self.board.is_passable(coord) {
            return fail("impassable hex".into());
        }
        if self.tokens.is_occupied(coord) {
            return fail("hex already occupied".into());
        }

        let id = match &placement.id {
            Some(id) => TokenId::new(id.clone()),
            None => self.tokens.next_id(owner, &blueprint),
        };
        let mut token = Token::from_blueprint(id, owner, &blueprint);
        token.position = Some(coord);
        self.tokens.insert(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_json(tokens: &str) -> String {
        format!(
            r#"{{
                "name": "test",
                "map": "map.json",
                "blueprints": "blueprints.json",
                "players": [
                    {{"id": 1, "nation": "Polska", "role": "General", "name": "A", "starting_pe": 50}},
                    {{"id": 2, "nation": "Polska", "role": "Commander", "name": "B"}},
                    {{"id": 4, "nation": "Niemcy", "role": "General", "name": "C"}},
                    {{"id": 5, "nation": "Niemcy", "role": "Commander", "name": "D",
                      "controller": {{"ai": {{"personality": "default"}}}}}}
                ],
                "tokens": {}
            }}"#,
            tokens
        )
    }

    const MAP: &str = r#"{
        "width": 8, "height": 8,
        "tiles": [{"q": 3, "r": 3, "terrain": "impassable"}],
        "key_points": [{"q": 4, "r": 4, "kind": "city", "value": 50}],
        "spawn_points": {"Polska": [[0, 0]], "Niemcy": [[7, 7]]}
    }"#;

    const BLUEPRINTS: &str = r#"[
        {"key": "Polska_P_Kompania", "nation": "Polska", "kind": "P", "size": "Kompania",
         "label": "Kompania piechoty",
         "stats": {"movement": 3.0, "attack_range": 1, "attack_value": 6, "combat_value": 10,
                   "defense_value": 6, "sight": 2, "upkeep": 2, "price": 20}},
        {"key": "Niemcy_P_Kompania", "nation": "Niemcy", "kind": "P", "size": "Kompania",
         "label": "Schützenkompanie",
         "stats": {"movement": 3.0, "attack_range": 1, "attack_value": 6, "combat_value": 10,
                   "defense_value": 6, "sight": 2, "upkeep": 2, "price": 20}}
    ]"#;

    fn write_scenario(tokens: &str) -> (tempfile::TempDir, Scenario) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("map.json"), MAP).unwrap();
        fs::write(dir.path().join("blueprints.json"), BLUEPRINTS).unwrap();
        let scenario = Scenario::from_json(&scenario_json(tokens)).unwrap();
        (dir, scenario)
    }

    #[test]
    fn test_scenario_builds_game() {
        let (dir, scenario) = write_scenario(
            r#"[{"blueprint": "Polska_P_Kompania", "owner": "2 (Polska)", "q": 1, "r": 1, "id": "p1"},
                {"blueprint": "Niemcy_P_Kompania", "owner": "5 (Niemcy)", "q": 6, "r": 6}]"#,
        );
        let state = GameState::from_scenario(&scenario, dir.path(), GameConfig::default()).unwrap();

        assert_eq!(state.tokens.len(), 2);
        assert!(state.tokens.contains(&TokenId::new("p1")));
        assert_eq!(state.turn(), 1);
        assert!(state.players.iter().any(|p| p.is_ai()));
        // starting PE plus the first round's base income
        let income = state.config.economy.base_income;
        assert_eq!(state.treasury.balance(PlayerId(1)), 50 + income);
    }

    #[test]
    fn test_placement_rules() {
        let cases = [
            r#"[{"blueprint": "Polska_P_Kompania", "owner": "2 (Polska)", "q": 3, "r": 3}]"#,
            r#"[{"blueprint": "Polska_P_Kompania", "owner": "2 (Polska)", "q": 9, "r": 0}]"#,
            r#"[{"blueprint": "Niemcy_P_Kompania", "owner": "2 (Polska)", "q": 1, "r": 1}]"#,
            r#"[{"blueprint": "Polska_P_Kompania", "owner": "1 (Polska)", "q": 1, "r": 1}]"#,
            r#"[{"blueprint": "Polska_P_Kompania", "owner": "2 (Polska)", "q": 1, "r": 1},
                {"blueprint": "Polska_P_Kompania", "owner": "2 (Polska)", "q": 1, "r": 1}]"#,
        ];
        for tokens in cases {
            let (dir, scenario) = write_scenario(tokens);
            let result = GameState::from_scenario(&scenario, dir.path(), GameConfig::default());
            assert!(matches!(result, Err(GameError::Scenario(_))), "accepted {}", tokens);
        }
    }

    #[test]
    fn test_missing_general_rejected() {
        let json = scenario_json("[]").replace(r#""role": "General", "name": "C""#, r#""role": "Commander", "name": "C""#);
        assert!(matches!(Scenario::from_json(&json), Err(GameError::Scenario(_))));
    }

    #[test]
    fn test_set_controllers() {
        let (_dir, mut scenario) = write_scenario("[]");
        let ai = Controller::Ai {
            personality: "aggressive".into(),
        };
        scenario.set_controllers(Nation::Polska, ai.clone());
        assert!(scenario
            .players
            .iter()
            .filter(|p| p.nation == Nation::Polska)
            .all(|p| p.controller == ai));
        assert_eq!(scenario.players[3].controller, Controller::Ai { personality: "default".into() });
    }

    #[test]
    fn test_load_shipped_scenario() {
        let path = Path::new("data/scenarios/wrzesien.json");
        let scenario = Scenario::load(path).unwrap();
        let base = path.parent().unwrap();
        let state = GameState::from_scenario(&scenario, base, GameConfig::default()).unwrap();
        assert!(state.tokens.deployed(Nation::Polska).count() > 0);
        assert!(state.tokens.deployed(Nation::Niemcy).count() > 0);
    }
}
