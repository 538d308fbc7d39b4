//! Heuristic AI for both roles
//!
//! Architecture: trait + data hybrid
//! - `PlayerAi` is the interface the turn loop drives
//! - `GeneralAi` splits the national budget between commanders
//! - `CommanderAi` spends its PE and activates its tokens
//! - `AiPersonality` holds the TOML-loaded weights both use

pub mod commander;
pub mod decision_log;
pub mod general;
pub mod personality;

pub use commander::CommanderAi;
pub use decision_log::DecisionLog;
pub use general::{split_budget, Allocation, CommanderNeed, GeneralAi};
pub use personality::{
    load_personality, load_personality_from, AiPersonality, CommanderWeights, GeneralWeights,
};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Nation, PlayerId, Role, Turn};
use crate::engine::state::GameState;
use crate::engine::turn::{Controller, Player};

/// One AI action, as written to the decision log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDecision {
    pub turn: Turn,
    pub player: u8,
    pub nation: Nation,
    pub role: Role,
    pub action: String,
    pub detail: String,
    /// Player's PE before the action
    pub points_before: u32,
    pub points_after: u32,
}

/// An AI that can play a whole turn for one player
pub trait PlayerAi {
    fn player(&self) -> PlayerId;

    fn personality(&self) -> &AiPersonality;

    /// Issue all actions for this turn; does not end the turn
    fn play_turn(&mut self, state: &mut GameState) -> Result<Vec<AiDecision>>;
}

/// Build the AI matching a player's role
pub fn controller_for(player: &Player, personality: AiPersonality) -> Box<dyn PlayerAi> {
    match player.role {
        Role::General => Box::new(GeneralAi::new(player.id, personality)),
        Role::Commander => Box::new(CommanderAi::new(player.id, personality)),
    }
}

/// AI instances for every AI-controlled player of a game
#[derive(Default)]
pub struct AiRoster {
    controllers: BTreeMap<PlayerId, Box<dyn PlayerAi>>,
}

impl AiRoster {
    /// Load the personality of every AI player from `dir`
    pub fn from_state(state: &GameState, dir: &Path) -> Result<Self> {
        let mut controllers = BTreeMap::new();
        for player in &state.players {
            if let Controller::Ai { personality } = &player.controller {
                let weights = load_personality_from(dir, personality)?;
                tracing::debug!("Player {} uses AI personality {}", player.id, personality);
                controllers.insert(player.id, controller_for(player, weights));
            }
        }
        Ok(Self { controllers })
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut (dyn PlayerAi + 'static)> {
        self.controllers.get_mut(&player).map(|ai| ai.as_mut())
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.controllers.contains_key(&player)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
