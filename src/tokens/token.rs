//! Live token state on the board

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::types::{Nation, Owner, TokenId};
use crate::tokens::blueprint::{Blueprint, TokenStats};
use crate::tokens::unit_type::{UnitKind, UnitSize};

/// Movement posture chosen before a token moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    /// Tryb bojowy
    #[default]
    Combat,
    /// Tryb marszowy: fast but vulnerable
    March,
    /// Tryb zwiadowczy: slow, careful, sees further
    Recon,
}

impl MoveMode {
    pub fn movement_multiplier(&self) -> f32 {
        match self {
            MoveMode::Combat => 1.0,
            MoveMode::March => 1.5,
            MoveMode::Recon => 0.5,
        }
    }

    pub fn attack_multiplier(&self) -> f32 {
        match self {
            MoveMode::Combat => 1.0,
            MoveMode::March => 0.5,
            MoveMode::Recon => 0.75,
        }
    }

    pub fn defense_multiplier(&self) -> f32 {
        match self {
            MoveMode::Combat => 1.0,
            MoveMode::March => 0.5,
            MoveMode::Recon => 1.25,
        }
    }

    pub fn sight_bonus(&self) -> u32 {
        match self {
            MoveMode::Recon => 1,
            _ => 0,
        }
    }
}

impl std::str::FromStr for MoveMode {
    type Err = crate::core::error::GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "combat" | "bojowy" => Ok(MoveMode::Combat),
            "march" | "marsz" | "marszowy" => Ok(MoveMode::March),
            "recon" | "zwiad" | "zwiadowczy" => Ok(MoveMode::Recon),
            other => Err(crate::core::error::GameError::Parse(format!(
                "unknown move mode '{}'",
                other
            ))),
        }
    }
}

/// A unit counter in play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub owner: Owner,
    pub blueprint_key: String,
    pub kind: UnitKind,
    pub size: UnitSize,
    pub label: String,
    pub stats: TokenStats,

    /// None while awaiting deployment
    pub position: Option<HexCoord>,

    // Current state
    pub combat_value: u32,
    pub fuel: u32,
    pub mode: MoveMode,
    pub movement_left: f32,
    pub has_moved: bool,
    pub has_attacked: bool,
}

impl Token {
    /// Create a fresh, full-strength token from a blueprint
    pub fn from_blueprint(id: TokenId, owner: Owner, blueprint: &Blueprint) -> Self {
        let mut token = Self {
            id,
            owner,
            blueprint_key: blueprint.key.clone(),
            kind: blueprint.kind,
            size: blueprint.size,
            label: blueprint.label.clone(),
            stats: blueprint.stats.clone(),
            position: None,
            combat_value: blueprint.stats.combat_value,
            fuel: blueprint.stats.fuel_capacity,
            mode: MoveMode::Combat,
            movement_left: 0.0,
            has_moved: false,
            has_attacked: false,
        };
        token.movement_left = token.max_movement();
        token
    }

    pub fn nation(&self) -> Nation {
        self.owner.nation
    }

    pub fn is_alive(&self) -> bool {
        self.combat_value > 0
    }

    pub fn is_on_board(&self) -> bool {
        self.position.is_some()
    }

    pub fn uses_fuel(&self) -> bool {
        self.stats.fuel_capacity > 0
    }

    /// Movement points for a full turn in the current mode
    pub fn max_movement(&self) -> f32 {
        self.stats.movement * self.mode.movement_multiplier()
    }

    pub fn sight_range(&self) -> u32 {
        self.stats.sight + self.mode.sight_bonus()
    }

    pub fn attack_power(&self) -> f32 {
        self.stats.attack_value as f32 * self.mode.attack_multiplier()
    }

    /// Defense before terrain
    pub fn base_defense_power(&self) -> f32 {
        self.stats.defense_value as f32 * self.mode.defense_multiplier()
    }

    pub fn missing_cv(&self) -> u32 {
        self.stats.combat_value.saturating_sub(self.combat_value)
    }

    pub fn missing_fuel(&self) -> u32 {
        self.stats.fuel_capacity.saturating_sub(self.fuel)
    }

    pub fn cv_ratio(&self) -> f32 {
        self.combat_value as f32 / self.stats.combat_value.max(1) as f32
    }

    /// 1.0 for units that do not use fuel
    pub fn fuel_ratio(&self) -> f32 {
        if self.uses_fuel() {
            self.fuel as f32 / self.stats.fuel_capacity as f32
        } else {
            1.0
        }
    }

    /// Reset per-turn action state
    pub fn start_turn(&mut self) {
        self.movement_left = self.max_movement();
        self.has_moved = false;
        self.has_attacked = false;
    }

    /// Switch mode; only allowed before moving this turn
    pub fn set_mode(&mut self, mode: MoveMode) -> bool {
        if self.has_moved {
            return false;
        }
        self.mode = mode;
        self.movement_left = self.max_movement();
        true
    }

    /// Apply losses, returning the CV actually removed
    pub fn take_losses(&mut self, losses: u32) -> u32 {
        let applied = losses.min(self.combat_value);
        self.combat_value -= applied;
        applied
    }
}
