//! Game configuration with documented constants
//!
//! All tunable numbers live here, grouped by the system that reads them.
//! Values load from `data/game_config.toml`; every section falls back to
//! its defaults when missing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// Economic rules (PE income and spending)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// PE every General receives at the start of each round
    pub base_income: u32,

    /// Fraction of a key point's remaining value paid out per round
    ///
    /// The payout is also subtracted from the key point, so a point
    /// worth 100 yields 10, then 9, then 9, ... until it is exhausted.
    pub kp_income_rate: f32,

    /// PE cost of one point of fuel when resupplying
    pub resupply_cost_per_fuel: f32,

    /// PE cost of one restored point of combat value
    pub reinforce_cost_per_cv: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_income: 40,
            kp_income_rate: 0.1,
            resupply_cost_per_fuel: 0.5,
            reinforce_cost_per_cv: 2,
        }
    }
}

/// Combat resolution constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Lower bound of the random roll applied to each side
    pub roll_min: f32,
    /// Upper bound of the random roll applied to each side
    pub roll_max: f32,

    /// Attack/defense ratio is clamped into [ratio_floor, ratio_cap]
    /// before scaling losses, so a lucky matchup never wipes a unit in
    /// one blow and a hopeless one still scratches.
    pub ratio_floor: f32,
    pub ratio_cap: f32,

    /// Defender losses per point of effective attack
    pub loss_scale: f32,

    /// Attacker losses per point of counterattack
    pub counter_scale: f32,

    /// Fraction of remaining CV lost when a beaten defender has nowhere to retreat
    pub blocked_retreat_penalty: f32,

    /// Minimum defense power, keeps the ratio finite
    pub min_defense_power: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            roll_min: 0.8,
            roll_max: 1.2,
            ratio_floor: 0.25,
            ratio_cap: 2.0,
            loss_scale: 0.5,
            counter_scale: 0.5,
            blocked_retreat_penalty: 0.25,
            min_defense_power: 0.1,
        }
    }
}

/// Movement rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Maximum friendly tokens that may end a move on one hex
    pub max_stack: usize,

    /// Fuel spent per hex entered by motorized tokens
    pub fuel_per_hex: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_stack: 1,
            fuel_per_hex: 1,
        }
    }
}

/// Session-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rounds played before victory points decide the game
    pub max_turns: u32,

    /// Seed for combat rolls
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: 20,
            seed: 1939,
        }
    }
}

/// AI bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Write every AI decision to a CSV file
    pub log_decisions: bool,

    /// Directory for decision logs
    pub log_dir: PathBuf,

    /// Directory holding personality TOML files
    pub personality_dir: PathBuf,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            log_decisions: false,
            log_dir: PathBuf::from("logs/ai"),
            personality_dir: PathBuf::from("data/ai_personalities"),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub economy: EconomyConfig,
    pub combat: CombatConfig,
    pub movement: MovementConfig,
    pub game: SessionConfig,
    pub ai: AiConfig,
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: GameConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!("Config {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let c = &self.combat;
        if c.roll_min <= 0.0 || c.roll_min > c.roll_max {
            return Err(GameError::Config(format!(
                "combat roll range [{}, {}] is invalid",
                c.roll_min, c.roll_max
            )));
        }

        if c.ratio_floor <= 0.0 || c.ratio_floor > c.ratio_cap {
            return Err(GameError::Config(format!(
                "ratio clamp [{}, {}] is invalid",
                c.ratio_floor, c.ratio_cap
            )));
        }

        if c.loss_scale <= 0.0 || c.counter_scale < 0.0 {
            return Err(GameError::Config("loss scales must be positive".into()));
        }

        if !(0.0..=1.0).contains(&c.blocked_retreat_penalty) {
            return Err(GameError::Config(
                "blocked_retreat_penalty must be within [0, 1]".into(),
            ));
        }

        if c.min_defense_power <= 0.0 {
            return Err(GameError::Config("min_defense_power must be positive".into()));
        }

        let e = &self.economy;
        if !(0.0..=1.0).contains(&e.kp_income_rate) || e.kp_income_rate == 0.0 {
            return Err(GameError::Config(format!(
                "kp_income_rate ({}) must be within (0, 1]",
                e.kp_income_rate
            )));
        }

        if e.resupply_cost_per_fuel < 0.0 {
            return Err(GameError::Config("resupply_cost_per_fuel must not be negative".into()));
        }

        if self.movement.max_stack == 0 {
            return Err(GameError::Config("max_stack must be at least 1".into()));
        }

        if self.game.max_turns == 0 {
            return Err(GameError::Config("max_turns must be at least 1".into()));
        }

        Ok(())
    }
}
