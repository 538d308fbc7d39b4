//! AI personality configuration loaded from TOML
//!
//! A personality carries one weight table for the General (budget split)
//! and one for the Commanders (orders queue and tactics).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// Weights the General uses to split its budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralWeights {
    /// Fraction of the budget kept back each round
    pub reserve_ratio: f32,
    /// Guaranteed fraction of the distributable budget per commander
    pub min_share: f32,
    /// Need per missing point of combat value
    pub w_cv: f32,
    /// Need per missing point of fuel
    pub w_fuel: f32,
    /// Need per token below `target_force`
    pub w_force: f32,
    /// Need per visible enemy near the commander's tokens
    pub w_front: f32,
    /// Tokens (on board plus on order) a commander should field
    pub target_force: u32,
}

impl Default for GeneralWeights {
    fn default() -> Self {
        Self {
            reserve_ratio: 0.1,
            min_share: 0.15,
            w_cv: 1.0,
            w_fuel: 0.5,
            w_force: 5.0,
            w_front: 3.0,
            target_force: 6,
        }
    }
}

/// Weights a Commander uses for spending and fighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderWeights {
    // Envelope split of the commander's PE
    pub repair_share: f32,
    pub resupply_share: f32,
    pub purchase_share: f32,

    /// Reinforce tokens below this CV ratio
    pub repair_threshold: f32,
    /// Resupply motorized tokens below this fuel ratio
    pub fuel_threshold: f32,
    /// Tokens (on board plus on order) to keep in the field
    pub target_force: u32,

    /// Expected attack/defense ratio needed before attacking
    pub min_attack_ratio: f32,
    /// Withdraw tokens below this CV ratio when enemies are close
    pub retreat_cv_ratio: f32,
    /// Use march mode when no enemy is visible within this many hexes
    pub march_safe_distance: u32,
}

impl Default for CommanderWeights {
    fn default() -> Self {
        Self {
            repair_share: 0.3,
            resupply_share: 0.2,
            purchase_share: 0.5,
            repair_threshold: 0.7,
            fuel_threshold: 0.5,
            target_force: 6,
            min_attack_ratio: 1.0,
            retreat_cv_ratio: 0.3,
            march_safe_distance: 6,
        }
    }
}

/// Complete AI personality configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiPersonality {
    /// Name of this personality (set from filename)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub general: GeneralWeights,
    #[serde(default)]
    pub commander: CommanderWeights,
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            general: GeneralWeights::default(),
            commander: CommanderWeights::default(),
        }
    }
}

impl AiPersonality {
    pub fn validate(&self) -> Result<()> {
        let g = &self.general;
        let c = &self.commander;
        let fraction = |v: f32| (0.0..=1.0).contains(&v);

        if !fraction(g.reserve_ratio) || !fraction(g.min_share) {
            return Err(GameError::Config(format!(
                "personality {}: reserve_ratio and min_share must lie in [0, 1]",
                self.name
            )));
        }
        if [g.w_cv, g.w_fuel, g.w_force, g.w_front].iter().any(|w| *w < 0.0) {
            return Err(GameError::Config(format!(
                "personality {}: general weights must not be negative",
                self.name
            )));
        }

        let shares = [c.repair_share, c.resupply_share, c.purchase_share];
        if shares.iter().any(|s| *s < 0.0) || shares.iter().sum::<f32>() > 1.0 + 1e-4 {
            return Err(GameError::Config(format!(
                "personality {}: envelope shares must be non-negative and sum to at most 1",
                self.name
            )));
        }
        if c.min_attack_ratio <= 0.0 {
            return Err(GameError::Config(format!(
                "personality {}: min_attack_ratio must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

/// Load personality from `data/ai_personalities/{name}.toml`
pub fn load_personality(name: &str) -> Result<AiPersonality> {
    load_personality_from(Path::new("data/ai_personalities"), name)
}

/// Load personality `{name}.toml` from a directory
pub fn load_personality_from(dir: &Path, name: &str) -> Result<AiPersonality> {
    let path = personality_path(dir, name);
    let contents = fs::read_to_string(&path)?;

    let mut personality: AiPersonality = toml::from_str(&contents)?;
    personality.name = name.to_string();
    personality.validate()?;
    Ok(personality)
}

fn personality_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.toml", name))
}
