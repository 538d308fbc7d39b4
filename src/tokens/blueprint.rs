//! Token blueprints: the purchasable unit templates of each nation
//!
//! Blueprints load from `data/tokens/blueprints.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::core::types::Nation;
use crate::tokens::unit_type::{UnitKind, UnitSize};

/// Base statistics of a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    /// Movement points per turn in combat mode
    pub movement: f32,
    pub attack_range: u32,
    pub attack_value: u32,
    /// Maximum CV (hit points)
    pub combat_value: u32,
    pub defense_value: u32,
    pub sight: u32,
    /// 0 for units that do not burn fuel
    #[serde(default)]
    pub fuel_capacity: u32,
    /// PE paid by the commander each round
    pub upkeep: u32,
    pub price: u32,
}

/// Purchasable unit template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub key: String,
    pub nation: Nation,
    pub kind: UnitKind,
    pub size: UnitSize,
    pub label: String,
    pub stats: TokenStats,
}

impl Blueprint {
    /// Combat punch per PE, used by the AI to pick purchases
    pub fn value_per_price(&self) -> f32 {
        (self.stats.combat_value + self.stats.attack_value) as f32 / self.stats.price.max(1) as f32
    }

    fn validate(&self) -> Result<()> {
        let s = &self.stats;
        let fail = |what: &str| -> Result<()> {
            Err(GameError::Scenario(format!("blueprint {}: {}", self.key, what)))
        };

        if s.price == 0 {
            return fail("price must be positive");
        }
        if s.combat_value == 0 {
            return fail("combat_value must be positive");
        }
        if s.sight == 0 {
            return fail("sight must be positive");
        }
        if s.movement < 0.0 || !s.movement.is_finite() {
            return fail("movement must be a finite, non-negative number");
        }
        if s.attack_range == 0 {
            return fail("attack_range must be at least 1");
        }
        if self.kind.is_motorized() && s.fuel_capacity == 0 {
            return fail("motorized units need fuel capacity");
        }
        Ok(())
    }
}

/// All known blueprints keyed by blueprint key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlueprintCatalog {
    blueprints: BTreeMap<String, Blueprint>,
}

impl BlueprintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a JSON list of blueprints
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let list: Vec<Blueprint> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for blueprint in list {
            catalog.insert(blueprint)?;
        }
        Ok(catalog)
    }

    /// Add a blueprint, rejecting invalid stats and duplicate keys
    pub fn insert(&mut self, blueprint: Blueprint) -> Result<()> {
        blueprint.validate()?;
        if self.blueprints.contains_key(&blueprint.key) {
            return Err(GameError::Scenario(format!(
                "duplicate blueprint key {}",
                blueprint.key
            )));
        }
        self.blueprints.insert(blueprint.key.clone(), blueprint);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&Blueprint> {
        self.blueprints
            .get(key)
            .ok_or_else(|| GameError::BlueprintNotFound(key.to_string()))
    }

    pub fn for_nation(&self, nation: Nation) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values().filter(move |b| b.nation == nation)
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn infantry(nation: Nation) -> Blueprint {
        Blueprint {
            key: format!("{}_P_Kompania", nation),
            nation,
            kind: UnitKind::Infantry,
            size: UnitSize::Kompania,
            label: "Kompania piechoty".into(),
            stats: TokenStats {
                movement: 3.0,
                attack_range: 1,
                attack_value: 6,
                combat_value: 10,
                defense_value: 6,
                sight: 2,
                fuel_capacity: 0,
                upkeep: 2,
                price: 20,
            },
        }
    }

    pub fn tank(nation: Nation) -> Blueprint {
        Blueprint {
            key: format!("{}_TS_Pluton", nation),
            nation,
            kind: UnitKind::MediumTank,
            size: UnitSize::Pluton,
            label: "Pluton czołgów średnich".into(),
            stats: TokenStats {
                movement: 5.0,
                attack_range: 1,
                attack_value: 10,
                combat_value: 8,
                defense_value: 7,
                sight: 2,
                fuel_capacity: 10,
                upkeep: 3,
                price: 35,
            },
        }
    }

    pub fn artillery(nation: Nation) -> Blueprint {
        Blueprint {
            key: format!("{}_AL_Pluton", nation),
            nation,
            kind: UnitKind::LightArtillery,
            size: UnitSize::Pluton,
            label: "Pluton artylerii lekkiej".into(),
            stats: TokenStats {
                movement: 2.0,
                attack_range: 3,
                attack_value: 8,
                combat_value: 5,
                defense_value: 3,
                sight: 2,
                fuel_capacity: 0,
                upkeep: 2,
                price: 25,
            },
        }
    }

    pub fn catalog() -> BlueprintCatalog {
        let mut catalog = BlueprintCatalog::new();
        for nation in Nation::all() {
            catalog.insert(infantry(nation)).unwrap();
            catalog.insert(tank(nation)).unwrap();
            catalog.insert(artillery(nation)).unwrap();
        }
        catalog
    }
}
