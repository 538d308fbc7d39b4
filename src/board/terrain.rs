//! Campaign terrain types and their effects

use serde::{Deserialize, Serialize};

/// Terrain of a map hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Plain,
    Road,
    Forest,
    Hills,
    Swamp,
    River,
    City,
    Fortification,
    Impassable,
}

impl Terrain {
    /// Movement points needed to enter the hex
    pub fn movement_cost(&self) -> f32 {
        match self {
            Terrain::Plain => 1.0,
            Terrain::Road => 0.5,
            Terrain::Forest => 2.0,
            Terrain::Hills => 2.0,
            Terrain::Swamp => 3.0,
            Terrain::River => 3.0,
            Terrain::City => 1.0,
            Terrain::Fortification => 1.5,
            Terrain::Impassable => f32::INFINITY,
        }
    }

    /// Multiplier applied to a defender's defense value
    pub fn defense_modifier(&self) -> f32 {
        match self {
            Terrain::Plain => 1.0,
            Terrain::Road => 1.0,
            Terrain::Forest => 1.25,
            Terrain::Hills => 1.5,
            Terrain::Swamp => 0.8,
            Terrain::River => 1.1,
            Terrain::City => 1.5,
            Terrain::Fortification => 2.0,
            Terrain::Impassable => 1.0,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.movement_cost().is_finite()
    }

    /// Does this terrain block line of sight through it?
    pub fn blocks_los(&self) -> bool {
        matches!(self, Terrain::Forest | Terrain::City | Terrain::Hills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_cheaper_than_plain() {
        assert!(Terrain::Road.movement_cost() < Terrain::Plain.movement_cost());
    }

    #[test]
    fn test_impassable() {
        assert!(!Terrain::Impassable.is_passable());
        assert!(Terrain::Swamp.is_passable());
    }

    #[test]
    fn test_fortification_best_defense() {
        let best = [
            Terrain::Plain,
            Terrain::Forest,
            Terrain::Hills,
            Terrain::City,
            Terrain::Swamp,
        ]
        .iter()
        .map(|t| t.defense_modifier())
        .fold(0.0_f32, f32::max);
        assert!(Terrain::Fortification.defense_modifier() > best);
    }

    #[test]
    fn test_swamp_hurts_defender() {
        assert!(Terrain::Swamp.defense_modifier() < 1.0);
    }

    #[test]
    fn test_forest_blocks_los() {
        assert!(Terrain::Forest.blocks_los());
        assert!(!Terrain::Plain.blocks_los());
    }

    #[test]
    fn test_serde_names() {
        let t: Terrain = serde_json::from_str("\"fortification\"").unwrap();
        assert_eq!(t, Terrain::Fortification);
    }
}
