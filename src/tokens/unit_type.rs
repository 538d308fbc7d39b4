//! Unit kinds and sizes
//!
//! Serialized with the short Polish codes used in token files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of military unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Piechota
    #[serde(rename = "P")]
    Infantry,
    /// Kawaleria
    #[serde(rename = "K")]
    Cavalry,
    #[serde(rename = "TL")]
    LightTank,
    #[serde(rename = "TS")]
    MediumTank,
    #[serde(rename = "TC")]
    HeavyTank,
    #[serde(rename = "AL")]
    LightArtillery,
    #[serde(rename = "AC")]
    HeavyArtillery,
    /// Artyleria przeciwlotnicza
    #[serde(rename = "AP")]
    AntiAir,
    /// Zaopatrzenie
    #[serde(rename = "Z")]
    Supply,
    /// Zwiad
    #[serde(rename = "R")]
    Recon,
}

impl UnitKind {
    pub fn code(&self) -> &'static str {
        match self {
            UnitKind::Infantry => "P",
            UnitKind::Cavalry => "K",
            UnitKind::LightTank => "TL",
            UnitKind::MediumTank => "TS",
            UnitKind::HeavyTank => "TC",
            UnitKind::LightArtillery => "AL",
            UnitKind::HeavyArtillery => "AC",
            UnitKind::AntiAir => "AP",
            UnitKind::Supply => "Z",
            UnitKind::Recon => "R",
        }
    }

    /// Motorized units burn fuel when they move
    pub fn is_motorized(&self) -> bool {
        matches!(
            self,
            UnitKind::LightTank
                | UnitKind::MediumTank
                | UnitKind::HeavyTank
                | UnitKind::HeavyArtillery
                | UnitKind::AntiAir
                | UnitKind::Supply
                | UnitKind::Recon
        )
    }

    pub fn is_artillery(&self) -> bool {
        matches!(
            self,
            UnitKind::LightArtillery | UnitKind::HeavyArtillery | UnitKind::AntiAir
        )
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Echelon of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitSize {
    Pluton,
    Kompania,
    Batalion,
}

impl fmt::Display for UnitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSize::Pluton => "Pluton",
            UnitSize::Kompania => "Kompania",
            UnitSize::Batalion => "Batalion",
        };
        f.write_str(name)
    }
}
