//! Core type definitions used throughout the codebase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::GameError;

/// Game turn counter (one full round of all players)
pub type Turn = u32;

/// The two sides of the campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nation {
    Polska,
    Niemcy,
}

impl Nation {
    pub fn opponent(&self) -> Nation {
        match self {
            Nation::Polska => Nation::Niemcy,
            Nation::Niemcy => Nation::Polska,
        }
    }

    pub fn all() -> [Nation; 2] {
        [Nation::Polska, Nation::Niemcy]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Nation::Polska => "Polska",
            Nation::Niemcy => "Niemcy",
        }
    }
}

impl fmt::Display for Nation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Nation {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Polska" => Ok(Nation::Polska),
            "Niemcy" => Ok(Nation::Niemcy),
            other => Err(GameError::Parse(format!("unknown nation '{}'", other))),
        }
    }
}

/// Unique identifier for players (seat number in the turn order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a player does in the chain of command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Runs the national economy and funds commanders
    General,
    /// Commands tokens on the map
    Commander,
}

/// Token owner: the commanding player and their nation
///
/// Legacy token files encode this as `"2 (Polska)"`; `Display` and `FromStr`
/// keep that form readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub commander: PlayerId,
    pub nation: Nation,
}

impl Owner {
    pub fn new(commander: PlayerId, nation: Nation) -> Self {
        Self { commander, nation }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.commander.0, self.nation)
    }
}

impl FromStr for Owner {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::Parse(format!("malformed owner '{}'", s));

        let (id_part, rest) = s.trim().split_once(' ').ok_or_else(bad)?;
        let commander: u8 = id_part.parse().map_err(|_| bad())?;
        let nation = rest
            .trim()
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(bad)?
            .parse()?;

        Ok(Owner::new(PlayerId(commander), nation))
    }
}

/// Token identifier as used in token files and save games
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
