//! Turn-stamped game event log

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::types::{Nation, PlayerId, TokenId, Turn};
use crate::engine::victory::Outcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEventKind {
    RoundStarted,
    Income { player: PlayerId, amount: u32 },
    KeyPointIncome { coord: HexCoord, nation: Nation, amount: u32 },
    UpkeepShortfall { commander: PlayerId, shortfall: u32 },
    Allocation { from: PlayerId, to: PlayerId, amount: u32 },
    Purchased { token: TokenId, blueprint: String, commander: PlayerId },
    Deployed { token: TokenId, at: HexCoord },
    Resupplied { token: TokenId, cost: u32 },
    Reinforced { token: TokenId, cv: u32, cost: u32 },
    Moved { token: TokenId, from: HexCoord, to: HexCoord },
    Ambush { token: TokenId, spotted: TokenId },
    Attack { attacker: TokenId, defender: TokenId, attacker_losses: u32, defender_losses: u32 },
    Retreat { token: TokenId, to: HexCoord },
    Eliminated { token: TokenId, nation: Nation },
    GameEnded { outcome: Outcome },
}

/// Single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub turn: Turn,
    pub kind: GameEventKind,
    pub description: String,
}

/// Everything that happened during a game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: GameEventKind, description: String, turn: Turn) {
        self.events.push(GameEvent {
            turn,
            kind,
            description,
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events logged after the first `index` entries
    pub fn since(&self, index: usize) -> &[GameEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    pub fn for_turn(&self, turn: Turn) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |e| e.turn == turn)
    }
}
