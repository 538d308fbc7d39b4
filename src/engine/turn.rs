//! Players and the fixed turn order

use serde::{Deserialize, Serialize};

use crate::core::types::{Nation, PlayerId, Role, Turn};

/// Who makes a player's decisions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    #[default]
    Human,
    Ai { personality: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nation: Nation,
    pub role: Role,
    pub name: String,
    #[serde(default)]
    pub controller: Controller,
}

impl Player {
    pub fn is_ai(&self) -> bool {
        matches!(self.controller, Controller::Ai { .. })
    }

    pub fn is_general(&self) -> bool {
        self.role == Role::General
    }

    pub fn is_commander(&self) -> bool {
        self.role == Role::Commander
    }
}

/// Round counter and position in the player order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnManager {
    /// Current round, starting at 1
    pub turn: Turn,
    /// Index into `order`
    pub current: usize,
    pub order: Vec<PlayerId>,
    pub max_turns: Turn,
}

impl TurnManager {
    pub fn new(order: Vec<PlayerId>, max_turns: Turn) -> Self {
        Self {
            turn: 1,
            current: 0,
            order,
            max_turns,
        }
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.order.get(self.current).copied()
    }

    /// Pass to the next player; returns true when a new round begins
    pub fn advance(&mut self) -> bool {
        if self.order.is_empty() {
            return false;
        }
        self.current += 1;
        if self.current >= self.order.len() {
            self.current = 0;
            self.turn += 1;
            true
        } else {
            false
        }
    }

    /// True once the last scheduled round has been played
    pub fn turns_exhausted(&self) -> bool {
        self.turn > self.max_turns
    }

    /// Jump to a player within the current round
    pub fn set_current(&mut self, player: PlayerId) -> bool {
        match self.order.iter().position(|p| *p == player) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }
}
