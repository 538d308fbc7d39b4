//! Victory conditions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::Nation;
use crate::economy::key_points::controller;
use crate::engine::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryReason {
    /// The loser has no tokens on board and none on order
    Annihilation,
    /// Both sides were wiped out at once
    MutualAnnihilation,
    /// Round limit reached; victory points plus held key points decide
    Points { polska: u32, niemcy: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// None for a draw
    pub winner: Option<Nation>,
    pub reason: VictoryReason,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(nation) => write!(f, "{} wins", nation)?,
            None => write!(f, "Draw")?,
        }
        match self.reason {
            VictoryReason::Annihilation => write!(f, " (enemy annihilated)"),
            VictoryReason::MutualAnnihilation => write!(f, " (both sides annihilated)"),
            VictoryReason::Points { polska, niemcy } => {
                write!(f, " on points: Polska {} vs Niemcy {}", polska, niemcy)
            }
        }
    }
}

/// Final score of a nation: victory points plus value of held key points
pub fn score(state: &GameState, nation: Nation) -> u32 {
    let held: u32 = state
        .board
        .key_points
        .iter()
        .filter(|kp| controller(&state.tokens, kp.coord) == Some(nation))
        .map(|kp| kp.value)
        .sum();
    state.victory_points_of(nation) + held
}

fn has_presence(state: &GameState, nation: Nation) -> bool {
    state.tokens.deployed(nation).next().is_some()
        || state.pending.iter().any(|order| {
            state
                .tokens
                .get(&order.token_id)
                .map(|t| t.nation() == nation)
                .unwrap_or(false)
        })
}

/// Decide whether the game is over
pub fn check_victory(state: &GameState) -> Option<Outcome> {
    let polska_alive = has_presence(state, Nation::Polska);
    let niemcy_alive = has_presence(state, Nation::Niemcy);

    match (polska_alive, niemcy_alive) {
        (false, false) => {
            return Some(Outcome {
                winner: None,
                reason: VictoryReason::MutualAnnihilation,
            })
        }
        (true, false) => {
            return Some(Outcome {
                winner: Some(Nation::Polska),
                reason: VictoryReason::Annihilation,
            })
        }
        (false, true) => {
            return Some(Outcome {
                winner: Some(Nation::Niemcy),
                reason: VictoryReason::Annihilation,
            })
        }
        (true, true) => {}
    }

    if !state.turns.turns_exhausted() {
        return None;
    }

    let polska = score(state, Nation::Polska);
    let niemcy = score(state, Nation::Niemcy);
    let winner = match polska.cmp(&niemcy) {
        std::cmp::Ordering::Greater => Some(Nation::Polska),
        std::cmp::Ordering::Less => Some(Nation::Niemcy),
        std::cmp::Ordering::Equal => None,
    };

    Some(Outcome {
        winner,
        reason: VictoryReason::Points { polska, niemcy },
    })
}
