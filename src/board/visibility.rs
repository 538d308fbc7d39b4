//! Per-nation visibility (fog of war)
//!
//! Each nation sees what its tokens see. Enemy tokens outside the visible
//! set can be neither targeted nor shown to the player.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::map::Board;

/// Visibility state for one nation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationVisibility {
    /// Currently visible hexes
    pub visible: BTreeSet<HexCoord>,
    /// Hexes seen earlier but not in sight now
    pub remembered: BTreeSet<HexCoord>,
}

impl NationVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute visibility from observers given as (position, sight range)
    pub fn compute(board: &Board, observers: impl IntoIterator<Item = (HexCoord, u32)>) -> Self {
        let mut visibility = Self::new();
        visibility.visible = Self::sight_set(board, observers);
        visibility
    }

    fn sight_set(
        board: &Board,
        observers: impl IntoIterator<Item = (HexCoord, u32)>,
    ) -> BTreeSet<HexCoord> {
        let mut visible = BTreeSet::new();
        for (position, range) in observers {
            visible.extend(board.visible_hexes(position, range));
        }
        visible
    }

    pub fn is_visible(&self, coord: HexCoord) -> bool {
        self.visible.contains(&coord)
    }

    pub fn is_remembered(&self, coord: HexCoord) -> bool {
        self.remembered.contains(&coord)
    }

    /// Replace the visible set, remembering what drops out of sight
    pub fn refresh(&mut self, board: &Board, observers: impl IntoIterator<Item = (HexCoord, u32)>) {
        let new_visible = Self::sight_set(board, observers);
        self.remembered.extend(self.visible.iter().copied());
        self.visible = new_visible;
        for coord in &self.visible {
            self.remembered.remove(coord);
        }
    }

    /// Add sight from a single observer without dropping anything
    pub fn reveal_from(&mut self, board: &Board, position: HexCoord, range: u32) {
        for coord in board.visible_hexes(position, range) {
            self.remembered.remove(&coord);
            self.visible.insert(coord);
        }
    }
}
