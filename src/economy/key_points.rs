//! Key point income and depletion

use crate::board::hex::HexCoord;
use crate::board::map::Board;
use crate::core::types::Nation;
use crate::tokens::registry::TokenRegistry;

/// PE paid out by one key point this round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPointIncome {
    pub coord: HexCoord,
    pub nation: Nation,
    pub amount: u32,
}

/// Pay out every occupied key point and deplete it by the same amount
///
/// Exhausted key points are removed from the board.
pub fn collect_key_point_income(
    board: &mut Board,
    tokens: &TokenRegistry,
    rate: f32,
) -> Vec<KeyPointIncome> {
    let mut income = Vec::new();

    for kp in board.key_points.iter_mut() {
        let Some(holder) = tokens.at(kp.coord).next() else {
            continue;
        };

        let amount = ((kp.value as f32 * rate).ceil() as u32).min(kp.value);
        if amount == 0 {
            continue;
        }

        kp.value -= amount;
        income.push(KeyPointIncome {
            coord: kp.coord,
            nation: holder.nation(),
            amount,
        });
    }

    board.key_points.retain(|kp| kp.value > 0);
    income
}

/// Nation currently holding a key point, if any
pub fn controller(tokens: &TokenRegistry, coord: HexCoord) -> Option<Nation> {
    tokens.at(coord).next().map(|t| t.nation())
}
