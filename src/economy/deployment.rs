//! Purchased tokens waiting for a free spawn point

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::map::Board;
use crate::core::types::{PlayerId, TokenId, Turn};
use crate::tokens::registry::TokenRegistry;

/// A bought token that is in the registry but not yet on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeployment {
    pub token_id: TokenId,
    pub commander: PlayerId,
    pub ordered_turn: Turn,
}

/// Place pending tokens on free spawn points of their nation
///
/// Orders are served first come, first served. An order whose nation has
/// no free spawn point stays in `pending`. Returns the placements made.
pub fn deploy_pending(
    pending: &mut Vec<PendingDeployment>,
    tokens: &mut TokenRegistry,
    board: &Board,
) -> Vec<(TokenId, HexCoord)> {
    let mut placed = Vec::new();
    let mut waiting = Vec::new();

    for order in pending.drain(..) {
        let Ok(token) = tokens.get(&order.token_id) else {
            tracing::warn!("Dropping deployment of unknown token {}", order.token_id);
            continue;
        };
        let nation = token.nation();

        let free = board
            .spawn_points_for(nation)
            .iter()
            .copied()
            .find(|c| !tokens.is_occupied(*c));

        match (free, tokens.get_mut(&order.token_id)) {
            (Some(spawn), Ok(token)) => {
                token.position = Some(spawn);
                token.start_turn();
                placed.push((order.token_id, spawn));
            }
            _ => waiting.push(order),
        }
    }

    *pending = waiting;
    placed
}
