//! Move orders: validation, step-by-step execution and ambush interruption

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use crate::board::hex::HexCoord;
use crate::board::pathfinding::{find_path, path_cost};
use crate::core::error::{GameError, MoveRejection, Result};
use crate::core::types::{Nation, PlayerId, Role, TokenId};
use crate::engine::events::GameEventKind;
use crate::engine::state::GameState;
use crate::tokens::token::{MoveMode, Token};

const EPSILON: f32 = 1e-4;

/// What a completed move did
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub token: TokenId,
    /// Hexes actually walked, start included
    pub path: Vec<HexCoord>,
    pub cost: f32,
    pub fuel_used: u32,
    /// Enemy whose sighting stopped the move
    pub interrupted_by: Option<TokenId>,
}

impl MoveReport {
    pub fn destination(&self) -> Option<HexCoord> {
        self.path.last().copied()
    }
}

/// An enemy the nation knows to be on this hex
pub(crate) fn known_enemy_at(state: &GameState, nation: Nation, coord: HexCoord) -> bool {
    state.tokens.enemy_at(coord, nation).is_some() && state.is_visible_to(nation, coord)
}

fn fuel_needed(path: &[HexCoord], fuel_per_hex: u32) -> u32 {
    path.len().saturating_sub(1) as u32 * fuel_per_hex
}

/// Hexes a token may enter on its remaining fuel, `None` when it needs none
fn step_cap(state: &GameState, token: &Token) -> Option<u32> {
    token
        .uses_fuel()
        .then(|| token.fuel / state.config.movement.fuel_per_hex.max(1))
}

/// Cheapest cost and predecessor per (hex, hexes entered)
type StepLabels = AHashMap<(HexCoord, u32), (f32, Option<(HexCoord, u32)>)>;

/// Dijkstra over (hex, hexes entered) within a movement budget
///
/// With a step cap a short but dear walk keeps its own label, so a hex
/// the cheapest walk reaches too late on fuel can still be expanded.
/// Without a cap every hex has the single step count 0.
fn step_search(
    state: &GameState,
    nation: Nation,
    start: HexCoord,
    budget: f32,
    cap: Option<u32>,
) -> StepLabels {
    let mut labels: StepLabels = AHashMap::new();
    let mut open = BinaryHeap::new();
    labels.insert((start, 0), (0.0, None));
    open.push(Reverse((OrderedFloat(0.0f32), start, 0u32)));

    while let Some(Reverse((OrderedFloat(cost), coord, steps))) = open.pop() {
        if labels.get(&(coord, steps)).map(|&(c, _)| c < cost).unwrap_or(false) {
            continue;
        }
        let next_steps = match cap {
            Some(max) if steps >= max => continue,
            Some(_) => steps + 1,
            None => 0,
        };

        for neighbor in state.board.neighbors(coord) {
            if known_enemy_at(state, nation, neighbor) {
                continue;
            }
            let next = cost + state.board.movement_cost(neighbor);
            if !next.is_finite() || next > budget + EPSILON {
                continue;
            }
            let key = (neighbor, next_steps);
            if labels.get(&key).map(|&(c, _)| next < c).unwrap_or(true) {
                labels.insert(key, (next, Some((coord, steps))));
                open.push(Reverse((OrderedFloat(next), neighbor, next_steps)));
            }
        }
    }
    labels
}

/// Cheapest walk to `dest` that stays within the step cap
fn capped_path(
    state: &GameState,
    nation: Nation,
    start: HexCoord,
    dest: HexCoord,
    budget: f32,
    cap: u32,
) -> Option<Vec<HexCoord>> {
    let labels = step_search(state, nation, start, budget, Some(cap));
    let mut key = labels
        .iter()
        .filter(|((c, _), _)| *c == dest)
        .min_by(|a, b| {
            OrderedFloat(a.1 .0)
                .cmp(&OrderedFloat(b.1 .0))
                .then_with(|| a.0 .1.cmp(&b.0 .1))
        })
        .map(|(k, _)| *k)?;

    let mut path = vec![key.0];
    while let Some(&(_, Some(prev))) = labels.get(&key) {
        path.push(prev.0);
        key = prev;
    }
    path.reverse();
    Some(path)
}

/// Check a move order and return the path it would take
pub fn validate_move(
    state: &GameState,
    player: PlayerId,
    token_id: &TokenId,
    dest: HexCoord,
) -> Result<Vec<HexCoord>> {
    state.require_active(player, Role::Commander)?;
    let token = state.require_owned(player, token_id)?;
    let reject = |reason: MoveRejection| -> Result<Vec<HexCoord>> {
        Err(GameError::IllegalMove {
            token: token_id.clone(),
            reason,
        })
    };

    let Some(start) = token.position else {
        return reject(MoveRejection::NotOnBoard);
    };
    if token.has_moved && token.movement_left <= EPSILON {
        return reject(MoveRejection::AlreadyMoved);
    }

    let board = &state.board;
    if !board.in_bounds(dest) {
        return reject(MoveRejection::OutOfBounds);
    }
    if !board.is_passable(dest) {
        return reject(MoveRejection::Impassable);
    }
    if dest == start {
        return reject(MoveRejection::NoPath);
    }

    let nation = token.nation();
    if known_enemy_at(state, nation, dest) {
        return reject(MoveRejection::EnemyOccupied);
    }
    if state.tokens.friendly_count_at(dest, nation) >= state.config.movement.max_stack {
        return reject(MoveRejection::StackFull);
    }

    let Some(path) = find_path(board, start, dest, &|c| known_enemy_at(state, nation, c)) else {
        return reject(MoveRejection::NoPath);
    };

    if path_cost(board, &path) > token.movement_left + EPSILON {
        return reject(MoveRejection::NotEnoughMovement);
    }
    if let Some(cap) = step_cap(state, token) {
        if path.len().saturating_sub(1) as u32 > cap {
            // the cheapest walk burns too much fuel, a shorter dearer one may not
            return match capped_path(state, nation, start, dest, token.movement_left, cap) {
                Some(shorter) => Ok(shorter),
                None => reject(MoveRejection::NotEnoughFuel),
            };
        }
    }

    Ok(path)
}

/// Validate and carry out a move order
///
/// The token walks its path one hex at a time. It stops early when it
/// bumps into a hidden enemy or spots an enemy it did not know about; an
/// ambushed token loses its remaining movement. If the stop lands on a hex
/// already full of friendly tokens it falls back to the last hex where it
/// may stand.
pub fn resolve_move(
    state: &mut GameState,
    player: PlayerId,
    token_id: &TokenId,
    dest: HexCoord,
) -> Result<MoveReport> {
    let path = validate_move(state, player, token_id, dest)?;

    let token = state.tokens.get(token_id)?;
    let nation = token.nation();
    let sight = token.sight_range();
    let uses_fuel = token.uses_fuel();
    let max_stack = state.config.movement.max_stack;

    let known: BTreeSet<TokenId> = state
        .visible_enemies(nation)
        .iter()
        .map(|t| t.id.clone())
        .collect();
    let mut sight_map = state.visibility.get(&nation).cloned().unwrap_or_default();

    let mut walked = vec![path[0]];
    let mut interrupted_by = None;

    for &step in &path[1..] {
        if let Some(hidden) = state.tokens.enemy_at(step, nation) {
            interrupted_by = Some(hidden.id.clone());
            break;
        }
        walked.push(step);

        sight_map.reveal_from(&state.board, step, sight);
        let spotted = state
            .tokens
            .deployed(nation.opponent())
            .filter(|t| t.position.map(|p| sight_map.is_visible(p)).unwrap_or(false))
            .find(|t| !known.contains(&t.id));
        if let Some(enemy) = spotted {
            interrupted_by = Some(enemy.id.clone());
            break;
        }
    }

    while walked.len() > 1 {
        let last = walked[walked.len() - 1];
        if state.tokens.friendly_count_at(last, nation) < max_stack {
            break;
        }
        walked.pop();
    }

    let cost = path_cost(&state.board, &walked);
    let fuel_used = if uses_fuel {
        fuel_needed(&walked, state.config.movement.fuel_per_hex)
    } else {
        0
    };
    let start = walked[0];
    let end = walked[walked.len() - 1];

    let token = state.tokens.get_mut(token_id)?;
    token.position = Some(end);
    token.movement_left = (token.movement_left - cost).max(0.0);
    token.fuel = token.fuel.saturating_sub(fuel_used);
    token.has_moved = true;
    if interrupted_by.is_some() {
        token.movement_left = 0.0;
    }

    let turn = state.turn();
    if end != start {
        debug!("{} moved {} -> {} (cost {:.1})", token_id, start, end, cost);
        state.events.push(
            GameEventKind::Moved {
                token: token_id.clone(),
                from: start,
                to: end,
            },
            format!("{} moves from {} to {}", token_id, start, end),
            turn,
        );
    }
    if let Some(spotted) = &interrupted_by {
        info!("{} ambushed near {} by {}", token_id, end, spotted);
        state.events.push(
            GameEventKind::Ambush {
                token: token_id.clone(),
                spotted: spotted.clone(),
            },
            format!("{} stops at {}: enemy {} spotted", token_id, end, spotted),
            turn,
        );
    }

    state.refresh_visibility();

    Ok(MoveReport {
        token: token_id.clone(),
        path: walked,
        cost,
        fuel_used,
        interrupted_by,
    })
}

/// Change a token's movement mode; only allowed before it moves
pub fn set_mode(
    state: &mut GameState,
    player: PlayerId,
    token_id: &TokenId,
    mode: MoveMode,
) -> Result<()> {
    state.require_active(player, Role::Commander)?;
    state.require_owned(player, token_id)?;

    let token = state.tokens.get_mut(token_id)?;
    if !token.set_mode(mode) {
        return Err(GameError::IllegalMove {
            token: token_id.clone(),
            reason: MoveRejection::AlreadyMoved,
        });
    }

    state.refresh_visibility();
    Ok(())
}

/// Hexes a token could end a move on this turn, with their cost
///
/// Uses only what the token's nation can see; sorted by coordinate.
pub fn reachable_hexes(state: &GameState, token_id: &TokenId) -> Result<Vec<(HexCoord, f32)>> {
    let token = state.tokens.get(token_id)?;
    let Some(start) = token.position else {
        return Ok(Vec::new());
    };

    let nation = token.nation();
    let labels = step_search(state, nation, start, token.movement_left, step_cap(state, token));

    let mut best: AHashMap<HexCoord, f32> = AHashMap::new();
    for ((coord, _), (cost, _)) in labels {
        let entry = best.entry(coord).or_insert(cost);
        if cost < *entry {
            *entry = cost;
        }
    }

    let max_stack = state.config.movement.max_stack;
    let mut reachable: Vec<(HexCoord, f32)> = best
        .into_iter()
        .filter(|(c, _)| {
            *c != start
                && !known_enemy_at(state, nation, *c)
                && state.tokens.friendly_count_at(*c, nation) < max_stack
        })
        .collect();
    reachable.sort_by_key(|(c, _)| *c);
    Ok(reachable)
}
