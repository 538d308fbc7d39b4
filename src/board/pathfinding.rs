//! A* pathfinding over the campaign board
//!
//! Respects terrain costs; callers supply extra blocked hexes
//! (enemy-occupied ones, typically).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::board::hex::HexCoord;
use crate::board::map::Board;

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    coord: HexCoord,
    f_cost: f32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; coordinate order keeps ties deterministic
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest path from `start` to `goal` (both inclusive)
///
/// Returns None if no path exists. `blocked` marks hexes that may not be
/// entered; the start hex is never checked.
pub fn find_path(
    board: &Board,
    start: HexCoord,
    goal: HexCoord,
    blocked: &dyn Fn(HexCoord) -> bool,
) -> Option<Vec<HexCoord>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !board.is_passable(goal) || blocked(goal) {
        return None;
    }

    // Cheapest terrain keeps the heuristic admissible
    let min_step = crate::board::terrain::Terrain::Road.movement_cost();

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, f32> = AHashMap::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        coord: start,
        f_cost: start.distance(&goal) as f32 * min_step,
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, current.coord));
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&f32::INFINITY);

        for neighbor in board.neighbors(current.coord) {
            if blocked(neighbor) {
                continue;
            }

            let move_cost = board.movement_cost(neighbor);
            if move_cost.is_infinite() {
                continue;
            }

            let tentative_g = current_g + move_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);

                open_set.push(PathNode {
                    coord: neighbor,
                    f_cost: tentative_g + neighbor.distance(&goal) as f32 * min_step,
                });
            }
        }
    }

    None
}

fn reconstruct_path(
    came_from: &AHashMap<HexCoord, HexCoord>,
    mut current: HexCoord,
) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Movement points needed to walk a path (the start hex is free)
pub fn path_cost(board: &Board, path: &[HexCoord]) -> f32 {
    path.iter().skip(1).map(|coord| board.movement_cost(*coord)).sum()
}
