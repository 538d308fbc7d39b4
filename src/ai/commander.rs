//! Commander AI: economy pipeline and tactical activation
//!
//! Economy: the commander's PE is split into repair, resupply and purchase
//! envelopes. Candidate orders are ranked by priority and paid greedily
//! from their own envelope; whatever is left in all envelopes is then
//! pooled for the orders that did not fit.
//!
//! Tactics: tokens act strongest first. Each one attacks if the odds are
//! good enough, withdraws if it is worn down and under threat, and
//! otherwise advances on its objective before trying to attack again.

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::ai::personality::{AiPersonality, CommanderWeights};
use crate::ai::{AiDecision, PlayerAi};
use crate::board::hex::HexCoord;
use crate::board::pathfinding::find_path;
use crate::core::error::{GameError, Result};
use crate::core::types::{Nation, PlayerId, Role, TokenId};
use crate::economy::key_points::controller;
use crate::economy::upkeep::resupply_cost;
use crate::engine::combat::{expected_ratio, resolve_attack};
use crate::engine::logistics::{purchase, reinforce, resupply};
use crate::engine::movement::{known_enemy_at, reachable_hexes, resolve_move, set_mode};
use crate::engine::state::GameState;
use crate::tokens::token::MoveMode;

/// Enemies this close count as an immediate threat
const THREAT_RADIUS: u32 = 3;

/// Which envelope pays for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Repair,
    Resupply,
    Purchase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKind {
    Reinforce { token: TokenId, cv: u32 },
    Resupply { token: TokenId },
    Purchase { blueprint: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedOrder {
    pub kind: OrderKind,
    pub priority: f32,
}

impl QueuedOrder {
    pub fn envelope(&self) -> Envelope {
        match self.kind {
            OrderKind::Reinforce { .. } => Envelope::Repair,
            OrderKind::Resupply { .. } => Envelope::Resupply,
            OrderKind::Purchase { .. } => Envelope::Purchase,
        }
    }

    fn tie_key(&self) -> &str {
        match &self.kind {
            OrderKind::Reinforce { token, .. } | OrderKind::Resupply { token } => token.as_str(),
            OrderKind::Purchase { blueprint } => blueprint,
        }
    }
}

/// PE set aside per kind of spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Envelopes {
    pub repair: u32,
    pub resupply: u32,
    pub purchase: u32,
}

impl Envelopes {
    fn get_mut(&mut self, envelope: Envelope) -> &mut u32 {
        match envelope {
            Envelope::Repair => &mut self.repair,
            Envelope::Resupply => &mut self.resupply,
            Envelope::Purchase => &mut self.purchase,
        }
    }

    pub fn total(&self) -> u32 {
        self.repair + self.resupply + self.purchase
    }
}

/// Repair and resupply get their floored shares; purchase takes the rest
pub fn split_envelopes(budget: u32, weights: &CommanderWeights) -> Envelopes {
    let repair = ((budget as f32 * weights.repair_share).floor() as u32).min(budget);
    let resupply = ((budget as f32 * weights.resupply_share).floor() as u32).min(budget - repair);
    Envelopes {
        repair,
        resupply,
        purchase: budget - repair - resupply,
    }
}

/// Rank every reinforcement, resupply and purchase the commander wants
pub fn build_order_queue(
    state: &GameState,
    commander: PlayerId,
    weights: &CommanderWeights,
) -> Result<Vec<QueuedOrder>> {
    let nation = state.player(commander)?.nation;
    let budget = state.treasury.balance(commander);
    let enemies = enemy_positions(state, nation);
    let mut queue = Vec::new();

    for token in state.tokens.of_commander(commander) {
        let Some(pos) = token.position else {
            continue;
        };

        let cv_ratio = token.cv_ratio();
        if cv_ratio < weights.repair_threshold && token.missing_cv() > 0 {
            let threatened = enemies.iter().any(|e| pos.distance(e) <= THREAT_RADIUS);
            queue.push(QueuedOrder {
                kind: OrderKind::Reinforce {
                    token: token.id.clone(),
                    cv: token.missing_cv(),
                },
                priority: 100.0 * (1.0 - cv_ratio) + if threatened { 20.0 } else { 0.0 },
            });
        }

        let fuel_ratio = token.fuel_ratio();
        if token.uses_fuel() && fuel_ratio < weights.fuel_threshold {
            queue.push(QueuedOrder {
                kind: OrderKind::Resupply {
                    token: token.id.clone(),
                },
                priority: 80.0 * (1.0 - fuel_ratio),
            });
        }
    }

    let force = state.tokens.of_commander(commander).count() as u32;
    let shortfall = weights.target_force.saturating_sub(force);
    let best = state
        .catalog
        .for_nation(nation)
        .filter(|b| b.stats.price <= budget)
        .max_by(|a, b| {
            OrderedFloat(a.value_per_price())
                .cmp(&OrderedFloat(b.value_per_price()))
                .then_with(|| b.key.cmp(&a.key))
        });
    if let Some(blueprint) = best {
        for k in 0..shortfall {
            queue.push(QueuedOrder {
                kind: OrderKind::Purchase {
                    blueprint: blueprint.key.clone(),
                },
                priority: 30.0 * (shortfall - k) as f32,
            });
        }
    }

    queue.sort_by(|a, b| {
        OrderedFloat(b.priority)
            .cmp(&OrderedFloat(a.priority))
            .then_with(|| a.tie_key().cmp(b.tie_key()))
    });
    Ok(queue)
}

fn enemy_positions(state: &GameState, nation: Nation) -> Vec<HexCoord> {
    state
        .visible_enemies(nation)
        .iter()
        .filter_map(|t| t.position)
        .collect()
}

fn nearest_distance(from: HexCoord, others: &[HexCoord]) -> Option<u32> {
    others.iter().map(|o| from.distance(o)).min()
}

/// Engine rejections end the AI's attempt; anything else is a real error
fn rejected<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GameError::IllegalMove { token, reason }) => {
            debug!("AI move for {} rejected: {:?}", token, reason);
            Ok(None)
        }
        Err(GameError::IllegalAttack { token, reason }) => {
            debug!("AI attack by {} rejected: {:?}", token, reason);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub struct CommanderAi {
    player: PlayerId,
    personality: AiPersonality,
}

impl CommanderAi {
    pub fn new(player: PlayerId, personality: AiPersonality) -> Self {
        Self {
            player,
            personality,
        }
    }

    fn weights(&self) -> &CommanderWeights {
        &self.personality.commander
    }

    fn decision(
        &self,
        state: &GameState,
        nation: Nation,
        action: &str,
        detail: String,
        points_before: u32,
    ) -> AiDecision {
        AiDecision {
            turn: state.turn(),
            player: self.player.0,
            nation,
            role: Role::Commander,
            action: action.to_string(),
            detail,
            points_before,
            points_after: state.treasury.balance(self.player),
        }
    }

    // ===== Economy =====

    /// Spend PE through the envelope pipeline
    pub fn run_economy(&self, state: &mut GameState) -> Result<Vec<AiDecision>> {
        let budget = state.treasury.balance(self.player);
        let mut envelopes = split_envelopes(budget, self.weights());
        let queue = build_order_queue(state, self.player, self.weights())?;
        debug!(
            "Commander {} budget {} PE, envelopes {:?}, {} orders queued",
            self.player,
            budget,
            envelopes,
            queue.len()
        );

        let mut decisions = Vec::new();
        let mut unfilled = Vec::new();

        for order in queue {
            let cap = envelopes.get_mut(order.envelope());
            match self.execute_order(state, &order, *cap)? {
                Some((spent, decision, remainder)) => {
                    *cap -= spent;
                    decisions.push(decision);
                    unfilled.extend(remainder);
                }
                None => unfilled.push(order),
            }
        }

        let mut pool = envelopes.total();
        for order in unfilled {
            if let Some((spent, decision, _)) = self.execute_order(state, &order, pool)? {
                pool -= spent;
                decisions.push(decision);
            }
        }

        Ok(decisions)
    }

    /// Carry out an order spending at most `cap`
    ///
    /// Returns the PE spent, the decision record and, for a partial
    /// reinforcement, the part still wanted. None if nothing was affordable.
    fn execute_order(
        &self,
        state: &mut GameState,
        order: &QueuedOrder,
        cap: u32,
    ) -> Result<Option<(u32, AiDecision, Option<QueuedOrder>)>> {
        let nation = state.player(self.player)?.nation;
        let before = state.treasury.balance(self.player);

        match &order.kind {
            OrderKind::Reinforce { token, cv } => {
                if !state.tokens.contains(token) {
                    return Ok(None);
                }
                let per_cv = state.config.economy.reinforce_cost_per_cv;
                let affordable = if per_cv == 0 { *cv } else { (*cv).min(cap / per_cv) };
                if affordable == 0 {
                    return Ok(None);
                }
                let spent = reinforce(state, self.player, token, affordable)?;
                let remainder = (affordable < *cv).then(|| QueuedOrder {
                    kind: OrderKind::Reinforce {
                        token: token.clone(),
                        cv: cv - affordable,
                    },
                    priority: order.priority,
                });
                let decision = self.decision(
                    state,
                    nation,
                    "reinforce",
                    format!("{} +{} CV", token, affordable),
                    before,
                );
                Ok(Some((spent, decision, remainder)))
            }
            OrderKind::Resupply { token } => {
                let Ok(t) = state.tokens.get(token) else {
                    return Ok(None);
                };
                let cost = resupply_cost(t, &state.config.economy);
                if cost > cap {
                    return Ok(None);
                }
                let spent = resupply(state, self.player, token)?;
                let decision =
                    self.decision(state, nation, "resupply", format!("{} refuelled", token), before);
                Ok(Some((spent, decision, None)))
            }
            OrderKind::Purchase { blueprint } => {
                let price = state.catalog.get(blueprint)?.stats.price;
                if price > cap {
                    return Ok(None);
                }
                let id = purchase(state, self.player, blueprint)?;
                let decision =
                    self.decision(state, nation, "purchase", format!("{} as {}", blueprint, id), before);
                Ok(Some((price, decision, None)))
            }
        }
    }

    // ===== Tactics =====

    /// Activate every on-board token once
    pub fn run_tactics(&self, state: &mut GameState) -> Result<Vec<AiDecision>> {
        let nation = state.player(self.player)?.nation;
        let mut order: Vec<(u32, TokenId)> = state
            .tokens
            .of_commander(self.player)
            .filter(|t| t.is_on_board())
            .map(|t| (t.combat_value, t.id.clone()))
            .collect();
        order.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let mut decisions = Vec::new();
        for (_, id) in order {
            if state.is_over() {
                break;
            }
            if !state.tokens.contains(&id) {
                continue;
            }
            self.activate(state, nation, &id, &mut decisions)?;
        }
        Ok(decisions)
    }

    fn activate(
        &self,
        state: &mut GameState,
        nation: Nation,
        id: &TokenId,
        decisions: &mut Vec<AiDecision>,
    ) -> Result<()> {
        if let Some(decision) = self.try_attack(state, nation, id)? {
            decisions.push(decision);
            return Ok(());
        }

        let token = state.tokens.get(id)?;
        let Some(pos) = token.position else {
            return Ok(());
        };
        let enemies = enemy_positions(state, nation);
        let nearest = nearest_distance(pos, &enemies);

        let threatened = nearest.map(|d| d <= THREAT_RADIUS).unwrap_or(false);
        if token.cv_ratio() < self.weights().retreat_cv_ratio && threatened {
            if let Some(decision) = self.withdraw(state, nation, id, &enemies)? {
                decisions.push(decision);
            }
            return Ok(());
        }

        let Some(objective) = self.pick_objective(state, nation, pos) else {
            return Ok(());
        };

        let safe = nearest
            .map(|d| d > self.weights().march_safe_distance)
            .unwrap_or(true);
        let mode = if safe { MoveMode::March } else { MoveMode::Combat };
        let token = state.tokens.get(id)?;
        if token.mode != mode && !token.has_moved {
            rejected(set_mode(state, self.player, id, mode))?;
        }

        if let Some(decision) = self.advance(state, nation, id, objective)? {
            decisions.push(decision);
        }
        if let Some(decision) = self.try_attack(state, nation, id)? {
            decisions.push(decision);
        }
        Ok(())
    }

    /// Attack the best target in range if the odds are good enough
    fn try_attack(&self, state: &mut GameState, nation: Nation, id: &TokenId) -> Result<Option<AiDecision>> {
        let Ok(token) = state.tokens.get(id) else {
            return Ok(None);
        };
        let Some(pos) = token.position else {
            return Ok(None);
        };
        if token.has_attacked || token.stats.attack_value == 0 {
            return Ok(None);
        }
        let range = token.stats.attack_range;

        let mut best: Option<(f32, u32, TokenId)> = None;
        for enemy in state.visible_enemies(nation) {
            let Some(target) = enemy.position else {
                continue;
            };
            if pos.distance(&target) > range {
                continue;
            }
            let ratio = expected_ratio(state, id, &enemy.id)?;
            let better = match &best {
                None => true,
                Some((r, cv, eid)) => OrderedFloat(ratio)
                    .cmp(&OrderedFloat(*r))
                    .then_with(|| cv.cmp(&enemy.combat_value))
                    .then_with(|| eid.cmp(&enemy.id))
                    .is_gt(),
            };
            if better {
                best = Some((ratio, enemy.combat_value, enemy.id.clone()));
            }
        }

        let Some((ratio, _, target)) = best else {
            return Ok(None);
        };
        if ratio < self.weights().min_attack_ratio {
            return Ok(None);
        }

        let before = state.treasury.balance(self.player);
        let Some(report) = rejected(resolve_attack(state, self.player, id, &target))? else {
            return Ok(None);
        };
        Ok(Some(self.decision(
            state,
            nation,
            "attack",
            format!(
                "{} -> {} (ratio {:.2}, losses {}/{})",
                id, target, report.ratio, report.attacker_losses, report.defender_losses
            ),
            before,
        )))
    }

    /// Move to the reachable hex farthest from the nearest enemy
    fn withdraw(
        &self,
        state: &mut GameState,
        nation: Nation,
        id: &TokenId,
        enemies: &[HexCoord],
    ) -> Result<Option<AiDecision>> {
        let Some(pos) = state.tokens.get(id)?.position else {
            return Ok(None);
        };
        let current = nearest_distance(pos, enemies).unwrap_or(u32::MAX);

        let best = reachable_hexes(state, id)?
            .into_iter()
            .map(|(hex, cost)| (nearest_distance(hex, enemies).unwrap_or(u32::MAX), cost, hex))
            .filter(|(dist, _, _)| *dist > current)
            .min_by(|a, b| {
                b.0.cmp(&a.0)
                    .then_with(|| OrderedFloat(a.1).cmp(&OrderedFloat(b.1)))
                    .then_with(|| a.2.cmp(&b.2))
            });
        let Some((_, _, dest)) = best else {
            return Ok(None);
        };

        let before = state.treasury.balance(self.player);
        let Some(report) = rejected(resolve_move(state, self.player, id, dest))? else {
            return Ok(None);
        };
        let to = report.destination().unwrap_or(pos);
        Ok(Some(self.decision(
            state,
            nation,
            "withdraw",
            format!("{} {} -> {}", id, pos, to),
            before,
        )))
    }

    /// Nearest visible enemy, else nearest key point not held, else the enemy spawn area
    fn pick_objective(&self, state: &GameState, nation: Nation, from: HexCoord) -> Option<HexCoord> {
        let enemy = state
            .visible_enemies(nation)
            .iter()
            .filter_map(|t| t.position.map(|p| (from.distance(&p), t.id.clone(), p)))
            .min()
            .map(|(_, _, p)| p);
        if enemy.is_some() {
            return enemy;
        }

        let key_point = state
            .board
            .key_points
            .iter()
            .filter(|kp| controller(&state.tokens, kp.coord) != Some(nation))
            .map(|kp| (from.distance(&kp.coord), kp.coord))
            .min()
            .map(|(_, c)| c);
        if key_point.is_some() {
            return key_point;
        }

        state.board.spawn_center(nation.opponent())
    }

    /// Move as far along the path to `objective` as movement and fuel allow
    fn advance(
        &self,
        state: &mut GameState,
        nation: Nation,
        id: &TokenId,
        objective: HexCoord,
    ) -> Result<Option<AiDecision>> {
        let token = state.tokens.get(id)?;
        let Some(pos) = token.position else {
            return Ok(None);
        };
        if pos == objective {
            return Ok(None);
        }

        let blocked = |c: HexCoord| c != objective && known_enemy_at(state, nation, c);
        let Some(path) = find_path(&state.board, pos, objective, &blocked) else {
            return Ok(None);
        };

        let max_stack = state.config.movement.max_stack;
        let fuel_per_hex = state.config.movement.fuel_per_hex;
        let mut spent = 0.0;
        let mut dest = None;
        for (steps, &hex) in path.iter().enumerate().skip(1) {
            spent += state.board.movement_cost(hex);
            if spent > token.movement_left + 1e-4 {
                break;
            }
            if token.uses_fuel() && token.fuel < steps as u32 * fuel_per_hex {
                break;
            }
            if known_enemy_at(state, nation, hex) {
                break;
            }
            if state.tokens.friendly_count_at(hex, nation) < max_stack {
                dest = Some(hex);
            }
        }
        let Some(dest) = dest else {
            return Ok(None);
        };

        let before = state.treasury.balance(self.player);
        let Some(report) = rejected(resolve_move(state, self.player, id, dest))? else {
            return Ok(None);
        };
        let to = report.destination().unwrap_or(pos);
        let mut detail = format!("{} {} -> {} towards {}", id, pos, to, objective);
        if let Some(spotted) = &report.interrupted_by {
            detail.push_str(&format!(", stopped by {}", spotted));
        }
        Ok(Some(self.decision(state, nation, "move", detail, before)))
    }
}

impl PlayerAi for CommanderAi {
    fn player(&self) -> PlayerId {
        self.player
    }

    fn personality(&self) -> &AiPersonality {
        &self.personality
    }

    fn play_turn(&mut self, state: &mut GameState) -> Result<Vec<AiDecision>> {
        let mut decisions = self.run_economy(state)?;
        decisions.extend(self.run_tactics(state)?);
        Ok(decisions)
    }
}
