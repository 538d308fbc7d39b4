//! Attack resolution with counterattack and retreat
//!
//! One attack = one exchange:
//! - the attacker deals `attack × roll × clamp(ratio) × loss_scale` losses
//! - a surviving defender with the attacker in range hits back
//! - a defender that came off worse falls back one hex, or takes extra
//!   losses when it has nowhere to go

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::hex::HexCoord;
use crate::core::error::{AttackRejection, GameError, Result};
use crate::core::types::{PlayerId, Role, TokenId};
use crate::engine::events::GameEventKind;
use crate::engine::state::{GameState, RemovalCause};
use crate::tokens::token::Token;

/// What happened to the defender after the exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RetreatOutcome {
    /// Defender held or was destroyed
    None,
    Retreated { from: HexCoord, to: HexCoord },
    /// No free hex to fall back to
    Blocked { extra_losses: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatReport {
    pub attacker: TokenId,
    pub defender: TokenId,
    pub ratio: f32,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub counterattack: bool,
    pub retreat: RetreatOutcome,
    pub attacker_eliminated: bool,
    pub defender_eliminated: bool,
}

/// Defense including terrain of the hex the token stands on
fn defense_power(state: &GameState, token: &Token) -> f32 {
    let terrain = token
        .position
        .map(|p| state.board.defense_modifier(p))
        .unwrap_or(1.0);
    token.base_defense_power() * terrain
}

fn ratio_between(state: &GameState, attacker: &Token, defender: &Token) -> f32 {
    let defense = defense_power(state, defender).max(state.config.combat.min_defense_power);
    attacker.attack_power() / defense
}

/// Attack/defense ratio before dice, as the AI estimates it
pub fn expected_ratio(state: &GameState, attacker_id: &TokenId, defender_id: &TokenId) -> Result<f32> {
    let attacker = state.tokens.get(attacker_id)?;
    let defender = state.tokens.get(defender_id)?;
    Ok(ratio_between(state, attacker, defender))
}

/// Check an attack order
pub fn validate_attack(
    state: &GameState,
    player: PlayerId,
    attacker_id: &TokenId,
    defender_id: &TokenId,
) -> Result<()> {
    state.require_active(player, Role::Commander)?;
    let attacker = state.require_owned(player, attacker_id)?;
    let reject = |reason: AttackRejection| -> Result<()> {
        Err(GameError::IllegalAttack {
            token: attacker_id.clone(),
            reason,
        })
    };

    if !attacker.is_alive() || attacker.stats.attack_value == 0 {
        return reject(AttackRejection::NoCombatValue);
    }
    if attacker.has_attacked {
        return reject(AttackRejection::AlreadyAttacked);
    }
    let Some(from) = attacker.position else {
        return reject(AttackRejection::NotOnBoard);
    };

    let defender = state.tokens.get(defender_id)?;
    let Some(target) = defender.position else {
        return reject(AttackRejection::NotOnBoard);
    };
    if defender.nation() == attacker.nation() {
        return reject(AttackRejection::FriendlyTarget);
    }
    if !state.is_visible_to(attacker.nation(), target) {
        return reject(AttackRejection::TargetNotVisible);
    }
    if from.distance(&target) > attacker.stats.attack_range {
        return reject(AttackRejection::OutOfRange);
    }

    Ok(())
}

/// Free neighbour a beaten defender falls back to
///
/// Only hexes that open the distance to the attacker qualify. Farthest
/// first, then cheapest terrain, then coordinate order.
fn retreat_hex(state: &GameState, from: HexCoord, threat: HexCoord) -> Option<HexCoord> {
    let board = &state.board;
    let current = from.distance(&threat);
    let mut candidates: Vec<HexCoord> = from
        .neighbors_away_from(&threat)
        .into_iter()
        .filter(|c| c.distance(&threat) > current)
        .filter(|c| board.in_bounds(*c) && board.is_passable(*c) && !state.tokens.is_occupied(*c))
        .collect();

    candidates.sort_by(|a, b| {
        b.distance(&threat)
            .cmp(&a.distance(&threat))
            .then_with(|| {
                board
                    .movement_cost(*a)
                    .partial_cmp(&board.movement_cost(*b))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.cmp(b))
    });
    candidates.into_iter().next()
}

fn roll(state: &mut GameState) -> f32 {
    let (lo, hi) = (state.config.combat.roll_min, state.config.combat.roll_max);
    state.rng.gen_range(lo..=hi)
}

/// Validate and resolve an attack
pub fn resolve_attack(
    state: &mut GameState,
    player: PlayerId,
    attacker_id: &TokenId,
    defender_id: &TokenId,
) -> Result<CombatReport> {
    validate_attack(state, player, attacker_id, defender_id)?;

    let cfg = state.config.combat.clone();
    let attacker = state.tokens.get(attacker_id)?;
    let defender = state.tokens.get(defender_id)?;

    let ratio = ratio_between(state, attacker, defender);
    let attack_power = attacker.attack_power();
    let counter_power = defender.attack_power();
    let attacker_pos = attacker.position.unwrap_or_default();
    let defender_pos = defender.position.unwrap_or_default();
    let defender_range = defender.stats.attack_range;

    let roll_a = roll(state);
    let defender_losses = (attack_power * roll_a * ratio.clamp(cfg.ratio_floor, cfg.ratio_cap) * cfg.loss_scale)
        .ceil() as u32;
    let defender_losses = state.tokens.get_mut(defender_id)?.take_losses(defender_losses);
    let defender_alive = state.tokens.get(defender_id)?.is_alive();

    let counterattack = defender_alive && attacker_pos.distance(&defender_pos) <= defender_range;
    let mut attacker_losses = 0;
    if counterattack {
        let roll_d = roll(state);
        let inverse = (1.0 / ratio.max(f32::EPSILON)).clamp(cfg.ratio_floor, cfg.ratio_cap);
        let losses = (counter_power * roll_d * inverse * cfg.counter_scale).ceil() as u32;
        attacker_losses = state.tokens.get_mut(attacker_id)?.take_losses(losses);
    }

    let attacker = state.tokens.get_mut(attacker_id)?;
    attacker.has_attacked = true;
    let attacker_alive = attacker.is_alive();

    let mut retreat = RetreatOutcome::None;
    if defender_alive && defender_losses > attacker_losses {
        match retreat_hex(state, defender_pos, attacker_pos) {
            Some(to) => {
                state.tokens.get_mut(defender_id)?.position = Some(to);
                retreat = RetreatOutcome::Retreated {
                    from: defender_pos,
                    to,
                };
            }
            None => {
                let defender = state.tokens.get_mut(defender_id)?;
                let penalty = (defender.combat_value as f32 * cfg.blocked_retreat_penalty).ceil() as u32;
                let extra_losses = defender.take_losses(penalty);
                retreat = RetreatOutcome::Blocked { extra_losses };
            }
        }
    }

    let defender_eliminated = !state.tokens.get(defender_id)?.is_alive();
    let attacker_eliminated = !attacker_alive;

    let turn = state.turn();
    info!(
        "{} attacks {}: ratio {:.2}, losses {}/{}",
        attacker_id, defender_id, ratio, attacker_losses, defender_losses
    );
    state.events.push(
        GameEventKind::Attack {
            attacker: attacker_id.clone(),
            defender: defender_id.clone(),
            attacker_losses,
            defender_losses,
        },
        format!(
            "{} attacks {} (ratio {:.2}): attacker -{} CV, defender -{} CV",
            attacker_id, defender_id, ratio, attacker_losses, defender_losses
        ),
        turn,
    );
    match retreat {
        RetreatOutcome::Retreated { to, .. } => {
            debug!("{} retreats to {}", defender_id, to);
            state.events.push(
                GameEventKind::Retreat {
                    token: defender_id.clone(),
                    to,
                },
                format!("{} falls back to {}", defender_id, to),
                turn,
            );
        }
        RetreatOutcome::Blocked { extra_losses } => {
            debug!("{} cannot retreat, loses {} more CV", defender_id, extra_losses);
        }
        RetreatOutcome::None => {}
    }

    if defender_eliminated {
        state.remove_token(defender_id, RemovalCause::Combat);
    }
    if attacker_eliminated {
        state.remove_token(attacker_id, RemovalCause::Combat);
    }

    state.refresh_visibility();
    state.update_outcome();

    Ok(CombatReport {
        attacker: attacker_id.clone(),
        defender: defender_id.clone(),
        ratio,
        attacker_losses,
        defender_losses,
        counterattack,
        retreat,
        attacker_eliminated,
        defender_eliminated,
    })
}
