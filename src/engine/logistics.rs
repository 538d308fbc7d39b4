//! Spending PE: purchases, resupply, reinforcement and transfers

use tracing::info;

use crate::core::error::{GameError, Result};
use crate::core::types::{Owner, PlayerId, Role, TokenId};
use crate::economy::deployment::PendingDeployment;
use crate::economy::upkeep::{reinforce_cost, resupply_cost};
use crate::engine::events::GameEventKind;
use crate::engine::state::GameState;
use crate::tokens::token::Token;

/// Buy a token; it is paid now and deployed at the next round start
pub fn purchase(state: &mut GameState, player: PlayerId, blueprint_key: &str) -> Result<TokenId> {
    let nation = state.require_active(player, Role::Commander)?.nation;
    let blueprint = state.catalog.get(blueprint_key)?;
    if blueprint.nation != nation {
        return Err(GameError::BlueprintNotFound(format!(
            "{} is not available to {}",
            blueprint_key, nation
        )));
    }
    let blueprint = blueprint.clone();

    state.treasury.debit(player, blueprint.stats.price)?;

    let owner = Owner::new(player, nation);
    let id = state.tokens.next_id(owner, &blueprint);
    state
        .tokens
        .insert(Token::from_blueprint(id.clone(), owner, &blueprint))?;

    let turn = state.turn();
    state.pending.push(PendingDeployment {
        token_id: id.clone(),
        commander: player,
        ordered_turn: turn,
    });

    info!("Commander {} bought {} for {} PE", player, blueprint.key, blueprint.stats.price);
    state.events.push(
        GameEventKind::Purchased {
            token: id.clone(),
            blueprint: blueprint.key.clone(),
            commander: player,
        },
        format!("{} orders {} ({} PE)", owner, blueprint.label, blueprint.stats.price),
        turn,
    );
    Ok(id)
}

/// Refill a token's fuel; returns the PE spent
pub fn resupply(state: &mut GameState, player: PlayerId, token_id: &TokenId) -> Result<u32> {
    state.require_active(player, Role::Commander)?;
    let token = state.require_owned(player, token_id)?;
    let cost = resupply_cost(token, &state.config.economy);
    if token.missing_fuel() == 0 {
        return Ok(0);
    }

    state.treasury.debit(player, cost)?;
    let token = state.tokens.get_mut(token_id)?;
    token.fuel = token.stats.fuel_capacity;

    let turn = state.turn();
    state.events.push(
        GameEventKind::Resupplied {
            token: token_id.clone(),
            cost,
        },
        format!("{} resupplied for {} PE", token_id, cost),
        turn,
    );
    Ok(cost)
}

/// Restore up to `cv` combat value; returns the PE spent
///
/// Requests beyond the blueprint maximum are trimmed.
pub fn reinforce(state: &mut GameState, player: PlayerId, token_id: &TokenId, cv: u32) -> Result<u32> {
    state.require_active(player, Role::Commander)?;
    let token = state.require_owned(player, token_id)?;
    let cv = cv.min(token.missing_cv());
    if cv == 0 {
        return Ok(0);
    }
    let cost = reinforce_cost(cv, &state.config.economy);

    state.treasury.debit(player, cost)?;
    state.tokens.get_mut(token_id)?.combat_value += cv;

    let turn = state.turn();
    state.events.push(
        GameEventKind::Reinforced {
            token: token_id.clone(),
            cv,
            cost,
        },
        format!("{} reinforced by {} CV for {} PE", token_id, cv, cost),
        turn,
    );
    Ok(cost)
}

/// Hand PE to another player of the same nation
pub fn give(state: &mut GameState, from: PlayerId, to: PlayerId, amount: u32) -> Result<()> {
    if state.is_over() {
        return Err(GameError::GameOver);
    }
    if state.turns.current_player() != Some(from) {
        return Err(GameError::NotYourTurn(from));
    }
    let nation = state.player(from)?.nation;
    if state.player(to)?.nation != nation || from == to {
        return Err(GameError::WrongRole(to));
    }

    state.treasury.transfer(from, to, amount)?;

    let turn = state.turn();
    state.events.push(
        GameEventKind::Allocation { from, to, amount },
        format!("Player {} gives {} PE to player {}", from, amount, to),
        turn,
    );
    Ok(())
}
