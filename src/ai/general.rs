//! General AI: splits the national budget into commander envelopes
//!
//! Each round the General keeps a reserve, guarantees every commander a
//! minimum envelope and shares the rest in proportion to need. Need grows
//! with missing CV and fuel, with a commander's shortfall of tokens and
//! with enemy pressure on its front.

use std::cmp::Reverse;

use tracing::debug;

use crate::ai::personality::{AiPersonality, GeneralWeights};
use crate::ai::{AiDecision, PlayerAi};
use crate::core::error::Result;
use crate::core::types::{PlayerId, Role};
use crate::engine::logistics::give;
use crate::engine::state::GameState;

/// Enemies within this many hexes of a commander's token count as front pressure
pub const FRONT_RADIUS: u32 = 3;

/// Need assessment for one commander
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommanderNeed {
    pub commander: PlayerId,
    pub need: f32,
}

/// PE the General hands to one commander
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub commander: PlayerId,
    pub need: f32,
    pub amount: u32,
}

/// `1 + w_cv·missing_cv + w_fuel·missing_fuel + w_force·shortfall + w_front·enemies`
pub fn need_score(
    weights: &GeneralWeights,
    missing_cv: u32,
    missing_fuel: u32,
    token_count: u32,
    enemies_near: u32,
) -> f32 {
    let shortfall = weights.target_force.saturating_sub(token_count);
    1.0 + weights.w_cv * missing_cv as f32
        + weights.w_fuel * missing_fuel as f32
        + weights.w_force * shortfall as f32
        + weights.w_front * enemies_near as f32
}

/// Split `budget` between commanders
///
/// Allocations always sum to exactly `budget - floor(budget * reserve_ratio)`.
/// Fractional PE left by the proportional split go to the largest
/// remainders, ties to the needier commander, then the lower id.
pub fn split_budget(budget: u32, needs: &[CommanderNeed], weights: &GeneralWeights) -> Vec<Allocation> {
    if needs.is_empty() {
        return Vec::new();
    }

    let reserve = ((budget as f32 * weights.reserve_ratio).floor() as u32).min(budget);
    let distributable = budget - reserve;
    let count = needs.len() as u32;

    let mut minimum = (distributable as f32 * weights.min_share).floor() as u32;
    if minimum.saturating_mul(count) > distributable {
        minimum = 0;
    }
    let rest = (distributable - minimum * count) as u64;

    // Needs in thousandths keep the proportional split in integers
    let units: Vec<u64> = needs
        .iter()
        .map(|n| ((n.need.max(0.0) * 1000.0).round() as u64).max(1))
        .collect();
    let total: u64 = units.iter().sum();

    let mut allocations = Vec::with_capacity(needs.len());
    let mut remainders = Vec::with_capacity(needs.len());
    let mut assigned = 0u64;
    for (index, (need, weight)) in needs.iter().zip(&units).enumerate() {
        let share = rest * weight / total;
        assigned += share;
        remainders.push((index, rest * weight % total));
        allocations.push(Allocation {
            commander: need.commander,
            need: need.need,
            amount: minimum + share as u32,
        });
    }

    let mut leftover = rest - assigned;
    remainders.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| units[b.0].cmp(&units[a.0]))
            .then_with(|| needs[a.0].commander.cmp(&needs[b.0].commander))
    });
    for (index, _) in remainders {
        if leftover == 0 {
            break;
        }
        allocations[index].amount += 1;
        leftover -= 1;
    }

    allocations
}

pub struct GeneralAi {
    player: PlayerId,
    personality: AiPersonality,
}

impl GeneralAi {
    pub fn new(player: PlayerId, personality: AiPersonality) -> Self {
        Self {
            player,
            personality,
        }
    }

    /// Need score of every commander of the General's nation
    pub fn assess_needs(&self, state: &GameState) -> Result<Vec<CommanderNeed>> {
        let nation = state.player(self.player)?.nation;
        let weights = &self.personality.general;
        let enemies: Vec<_> = state
            .visible_enemies(nation)
            .iter()
            .filter_map(|t| t.position)
            .collect();

        let mut needs = Vec::new();
        for commander in state.commanders_of(nation) {
            let tokens: Vec<_> = state.tokens.of_commander(commander).collect();
            let missing_cv = tokens.iter().map(|t| t.missing_cv()).sum();
            let missing_fuel = tokens.iter().map(|t| t.missing_fuel()).sum();
            let enemies_near = enemies
                .iter()
                .filter(|e| {
                    tokens
                        .iter()
                        .filter_map(|t| t.position)
                        .any(|p| p.distance(e) <= FRONT_RADIUS)
                })
                .count() as u32;

            needs.push(CommanderNeed {
                commander,
                need: need_score(
                    weights,
                    missing_cv,
                    missing_fuel,
                    tokens.len() as u32,
                    enemies_near,
                ),
            });
        }
        Ok(needs)
    }

    pub fn plan_allocations(&self, state: &GameState) -> Result<Vec<Allocation>> {
        let budget = state.treasury.balance(self.player);
        let needs = self.assess_needs(state)?;
        Ok(split_budget(budget, &needs, &self.personality.general))
    }

    /// Transfer the planned envelopes
    pub fn execute(&self, state: &mut GameState, allocations: &[Allocation]) -> Result<Vec<AiDecision>> {
        let nation = state.player(self.player)?.nation;
        let mut decisions = Vec::new();

        let mut ordered: Vec<&Allocation> = allocations.iter().filter(|a| a.amount > 0).collect();
        ordered.sort_by_key(|a| (Reverse(a.amount), a.commander));

        for allocation in ordered {
            let before = state.treasury.balance(self.player);
            give(state, self.player, allocation.commander, allocation.amount)?;
            debug!(
                "General {} allocates {} PE to commander {} (need {:.1})",
                self.player, allocation.amount, allocation.commander, allocation.need
            );
            decisions.push(AiDecision {
                turn: state.turn(),
                player: self.player.0,
                nation,
                role: Role::General,
                action: "allocate".to_string(),
                detail: format!(
                    "{} PE to commander {} (need {:.1})",
                    allocation.amount, allocation.commander, allocation.need
                ),
                points_before: before,
                points_after: state.treasury.balance(self.player),
            });
        }
        Ok(decisions)
    }
}

impl PlayerAi for GeneralAi {
    fn player(&self) -> PlayerId {
        self.player
    }

    fn personality(&self) -> &AiPersonality {
        &self.personality
    }

    fn play_turn(&mut self, state: &mut GameState) -> Result<Vec<AiDecision>> {
        let allocations = self.plan_allocations(state)?;
        self.execute(state, &allocations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::hex::HexCoord;
    use crate::engine::state::fixtures::*;
    use crate::tokens::blueprint::fixtures as blueprints;
    use proptest::prelude::*;

    fn need(id: u8, need: f32) -> CommanderNeed {
        CommanderNeed {
            commander: PlayerId(id),
            need,
        }
    }

    fn total(allocations: &[Allocation]) -> u32 {
        allocations.iter().map(|a| a.amount).sum()
    }

    #[test]
    fn test_no_commanders_no_allocations() {
        assert!(split_budget(100, &[], &GeneralWeights::default()).is_empty());
    }

    #[test]
    fn test_reserve_minimum_and_proportional_split() {
        let weights = GeneralWeights::default();
        let allocations = split_budget(100, &[need(2, 1.0), need(3, 3.0)], &weights);

        // 10 reserve, 13 each guaranteed, 64 split 1:3
        assert_eq!(allocations[0].amount, 29);
        assert_eq!(allocations[1].amount, 61);
        assert_eq!(total(&allocations), 90);
    }

    #[test]
    fn test_minimum_dropped_when_it_does_not_fit() {
        let weights = GeneralWeights {
            reserve_ratio: 0.0,
            min_share: 0.6,
            ..Default::default()
        };
        let allocations = split_budget(100, &[need(2, 1.0), need(3, 4.0)], &weights);
        assert_eq!(allocations[0].amount, 20);
        assert_eq!(allocations[1].amount, 80);
    }

    #[test]
    fn test_leftover_goes_to_lowest_id_on_full_tie() {
        let weights = GeneralWeights {
            reserve_ratio: 0.0,
            min_share: 0.0,
            ..Default::default()
        };
        let allocations = split_budget(10, &[need(3, 2.0), need(2, 2.0), need(5, 2.0)], &weights);
        let by_id: Vec<(u8, u32)> = allocations.iter().map(|a| (a.commander.0, a.amount)).collect();
        assert_eq!(by_id, vec![(3, 3), (2, 4), (5, 3)]);
    }

    #[test]
    fn test_leftover_prefers_needier_commander() {
        let weights = GeneralWeights {
            reserve_ratio: 0.0,
            min_share: 0.0,
            ..Default::default()
        };
        // 7 split 1:2 -> 2.33 / 4.67
        let allocations = split_budget(7, &[need(2, 1.0), need(3, 2.0)], &weights);
        assert_eq!(allocations[0].amount, 2);
        assert_eq!(allocations[1].amount, 5);
    }

    #[test]
    fn test_need_score() {
        let w = GeneralWeights::default();
        assert_eq!(need_score(&w, 0, 0, 6, 0), 1.0);
        assert_eq!(need_score(&w, 4, 2, 4, 1), 1.0 + 4.0 + 1.0 + 10.0 + 3.0);
    }

    #[test]
    fn test_damaged_front_commander_gets_more() {
        let mut state = state();
        state.players.push(crate::engine::turn::Player {
            id: PlayerId(3),
            nation: crate::core::types::Nation::Polska,
            role: Role::Commander,
            name: "Drugi".into(),
            controller: Default::default(),
        });
        let hurt = place(&mut state, "hurt", COMMANDER_PL, blueprints::infantry, HexCoord::new(5, 5));
        place(&mut state, "calm", PlayerId(3), blueprints::infantry, HexCoord::new(1, 1));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(6, 5));
        state.tokens.get_mut(&hurt).unwrap().combat_value = 4;
        state.treasury.credit(GENERAL_PL, 100);
        state.turns.set_current(GENERAL_PL);

        let mut ai = GeneralAi::new(GENERAL_PL, AiPersonality::default());
        let allocations = ai.plan_allocations(&state).unwrap();
        let to = |id| allocations.iter().find(|a| a.commander == id).unwrap().amount;
        assert!(to(COMMANDER_PL) > to(PlayerId(3)));
        assert_eq!(total(&allocations), 90);

        let decisions = ai.play_turn(&mut state).unwrap();
        assert_eq!(decisions.len(), 2);
        assert_eq!(state.treasury.balance(GENERAL_PL), 10);
        assert_eq!(
            state.treasury.balance(COMMANDER_PL) + state.treasury.balance(PlayerId(3)),
            90
        );
    }

    proptest! {
        #[test]
        fn prop_allocations_sum_to_distributable(
            budget in 0u32..5000,
            raw in proptest::collection::vec(1.0f32..60.0, 1..6),
            reserve_ratio in 0.0f32..0.5,
            min_share in 0.0f32..0.4,
        ) {
            let weights = GeneralWeights { reserve_ratio, min_share, ..Default::default() };
            let needs: Vec<CommanderNeed> = raw
                .iter()
                .enumerate()
                .map(|(i, n)| need(i as u8 + 2, *n))
                .collect();

            let allocations = split_budget(budget, &needs, &weights);
            let reserve = (budget as f32 * reserve_ratio).floor() as u32;
            prop_assert_eq!(total(&allocations), budget - reserve.min(budget));
            prop_assert!(total(&allocations) <= budget);
            prop_assert_eq!(allocations.len(), needs.len());
        }

        #[test]
        fn prop_minimum_envelope_honoured(
            budget in 0u32..5000,
            count in 1usize..6,
        ) {
            let weights = GeneralWeights::default();
            let needs: Vec<CommanderNeed> = (0..count).map(|i| need(i as u8 + 2, 1.0 + i as f32)).collect();
            let allocations = split_budget(budget, &needs, &weights);

            let distributable = budget - (budget as f32 * weights.reserve_ratio).floor() as u32;
            let minimum = (distributable as f32 * weights.min_share).floor() as u32;
            if minimum * count as u32 <= distributable {
                prop_assert!(allocations.iter().all(|a| a.amount >= minimum));
            }
        }
    }
}
