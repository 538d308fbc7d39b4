//! Round upkeep plus resupply and reinforcement pricing

use crate::core::config::EconomyConfig;
use crate::core::types::{PlayerId, TokenId};
use crate::economy::treasury::Treasury;
use crate::tokens::registry::TokenRegistry;
use crate::tokens::token::Token;

/// Result of charging one commander's upkeep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpkeepReport {
    pub commander: PlayerId,
    /// Total upkeep of the commander's on-board tokens
    pub due: u32,
    pub paid: u32,
    /// Tokens that went unpaid and lost 1 CV
    pub unpaid: Vec<TokenId>,
}

impl UpkeepReport {
    pub fn shortfall(&self) -> u32 {
        self.due - self.paid
    }
}

/// Charge upkeep for every on-board token of a commander
///
/// Tokens are paid in registry order until the balance runs short; each
/// token from that point on loses 1 CV. Tokens killed this way stay in the
/// registry with zero CV for the caller to remove.
pub fn charge_upkeep(
    treasury: &mut Treasury,
    tokens: &mut TokenRegistry,
    commander: PlayerId,
) -> UpkeepReport {
    let mut report = UpkeepReport {
        commander,
        due: 0,
        paid: 0,
        unpaid: Vec::new(),
    };
    let mut short = false;

    for token in tokens
        .iter_mut()
        .filter(|t| t.owner.commander == commander && t.is_on_board())
    {
        let cost = token.stats.upkeep;
        report.due += cost;

        if !short && treasury.debit(commander, cost).is_ok() {
            report.paid += cost;
            continue;
        }

        short = true;
        token.take_losses(1);
        report.unpaid.push(token.id.clone());
    }

    if !report.unpaid.is_empty() {
        tracing::debug!(
            "Commander {} short on upkeep by {} PE, {} tokens weakened",
            commander,
            report.shortfall(),
            report.unpaid.len()
        );
    }

    report
}

/// PE needed to refill a token's fuel
pub fn resupply_cost(token: &Token, config: &EconomyConfig) -> u32 {
    (token.missing_fuel() as f32 * config.resupply_cost_per_fuel).ceil() as u32
}

/// PE needed to restore `cv` points of combat value
pub fn reinforce_cost(cv: u32, config: &EconomyConfig) -> u32 {
    cv * config.reinforce_cost_per_cv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::hex::HexCoord;
    use crate::core::types::{Nation, Owner};
    use crate::tokens::blueprint::fixtures;

    fn deploy(tokens: &mut TokenRegistry, id: &str, q: i32) {
        let mut t = Token::from_blueprint(
            TokenId::new(id),
            Owner::new(PlayerId(2), Nation::Polska),
            &fixtures::infantry(Nation::Polska),
        );
        t.position = Some(HexCoord::new(q, 0));
        tokens.insert(t).unwrap();
    }

    #[test]
    fn test_upkeep_fully_paid() {
        let mut treasury = Treasury::new();
        treasury.credit(PlayerId(2), 10);
        let mut tokens = TokenRegistry::new();
        deploy(&mut tokens, "a", 0);
        deploy(&mut tokens, "b", 1);

        let report = charge_upkeep(&mut treasury, &mut tokens, PlayerId(2));
        assert_eq!(report.commander, PlayerId(2));
        assert_eq!(report.due, 4);
        assert_eq!(report.paid, 4);
        assert!(report.unpaid.is_empty());
        assert_eq!(treasury.balance(PlayerId(2)), 6);
    }

    #[test]
    fn test_upkeep_shortfall_costs_cv() {
        let mut treasury = Treasury::new();
        treasury.credit(PlayerId(2), 3);
        let mut tokens = TokenRegistry::new();
        deploy(&mut tokens, "a", 0);
        deploy(&mut tokens, "b", 1);

        let report = charge_upkeep(&mut treasury, &mut tokens, PlayerId(2));
        assert_eq!(report.paid, 2);
        assert_eq!(report.shortfall(), 2);
        assert_eq!(report.unpaid, vec![TokenId::new("b")]);
        assert_eq!(tokens.get(&TokenId::new("a")).unwrap().combat_value, 10);
        assert_eq!(tokens.get(&TokenId::new("b")).unwrap().combat_value, 9);
        assert_eq!(treasury.balance(PlayerId(2)), 1);
    }

    #[test]
    fn test_pending_tokens_cost_nothing() {
        let mut treasury = Treasury::new();
        let mut tokens = TokenRegistry::new();
        let t = Token::from_blueprint(
            TokenId::new("reserve"),
            Owner::new(PlayerId(2), Nation::Polska),
            &fixtures::infantry(Nation::Polska),
        );
        tokens.insert(t).unwrap();

        let report = charge_upkeep(&mut treasury, &mut tokens, PlayerId(2));
        assert_eq!(report.due, 0);
        assert!(report.unpaid.is_empty());
    }

    #[test]
    fn test_resupply_cost_rounds_up() {
        let mut t = Token::from_blueprint(
            TokenId::new("t"),
            Owner::new(PlayerId(2), Nation::Polska),
            &fixtures::tank(Nation::Polska),
        );
        t.fuel = 7;
        assert_eq!(resupply_cost(&t, &EconomyConfig::default()), 2);
        t.fuel = 10;
        assert_eq!(resupply_cost(&t, &EconomyConfig::default()), 0);
    }

    #[test]
    fn test_reinforce_cost() {
        assert_eq!(reinforce_cost(4, &EconomyConfig::default()), 8);
    }
}
