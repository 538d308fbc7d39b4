//! PE balances per player

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::core::types::PlayerId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treasury {
    balances: BTreeMap<PlayerId, u32>,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, player: PlayerId) -> u32 {
        self.balances.get(&player).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, player: PlayerId, amount: u32) {
        let entry = self.balances.entry(player).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove PE; fails without touching the balance if it would go negative
    pub fn debit(&mut self, player: PlayerId, amount: u32) -> Result<()> {
        let available = self.balance(player);
        if amount > available {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        self.balances.insert(player, available - amount);
        Ok(())
    }

    pub fn transfer(&mut self, from: PlayerId, to: PlayerId, amount: u32) -> Result<()> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let mut t = Treasury::new();
        t.credit(PlayerId(1), 50);
        t.debit(PlayerId(1), 20).unwrap();
        assert_eq!(t.balance(PlayerId(1)), 30);
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let mut t = Treasury::new();
        t.credit(PlayerId(1), 10);
        let err = t.debit(PlayerId(1), 11).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientFunds { needed: 11, available: 10 }
        ));
        assert_eq!(t.balance(PlayerId(1)), 10);
    }

    #[test]
    fn test_transfer() {
        let mut t = Treasury::new();
        t.credit(PlayerId(1), 100);
        t.transfer(PlayerId(1), PlayerId(2), 40).unwrap();
        assert_eq!(t.balance(PlayerId(1)), 60);
        assert_eq!(t.balance(PlayerId(2)), 40);
        assert!(t.transfer(PlayerId(2), PlayerId(3), 41).is_err());
        assert_eq!(t.balance(PlayerId(3)), 0);
    }

    #[test]
    fn test_unknown_player_has_zero() {
        assert_eq!(Treasury::new().balance(PlayerId(9)), 0);
    }
}
