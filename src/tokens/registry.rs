//! Token registry: every token in play, keyed by id
//!
//! A BTreeMap keeps iteration order stable, which the AI and the upkeep
//! rules rely on for reproducible games.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::core::error::{GameError, Result};
use crate::core::types::{Nation, Owner, PlayerId, TokenId};
use crate::tokens::blueprint::Blueprint;
use crate::tokens::token::Token;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRegistry {
    tokens: BTreeMap<TokenId, Token>,
    next_seq: u32,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: Token) -> Result<()> {
        if self.tokens.contains_key(&token.id) {
            return Err(GameError::Scenario(format!("duplicate token id {}", token.id)));
        }
        self.tokens.insert(token.id.clone(), token);
        Ok(())
    }

    pub fn get(&self, id: &TokenId) -> Result<&Token> {
        self.tokens
            .get(id)
            .ok_or_else(|| GameError::TokenNotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &TokenId) -> Result<&mut Token> {
        self.tokens
            .get_mut(id)
            .ok_or_else(|| GameError::TokenNotFound(id.clone()))
    }

    pub fn remove(&mut self, id: &TokenId) -> Option<Token> {
        self.tokens.remove(id)
    }

    pub fn contains(&self, id: &TokenId) -> bool {
        self.tokens.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.tokens.values_mut()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens standing on a hex
    pub fn at(&self, coord: HexCoord) -> impl Iterator<Item = &Token> {
        self.tokens
            .values()
            .filter(move |t| t.position == Some(coord))
    }

    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.at(coord).next().is_some()
    }

    /// First token of the opposing nation on a hex
    pub fn enemy_at(&self, coord: HexCoord, nation: Nation) -> Option<&Token> {
        self.at(coord).find(|t| t.nation() != nation)
    }

    pub fn friendly_count_at(&self, coord: HexCoord, nation: Nation) -> usize {
        self.at(coord).filter(|t| t.nation() == nation).count()
    }

    pub fn of_commander(&self, commander: PlayerId) -> impl Iterator<Item = &Token> {
        self.tokens
            .values()
            .filter(move |t| t.owner.commander == commander)
    }

    pub fn of_nation(&self, nation: Nation) -> impl Iterator<Item = &Token> {
        self.tokens.values().filter(move |t| t.nation() == nation)
    }

    /// On-board tokens of a nation
    pub fn deployed(&self, nation: Nation) -> impl Iterator<Item = &Token> {
        self.of_nation(nation).filter(|t| t.is_on_board())
    }

    /// Fresh id for a purchased token: `{kind}_{size}__{commander}_{nation}_{n}`
    pub fn next_id(&mut self, owner: Owner, blueprint: &Blueprint) -> TokenId {
        loop {
            self.next_seq += 1;
            let id = TokenId::new(format!(
                "{}_{}__{}_{}_{}",
                blueprint.kind, blueprint.size, owner.commander, owner.nation, self.next_seq
            ));
            if !self.tokens.contains_key(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::blueprint::fixtures;

    fn token(id: &str, commander: u8, nation: Nation, pos: Option<HexCoord>) -> Token {
        let mut t = Token::from_blueprint(
            TokenId::new(id),
            Owner::new(PlayerId(commander), nation),
            &fixtures::infantry(nation),
        );
        t.position = pos;
        t
    }

    #[test]
    fn test_insert_and_get() {
        let mut reg = TokenRegistry::new();
        reg.insert(token("a", 2, Nation::Polska, None)).unwrap();
        assert!(reg.get(&TokenId::new("a")).is_ok());
        assert!(matches!(
            reg.get(&TokenId::new("b")),
            Err(GameError::TokenNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut reg = TokenRegistry::new();
        reg.insert(token("a", 2, Nation::Polska, None)).unwrap();
        assert!(reg.insert(token("a", 3, Nation::Polska, None)).is_err());
    }

    #[test]
    fn test_position_queries() {
        let mut reg = TokenRegistry::new();
        let here = HexCoord::new(3, 3);
        reg.insert(token("pl", 2, Nation::Polska, Some(here))).unwrap();
        reg.insert(token("de", 5, Nation::Niemcy, Some(HexCoord::new(4, 3)))).unwrap();

        assert!(reg.is_occupied(here));
        assert_eq!(reg.friendly_count_at(here, Nation::Polska), 1);
        assert!(reg.enemy_at(here, Nation::Polska).is_none());
        assert_eq!(
            reg.enemy_at(HexCoord::new(4, 3), Nation::Polska).map(|t| t.id.as_str()),
            Some("de")
        );
    }

    #[test]
    fn test_deployed_excludes_pending() {
        let mut reg = TokenRegistry::new();
        reg.insert(token("a", 2, Nation::Polska, Some(HexCoord::new(0, 0)))).unwrap();
        reg.insert(token("b", 2, Nation::Polska, None)).unwrap();
        assert_eq!(reg.deployed(Nation::Polska).count(), 1);
        assert_eq!(reg.of_commander(PlayerId(2)).count(), 2);
    }

    #[test]
    fn test_next_id_unique() {
        let mut reg = TokenRegistry::new();
        let owner = Owner::new(PlayerId(2), Nation::Polska);
        let bp = fixtures::infantry(Nation::Polska);
        let a = reg.next_id(owner, &bp);
        let b = reg.next_id(owner, &bp);
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "P_Kompania__2_Polska_1");
    }
}
