use thiserror::Error;

use crate::core::types::{PlayerId, TokenId};

/// Why a move order was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    NotOnBoard,
    OutOfBounds,
    Impassable,
    EnemyOccupied,
    StackFull,
    NoPath,
    NotEnoughMovement,
    NotEnoughFuel,
    AlreadyMoved,
}

/// Why an attack order was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackRejection {
    NotOnBoard,
    AlreadyAttacked,
    FriendlyTarget,
    TargetNotVisible,
    OutOfRange,
    NoCombatValue,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Token not found: {0}")]
    TokenNotFound(TokenId),

    #[error("Player not found: {0:?}")]
    PlayerNotFound(PlayerId),

    #[error("Blueprint not found: {0}")]
    BlueprintNotFound(String),

    #[error("Token {token} does not belong to player {player:?}")]
    NotOwner { token: TokenId, player: PlayerId },

    #[error("Illegal move for {token}: {reason:?}")]
    IllegalMove { token: TokenId, reason: MoveRejection },

    #[error("Illegal attack by {token}: {reason:?}")]
    IllegalAttack { token: TokenId, reason: AttackRejection },

    #[error("Insufficient funds: needed {needed} PE, available {available} PE")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("Player {0:?} has the wrong role for this action")]
    WrongRole(PlayerId),

    #[error("It is not player {0:?}'s turn")]
    NotYourTurn(PlayerId),

    #[error("Game is already over")]
    GameOver,

    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
