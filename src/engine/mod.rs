//! Game engine: turn loop, action resolution and victory
//!
//! `GameState` owns everything; the free functions in `movement`, `combat`
//! and `logistics` validate and apply one player action each.

pub mod combat;
pub mod events;
pub mod logistics;
pub mod movement;
pub mod state;
pub mod turn;
pub mod victory;

pub use combat::{expected_ratio, resolve_attack, validate_attack, CombatReport, RetreatOutcome};
pub use events::{EventLog, GameEvent, GameEventKind};
pub use logistics::{give, purchase, reinforce, resupply};
pub use movement::{reachable_hexes, resolve_move, set_mode, validate_move, MoveReport};
pub use state::GameState;
pub use turn::{Controller, Player, TurnManager};
pub use victory::{check_victory, score, Outcome, VictoryReason};
