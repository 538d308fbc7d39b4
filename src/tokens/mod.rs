//! Tokens (żetony): unit blueprints, live token state and the registry

pub mod blueprint;
pub mod registry;
pub mod token;
pub mod unit_type;

pub use blueprint::{Blueprint, BlueprintCatalog, TokenStats};
pub use registry::TokenRegistry;
pub use token::{MoveMode, Token};
pub use unit_type::{UnitKind, UnitSize};
