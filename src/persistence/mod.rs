//! Save games

pub mod save;

pub use save::{load_game, save_game, SAVE_VERSION};
