//! JSON save files
//!
//! The whole `GameState` is written, including the combat RNG (seed,
//! stream and word position) so a loaded game rolls the same dice.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{GameError, Result};
use crate::engine::state::GameState;

/// Bumped whenever the saved layout changes incompatibly
pub const SAVE_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveFileRef<'a> {
    version: u32,
    state: &'a GameState,
}

#[derive(Deserialize)]
struct SaveFile {
    version: u32,
    state: GameState,
}

/// Write the game to `path`, creating parent directories as needed
pub fn save_game(path: &Path, state: &GameState) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = SaveFileRef {
        version: SAVE_VERSION,
        state,
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json)?;
    info!("Saved turn {} to {:?}", state.turn(), path);
    Ok(())
}

pub fn load_game(path: &Path) -> Result<GameState> {
    let contents = fs::read_to_string(path)?;
    let file: SaveFile = serde_json::from_str(&contents)?;
    if file.version != SAVE_VERSION {
        return Err(GameError::Parse(format!(
            "save version {} is not supported (expected {})",
            file.version, SAVE_VERSION
        )));
    }
    info!("Loaded turn {} from {:?}", file.state.turn(), path);
    Ok(file.state)
}
