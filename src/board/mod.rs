//! Campaign board: hex geometry, terrain, key points and fog of war
//!
//! The board is static terrain plus the key points that pay income.
//! Token positions live in the token registry, not here.

pub mod hex;
pub mod map;
pub mod pathfinding;
pub mod terrain;
pub mod visibility;

pub use hex::{HexCoord, HexDirection};
pub use map::{Board, KeyPoint, KeyPointKind, Tile};
pub use pathfinding::{find_path, path_cost};
pub use terrain::Terrain;
pub use visibility::NationVisibility;
