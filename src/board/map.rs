//! Campaign board: hex grid, terrain, key points and spawn areas
//!
//! The map file format is sparse: only hexes that differ from the
//! default terrain are listed.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::board::hex::HexCoord;
use crate::board::terrain::Terrain;
use crate::core::error::{GameError, Result};
use crate::core::types::Nation;

/// A single hex on the board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: Terrain,
}

impl Tile {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self { coord, terrain }
    }
}

/// Kind of key point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPointKind {
    City,
    Fortification,
    Junction,
}

/// A hex that pays PE to whichever nation occupies it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub coord: HexCoord,
    pub kind: KeyPointKind,
    /// PE left to extract
    pub value: u32,
}

#[derive(Debug, Deserialize)]
struct MapFile {
    width: u32,
    height: u32,
    #[serde(default)]
    default_terrain: Terrain,
    #[serde(default)]
    tiles: Vec<MapFileTile>,
    #[serde(default)]
    key_points: Vec<MapFileKeyPoint>,
    #[serde(default)]
    spawn_points: AHashMap<Nation, Vec<(i32, i32)>>,
}

#[derive(Debug, Deserialize)]
struct MapFileTile {
    q: i32,
    r: i32,
    terrain: Terrain,
}

#[derive(Debug, Deserialize)]
struct MapFileKeyPoint {
    q: i32,
    r: i32,
    kind: KeyPointKind,
    value: u32,
}

/// JSON object keys must be strings, so tiles are stored as a sorted list
mod tile_list {
    use ahash::AHashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Tile;
    use crate::board::hex::HexCoord;

    pub fn serialize<S: Serializer>(
        tiles: &AHashMap<HexCoord, Tile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut list: Vec<&Tile> = tiles.values().collect();
        list.sort_by_key(|t| t.coord);
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<AHashMap<HexCoord, Tile>, D::Error> {
        let list: Vec<Tile> = Vec::deserialize(deserializer)?;
        Ok(list.into_iter().map(|t| (t.coord, t)).collect())
    }
}

/// The full campaign board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: u32,
    pub height: u32,
    #[serde(with = "tile_list")]
    pub tiles: AHashMap<HexCoord, Tile>,
    pub key_points: Vec<KeyPoint>,
    pub spawn_points: AHashMap<Nation, Vec<HexCoord>>,
}

impl Board {
    /// Create a board of open plain
    pub fn new(width: u32, height: u32) -> Self {
        let mut tiles = AHashMap::new();

        for q in 0..width as i32 {
            for r in 0..height as i32 {
                let coord = HexCoord::new(q, r);
                tiles.insert(coord, Tile::new(coord, Terrain::Plain));
            }
        }

        Self {
            width,
            height,
            tiles,
            key_points: Vec::new(),
            spawn_points: AHashMap::new(),
        }
    }

    /// Load a board from a JSON map file
    pub fn from_map_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_map_json(&contents)
    }

    /// Parse a board from the sparse JSON map format
    pub fn from_map_json(json: &str) -> Result<Self> {
        let file: MapFile = serde_json::from_str(json)?;
        if file.width == 0 || file.height == 0 {
            return Err(GameError::Scenario("map has zero size".into()));
        }

        let mut board = Board::new(file.width, file.height);
        for tile in board.tiles.values_mut() {
            tile.terrain = file.default_terrain;
        }

        for t in &file.tiles {
            let coord = HexCoord::new(t.q, t.r);
            board.require_in_bounds(coord, "tile")?;
            board.set_terrain(coord, t.terrain);
        }

        for kp in &file.key_points {
            let coord = HexCoord::new(kp.q, kp.r);
            board.require_in_bounds(coord, "key point")?;
            board.key_points.push(KeyPoint {
                coord,
                kind: kp.kind,
                value: kp.value,
            });
        }

        for (nation, points) in &file.spawn_points {
            let mut coords = Vec::with_capacity(points.len());
            for &(q, r) in points {
                let coord = HexCoord::new(q, r);
                board.require_in_bounds(coord, "spawn point")?;
                if !board.is_passable(coord) {
                    return Err(GameError::Scenario(format!(
                        "spawn point {} for {} is impassable",
                        coord, nation
                    )));
                }
                coords.push(coord);
            }
            board.spawn_points.insert(*nation, coords);
        }

        Ok(board)
    }

    fn require_in_bounds(&self, coord: HexCoord, what: &str) -> Result<()> {
        if self.in_bounds(coord) {
            Ok(())
        } else {
            Err(GameError::Scenario(format!(
                "{} at {} lies outside the {}x{} map",
                what, coord, self.width, self.height
            )))
        }
    }

    pub fn get(&self, coord: HexCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        coord.q >= 0
            && coord.r >= 0
            && coord.q < self.width as i32
            && coord.r < self.height as i32
    }

    pub fn terrain(&self, coord: HexCoord) -> Option<Terrain> {
        self.get(coord).map(|t| t.terrain)
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.terrain = terrain;
        }
    }

    /// Cost to enter a hex; infinite off the map
    pub fn movement_cost(&self, coord: HexCoord) -> f32 {
        self.terrain(coord)
            .map(|t| t.movement_cost())
            .unwrap_or(f32::INFINITY)
    }

    pub fn is_passable(&self, coord: HexCoord) -> bool {
        self.movement_cost(coord).is_finite()
    }

    pub fn defense_modifier(&self, coord: HexCoord) -> f32 {
        self.terrain(coord)
            .map(|t| t.defense_modifier())
            .unwrap_or(1.0)
    }

    /// In-bounds neighbours of a hex
    pub fn neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    /// Check line of sight between two hexes (endpoints never block)
    pub fn has_line_of_sight(&self, from: HexCoord, to: HexCoord) -> bool {
        let line = from.line_to(&to);

        for coord in line.iter().skip(1).take(line.len().saturating_sub(2)) {
            if let Some(tile) = self.get(*coord) {
                if tile.terrain.blocks_los() {
                    return false;
                }
            }
        }

        true
    }

    /// All hexes visible from a position within range
    pub fn visible_hexes(&self, from: HexCoord, range: u32) -> Vec<HexCoord> {
        from.hexes_in_range(range)
            .into_iter()
            .filter(|coord| self.in_bounds(*coord) && self.has_line_of_sight(from, *coord))
            .collect()
    }

    pub fn key_point_at(&self, coord: HexCoord) -> Option<&KeyPoint> {
        self.key_points.iter().find(|kp| kp.coord == coord)
    }

    pub fn spawn_points_for(&self, nation: Nation) -> &[HexCoord] {
        self.spawn_points
            .get(&nation)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Centre of a nation's spawn area, used as a fallback AI objective
    pub fn spawn_center(&self, nation: Nation) -> Option<HexCoord> {
        let points = self.spawn_points_for(nation);
        if points.is_empty() {
            return None;
        }
        let n = points.len() as i32;
        let q = points.iter().map(|c| c.q).sum::<i32>() / n;
        let r = points.iter().map(|c| c.r).sum::<i32>() / n;
        Some(HexCoord::new(q, r))
    }
}
