//! Hex coordinate system for the campaign map (axial coordinates)
//!
//! Uses axial coordinates (q, r); the cube coordinate s is derived.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Number of hex steps between two coordinates
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// All 6 neighbouring coordinates, in `HexDirection::all()` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::all().map(|dir| self.step(dir))
    }

    /// The coordinate one step in the given direction
    pub fn step(&self, dir: HexDirection) -> HexCoord {
        let offset = dir.offset();
        HexCoord::new(self.q + offset.q, self.r + offset.r)
    }

    /// Hex coordinates on a line from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        let n = self.distance(other) as i32;
        if n == 0 {
            return vec![*self];
        }

        // Nudge off exact hex edges so ties round consistently
        let eps = 1e-6;
        let mut results = Vec::with_capacity((n + 1) as usize);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let q = self.q as f64 + eps + (other.q - self.q) as f64 * t;
            let r = self.r as f64 + eps + (other.r - self.r) as f64 * t;
            results.push(Self::round(q, r));
        }
        results
    }

    /// Round fractional axial coordinates to the nearest hex
    fn round(q: f64, r: f64) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }

    /// All hexes within range (inclusive of self)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Neighbours sorted so that the ones farthest from `threat` come first
    ///
    /// Used for retreats and withdrawals. Ties keep `HexDirection` order.
    pub fn neighbors_away_from(&self, threat: &HexCoord) -> Vec<HexCoord> {
        let mut candidates: Vec<HexCoord> = self.neighbors().to_vec();
        candidates.sort_by_key(|c| std::cmp::Reverse(c.distance(threat)));
        candidates
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Direction on the hex grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// The axial offset for this direction
    pub fn offset(&self) -> HexCoord {
        match self {
            HexDirection::East => HexCoord::new(1, 0),
            HexDirection::NorthEast => HexCoord::new(1, -1),
            HexDirection::NorthWest => HexCoord::new(0, -1),
            HexDirection::West => HexCoord::new(-1, 0),
            HexDirection::SouthWest => HexCoord::new(-1, 1),
            HexDirection::SouthEast => HexCoord::new(0, 1),
        }
    }

    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }
}
