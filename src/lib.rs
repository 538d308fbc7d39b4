//! Wrzesień - hex-grid operational wargame of the September 1939 campaign
//!
//! Two nations, each with a General who runs the economy and Commanders
//! who fight on the map. Any seat can be taken by the heuristic AI.

pub mod ai;
pub mod board;
pub mod command;
pub mod core;
pub mod economy;
pub mod engine;
pub mod persistence;
pub mod scenario;
pub mod tokens;
