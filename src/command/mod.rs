//! Console commands
//!
//! Text line -> `parse_command` -> `Command` -> `execute` -> `Flow`

pub mod executor;
pub mod parser;

pub use executor::{execute, Flow};
pub use parser::{parse_command, Command, HELP};
