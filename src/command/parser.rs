//! Console command parsing

use std::path::PathBuf;

use crate::board::hex::HexCoord;
use crate::core::error::{GameError, Result};
use crate::core::types::{PlayerId, TokenId};
use crate::tokens::token::MoveMode;

pub const HELP: &str = "\
Commands:
  status                      - Turn, treasury and score
  tokens                      - Your tokens and the enemies you can see
  reach <id>                  - Hexes a token can reach this turn
  move <id> <q> <r>           - Move a token
  attack <id> <target>        - Attack a visible enemy token
  mode <id> <combat|march|recon>
  buy <blueprint>             - Order a token (deploys next round)
  give <player> <pe>          - Transfer PE to a player of your nation
  resupply <id>               - Refuel a token
  reinforce <id> <cv>         - Restore combat value
  end                         - End your turn
  save <path> / load <path>
  help / quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Tokens,
    Reach { token: TokenId },
    Move { token: TokenId, to: HexCoord },
    Attack { token: TokenId, target: TokenId },
    Mode { token: TokenId, mode: MoveMode },
    Buy { blueprint: String },
    Give { to: PlayerId, amount: u32 },
    Resupply { token: TokenId },
    Reinforce { token: TokenId, cv: u32 },
    End,
    Save { path: PathBuf },
    Load { path: PathBuf },
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(word: &str, what: &str) -> Result<T> {
    word.parse()
        .map_err(|_| GameError::Parse(format!("{} must be a number, got '{}'", what, word)))
}

/// Parse one console line
pub fn parse_command(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Err(GameError::Parse("empty command".into()));
    };

    let usage = |form: &str| GameError::Parse(format!("usage: {}", form));
    let token = |i: usize| TokenId::new(args[i]);

    let command = match (verb.to_lowercase().as_str(), args.len()) {
        ("status" | "s", 0) => Command::Status,
        ("tokens" | "t", 0) => Command::Tokens,
        ("reach", 1) => Command::Reach { token: token(0) },
        ("move" | "m", 3) => Command::Move {
            token: token(0),
            to: HexCoord::new(number(args[1], "q")?, number(args[2], "r")?),
        },
        ("attack" | "a", 2) => Command::Attack {
            token: token(0),
            target: token(1),
        },
        ("mode", 2) => Command::Mode {
            token: token(0),
            mode: args[1].parse()?,
        },
        ("buy", 1) => Command::Buy {
            blueprint: args[0].to_string(),
        },
        ("give", 2) => Command::Give {
            to: PlayerId(number(args[0], "player")?),
            amount: number(args[1], "pe")?,
        },
        ("resupply", 1) => Command::Resupply { token: token(0) },
        ("reinforce", 2) => Command::Reinforce {
            token: token(0),
            cv: number(args[1], "cv")?,
        },
        ("end" | "e", 0) => Command::End,
        ("save", 1) => Command::Save {
            path: PathBuf::from(args[0]),
        },
        ("load", 1) => Command::Load {
            path: PathBuf::from(args[0]),
        },
        ("help" | "h" | "?", 0) => Command::Help,
        ("quit" | "q", 0) => Command::Quit,

        ("reach", _) => return Err(usage("reach <id>")),
        ("move" | "m", _) => return Err(usage("move <id> <q> <r>")),
        ("attack" | "a", _) => return Err(usage("attack <id> <target>")),
        ("mode", _) => return Err(usage("mode <id> <combat|march|recon>")),
        ("buy", _) => return Err(usage("buy <blueprint>")),
        ("give", _) => return Err(usage("give <player> <pe>")),
        ("resupply", _) => return Err(usage("resupply <id>")),
        ("reinforce", _) => return Err(usage("reinforce <id> <cv>")),
        ("save", _) => return Err(usage("save <path>")),
        ("load", _) => return Err(usage("load <path>")),
        (other, _) => {
            return Err(GameError::Parse(format!(
                "unknown command '{}', type 'help'",
                other
            )))
        }
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders() {
        assert_eq!(
            parse_command("move P_Kompania__2_Polska_1 4 -1").unwrap(),
            Command::Move {
                token: TokenId::new("P_Kompania__2_Polska_1"),
                to: HexCoord::new(4, -1),
            }
        );
        assert_eq!(
            parse_command("  ATTACK a b ").unwrap(),
            Command::Attack {
                token: TokenId::new("a"),
                target: TokenId::new("b"),
            }
        );
        assert_eq!(
            parse_command("mode t1 marsz").unwrap(),
            Command::Mode {
                token: TokenId::new("t1"),
                mode: MoveMode::March,
            }
        );
        assert_eq!(
            parse_command("give 3 25").unwrap(),
            Command::Give {
                to: PlayerId(3),
                amount: 25,
            }
        );
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        for line in ["", "move a 1", "give x 3", "reinforce t -2", "mode t sprint", "dance"] {
            assert!(
                matches!(parse_command(line), Err(GameError::Parse(_))),
                "accepted '{}'",
                line
            );
        }
    }
}
