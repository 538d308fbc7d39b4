//! Console command execution for the player whose turn it is

use crate::command::parser::{Command, HELP};
use crate::core::error::Result;
use crate::core::types::Role;
use crate::engine::combat::{resolve_attack, RetreatOutcome};
use crate::engine::logistics::{give, purchase, reinforce, resupply};
use crate::engine::movement::{reachable_hexes, resolve_move, set_mode};
use crate::engine::state::GameState;
use crate::engine::victory::score;
use crate::persistence::{load_game, save_game};

/// What the console loop should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Apply a command on behalf of the current player
pub fn execute(state: &mut GameState, command: Command) -> Result<Flow> {
    let player = state.current_player()?.id;

    let text = match command {
        Command::Status => status(state)?,
        Command::Tokens => tokens(state)?,
        Command::Reach { token } => {
            let hexes = reachable_hexes(state, &token)?;
            let list: Vec<String> = hexes
                .iter()
                .map(|(hex, cost)| format!("{} ({:.1})", hex, cost))
                .collect();
            format!("{} can reach {} hexes: {}", token, hexes.len(), list.join(", "))
        }
        Command::Move { token, to } => {
            let report = resolve_move(state, player, &token, to)?;
            let mut text = format!(
                "{} moved {} hexes for {:.1} MP, {} fuel",
                token,
                report.path.len().saturating_sub(1),
                report.cost,
                report.fuel_used
            );
            if let Some(at) = report.destination() {
                text.push_str(&format!(", now at {}", at));
            }
            if let Some(spotted) = report.interrupted_by {
                text.push_str(&format!(". Stopped: enemy {} spotted", spotted));
            }
            text
        }
        Command::Attack { token, target } => {
            let report = resolve_attack(state, player, &token, &target)?;
            let mut text = format!(
                "{} attacks {} (ratio {:.2}): losses {} / {}",
                report.attacker, report.defender, report.ratio, report.attacker_losses, report.defender_losses
            );
            if report.counterattack {
                text.push_str(", defender struck back");
            }
            match report.retreat {
                RetreatOutcome::Retreated { to, .. } => {
                    text.push_str(&format!(", {} retreats to {}", report.defender, to));
                }
                RetreatOutcome::Blocked { extra_losses } => {
                    text.push_str(&format!(", retreat blocked (+{} losses)", extra_losses));
                }
                RetreatOutcome::None => {}
            }
            if report.defender_eliminated {
                text.push_str(&format!(", {} destroyed", report.defender));
            }
            if report.attacker_eliminated {
                text.push_str(&format!(", {} destroyed", report.attacker));
            }
            if let Some(outcome) = state.outcome {
                text.push_str(&format!("\n{}", outcome));
            }
            text
        }
        Command::Mode { token, mode } => {
            set_mode(state, player, &token, mode)?;
            format!("{} switched to {:?} mode", token, mode)
        }
        Command::Buy { blueprint } => {
            let id = purchase(state, player, &blueprint)?;
            format!(
                "Ordered {} as {}; {} PE left",
                blueprint,
                id,
                state.treasury.balance(player)
            )
        }
        Command::Give { to, amount } => {
            give(state, player, to, amount)?;
            format!("Gave {} PE to player {}", amount, to)
        }
        Command::Resupply { token } => {
            let cost = resupply(state, player, &token)?;
            format!("{} refuelled for {} PE", token, cost)
        }
        Command::Reinforce { token, cv } => {
            let cost = reinforce(state, player, &token, cv)?;
            format!("{} reinforced for {} PE", token, cost)
        }
        Command::End => {
            state.end_player_turn()?;
            match state.outcome {
                Some(outcome) => format!("Game over: {}", outcome),
                None => {
                    let next = state.current_player()?;
                    format!("Turn {}: player {} ({}) to move", state.turn(), next.id, next.name)
                }
            }
        }
        Command::Save { path } => {
            save_game(&path, state)?;
            format!("Saved to {}", path.display())
        }
        Command::Load { path } => {
            *state = load_game(&path)?;
            format!("Loaded {} at turn {}", path.display(), state.turn())
        }
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Flow::Quit),
    };
    Ok(Flow::Continue(text))
}

fn status(state: &GameState) -> Result<String> {
    let player = state.current_player()?;
    let mut text = format!(
        "Turn {}/{} - player {} {} ({}, {:?})\n",
        state.turn(),
        state.turns.max_turns,
        player.id,
        player.name,
        player.nation,
        player.role
    );
    text.push_str(&format!("Treasury: {} PE\n", state.treasury.balance(player.id)));
    if player.role == Role::General {
        for commander in state.commanders_of(player.nation) {
            text.push_str(&format!(
                "  commander {}: {} PE\n",
                commander,
                state.treasury.balance(commander)
            ));
        }
    }
    text.push_str(&format!(
        "Score: {} {} / {} {}",
        player.nation,
        score(state, player.nation),
        player.nation.opponent(),
        score(state, player.nation.opponent())
    ));
    if let Some(outcome) = state.outcome {
        text.push_str(&format!("\n{}", outcome));
    }
    Ok(text)
}

fn tokens(state: &GameState) -> Result<String> {
    let player = state.current_player()?;
    let mut text = String::new();

    for token in state.tokens.of_nation(player.nation) {
        let at = match token.position {
            Some(pos) => pos.to_string(),
            None => "awaiting deployment".to_string(),
        };
        text.push_str(&format!(
            "{:<28} cmd {} {:<24} CV {:>2}/{:<2} fuel {:>2}/{:<2} MP {:.1} {:?} @ {}\n",
            token.id.as_str(),
            token.owner.commander,
            token.label,
            token.combat_value,
            token.stats.combat_value,
            token.fuel,
            token.stats.fuel_capacity,
            token.movement_left,
            token.mode,
            at
        ));
    }

    let enemies = state.visible_enemies(player.nation);
    if enemies.is_empty() {
        text.push_str("No enemies in sight");
    } else {
        text.push_str("Enemies in sight:");
        for enemy in enemies {
            if let Some(pos) = enemy.position {
                text.push_str(&format!(
                    "\n  {} {} CV {} @ {}",
                    enemy.id, enemy.label, enemy.combat_value, pos
                ));
            }
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::hex::HexCoord;
    use crate::command::parser::parse_command;
    use crate::core::error::GameError;
    use crate::engine::state::fixtures::*;
    use crate::tokens::blueprint::fixtures as blueprints;

    fn run(state: &mut GameState, line: &str) -> Result<String> {
        match execute(state, parse_command(line)?)? {
            Flow::Continue(text) => Ok(text),
            Flow::Quit => Ok("quit".into()),
        }
    }

    #[test]
    fn test_move_and_attack_through_console() {
        let mut state = state();
        place(&mut state, "tank", COMMANDER_PL, blueprints::tank, HexCoord::new(4, 5));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(6, 5));

        let text = run(&mut state, "move tank 5 5").unwrap();
        assert!(text.contains("now at (5, 5)"), "{}", text);
        let text = run(&mut state, "attack tank de").unwrap();
        assert!(text.starts_with("tank attacks de"), "{}", text);
    }

    #[test]
    fn test_rule_errors_are_returned() {
        let mut state = state();
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(6, 5));
        assert!(matches!(
            run(&mut state, "move de 5 5"),
            Err(GameError::NotOwner { .. })
        ));
        assert!(matches!(
            run(&mut state, "buy Polska_P_Kompania"),
            Err(GameError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_end_passes_turn() {
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(1, 1));
        place(&mut state, "de", COMMANDER_DE, blueprints::infantry, HexCoord::new(10, 10));

        let text = run(&mut state, "end").unwrap();
        assert_eq!(state.current_player().unwrap().id, GENERAL_DE);
        assert!(text.contains("player 4"), "{}", text);
    }

    #[test]
    fn test_save_and_load_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.json");
        let mut state = state();
        place(&mut state, "pl", COMMANDER_PL, blueprints::infantry, HexCoord::new(1, 1));

        run(&mut state, &format!("save {}", path.display())).unwrap();
        state.treasury.credit(COMMANDER_PL, 500);
        run(&mut state, &format!("load {}", path.display())).unwrap();
        assert_eq!(state.treasury.balance(COMMANDER_PL), 0);
    }

    #[test]
    fn test_status_and_quit() {
        let mut state = state();
        let text = run(&mut state, "status").unwrap();
        assert!(text.contains("Treasury: 0 PE"), "{}", text);
        assert!(text.lines().last().unwrap().starts_with("Score: Polska 0"), "{}", text);
        assert_eq!(execute(&mut state, Command::Quit).unwrap(), Flow::Quit);
    }
}
