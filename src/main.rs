//! Wrzesień - interactive console
//!
//! Human players type orders on their turn; AI players move on their own.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wrzesien::ai::{AiRoster, DecisionLog};
use wrzesien::command::{execute, parse_command, Command, Flow, HELP};
use wrzesien::core::config::GameConfig;
use wrzesien::core::error::Result;
use wrzesien::engine::state::GameState;
use wrzesien::persistence::load_game;
use wrzesien::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "wrzesien")]
#[command(about = "Play the September 1939 campaign in the console")]
struct Args {
    /// Scenario file
    #[arg(long, default_value = "data/scenarios/wrzesien.json")]
    scenario: PathBuf,

    /// Game configuration (TOML)
    #[arg(long, default_value = "data/game_config.toml")]
    config: PathBuf,

    /// Resume a saved game instead of starting the scenario
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wrzesien=info")),
        )
        .init();

    let args = Args::parse();
    let config = GameConfig::load_or_default(&args.config)?;

    let mut state = match &args.load {
        Some(path) => load_game(path)?,
        None => {
            let scenario = Scenario::load(&args.scenario)?;
            let base = args
                .scenario
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            GameState::from_scenario(&scenario, &base, config.clone())?
        }
    };

    let mut roster = AiRoster::from_state(&state, &state.config.ai.personality_dir)?;
    let mut decision_log = if config.ai.log_decisions {
        Some(DecisionLog::create(&config.ai.log_dir, "console")?)
    } else {
        None
    };

    println!("\n=== WRZESIEŃ 1939 ===");
    println!("{} AI players, {} turns", roster.len(), state.turns.max_turns);
    println!("{}\n", HELP);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut announced = None;

    loop {
        if let Some(outcome) = state.outcome {
            println!("\nGame over: {}", outcome);
            break;
        }

        let player = state.current_player()?.clone();
        if let Some(ai) = roster.get_mut(player.id) {
            let decisions = state.run_ai_turn(ai)?;
            for d in &decisions {
                println!("[AI {} {}] {}: {}", d.player, d.nation, d.action, d.detail);
            }
            if let Some(log) = decision_log.as_mut() {
                log.record_all(&decisions)?;
            }
            continue;
        }

        if announced != Some((state.turn(), player.id)) {
            println!(
                "\n--- Turn {} - {} ({}, {:?}) ---",
                state.turn(),
                player.name,
                player.nation,
                player.role
            );
            announced = Some((state.turn(), player.id));
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        let reloads = matches!(command, Command::Load { .. });

        match execute(&mut state, command) {
            Ok(Flow::Continue(text)) => println!("{}", text),
            Ok(Flow::Quit) => break,
            Err(e) => println!("Rejected: {}", e),
        }
        if reloads {
            roster = AiRoster::from_state(&state, &state.config.ai.personality_dir)?;
        }
    }

    Ok(())
}
