//! Headless Campaign Runner
//!
//! Plays the scenario AI vs AI and prints the result as JSON or text.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use wrzesien::ai::{AiRoster, DecisionLog};
use wrzesien::core::config::GameConfig;
use wrzesien::core::error::{GameError, Result};
use wrzesien::core::types::Nation;
use wrzesien::engine::state::GameState;
use wrzesien::engine::turn::Controller;
use wrzesien::engine::victory::score;
use wrzesien::persistence::save_game;
use wrzesien::scenario::Scenario;

/// Campaign Runner - AI vs AI games for balancing personalities
#[derive(Parser, Debug)]
#[command(name = "campaign_runner")]
#[command(about = "Run an AI vs AI campaign and report the outcome")]
struct Args {
    /// Scenario file
    #[arg(long, default_value = "data/scenarios/wrzesien.json")]
    scenario: PathBuf,

    /// Game configuration (TOML)
    #[arg(long, default_value = "data/game_config.toml")]
    config: PathBuf,

    /// Override the number of rounds
    #[arg(long)]
    turns: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Polish AI personality (loaded from data/ai_personalities/)
    #[arg(long, default_value = "default")]
    polska: String,

    /// German AI personality (loaded from data/ai_personalities/)
    #[arg(long, default_value = "default")]
    niemcy: String,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Save the final state to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log every AI decision
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct CampaignResult {
    scenario: String,
    outcome: String,
    winner: Option<Nation>,
    turns_played: u32,
    polska_score: u32,
    niemcy_score: u32,
    polska_tokens: usize,
    niemcy_tokens: usize,
    ai_decisions: usize,
    events: usize,
    polska_personality: String,
    niemcy_personality: String,
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "wrzesien=debug" } else { "wrzesien=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = GameConfig::load_or_default(&args.config)?;
    if let Some(turns) = args.turns {
        config.game.max_turns = turns;
    }
    if let Some(seed) = args.seed {
        config.game.seed = seed;
    }
    let seed = config.game.seed;

    let mut scenario = Scenario::load(&args.scenario)?;
    scenario.set_controllers(
        Nation::Polska,
        Controller::Ai {
            personality: args.polska.clone(),
        },
    );
    scenario.set_controllers(
        Nation::Niemcy,
        Controller::Ai {
            personality: args.niemcy.clone(),
        },
    );

    let base = args.scenario.parent().map(PathBuf::from).unwrap_or_default();
    let mut state = GameState::from_scenario(&scenario, &base, config)?;
    let mut roster = AiRoster::from_state(&state, &state.config.ai.personality_dir)?;
    let mut decision_log = if state.config.ai.log_decisions {
        let name = format!("{}_{}_vs_{}_{}", scenario.name, args.polska, args.niemcy, seed);
        Some(DecisionLog::create(&state.config.ai.log_dir, &name)?)
    } else {
        None
    };

    let mut ai_decisions = 0;
    while !state.is_over() {
        let player = state.current_player()?.id;
        let ai = roster.get_mut(player).ok_or(GameError::PlayerNotFound(player))?;
        let decisions = state.run_ai_turn(ai)?;
        ai_decisions += decisions.len();
        if let Some(log) = decision_log.as_mut() {
            log.record_all(&decisions)?;
        }
    }

    if let Some(path) = &args.save {
        save_game(path, &state)?;
    }

    let outcome = state.outcome;
    let result = CampaignResult {
        scenario: scenario.name.clone(),
        outcome: outcome.map(|o| o.to_string()).unwrap_or_else(|| "unfinished".into()),
        winner: outcome.and_then(|o| o.winner),
        turns_played: state.turn().min(state.turns.max_turns),
        polska_score: score(&state, Nation::Polska),
        niemcy_score: score(&state, Nation::Niemcy),
        polska_tokens: state.tokens.deployed(Nation::Polska).count(),
        niemcy_tokens: state.tokens.deployed(Nation::Niemcy).count(),
        ai_decisions,
        events: state.events.len(),
        polska_personality: args.polska.clone(),
        niemcy_personality: args.niemcy.clone(),
        seed,
    };

    match args.format.as_str() {
        "text" => {
            println!("Campaign Result");
            println!("===============");
            println!("Scenario: {}", result.scenario);
            println!("Outcome: {}", result.outcome);
            println!("Turns played: {}", result.turns_played);
            println!("Score: Polska {} / Niemcy {}", result.polska_score, result.niemcy_score);
            println!("Tokens on map: Polska {} / Niemcy {}", result.polska_tokens, result.niemcy_tokens);
            println!("AI decisions: {}, events: {}", result.ai_decisions, result.events);
            println!();
            println!("Personalities: {} vs {}", result.polska_personality, result.niemcy_personality);
            println!("Seed: {}", result.seed);
        }
        other => {
            if other != "json" {
                eprintln!("Unknown format '{}', defaulting to json", other);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
