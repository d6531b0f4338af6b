//! Simulate CLI: play random games of one type and report outcomes.
//!
//! Usage:
//!   cargo run --release --bin simulate -- hearts --games 200
//!   cargo run --release --bin simulate -- checkers --games 1000 --seed 7 --max-moves 300

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabletop_engine::engine::settings::{load_default_settings, load_settings};
use tabletop_engine::engine::simulator::run_simulations;
use tabletop_engine::games::GameRegistry;

#[derive(Parser)]
#[command(name = "simulate", about = "Run random playouts for a game type")]
struct Cli {
    /// Game type to simulate
    game_type: String,

    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Base seed; game i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Move cap per game (default: [simulation] max_moves)
    #[arg(long)]
    max_moves: Option<usize>,

    /// Path to engine.toml
    #[arg(long, env = "TABLETOP_ENGINE_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_settings(path).map_err(|e| format!("Failed to load settings: {}", e))?,
        None => load_default_settings(),
    };
    let registry = GameRegistry::from_settings(&settings);

    let Some(engine) = registry.shared(&cli.game_type) else {
        let available: Vec<String> = registry
            .list_game_types()
            .into_iter()
            .map(|t| t.game_type)
            .collect();
        return Err(format!(
            "Unsupported game type: {} (available: {})",
            cli.game_type,
            available.join(", ")
        )
        .into());
    };

    let max_moves = cli.max_moves.unwrap_or(settings.simulation.max_moves);
    eprintln!(
        "Simulate: {} x {} games, seed={}, max_moves={}",
        cli.game_type, cli.games, cli.seed, max_moves
    );

    let summary = run_simulations(engine, cli.games, cli.seed, max_moves);
    println!("{}", summary.summary());

    if !summary.errors.is_empty() {
        return Err(format!("{} playouts failed", summary.errors.len()).into());
    }
    Ok(())
}
