use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tabletop_engine::engine::instance::{MatchSnapshot, MoveOutcome, NewGame};
use tabletop_engine::engine::models::{GameConfig, MatchStatus, RenderData};
use tabletop_engine::engine::settings::{load_default_settings, load_settings, Settings};
use tabletop_engine::games::GameRegistry;

#[derive(Parser)]
#[command(name = "tabletop-engine", about = "Rule engines for chess, checkers and hearts")]
struct Cli {
    /// Path to engine.toml (default: auto-discover)
    #[arg(long, global = true, env = "TABLETOP_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List supported game types
    Types,

    /// Load and validate the settings file
    CheckConfig,

    /// Create a match and write its snapshot
    New {
        /// Game type, e.g. "chess"
        game_type: String,

        /// Comma-separated user ids to seat, in turn order
        #[arg(long, value_delimiter = ',')]
        players: Vec<String>,

        /// Match id (default: random)
        #[arg(long, default_value = "")]
        id: String,

        /// Seed for shuffles
        #[arg(long)]
        seed: Option<u64>,

        /// Engine options as a JSON object, e.g. '{"target_score": 50}'
        #[arg(long)]
        options: Option<String>,

        /// Snapshot file to write
        #[arg(long, short)]
        out: PathBuf,
    },

    /// Submit a move to a stored match
    Play {
        /// Snapshot file, updated in place
        snapshot: PathBuf,

        /// Acting user id
        #[arg(long)]
        player: String,

        /// Move as JSON, or bare notation such as e2-e4
        #[arg(long = "move")]
        mv: String,
    },

    /// Print the render projection of a stored match
    Render {
        snapshot: PathBuf,
    },
}

fn read_snapshot(path: &Path) -> Result<MatchSnapshot, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&text)?)
}

fn write_snapshot(path: &Path, snapshot: &MatchSnapshot) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(snapshot)?)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}

/// Bare notation is accepted as a JSON string.
fn parse_move(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

fn print_render(render: &RenderData) {
    if let Some(grid) = &render.grid {
        for row in grid {
            let line: String = row.iter().map(|c| c.unwrap_or('.')).collect();
            println!("{line}");
        }
    }
    for note in &render.annotations {
        println!("{note}");
    }
    if !render.highlights.is_empty() {
        println!("highlights: {}", render.highlights.join(", "));
    }
    if render.summary.as_object().is_some_and(|o| !o.is_empty()) {
        println!("{}", render.summary);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings: Settings = match &cli.config {
        Some(path) => load_settings(path).map_err(|e| format!("Failed to load settings: {}", e))?,
        None => load_default_settings(),
    };
    let registry = GameRegistry::from_settings(&settings);

    match cli.command {
        Command::Types => {
            for info in registry.list_game_types() {
                println!(
                    "{:<10} {:<10} {}-{} players  {}",
                    info.game_type, info.name, info.min_players, info.max_players, info.description
                );
            }
        }
        Command::CheckConfig => {
            let hearts = settings.hearts.to_settings();
            println!("hearts.target_score = {}", hearts.target_score);
            println!("hearts.moon_shot_penalty = {}", hearts.moon_shot_penalty);
            println!("simulation.max_moves = {}", settings.simulation.max_moves);
            println!("ok");
        }
        Command::New {
            game_type,
            players,
            id,
            seed,
            options,
            out,
        } => {
            let check = registry.validate_configuration(&game_type, None, None);
            if !check.valid {
                return Err(check.error.unwrap_or_default().into());
            }
            let options = match options {
                Some(text) => serde_json::from_str(&text)?,
                None => serde_json::json!({}),
            };
            let params = NewGame::new(id).with_settings(GameConfig {
                options,
                random_seed: seed,
            });
            let mut game = registry.create_game(&game_type, params)?;
            for user_id in &players {
                game.join(user_id, user_id)?;
            }
            if players.len() as u32 >= game.state().min_players {
                game.start()?;
            }
            write_snapshot(&out, &game.snapshot()?)?;
            println!(
                "{} {} ({:?}) -> {}",
                game.state().game_type,
                game.state().id,
                game.state().status,
                out.display()
            );
        }
        Command::Play { snapshot, player, mv } => {
            let mut game = registry.load_game(read_snapshot(&snapshot)?)?;
            match game.submit_move(&player, &parse_move(&mv))? {
                MoveOutcome::Rejected { reason } => {
                    println!("rejected: {reason}");
                }
                MoveOutcome::Applied { completed, winner } => {
                    write_snapshot(&snapshot, &game.snapshot()?)?;
                    if completed {
                        println!("game over, winner: {}", winner.as_deref().unwrap_or("none"));
                    } else if game.state().status == MatchStatus::Active {
                        println!(
                            "ok, next: {}",
                            game.state().current_player_id.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }
        Command::Render { snapshot } => {
            let game = registry.load_game(read_snapshot(&snapshot)?)?;
            print_render(&game.render()?);
        }
    }

    Ok(())
}
