//! Random playouts: drive a match to the end by picking uniformly among the
//! moves the engine reports as legal. Used by the `simulate` tool and as a
//! consistency check between `valid_moves` and `validate_move`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::errors::GameError;
use crate::engine::instance::{GameInstance, MoveOutcome, NewGame};
use crate::engine::models::*;
use crate::engine::plugin::GameEngine;

/// How a single playout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoutEnd {
    Completed,
    /// The player to act had no legal move.
    Stalled,
    /// Hit the move cap first.
    Capped,
}

#[derive(Debug, Clone)]
pub struct PlayoutResult {
    pub seed: u64,
    pub moves: u32,
    pub end: PlayoutEnd,
    pub winner: Option<PlayerId>,
    pub duration_ms: f64,
}

/// Seat `max_players` players named `p1..pN` and start the match.
pub fn seated_match(engine: Arc<dyn GameEngine>, seed: u64) -> Result<GameInstance, GameError> {
    let seats = engine.max_players();
    let params = NewGame::new(format!("sim-{seed}")).with_settings(GameConfig::with_seed(seed));
    let mut game = GameInstance::create(engine, params)?;
    for i in 1..=seats {
        game.join(&format!("p{i}"), &format!("Player {i}"))?;
    }
    game.start()?;
    Ok(game)
}

/// Play one game with uniformly random legal moves.
///
/// A generated move that the engine then rejects is reported as
/// `GameError::IllegalMove`: the engine disagrees with itself.
pub fn random_playout(
    engine: Arc<dyn GameEngine>,
    seed: u64,
    max_moves: usize,
) -> Result<PlayoutResult, GameError> {
    let t0 = Instant::now();
    let mut game = seated_match(engine, seed)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut end = PlayoutEnd::Capped;
    for _ in 0..max_moves {
        if game.state().status == MatchStatus::Completed {
            end = PlayoutEnd::Completed;
            break;
        }
        let Some(actor) = game.state().current_player_id.clone() else {
            end = PlayoutEnd::Stalled;
            break;
        };
        let moves = game.valid_moves(&actor)?;
        let Some(mv) = moves.choose(&mut rng) else {
            end = PlayoutEnd::Stalled;
            break;
        };
        if let MoveOutcome::Rejected { reason } = game.submit_move(&actor, mv)? {
            return Err(GameError::IllegalMove(format!(
                "generated move {mv} for {actor} was rejected: {reason}"
            )));
        }
    }
    if game.state().status == MatchStatus::Completed {
        end = PlayoutEnd::Completed;
    }

    Ok(PlayoutResult {
        seed,
        moves: game.state().move_count,
        end,
        winner: game.state().winner_id.clone(),
        duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Aggregated results from a batch of playouts.
#[derive(Debug, Default)]
pub struct SimulationSummary {
    pub game_type: String,
    pub num_games: usize,
    pub completed: usize,
    pub stalled: usize,
    pub capped: usize,
    pub wins: BTreeMap<PlayerId, usize>,
    pub total_moves: u64,
    pub game_durations_ms: Vec<f64>,
    pub errors: Vec<String>,
}

impl SimulationSummary {
    fn record(&mut self, result: Result<PlayoutResult, GameError>) {
        let r = match result {
            Ok(r) => r,
            Err(e) => {
                self.errors.push(e.to_string());
                return;
            }
        };
        match r.end {
            PlayoutEnd::Completed => self.completed += 1,
            PlayoutEnd::Stalled => self.stalled += 1,
            PlayoutEnd::Capped => self.capped += 1,
        }
        if let Some(winner) = r.winner {
            *self.wins.entry(winner).or_insert(0) += 1;
        }
        self.total_moves += r.moves as u64;
        self.game_durations_ms.push(r.duration_ms);
    }

    pub fn avg_moves(&self) -> f64 {
        let played = self.game_durations_ms.len();
        self.total_moves as f64 / played.max(1) as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Simulation Results: {} ({} games)",
            self.game_type, self.num_games
        )];
        lines.push("=".repeat(60));
        lines.push(format!(
            "  completed={}  stalled={}  capped={}  errors={}",
            self.completed,
            self.stalled,
            self.capped,
            self.errors.len()
        ));
        for (pid, wins) in &self.wins {
            let rate = *wins as f64 / self.num_games.max(1) as f64;
            lines.push(format!("  {:>8}: {:4} wins ({:5.1}%)", pid, wins, rate * 100.0));
        }
        lines.push(format!("  Avg moves: {:.1}", self.avg_moves()));
        if !self.game_durations_ms.is_empty() {
            let total_ms: f64 = self.game_durations_ms.iter().sum();
            let avg_ms = total_ms / self.game_durations_ms.len() as f64;
            lines.push(format!("  Avg game: {:.1}ms  |  Total: {:.2}s", avg_ms, total_ms / 1000.0));
        }
        for e in self.errors.iter().take(5) {
            lines.push(format!("  error: {e}"));
        }
        lines.join("\n")
    }
}

/// Run `num_games` playouts in parallel, seeding game `i` with `base_seed + i`.
pub fn run_simulations(
    engine: Arc<dyn GameEngine>,
    num_games: usize,
    base_seed: u64,
    max_moves: usize,
) -> SimulationSummary {
    let results: Vec<Result<PlayoutResult, GameError>> = (0..num_games)
        .into_par_iter()
        .map(|i| random_playout(Arc::clone(&engine), base_seed.wrapping_add(i as u64), max_moves))
        .collect();

    let mut summary = SimulationSummary {
        game_type: engine.game_type().to_string(),
        num_games,
        ..Default::default()
    };
    for result in results {
        summary.record(result);
    }
    tracing::info!(
        game_type = %summary.game_type,
        games = num_games,
        completed = summary.completed,
        errors = summary.errors.len(),
        "simulation finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::plugin::JsonAdapter;
    use crate::games::checkers::CheckersEngine;
    use crate::games::chess::ChessEngine;
    use crate::games::hearts::HeartsEngine;

    #[test]
    fn test_chess_playout_hits_cap() {
        let r = random_playout(Arc::new(JsonAdapter(ChessEngine)), 1, 30).unwrap();
        assert!(r.moves <= 30);
        assert_ne!(r.end, PlayoutEnd::Completed);
        assert!(r.winner.is_none());
    }

    #[test]
    fn test_checkers_playouts_stay_consistent() {
        let summary = run_simulations(Arc::new(JsonAdapter(CheckersEngine)), 8, 100, 400);
        assert!(summary.errors.is_empty(), "{:?}", summary.errors);
        assert_eq!(summary.completed + summary.stalled + summary.capped, 8);
    }

    #[test]
    fn test_hearts_playout_completes() {
        let r = random_playout(Arc::new(JsonAdapter(HeartsEngine::default())), 5, 5000).unwrap();
        assert_eq!(r.end, PlayoutEnd::Completed);
        assert!(r.winner.is_some());
        // At least one full round: 4 passes plus 52 plays.
        assert!(r.moves >= 56);
    }

    #[test]
    fn test_playouts_are_reproducible() {
        let engine: Arc<dyn GameEngine> = Arc::new(JsonAdapter(HeartsEngine::default()));
        let a = random_playout(Arc::clone(&engine), 9, 5000).unwrap();
        let b = random_playout(engine, 9, 5000).unwrap();
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.winner, b.winner);
    }

    #[test]
    fn test_seeds_wrap_near_the_top_of_the_range() {
        let summary = run_simulations(Arc::new(JsonAdapter(ChessEngine)), 3, u64::MAX - 1, 10);
        assert!(summary.errors.is_empty(), "{:?}", summary.errors);
        assert_eq!(summary.completed + summary.stalled + summary.capped, 3);
    }

    #[test]
    fn test_summary_text() {
        let summary = run_simulations(Arc::new(JsonAdapter(HeartsEngine::default())), 2, 7, 5000);
        let text = summary.summary();
        assert!(text.contains("hearts (2 games)"));
        assert_eq!(summary.completed, 2);
    }
}
