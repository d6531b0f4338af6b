use thiserror::Error;

use crate::engine::models::MatchStatus;

/// Failures surfaced by engines, match instances and the registry.
///
/// Rule violations during validation are not errors; they are reported
/// through `Validation`. These variants cover malformed input that
/// cannot be interpreted, guard failures at the match level, and
/// configuration problems.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid board state: {0}")]
    StateFormat(String),
    #[error("invalid move format: {0}")]
    MoveFormat(String),
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("game is not active (status: {0:?})")]
    NotActive(MatchStatus),
    #[error("not your turn: waiting for {expected}")]
    NotYourTurn { expected: String },
    #[error("player {0} is not in this game")]
    UnknownPlayer(String),
    #[error("player {0} has already joined")]
    AlreadyJoined(String),
    #[error("game cannot be joined")]
    CannotJoin,
    #[error("game has already started (status: {0:?})")]
    AlreadyStarted(MatchStatus),
    #[error("need at least {min} players, have {have}")]
    NotEnoughPlayers { min: u32, have: u32 },
    #[error("Unsupported game type: {0}")]
    UnsupportedGameType(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid engine {game_type}: {reason}")]
    InvalidEngine { game_type: String, reason: String },
    #[error("game type already registered: {0}")]
    AlreadyRegistered(String),
}

impl From<serde_json::Error> for GameError {
    fn from(e: serde_json::Error) -> Self {
        GameError::StateFormat(e.to_string())
    }
}
