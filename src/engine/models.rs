//! Core engine data types shared by every game type.

use serde::{Deserialize, Serialize};

pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: PlayerId,
    pub username: String,
    pub color: String,
    /// 1-based rank in the turn sequence, fixed at join time.
    pub player_order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    Active,
    Completed,
}

/// Per-match configuration. `options` is opaque to the contract layer and
/// interpreted only by the engine that owns the match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_options")]
    pub options: serde_json::Value,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_options() -> serde_json::Value {
    serde_json::json!({})
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            options: default_options(),
            random_seed: Some(seed),
        }
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(|v| v.as_u64())
    }
}

/// Match-level bookkeeping common to all game types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub id: String,
    pub game_type: String,
    pub status: MatchStatus,
    #[serde(default)]
    pub current_player_id: Option<PlayerId>,
    #[serde(default)]
    pub move_count: u32,
    #[serde(default)]
    pub settings: GameConfig,
    #[serde(default)]
    pub players: Vec<Player>,
    pub min_players: u32,
    pub max_players: u32,
    #[serde(default)]
    pub winner_id: Option<PlayerId>,
}

/// Outcome of a move or configuration check. Rule violations are expected,
/// so they travel as data rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self { valid: true, error: None }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
        }
    }

    pub fn from_error(error: Option<String>) -> Self {
        match error {
            None => Self::ok(),
            Some(reason) => Self::invalid(reason),
        }
    }
}

/// Display-oriented projection of a board state, consumed by renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    pub game_type: String,
    /// Row-major cells, top row first. Absent for card games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<Vec<Option<char>>>>,
    /// Square names (or seat labels) worth emphasizing.
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default = "default_options")]
    pub summary: serde_json::Value,
}

/// Registry metadata for one game type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTypeInfo {
    pub game_type: String,
    pub name: String,
    pub description: String,
    pub min_players: u32,
    pub max_players: u32,
}
