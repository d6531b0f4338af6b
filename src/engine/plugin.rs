//! GameEngine traits — the interface every game type must implement.
//!
//! Games implement [`TypedGameEngine`] against their own state and move
//! types. The registry and match instances talk to them through the
//! object-safe [`GameEngine`] trait, which works on `serde_json::Value`
//! board states; [`JsonAdapter`] bridges the two.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::errors::GameError;
use crate::engine::models::*;

/// Strongly-typed engine for one game type.
///
/// Engines are stateless rule books: every method takes the board state it
/// operates on and `apply_move` produces a fresh state rather than mutating
/// its input.
pub trait TypedGameEngine: Send + Sync {
    type State: Clone + Serialize + DeserializeOwned + Send + Sync;
    type Move: Serialize + DeserializeOwned + Send + Sync;

    const GAME_TYPE: &'static str;
    const GAME_TYPE_NAME: &'static str;
    const GAME_DESCRIPTION: &'static str;
    const MIN_PLAYERS: u32;
    const MAX_PLAYERS: u32;
    const AVAILABLE_COLORS: &'static [&'static str];

    /// Fresh starting state.
    fn initial_state(&self, config: &GameConfig) -> Self::State;

    /// Check a move against the rules. Returns None if valid, Some(reason) if not.
    /// Must not mutate anything and must not panic on odd input.
    fn validate_move(
        &self,
        state: &Self::State,
        mv: &Self::Move,
        player_id: &str,
        players: &[Player],
    ) -> Option<String>;

    /// Apply a previously validated move, returning the new state.
    fn apply_move(
        &self,
        state: &Self::State,
        mv: &Self::Move,
        player_id: &str,
        players: &[Player],
    ) -> Result<Self::State, GameError>;

    fn is_game_complete(&self, state: &Self::State) -> bool;

    /// Winning player, or None while the game runs or when nobody wins.
    fn winner(&self, state: &Self::State, players: &[Player]) -> Option<PlayerId>;

    fn render_board(&self, state: &Self::State) -> RenderData;

    /// Moves `player_id` could legally submit right now.
    fn valid_moves(
        &self,
        state: &Self::State,
        player_id: &str,
        players: &[Player],
    ) -> Vec<Self::Move>;

    /// Player the board state says must act next, for games that track it
    /// themselves. None hands the decision to the circular turn order.
    fn expected_player(&self, _state: &Self::State, _players: &[Player]) -> Option<PlayerId> {
        None
    }

    /// Whether the match-level turn guard applies to the next move.
    /// Games with simultaneous phases return false while such a phase runs.
    fn enforces_turn_order(&self, _state: &Self::State) -> bool {
        true
    }

    /// Reject per-match options this engine cannot play with.
    fn check_config(&self, _config: &GameConfig) -> Result<(), GameError> {
        Ok(())
    }

    fn decode_state(&self, board_state: &serde_json::Value) -> Result<Self::State, GameError> {
        serde_json::from_value(board_state.clone()).map_err(GameError::from)
    }

    fn encode_state(&self, state: &Self::State) -> Result<serde_json::Value, GameError> {
        serde_json::to_value(state).map_err(GameError::from)
    }

    fn decode_move(&self, mv: &serde_json::Value) -> Result<Self::Move, GameError> {
        serde_json::from_value(mv.clone()).map_err(|e| GameError::MoveFormat(e.to_string()))
    }
}

/// Object-safe engine view used at the registry / match boundary.
pub trait GameEngine: Send + Sync {
    fn game_type(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;
    fn min_players(&self) -> u32;
    fn max_players(&self) -> u32;
    fn available_colors(&self) -> &[&'static str];

    fn initial_board_state(&self, config: &GameConfig) -> Result<serde_json::Value, GameError>;

    fn check_config(&self, config: &GameConfig) -> Result<(), GameError>;

    /// Fails with `StateFormat` unless the engine can decode `board_state`.
    fn check_board_state(&self, board_state: &serde_json::Value) -> Result<(), GameError>;

    /// Never fails: undecodable input degrades to `valid: false`.
    fn validate_move(
        &self,
        mv: &serde_json::Value,
        player_id: &str,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Validation;

    fn apply_move(
        &self,
        mv: &serde_json::Value,
        player_id: &str,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Result<serde_json::Value, GameError>;

    fn is_game_complete(&self, board_state: &serde_json::Value) -> Result<bool, GameError>;

    fn winner(
        &self,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Result<Option<PlayerId>, GameError>;

    fn render_board(&self, board_state: &serde_json::Value) -> Result<RenderData, GameError>;

    fn valid_moves(
        &self,
        board_state: &serde_json::Value,
        player_id: &str,
        players: &[Player],
    ) -> Result<Vec<serde_json::Value>, GameError>;

    fn expected_player(
        &self,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Result<Option<PlayerId>, GameError>;

    fn enforces_turn_order(&self, board_state: &serde_json::Value) -> Result<bool, GameError>;

    fn type_info(&self) -> GameTypeInfo {
        GameTypeInfo {
            game_type: self.game_type().to_string(),
            name: self.display_name().to_string(),
            description: self.description().to_string(),
            min_players: self.min_players(),
            max_players: self.max_players(),
        }
    }
}

/// Exposes a [`TypedGameEngine`] through the JSON-based [`GameEngine`] trait.
pub struct JsonAdapter<E>(pub E);

impl<E: TypedGameEngine> GameEngine for JsonAdapter<E> {
    fn game_type(&self) -> &str {
        E::GAME_TYPE
    }
    fn display_name(&self) -> &str {
        E::GAME_TYPE_NAME
    }
    fn description(&self) -> &str {
        E::GAME_DESCRIPTION
    }
    fn min_players(&self) -> u32 {
        E::MIN_PLAYERS
    }
    fn max_players(&self) -> u32 {
        E::MAX_PLAYERS
    }
    fn available_colors(&self) -> &[&'static str] {
        E::AVAILABLE_COLORS
    }

    fn initial_board_state(&self, config: &GameConfig) -> Result<serde_json::Value, GameError> {
        self.0.encode_state(&self.0.initial_state(config))
    }

    fn check_config(&self, config: &GameConfig) -> Result<(), GameError> {
        self.0.check_config(config)
    }

    fn check_board_state(&self, board_state: &serde_json::Value) -> Result<(), GameError> {
        self.0.decode_state(board_state).map(|_| ())
    }

    fn validate_move(
        &self,
        mv: &serde_json::Value,
        player_id: &str,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Validation {
        let state = match self.0.decode_state(board_state) {
            Ok(s) => s,
            Err(e) => return Validation::invalid(e.to_string()),
        };
        let mv = match self.0.decode_move(mv) {
            Ok(m) => m,
            Err(e) => return Validation::invalid(e.to_string()),
        };
        Validation::from_error(self.0.validate_move(&state, &mv, player_id, players))
    }

    fn apply_move(
        &self,
        mv: &serde_json::Value,
        player_id: &str,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Result<serde_json::Value, GameError> {
        let state = self.0.decode_state(board_state)?;
        let mv = self.0.decode_move(mv)?;
        let next = self.0.apply_move(&state, &mv, player_id, players)?;
        self.0.encode_state(&next)
    }

    fn is_game_complete(&self, board_state: &serde_json::Value) -> Result<bool, GameError> {
        Ok(self.0.is_game_complete(&self.0.decode_state(board_state)?))
    }

    fn winner(
        &self,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Result<Option<PlayerId>, GameError> {
        Ok(self.0.winner(&self.0.decode_state(board_state)?, players))
    }

    fn render_board(&self, board_state: &serde_json::Value) -> Result<RenderData, GameError> {
        Ok(self.0.render_board(&self.0.decode_state(board_state)?))
    }

    fn valid_moves(
        &self,
        board_state: &serde_json::Value,
        player_id: &str,
        players: &[Player],
    ) -> Result<Vec<serde_json::Value>, GameError> {
        let state = self.0.decode_state(board_state)?;
        self.0
            .valid_moves(&state, player_id, players)
            .iter()
            .map(|m| serde_json::to_value(m).map_err(|e| GameError::MoveFormat(e.to_string())))
            .collect()
    }

    fn expected_player(
        &self,
        board_state: &serde_json::Value,
        players: &[Player],
    ) -> Result<Option<PlayerId>, GameError> {
        Ok(self.0.expected_player(&self.0.decode_state(board_state)?, players))
    }

    fn enforces_turn_order(&self, board_state: &serde_json::Value) -> Result<bool, GameError> {
        Ok(self.0.enforces_turn_order(&self.0.decode_state(board_state)?))
    }
}

/// Text form of a board state, as persisted between moves.
pub fn serialize_board_state(board_state: &serde_json::Value) -> Result<String, GameError> {
    serde_json::to_string(board_state).map_err(GameError::from)
}

/// Parse a persisted board state. Unparseable text is a format error.
pub fn deserialize_board_state(text: &str) -> Result<serde_json::Value, GameError> {
    serde_json::from_str(text).map_err(GameError::from)
}
