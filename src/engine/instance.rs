//! One running match: roster, turn pointer and board state, driven through
//! a shared [`GameEngine`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::errors::GameError;
use crate::engine::models::*;
use crate::engine::plugin::{deserialize_board_state, serialize_board_state, GameEngine};
use crate::engine::turns;

/// Parameters for a fresh match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGame {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub settings: GameConfig,
    /// Starting board; generated by the engine when absent.
    #[serde(default)]
    pub board_state: Option<serde_json::Value>,
}

impl NewGame {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_settings(mut self, settings: GameConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_board_state(mut self, board_state: serde_json::Value) -> Self {
        self.board_state = Some(board_state);
        self
    }
}

/// Persisted form of a match. The board state travels as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_state: MatchState,
    pub board_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The move broke a rule; nothing changed.
    Rejected { reason: String },
    Applied {
        completed: bool,
        winner: Option<PlayerId>,
    },
}

pub struct GameInstance {
    state: MatchState,
    board_state: serde_json::Value,
    engine: Arc<dyn GameEngine>,
}

impl GameInstance {
    /// Build a waiting match. Player bounds always come from the engine.
    pub fn create(engine: Arc<dyn GameEngine>, params: NewGame) -> Result<Self, GameError> {
        engine.check_config(&params.settings)?;
        let board_state = match params.board_state {
            Some(board) => {
                engine.check_board_state(&board)?;
                board
            }
            None => engine.initial_board_state(&params.settings)?,
        };
        let state = MatchState {
            id: params.id,
            game_type: engine.game_type().to_string(),
            status: MatchStatus::Waiting,
            current_player_id: None,
            move_count: 0,
            settings: params.settings,
            players: Vec::new(),
            min_players: engine.min_players(),
            max_players: engine.max_players(),
            winner_id: None,
        };
        tracing::info!(match_id = %state.id, game_type = %state.game_type, "match created");
        Ok(Self {
            state,
            board_state,
            engine,
        })
    }

    /// Rebuild a match from its persisted form.
    pub fn restore(engine: Arc<dyn GameEngine>, snapshot: MatchSnapshot) -> Result<Self, GameError> {
        if snapshot.match_state.game_type != engine.game_type() {
            return Err(GameError::StateFormat(format!(
                "snapshot is for {}, engine plays {}",
                snapshot.match_state.game_type,
                engine.game_type()
            )));
        }
        let board_state = deserialize_board_state(&snapshot.board_state)?;
        engine.check_board_state(&board_state)?;
        Ok(Self {
            state: snapshot.match_state,
            board_state,
            engine,
        })
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn board_state(&self) -> &serde_json::Value {
        &self.board_state
    }

    pub fn engine(&self) -> &dyn GameEngine {
        self.engine.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    /// Seat a new player at the next `player_order`, with the matching colour.
    pub fn join(&mut self, user_id: &str, username: &str) -> Result<&Player, GameError> {
        if self.state.players.iter().any(|p| p.user_id == user_id) {
            return Err(GameError::AlreadyJoined(user_id.to_string()));
        }
        if !turns::can_join(&self.state) {
            return Err(GameError::CannotJoin);
        }
        let player_order = self.state.players.len() as u32 + 1;
        let player = Player {
            user_id: user_id.to_string(),
            username: username.to_string(),
            color: turns::assign_color(self.engine.available_colors(), player_order),
            player_order,
        };
        tracing::debug!(match_id = %self.state.id, user_id, player_order, color = %player.color, "player joined");
        self.state.players.push(player);
        let idx = self.state.players.len() - 1;
        Ok(&self.state.players[idx])
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        if self.state.status != MatchStatus::Waiting {
            return Err(GameError::AlreadyStarted(self.state.status));
        }
        let have = self.state.players.len() as u32;
        if have < self.state.min_players {
            return Err(GameError::NotEnoughPlayers {
                min: self.state.min_players,
                have,
            });
        }
        self.state.status = MatchStatus::Active;
        self.state.current_player_id = match self
            .engine
            .expected_player(&self.board_state, &self.state.players)?
        {
            Some(pid) => Some(pid),
            None => turns::turn_order(&self.state.players)
                .first()
                .map(|p| p.user_id.clone()),
        };
        tracing::info!(
            match_id = %self.state.id,
            players = have,
            current = ?self.state.current_player_id,
            "match started"
        );
        Ok(())
    }

    /// Validate and apply one move.
    ///
    /// Rule violations come back as `MoveOutcome::Rejected`; only match-level
    /// guard failures and undecodable state are errors.
    pub fn submit_move(
        &mut self,
        player_id: &str,
        mv: &serde_json::Value,
    ) -> Result<MoveOutcome, GameError> {
        if self.state.status != MatchStatus::Active {
            return Err(GameError::NotActive(self.state.status));
        }
        if self.engine.enforces_turn_order(&self.board_state)? {
            turns::validate_turn(&self.state, player_id)?;
        } else if !self.state.players.iter().any(|p| p.user_id == player_id) {
            return Err(GameError::UnknownPlayer(player_id.to_string()));
        }

        let validation = self
            .engine
            .validate_move(mv, player_id, &self.board_state, &self.state.players);
        if !validation.valid {
            let reason = validation.error.unwrap_or_else(|| "invalid move".into());
            tracing::debug!(match_id = %self.state.id, player_id, %reason, "move rejected");
            return Ok(MoveOutcome::Rejected { reason });
        }

        self.board_state =
            self.engine
                .apply_move(mv, player_id, &self.board_state, &self.state.players)?;
        self.state.move_count += 1;

        let players = &self.state.players;
        self.state.current_player_id = match self.engine.expected_player(&self.board_state, players)? {
            Some(pid) => Some(pid),
            None => turns::next_player(players, player_id).map(|p| p.user_id.clone()),
        };

        let completed = self.engine.is_game_complete(&self.board_state)?;
        if completed {
            self.state.status = MatchStatus::Completed;
            self.state.winner_id = self.engine.winner(&self.board_state, players)?;
            self.state.current_player_id = None;
            tracing::info!(
                match_id = %self.state.id,
                moves = self.state.move_count,
                winner = ?self.state.winner_id,
                "match completed"
            );
        }

        Ok(MoveOutcome::Applied {
            completed,
            winner: self.state.winner_id.clone(),
        })
    }

    pub fn valid_moves(&self, player_id: &str) -> Result<Vec<serde_json::Value>, GameError> {
        self.engine
            .valid_moves(&self.board_state, player_id, &self.state.players)
    }

    pub fn render(&self) -> Result<RenderData, GameError> {
        self.engine.render_board(&self.board_state)
    }

    pub fn snapshot(&self) -> Result<MatchSnapshot, GameError> {
        Ok(MatchSnapshot {
            match_state: self.state.clone(),
            board_state: serialize_board_state(&self.board_state)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::plugin::JsonAdapter;
    use crate::games::checkers::CheckersEngine;
    use crate::games::chess::ChessEngine;
    use crate::games::hearts::HeartsEngine;

    fn chess_match() -> GameInstance {
        let mut game =
            GameInstance::create(Arc::new(JsonAdapter(ChessEngine)), NewGame::new("m1")).unwrap();
        game.join("alice", "Alice").unwrap();
        game.join("bob", "Bob").unwrap();
        game
    }

    #[test]
    fn test_join_assigns_order_and_colour() {
        let game = chess_match();
        let players = game.players();
        assert_eq!(players[0].player_order, 1);
        assert_eq!(players[0].color, "white");
        assert_eq!(players[1].player_order, 2);
        assert_eq!(players[1].color, "black");
        assert_eq!(game.state().min_players, 2);
        assert_eq!(game.state().max_players, 2);
    }

    #[test]
    fn test_join_guards() {
        let mut game = chess_match();
        assert!(matches!(game.join("alice", "Again"), Err(GameError::AlreadyJoined(_))));
        assert!(matches!(game.join("carol", "Carol"), Err(GameError::CannotJoin)));
    }

    #[test]
    fn test_start_requires_min_players() {
        let mut game =
            GameInstance::create(Arc::new(JsonAdapter(ChessEngine)), NewGame::new("m2")).unwrap();
        game.join("alice", "Alice").unwrap();
        assert!(matches!(
            game.start(),
            Err(GameError::NotEnoughPlayers { min: 2, have: 1 })
        ));
        game.join("bob", "Bob").unwrap();
        game.start().unwrap();
        assert_eq!(game.state().status, MatchStatus::Active);
        assert_eq!(game.state().current_player_id.as_deref(), Some("alice"));
        assert!(matches!(game.start(), Err(GameError::AlreadyStarted(MatchStatus::Active))));
        assert!(matches!(game.join("carol", "Carol"), Err(GameError::CannotJoin)));
    }

    #[test]
    fn test_submit_move_flow() {
        let mut game = chess_match();
        assert!(matches!(
            game.submit_move("alice", &json!("e2-e4")),
            Err(GameError::NotActive(MatchStatus::Waiting))
        ));
        game.start().unwrap();

        assert!(matches!(
            game.submit_move("bob", &json!("e7-e5")),
            Err(GameError::NotYourTurn { .. })
        ));
        assert!(matches!(
            game.submit_move("mallory", &json!("e2-e4")),
            Err(GameError::UnknownPlayer(_))
        ));

        let outcome = game.submit_move("alice", &json!("castle please")).unwrap();
        assert!(matches!(outcome, MoveOutcome::Rejected { ref reason } if reason.contains("Invalid move notation")));
        assert_eq!(game.state().move_count, 0);

        let outcome = game.submit_move("alice", &json!("e2-e4")).unwrap();
        assert_eq!(outcome, MoveOutcome::Applied { completed: false, winner: None });
        assert_eq!(game.state().move_count, 1);
        assert_eq!(game.state().current_player_id.as_deref(), Some("bob"));

        game.submit_move("bob", &json!("e5")).unwrap();
        assert_eq!(game.state().current_player_id.as_deref(), Some("alice"));
    }

    #[test]
    fn test_checkers_win_completes_match() {
        let mut board = vec![vec![serde_json::Value::Null; 8]; 8];
        board[2][2] = json!("w"); // c3
        board[1][1] = json!("b"); // b2
        let start = json!({"board": board, "must_capture": false, "chain_capture": null});

        let mut game = GameInstance::create(
            Arc::new(JsonAdapter(CheckersEngine)),
            NewGame::new("c1").with_board_state(start),
        )
        .unwrap();
        game.join("w", "White").unwrap();
        game.join("b", "Black").unwrap();
        game.start().unwrap();

        let outcome = game.submit_move("w", &json!("c3xa1")).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Applied {
                completed: true,
                winner: Some("w".into())
            }
        );
        assert_eq!(game.state().status, MatchStatus::Completed);
        assert_eq!(game.state().winner_id.as_deref(), Some("w"));
        assert!(matches!(
            game.submit_move("b", &json!("a1-b2")),
            Err(GameError::NotActive(MatchStatus::Completed))
        ));
    }

    #[test]
    fn test_hearts_passing_ignores_turn_order() {
        let engine = Arc::new(JsonAdapter(HeartsEngine::default()));
        let mut game = GameInstance::create(
            engine,
            NewGame::new("h1").with_settings(GameConfig::with_seed(77)),
        )
        .unwrap();
        for name in ["n", "e", "s", "w"] {
            game.join(name, name).unwrap();
        }
        game.start().unwrap();
        assert_eq!(game.state().current_player_id.as_deref(), Some("n"));

        // The last seat may pass first.
        let hand = game.board_state()["hands"][3].as_array().unwrap().clone();
        let pass = json!({"type": "pass", "cards": [hand[0], hand[1], hand[2]]});
        let outcome = game.submit_move("w", &pass).unwrap();
        assert!(matches!(outcome, MoveOutcome::Applied { completed: false, .. }));
        assert_eq!(game.state().current_player_id.as_deref(), Some("n"));

        let bad = json!({"type": "pass", "cards": [hand[0]]});
        let outcome = game.submit_move("n", &bad).unwrap();
        assert!(matches!(outcome, MoveOutcome::Rejected { .. }));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut game = chess_match();
        game.start().unwrap();
        game.submit_move("alice", &json!("Nf3")).unwrap();

        let snapshot = game.snapshot().unwrap();
        let restored =
            GameInstance::restore(Arc::new(JsonAdapter(ChessEngine)), snapshot.clone()).unwrap();
        assert_eq!(restored.state(), game.state());
        assert_eq!(restored.board_state(), game.board_state());
        assert_eq!(restored.snapshot().unwrap(), snapshot);

        let wrong = GameInstance::restore(Arc::new(JsonAdapter(CheckersEngine)), snapshot);
        assert!(matches!(wrong, Err(GameError::StateFormat(_))));
    }

    #[test]
    fn test_restore_rejects_bad_board_text() {
        let game = chess_match();
        let mut snapshot = game.snapshot().unwrap();
        snapshot.board_state = "{{ definitely not json".into();
        let restored = GameInstance::restore(Arc::new(JsonAdapter(ChessEngine)), snapshot);
        assert!(matches!(restored, Err(GameError::StateFormat(_))));
    }

    #[test]
    fn test_restore_rejects_board_the_engine_cannot_read() {
        let game = chess_match();
        let mut snapshot = game.snapshot().unwrap();
        snapshot.board_state = r#"{"foo":1}"#.into();
        let restored = GameInstance::restore(Arc::new(JsonAdapter(ChessEngine)), snapshot);
        assert!(matches!(restored, Err(GameError::StateFormat(_))));
    }

    #[test]
    fn test_create_rejects_unreadable_board_and_bad_options() {
        let checkers = Arc::new(JsonAdapter(CheckersEngine));
        let params = NewGame::new("c2").with_board_state(serde_json::json!([1, 2, 3]));
        assert!(matches!(
            GameInstance::create(checkers, params),
            Err(GameError::StateFormat(_))
        ));

        let hearts = Arc::new(JsonAdapter(HeartsEngine::default()));
        let params = NewGame::new("h3").with_settings(GameConfig {
            options: serde_json::json!({"target_score": 4294967296u64}),
            random_seed: Some(1),
        });
        assert!(matches!(
            GameInstance::create(hearts, params),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_render_passes_through() {
        let game = chess_match();
        let render = game.render().unwrap();
        assert_eq!(render.game_type, "chess");
        assert!(render.grid.is_some());
    }
}
