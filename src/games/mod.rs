pub mod checkers;
pub mod chess;
pub mod hearts;

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::errors::GameError;
use crate::engine::instance::{GameInstance, MatchSnapshot, NewGame};
use crate::engine::models::*;
use crate::engine::plugin::{GameEngine, JsonAdapter};
use crate::engine::settings::Settings;

use checkers::CheckersEngine;
use chess::ChessEngine;
use hearts::HeartsEngine;

/// Player-count bounds every game type must fit inside.
pub const MIN_PLAYERS_LIMIT: u32 = 1;
pub const MAX_PLAYERS_LIMIT: u32 = 10;

/// Registry of available game engines, keyed by game type.
pub struct GameRegistry {
    engines: HashMap<String, Arc<dyn GameEngine>>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::with_builtin_games()
    }
}

impl GameRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Chess, checkers and hearts with default settings.
    pub fn with_builtin_games() -> Self {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::new();
        let builtin: [Arc<dyn GameEngine>; 3] = [
            Arc::new(JsonAdapter(ChessEngine)),
            Arc::new(JsonAdapter(CheckersEngine)),
            Arc::new(JsonAdapter(HeartsEngine::new(settings.hearts.to_settings()))),
        ];
        for engine in builtin {
            if let Err(e) = registry.register(engine) {
                tracing::error!(error = %e, "built-in game failed registration");
            }
        }
        registry
    }

    /// Add an engine after checking its metadata.
    pub fn register(&mut self, engine: Arc<dyn GameEngine>) -> Result<(), GameError> {
        let game_type = engine.game_type().to_string();
        let invalid = |reason: String| GameError::InvalidEngine {
            game_type: game_type.clone(),
            reason,
        };

        if game_type.trim().is_empty() {
            return Err(invalid("missing game type".into()));
        }
        if engine.display_name().trim().is_empty() {
            return Err(invalid("missing GAME_TYPE_NAME".into()));
        }
        if engine.description().trim().is_empty() {
            return Err(invalid("missing GAME_DESCRIPTION".into()));
        }
        let (min, max) = (engine.min_players(), engine.max_players());
        if min < MIN_PLAYERS_LIMIT {
            return Err(invalid("MIN_PLAYERS must be at least 1".into()));
        }
        if min > max {
            return Err(invalid(format!("MIN_PLAYERS {min} exceeds MAX_PLAYERS {max}")));
        }
        if max > MAX_PLAYERS_LIMIT {
            return Err(invalid(format!("MAX_PLAYERS {max} exceeds {MAX_PLAYERS_LIMIT}")));
        }
        if engine.available_colors().len() < max as usize {
            return Err(invalid(format!(
                "{} colors declared for {max} players",
                engine.available_colors().len()
            )));
        }
        if self.engines.contains_key(&game_type) {
            return Err(GameError::AlreadyRegistered(game_type));
        }

        tracing::info!(game_type = %game_type, min_players = min, max_players = max, "registered game engine");
        self.engines.insert(game_type, engine);
        Ok(())
    }

    /// Remove an engine. Returns whether it was registered.
    pub fn unregister(&mut self, game_type: &str) -> bool {
        let removed = self.engines.remove(game_type).is_some();
        if removed {
            tracing::info!(game_type, "unregistered game engine");
        }
        removed
    }

    pub fn get(&self, game_type: &str) -> Option<&dyn GameEngine> {
        self.engines.get(game_type).map(|e| e.as_ref())
    }

    /// Shared handle to an engine, for callers that outlive the registry borrow.
    pub fn shared(&self, game_type: &str) -> Option<Arc<dyn GameEngine>> {
        self.engines.get(game_type).cloned()
    }

    fn engine(&self, game_type: &str) -> Result<Arc<dyn GameEngine>, GameError> {
        self.shared(game_type)
            .ok_or_else(|| GameError::UnsupportedGameType(game_type.to_string()))
    }

    pub fn is_supported(&self, game_type: &str) -> bool {
        self.engines.contains_key(game_type)
    }

    /// Metadata for every registered type, sorted by type id.
    pub fn list_game_types(&self) -> Vec<GameTypeInfo> {
        let mut infos: Vec<GameTypeInfo> = self.engines.values().map(|e| e.type_info()).collect();
        infos.sort_by(|a, b| a.game_type.cmp(&b.game_type));
        infos
    }

    pub fn game_type_info(&self, game_type: &str) -> Option<GameTypeInfo> {
        self.get(game_type).map(|e| e.type_info())
    }

    /// Check a proposed player-count configuration against the global
    /// limits and the engine's own bounds.
    pub fn validate_configuration(
        &self,
        game_type: &str,
        min_players: Option<u32>,
        max_players: Option<u32>,
    ) -> Validation {
        let Some(engine) = self.get(game_type) else {
            return Validation::invalid(GameError::UnsupportedGameType(game_type.into()).to_string());
        };
        let min = min_players.unwrap_or(engine.min_players());
        let max = max_players.unwrap_or(engine.max_players());

        if !(MIN_PLAYERS_LIMIT..=MAX_PLAYERS_LIMIT).contains(&min)
            || !(MIN_PLAYERS_LIMIT..=MAX_PLAYERS_LIMIT).contains(&max)
        {
            return Validation::invalid(format!(
                "Player counts must be between {MIN_PLAYERS_LIMIT} and {MAX_PLAYERS_LIMIT}"
            ));
        }
        if min > max {
            return Validation::invalid("Minimum players cannot exceed maximum players");
        }
        if min < engine.min_players() {
            return Validation::invalid(format!(
                "{} requires at least {} players",
                engine.display_name(),
                engine.min_players()
            ));
        }
        if max > engine.max_players() {
            return Validation::invalid(format!(
                "{} allows at most {} players",
                engine.display_name(),
                engine.max_players()
            ));
        }
        Validation::ok()
    }

    /// New waiting match of the given type. A blank id gets a random one.
    pub fn create_game(&self, game_type: &str, mut params: NewGame) -> Result<GameInstance, GameError> {
        let engine = self.engine(game_type)?;
        if params.id.is_empty() {
            params.id = format!("{game_type}-{:016x}", rand::random::<u64>());
        }
        GameInstance::create(engine, params)
    }

    /// Rebuild a persisted match with the engine for its type.
    pub fn load_game(&self, snapshot: MatchSnapshot) -> Result<GameInstance, GameError> {
        let engine = self.engine(&snapshot.match_state.game_type)?;
        GameInstance::restore(engine, snapshot)
    }
}
