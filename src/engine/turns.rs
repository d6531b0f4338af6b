//! Turn and roster bookkeeping shared by every game type.

use crate::engine::errors::GameError;
use crate::engine::models::*;

/// Players sorted by their join-time rank.
pub fn turn_order(players: &[Player]) -> Vec<&Player> {
    let mut ordered: Vec<&Player> = players.iter().collect();
    ordered.sort_by_key(|p| p.player_order);
    ordered
}

/// Circular successor of `current` in turn order. Falls back to the first
/// player when `current` is not seated.
pub fn next_player<'a>(players: &'a [Player], current: &str) -> Option<&'a Player> {
    let order = turn_order(players);
    if order.is_empty() {
        return None;
    }
    let next = match order.iter().position(|p| p.user_id == current) {
        Some(idx) => (idx + 1) % order.len(),
        None => 0,
    };
    Some(order[next])
}

/// Seat index (0-based position in turn order) of a player.
pub fn seat_of(players: &[Player], player_id: &str) -> Option<usize> {
    turn_order(players)
        .iter()
        .position(|p| p.user_id == player_id)
}

/// Player sitting at a seat index in turn order.
pub fn player_at_seat(players: &[Player], seat: usize) -> Option<&Player> {
    turn_order(players).get(seat).copied()
}

pub fn can_join(state: &MatchState) -> bool {
    state.status == MatchStatus::Waiting && (state.players.len() as u32) < state.max_players
}

/// Guard for move submission: the match must be active and `player_id`
/// must be the player whose turn it is.
pub fn validate_turn(state: &MatchState, player_id: &str) -> Result<(), GameError> {
    if state.status != MatchStatus::Active {
        return Err(GameError::NotActive(state.status));
    }
    if !state.players.iter().any(|p| p.user_id == player_id) {
        return Err(GameError::UnknownPlayer(player_id.to_string()));
    }
    match state.current_player_id.as_deref() {
        Some(current) if current == player_id => Ok(()),
        other => Err(GameError::NotYourTurn {
            expected: other.unwrap_or("nobody").to_string(),
        }),
    }
}

pub fn player_color<'a>(players: &'a [Player], player_id: &str) -> Option<&'a str> {
    players
        .iter()
        .find(|p| p.user_id == player_id)
        .map(|p| p.color.as_str())
}

/// Colour for the player joining at `player_order` (1-based). Wraps around
/// when a game declares fewer colours than seats.
pub fn assign_color(available_colors: &[&str], player_order: u32) -> String {
    if available_colors.is_empty() || player_order == 0 {
        return String::new();
    }
    let idx = (player_order as usize - 1) % available_colors.len();
    available_colors[idx].to_string()
}
