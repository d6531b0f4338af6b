//! CheckersEngine — implements TypedGameEngine for checkers.
//!
//! `must_capture` and `chain_capture` are part of the persisted state shape
//! but are NOT enforced: forced captures and multi-jump chains are not
//! required by validation, and both flags are cleared after every move.

use serde::{Deserialize, Serialize};

use crate::engine::errors::GameError;
use crate::engine::models::*;
use crate::engine::plugin::TypedGameEngine;
use crate::engine::turns;

use super::board::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckersState {
    pub board: Grid,
    #[serde(default)]
    pub must_capture: bool,
    #[serde(default)]
    pub chain_capture: Option<String>,
}

impl CheckersState {
    pub fn new() -> Self {
        Self {
            board: initial_grid(),
            must_capture: false,
            chain_capture: None,
        }
    }
}

impl Default for CheckersState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CheckersEngine;

impl CheckersEngine {
    /// Piece letter for a seat colour: "white" -> 'w', "black" -> 'b'.
    fn side_of(players: &[Player], player_id: &str) -> Option<char> {
        turns::player_color(players, player_id).and_then(|c| c.chars().next())
    }

    /// Row direction men of this side move in: white toward row 0, black toward row 7.
    fn forward(side: char) -> i32 {
        if side == 'w' {
            -1
        } else {
            1
        }
    }

    fn promotion_row(side: char) -> usize {
        if side == 'w' {
            0
        } else {
            BOARD_SIZE - 1
        }
    }

    fn check(state: &CheckersState, mv: &CheckersMove, side: char) -> Option<String> {
        if !mv.to.is_dark() {
            return Some("Pieces can only move to dark squares".into());
        }
        let piece = match piece_at(&state.board, mv.from) {
            Some(p) => p,
            None => return Some(format!("No piece at {}", mv.from)),
        };
        if owner(piece) != side {
            return Some(format!("The piece at {} is not yours", mv.from));
        }
        if piece_at(&state.board, mv.to).is_some() {
            return Some(format!("Square {} is occupied", mv.to));
        }

        let dr = mv.to.row as i32 - mv.from.row as i32;
        let dc = mv.to.col as i32 - mv.from.col as i32;
        if dr.abs() != dc.abs() {
            return Some("Moves must be diagonal".into());
        }

        match mv.kind {
            MoveKind::Simple => {
                if dr.abs() != 1 {
                    return Some("Simple moves go exactly one square".into());
                }
                if !is_king(piece) && dr != Self::forward(side) {
                    return Some("Only kings can move backwards".into());
                }
            }
            MoveKind::Capture => {
                if dr.abs() != 2 {
                    return Some("Captures must jump exactly two squares".into());
                }
                let Some(mid) = mv.from.offset(dr / 2, dc / 2) else {
                    return Some("Capture jumps off the board".into());
                };
                match piece_at(&state.board, mid) {
                    Some(p) if owner(p) != side => {}
                    _ => return Some(format!("No opposing piece to capture at {mid}")),
                }
            }
        }
        None
    }

    fn candidate_moves(from: Pos) -> impl Iterator<Item = CheckersMove> {
        [(-1, -1), (-1, 1), (1, -1), (1, 1)]
            .into_iter()
            .flat_map(move |(dr, dc)| {
                let simple = from.offset(dr, dc).map(|to| CheckersMove {
                    from,
                    to,
                    kind: MoveKind::Simple,
                });
                let jump = from.offset(2 * dr, 2 * dc).map(|to| CheckersMove {
                    from,
                    to,
                    kind: MoveKind::Capture,
                });
                simple.into_iter().chain(jump)
            })
    }
}

impl TypedGameEngine for CheckersEngine {
    type State = CheckersState;
    type Move = String;

    const GAME_TYPE: &'static str = "checkers";
    const GAME_TYPE_NAME: &'static str = "Checkers";
    const GAME_DESCRIPTION: &'static str =
        "Two-player draughts on the dark squares of an 8x8 board; capture every opposing piece to win.";
    const MIN_PLAYERS: u32 = 2;
    const MAX_PLAYERS: u32 = 2;
    const AVAILABLE_COLORS: &'static [&'static str] = &["white", "black"];

    fn initial_state(&self, _config: &GameConfig) -> CheckersState {
        CheckersState::new()
    }

    fn validate_move(
        &self,
        state: &CheckersState,
        mv: &String,
        player_id: &str,
        players: &[Player],
    ) -> Option<String> {
        let parsed = match parse_move(mv) {
            Ok(m) => m,
            Err(NotationError::Malformed) => {
                return Some(format!(
                    "Invalid move format: {mv}. Use notation like 'c3-d4' or 'a3xc5'"
                ))
            }
            Err(NotationError::OffBoard) => return Some(format!("Move {mv} is off the board")),
        };
        let side = match Self::side_of(players, player_id) {
            Some(s) => s,
            None => return Some(format!("Player {player_id} is not in this game")),
        };
        Self::check(state, &parsed, side)
    }

    fn apply_move(
        &self,
        state: &CheckersState,
        mv: &String,
        _player_id: &str,
        _players: &[Player],
    ) -> Result<CheckersState, GameError> {
        let parsed = parse_move(mv).map_err(|_| GameError::MoveFormat(mv.clone()))?;
        let piece = piece_at(&state.board, parsed.from)
            .ok_or_else(|| GameError::IllegalMove(format!("no piece at {}", parsed.from)))?;

        let mut s = state.clone();
        set_piece(&mut s.board, parsed.from, None);

        let mut captured = None;
        if parsed.kind == MoveKind::Capture {
            let dr = (parsed.to.row as i32 - parsed.from.row as i32) / 2;
            let dc = (parsed.to.col as i32 - parsed.from.col as i32) / 2;
            let mid = parsed
                .from
                .offset(dr, dc)
                .ok_or_else(|| GameError::IllegalMove(format!("no square between {mv}")))?;
            set_piece(&mut s.board, mid, None);
            captured = Some(mid);
        }

        let side = owner(piece);
        let landed = if !is_king(piece) && parsed.to.row == Self::promotion_row(side) {
            piece.to_ascii_uppercase()
        } else {
            piece
        };
        set_piece(&mut s.board, parsed.to, Some(landed));

        s.must_capture = false;
        s.chain_capture = None;

        tracing::debug!(
            mv = %mv,
            captured = ?captured.map(|p| p.to_string()),
            crowned = landed != piece,
            "checkers move applied"
        );
        Ok(s)
    }

    fn is_game_complete(&self, state: &CheckersState) -> bool {
        count_pieces(&state.board, 'w') == 0 || count_pieces(&state.board, 'b') == 0
    }

    fn winner(&self, state: &CheckersState, players: &[Player]) -> Option<PlayerId> {
        let white = count_pieces(&state.board, 'w');
        let black = count_pieces(&state.board, 'b');
        let surviving = match (white, black) {
            (0, 0) => return None,
            (_, 0) => 'w',
            (0, _) => 'b',
            _ => return None,
        };
        players
            .iter()
            .find(|p| p.color.starts_with(surviving))
            .map(|p| p.user_id.clone())
    }

    fn render_board(&self, state: &CheckersState) -> RenderData {
        // Display top row first: rank 8 down to rank 1.
        let grid = state.board.iter().rev().map(|row| row.to_vec()).collect();
        let mut highlights: Vec<String> = Vec::new();
        for (row, cells) in state.board.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_some_and(is_king) {
                    highlights.push(Pos { row, col }.to_string());
                }
            }
        }
        highlights.extend(state.chain_capture.clone());
        RenderData {
            game_type: Self::GAME_TYPE.into(),
            grid: Some(grid),
            highlights,
            annotations: vec![
                format!("White pieces: {}", count_pieces(&state.board, 'w')),
                format!("Black pieces: {}", count_pieces(&state.board, 'b')),
            ],
            summary: serde_json::json!({
                "must_capture": state.must_capture,
                "chain_capture": state.chain_capture,
            }),
        }
    }

    fn valid_moves(&self, state: &CheckersState, player_id: &str, players: &[Player]) -> Vec<String> {
        let Some(side) = Self::side_of(players, player_id) else {
            return vec![];
        };
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let from = Pos { row, col };
                if !piece_at(&state.board, from).is_some_and(|p| owner(p) == side) {
                    continue;
                }
                moves.extend(
                    Self::candidate_moves(from)
                        .filter(|mv| Self::check(state, mv, side).is_none())
                        .map(|mv| mv.to_string()),
                );
            }
        }
        moves
    }
}
