//! ChessEngine — implements TypedGameEngine for chess.
//!
//! Validation is notation-level only. The engine does NOT check that the
//! source square holds the mover's piece, that the path is clear, or that
//! the named piece can legally reach the destination; check, checkmate,
//! castling and en passant are not modelled, so a game never completes on
//! its own. These are known gaps, kept visible rather than half-filled.

use serde::{Deserialize, Serialize};

use crate::engine::errors::GameError;
use crate::engine::models::*;
use crate::engine::plugin::TypedGameEngine;
use crate::engine::turns;

use super::board::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChessState {
    pub board: Grid,
    pub castling_rights: CastlingRights,
    #[serde(default)]
    pub en_passant_target: Option<String>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    #[serde(default)]
    pub last_move: Option<LastMove>,
}

impl ChessState {
    pub fn new() -> Self {
        let board = grid_from_placement(INITIAL_PLACEMENT)
            .unwrap_or([[None; BOARD_SIZE]; BOARD_SIZE]);
        Self {
            board,
            castling_rights: CastlingRights::default(),
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            last_move: None,
        }
    }
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChessEngine;

impl ChessEngine {
    fn mover_is_white(players: &[Player], player_id: &str) -> bool {
        turns::player_color(players, player_id) != Some(Self::AVAILABLE_COLORS[1])
    }

    /// Find the square the named piece moves from, for algebraic notation.
    fn resolve_source(
        state: &ChessState,
        piece: PieceKind,
        file_hint: Option<u8>,
        rank_hint: Option<u8>,
        to: Square,
        white: bool,
    ) -> Option<Square> {
        let symbol = piece.symbol(white);

        if piece == PieceKind::Pawn {
            let dir: i8 = if white { 1 } else { -1 };
            if let Some(file) = file_hint.filter(|&f| f != to.file) {
                let from = Square::new(file, to.rank)?.offset(0, -dir)?;
                return (piece_at(&state.board, from) == Some(symbol)).then_some(from);
            }
            if let Some(one) = to.offset(0, -dir) {
                if piece_at(&state.board, one) == Some(symbol) {
                    return Some(one);
                }
                let start_rank = if white { 1 } else { 6 };
                if let Some(two) = to.offset(0, -2 * dir) {
                    if two.rank == start_rank
                        && piece_at(&state.board, two) == Some(symbol)
                        && piece_at(&state.board, one).is_none()
                    {
                        return Some(two);
                    }
                }
            }
            return None;
        }

        Square::all().find(|&from| {
            piece_at(&state.board, from) == Some(symbol)
                && file_hint.map_or(true, |f| f == from.file)
                && rank_hint.map_or(true, |r| r == from.rank)
                && can_reach(piece, from, to)
        })
    }

    fn pawn_targets(state: &ChessState, from: Square, white: bool) -> Vec<Square> {
        let dir: i8 = if white { 1 } else { -1 };
        let mut targets = Vec::new();
        if let Some(one) = from.offset(0, dir) {
            if piece_at(&state.board, one).is_none() {
                targets.push(one);
                let start_rank = if white { 1 } else { 6 };
                if from.rank == start_rank {
                    if let Some(two) = from.offset(0, 2 * dir) {
                        if piece_at(&state.board, two).is_none() {
                            targets.push(two);
                        }
                    }
                }
            }
        }
        for df in [-1, 1] {
            if let Some(diag) = from.offset(df, dir) {
                if piece_at(&state.board, diag).is_some_and(|p| is_white(p) != white) {
                    targets.push(diag);
                }
            }
        }
        targets
    }
}

impl TypedGameEngine for ChessEngine {
    type State = ChessState;
    type Move = String;

    const GAME_TYPE: &'static str = "chess";
    const GAME_TYPE_NAME: &'static str = "Chess";
    const GAME_DESCRIPTION: &'static str =
        "Classic two-player chess with coordinate (e2-e4) and algebraic (Nf3) move notation.";
    const MIN_PLAYERS: u32 = 2;
    const MAX_PLAYERS: u32 = 2;
    const AVAILABLE_COLORS: &'static [&'static str] = &["white", "black"];

    fn initial_state(&self, _config: &GameConfig) -> ChessState {
        ChessState::new()
    }

    fn validate_move(
        &self,
        _state: &ChessState,
        mv: &String,
        player_id: &str,
        players: &[Player],
    ) -> Option<String> {
        if let Err(e) = parse_notation(mv) {
            return Some(e);
        }
        if !players.iter().any(|p| p.user_id == player_id) {
            return Some(format!("Player {player_id} is not in this game"));
        }
        None
    }

    fn apply_move(
        &self,
        state: &ChessState,
        mv: &String,
        player_id: &str,
        players: &[Player],
    ) -> Result<ChessState, GameError> {
        let notation = parse_notation(mv).map_err(GameError::MoveFormat)?;
        let white = Self::mover_is_white(players, player_id);

        let (from, to) = match notation {
            Notation::Coordinate { from, to } => (from, to),
            Notation::Algebraic {
                piece,
                file_hint,
                rank_hint,
                to,
                ..
            } => {
                let from = Self::resolve_source(state, piece, file_hint, rank_hint, to, white)
                    .ok_or_else(|| GameError::IllegalMove(format!("no piece can play {mv}")))?;
                (from, to)
            }
        };

        let moving = piece_at(&state.board, from)
            .ok_or_else(|| GameError::IllegalMove(format!("no piece on {from}")))?;
        let captured = piece_at(&state.board, to).is_some();

        let mut s = state.clone();
        set_piece(&mut s.board, to, Some(moving));
        set_piece(&mut s.board, from, None);

        if captured || PieceKind::from_symbol(moving) == Some(PieceKind::Pawn) {
            s.halfmove_clock = 0;
        } else {
            s.halfmove_clock += 1;
        }
        if !is_white(moving) {
            s.fullmove_number += 1;
        }
        s.en_passant_target = None;
        s.last_move = Some(LastMove {
            from: from.to_string(),
            to: to.to_string(),
        });

        tracing::debug!(mv = %mv, %from, %to, captured, "chess move applied");
        Ok(s)
    }

    fn is_game_complete(&self, _state: &ChessState) -> bool {
        false
    }

    fn winner(&self, _state: &ChessState, _players: &[Player]) -> Option<PlayerId> {
        None
    }

    fn render_board(&self, state: &ChessState) -> RenderData {
        let highlights = state
            .last_move
            .iter()
            .flat_map(|m| [m.from.clone(), m.to.clone()])
            .collect();
        RenderData {
            game_type: Self::GAME_TYPE.into(),
            grid: Some(state.board.iter().map(|row| row.to_vec()).collect()),
            highlights,
            annotations: vec![
                format!("Move {}", state.fullmove_number),
                format!("Half-move clock {}", state.halfmove_clock),
            ],
            summary: serde_json::json!({
                "castling_rights": state.castling_rights,
                "en_passant_target": state.en_passant_target,
            }),
        }
    }

    fn valid_moves(&self, state: &ChessState, player_id: &str, players: &[Player]) -> Vec<String> {
        if !players.iter().any(|p| p.user_id == player_id) {
            return vec![];
        }
        let white = Self::mover_is_white(players, player_id);
        let mut moves = Vec::new();
        for from in Square::all() {
            let Some(symbol) = piece_at(&state.board, from) else { continue };
            if is_white(symbol) != white {
                continue;
            }
            let Some(kind) = PieceKind::from_symbol(symbol) else { continue };
            let targets: Vec<Square> = if kind == PieceKind::Pawn {
                Self::pawn_targets(state, from, white)
            } else {
                Square::all()
                    .filter(|&to| can_reach(kind, from, to))
                    .filter(|&to| piece_at(&state.board, to).map_or(true, |p| is_white(p) != white))
                    .collect()
            };
            moves.extend(targets.into_iter().map(|to| format!("{from}-{to}")));
        }
        moves
    }
}
