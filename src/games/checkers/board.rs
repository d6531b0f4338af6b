//! Checkers board geometry and move notation.
//!
//! Rows are indexed from rank 1 (row 0) to rank 8 (row 7). Dark squares are
//! those where row + column is even, so a1 is dark. Men are `w`/`b`, kings
//! the uppercase symbol.

use std::fmt;

pub const BOARD_SIZE: usize = 8;

pub type Grid = [[Option<char>; BOARD_SIZE]; BOARD_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    pub fn offset(self, dr: i32, dc: i32) -> Option<Pos> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        let range = 0..BOARD_SIZE as i32;
        (range.contains(&row) && range.contains(&col)).then(|| Pos {
            row: row as usize,
            col: col as usize,
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col as u8) as char, self.row + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Simple,
    Capture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckersMove {
    pub from: Pos,
    pub to: Pos,
    pub kind: MoveKind,
}

impl fmt::Display for CheckersMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = match self.kind {
            MoveKind::Simple => '-',
            MoveKind::Capture => 'x',
        };
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// Not of the `c3-d4` / `c3xe5` shape.
    Malformed,
    /// Right shape, but a square lies outside a-h / 1-8.
    OffBoard,
}

fn parse_square(file: u8, rank: u8) -> Result<Pos, NotationError> {
    if !file.is_ascii_lowercase() || !rank.is_ascii_digit() {
        return Err(NotationError::Malformed);
    }
    if file > b'h' || !(b'1'..=b'8').contains(&rank) {
        return Err(NotationError::OffBoard);
    }
    Ok(Pos {
        row: (rank - b'1') as usize,
        col: (file - b'a') as usize,
    })
}

/// Parse `<file><rank>-<file><rank>` (simple) or `...x...` (capture).
pub fn parse_move(text: &str) -> Result<CheckersMove, NotationError> {
    let bytes = text.as_bytes();
    if bytes.len() != 5 {
        return Err(NotationError::Malformed);
    }
    let kind = match bytes[2] {
        b'-' => MoveKind::Simple,
        b'x' => MoveKind::Capture,
        _ => return Err(NotationError::Malformed),
    };
    let from = parse_square(bytes[0], bytes[1])?;
    let to = parse_square(bytes[3], bytes[4])?;
    Ok(CheckersMove { from, to, kind })
}

pub fn piece_at(grid: &Grid, pos: Pos) -> Option<char> {
    grid[pos.row][pos.col]
}

pub fn set_piece(grid: &mut Grid, pos: Pos, piece: Option<char>) {
    grid[pos.row][pos.col] = piece;
}

pub fn is_king(piece: char) -> bool {
    piece.is_ascii_uppercase()
}

/// Lowercase owner letter of a piece symbol (`w` or `b`).
pub fn owner(piece: char) -> char {
    piece.to_ascii_lowercase()
}

/// Standard opening layout: black men on rows 0-2, white men on rows 5-7.
pub fn initial_grid() -> Grid {
    let mut grid: Grid = [[None; BOARD_SIZE]; BOARD_SIZE];
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let pos = Pos { row, col };
            if !pos.is_dark() {
                continue;
            }
            if row < 3 {
                grid[row][col] = Some('b');
            } else if row >= BOARD_SIZE - 3 {
                grid[row][col] = Some('w');
            }
        }
    }
    grid
}

pub fn count_pieces(grid: &Grid, side: char) -> usize {
    grid.iter()
        .flatten()
        .filter(|cell| cell.is_some_and(|p| owner(p) == side))
        .count()
}
