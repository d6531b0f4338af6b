//! Board geometry and move notation for chess.
//!
//! The grid is stored top row first (rank 8 at index 0), matching FEN
//! piece placement order. Uppercase symbols are white, lowercase black.

use std::fmt;

pub const BOARD_SIZE: usize = 8;
pub const INITIAL_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

pub type Grid = [[Option<char>; BOARD_SIZE]; BOARD_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    /// 0 = a-file
    pub file: u8,
    /// 0 = rank 1
    pub rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if (file as usize) < BOARD_SIZE && (rank as usize) < BOARD_SIZE {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// Parse "e4"-style names.
    pub fn parse(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        Self::from_bytes(bytes[0], bytes[1])
    }

    fn from_bytes(file: u8, rank: u8) -> Option<Self> {
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Self::new(file - b'a', rank - b'1')
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        if file < 0 || rank < 0 {
            return None;
        }
        Self::new(file as u8, rank as u8)
    }

    fn row(self) -> usize {
        BOARD_SIZE - 1 - self.rank as usize
    }

    fn col(self) -> usize {
        self.file as usize
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE as u8).flat_map(|rank| (0..BOARD_SIZE as u8).map(move |file| Square { file, rank }))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

pub fn piece_at(grid: &Grid, sq: Square) -> Option<char> {
    grid[sq.row()][sq.col()]
}

pub fn set_piece(grid: &mut Grid, sq: Square, piece: Option<char>) {
    grid[sq.row()][sq.col()] = piece;
}

/// Build a grid from the piece-placement field of a FEN string.
pub fn grid_from_placement(placement: &str) -> Option<Grid> {
    let mut grid: Grid = [[None; BOARD_SIZE]; BOARD_SIZE];
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != BOARD_SIZE {
        return None;
    }
    for (r, row) in rows.iter().enumerate() {
        let mut c = 0usize;
        for ch in row.chars() {
            if let Some(skip) = ch.to_digit(10) {
                c += skip as usize;
            } else {
                PieceKind::from_symbol(ch)?;
                if c >= BOARD_SIZE {
                    return None;
                }
                grid[r][c] = Some(ch);
                c += 1;
            }
        }
        if c != BOARD_SIZE {
            return None;
        }
    }
    Some(grid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    pub fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'K' => Some(Self::King),
            b'Q' => Some(Self::Queen),
            b'R' => Some(Self::Rook),
            b'B' => Some(Self::Bishop),
            b'N' => Some(Self::Knight),
            b'P' => Some(Self::Pawn),
            _ => None,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        if !symbol.is_ascii() {
            return None;
        }
        Self::from_letter(symbol.to_ascii_uppercase() as u8)
    }

    pub fn symbol(self, white: bool) -> char {
        let upper = match self {
            Self::King => 'K',
            Self::Queen => 'Q',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Knight => 'N',
            Self::Pawn => 'P',
        };
        if white {
            upper
        } else {
            upper.to_ascii_lowercase()
        }
    }
}

pub fn is_white(symbol: char) -> bool {
    symbol.is_ascii_uppercase()
}

/// Whether the piece's movement pattern covers `from -> to`.
///
/// Pure geometry: blocking pieces are not considered, and pawns are
/// always accepted (callers pick pawn sources explicitly).
pub fn can_reach(kind: PieceKind, from: Square, to: Square) -> bool {
    let df = (to.file as i8 - from.file as i8).abs();
    let dr = (to.rank as i8 - from.rank as i8).abs();
    if df == 0 && dr == 0 {
        return false;
    }
    match kind {
        PieceKind::Knight => (df == 1 && dr == 2) || (df == 2 && dr == 1),
        PieceKind::Bishop => df == dr,
        PieceKind::Rook => df == 0 || dr == 0,
        PieceKind::Queen => df == dr || df == 0 || dr == 0,
        PieceKind::King => df <= 1 && dr <= 1,
        PieceKind::Pawn => true,
    }
}

/// A parsed move string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notation {
    /// `e2-e4`
    Coordinate { from: Square, to: Square },
    /// `Nf3`, `Bxd7`, `exd5`, `Nbd7`
    Algebraic {
        piece: PieceKind,
        file_hint: Option<u8>,
        rank_hint: Option<u8>,
        capture: bool,
        to: Square,
    },
}

impl Notation {
    pub fn destination(&self) -> Square {
        match self {
            Self::Coordinate { to, .. } | Self::Algebraic { to, .. } => *to,
        }
    }
}

/// Parse coordinate or algebraic notation. Castling (`O-O`) is not
/// recognised. A trailing `+`/`#` and an `=Q`-style suffix are accepted
/// but carry no meaning.
pub fn parse_notation(text: &str) -> Result<Notation, String> {
    let invalid = || format!("Invalid move notation: {text}");
    if !text.is_ascii() {
        return Err(invalid());
    }
    let bytes = text.as_bytes();

    if bytes.len() == 5 && bytes[2] == b'-' {
        let from = Square::from_bytes(bytes[0], bytes[1]).ok_or_else(invalid)?;
        let to = Square::from_bytes(bytes[3], bytes[4]).ok_or_else(invalid)?;
        return Ok(Notation::Coordinate { from, to });
    }

    let mut body = text.trim_end_matches(['+', '#']).as_bytes();
    if body.len() >= 2 && body[body.len() - 2] == b'=' {
        match body[body.len() - 1] {
            b'Q' | b'R' | b'B' | b'N' => body = &body[..body.len() - 2],
            _ => return Err(invalid()),
        }
    }

    let piece = match body.first().and_then(|&b| PieceKind::from_letter(b)) {
        Some(kind) if kind != PieceKind::Pawn => {
            body = &body[1..];
            kind
        }
        _ => PieceKind::Pawn,
    };

    if body.len() < 2 {
        return Err(invalid());
    }
    let to = Square::from_bytes(body[body.len() - 2], body[body.len() - 1]).ok_or_else(invalid)?;
    let mut prefix = &body[..body.len() - 2];

    let capture = prefix.last() == Some(&b'x');
    if capture {
        prefix = &prefix[..prefix.len() - 1];
    }

    let mut file_hint = None;
    let mut rank_hint = None;
    if let Some(&b) = prefix.first() {
        if (b'a'..=b'h').contains(&b) {
            file_hint = Some(b - b'a');
            prefix = &prefix[1..];
        }
    }
    if let Some(&b) = prefix.first() {
        if (b'1'..=b'8').contains(&b) {
            rank_hint = Some(b - b'1');
            prefix = &prefix[1..];
        }
    }
    if !prefix.is_empty() {
        return Err(invalid());
    }

    Ok(Notation::Algebraic {
        piece,
        file_hint,
        rank_hint,
        capture,
        to,
    })
}
