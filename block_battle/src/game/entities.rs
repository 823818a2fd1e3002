use serde::{Deserialize, Serialize};
use std::fmt;

/// Board width in cells.
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells. Row 0 is the top, row 19 the bottom.
pub const BOARD_HEIGHT: usize = 20;

/// A board cell. 0 is empty, 1..=7 is a frozen block of that piece type.
pub type Cell = u8;

/// The fixed 10x20 playfield.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Board {
    rows: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: [[0; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    pub fn from_rows(rows: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT]) -> Self {
        Self { rows }
    }

    /// Cell at (row, col), or `None` when out of bounds. Signed
    /// coordinates let movement code probe positions without wrapping.
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || row >= BOARD_HEIGHT as i32 || col < 0 || col >= BOARD_WIDTH as i32 {
            return None;
        }
        Some(self.rows[row as usize][col as usize])
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if row < BOARD_HEIGHT && col < BOARD_WIDTH {
            self.rows[row][col] = cell;
        }
    }

    pub fn row(&self, row: usize) -> &[Cell; BOARD_WIDTH] {
        &self.rows[row]
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows[row].iter().all(|&cell| cell != 0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.rows.iter()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// The seven piece variants. The discriminant order fixes the
/// protocol-visible `block_type` numbering (1..=7) shared by both peers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        Self::I,
        Self::O,
        Self::T,
        Self::L,
        Self::J,
        Self::S,
        Self::Z,
    ];

    /// Protocol-visible block type number.
    pub fn block_type(self) -> u8 {
        match self {
            Self::I => 1,
            Self::O => 2,
            Self::T => 3,
            Self::L => 4,
            Self::J => 5,
            Self::S => 6,
            Self::Z => 7,
        }
    }

    pub fn from_block_type(block_type: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.block_type() == block_type)
    }

    /// Unrotated shape grid, 1 = occupied.
    pub fn base_shape(self) -> Vec<Vec<u8>> {
        let rows: &[&[u8]] = match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[1, 1, 1], &[0, 1, 0]],
            Self::L => &[&[1, 1, 1], &[1, 0, 0]],
            Self::J => &[&[1, 1, 1], &[0, 0, 1]],
            Self::S => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Z => &[&[0, 1, 1], &[1, 1, 0]],
        };
        rows.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::I => "I",
            Self::O => "O",
            Self::T => "T",
            Self::L => "L",
            Self::J => "J",
            Self::S => "S",
            Self::Z => "Z",
        };
        write!(f, "{repr}")
    }
}

/// An active piece: its block type number plus its current (possibly
/// rotated, so not necessarily square) 0/1 shape grid.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Piece {
    pub block_type: u8,
    pub shape: Vec<Vec<u8>>,
}

impl Piece {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            block_type: kind.block_type(),
            shape: kind.base_shape(),
        }
    }

    pub fn width(&self) -> usize {
        self.shape.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.shape.len()
    }
}

/// A (row, col) placement for a piece's top-left shape cell.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One player's mirrored state as declared by the server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerState {
    pub board: Board,
    pub current_piece: Option<Piece>,
    /// The upcoming piece, for the preview box.
    pub next_piece: Option<Piece>,
    pub position: Option<Position>,
    pub score: u64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            board: Board::new(),
            current_piece: None,
            next_piece: None,
            position: None,
            score: 0,
        }
    }
}
