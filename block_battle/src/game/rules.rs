//! Stateless rules engine.
//!
//! Pure functions over [`Board`] and [`Piece`] values. Under the
//! server-authoritative protocol these validate and predict; a
//! self-authoritative client (or a server) can drive the whole game
//! with them.

use rand::Rng;

use super::entities::{BOARD_HEIGHT, BOARD_WIDTH, Board, Piece, Position};

/// Points awarded per cleared row. Simultaneous clears do not scale.
pub const SCORE_PER_LINE: u64 = 100;

/// Block type written into injected garbage cells.
const GARBAGE_CELL: u8 = 7;

/// Whether `piece` placed at `position` keeps every occupied cell in
/// bounds and on an empty board cell.
pub fn valid_move(piece: &Piece, position: Position, board: &Board) -> bool {
    for (dy, row) in piece.shape.iter().enumerate() {
        for (dx, &cell) in row.iter().enumerate() {
            if cell == 0 {
                continue;
            }
            let row = position.row + dy as i32;
            let col = position.col + dx as i32;
            match board.get(row, col) {
                Some(0) => {}
                _ => return false,
            }
        }
    }
    true
}

/// Spawn placement for a new piece: top row, horizontally centered.
pub fn spawn_position(piece: &Piece) -> Position {
    Position::new(0, (BOARD_WIDTH / 2) as i32 - (piece.width() / 2) as i32)
}

/// Whether a freshly spawned piece already collides, which ends the game.
pub fn spawn_collides(piece: &Piece, board: &Board) -> bool {
    !valid_move(piece, spawn_position(piece), board)
}

/// Freeze `piece` into a copy of `board` at `position`, writing its
/// block type into each occupied cell. Out-of-bounds cells are skipped.
pub fn place_piece(board: &Board, piece: &Piece, position: Position) -> Board {
    let mut placed = board.clone();
    for (dy, row) in piece.shape.iter().enumerate() {
        for (dx, &cell) in row.iter().enumerate() {
            if cell == 0 {
                continue;
            }
            let row = position.row + dy as i32;
            let col = position.col + dx as i32;
            if row >= 0 && col >= 0 {
                placed.set(row as usize, col as usize, piece.block_type);
            }
        }
    }
    placed
}

/// Remove every full row, prepend an equal number of empty rows, and
/// report the cleared row indices in top-to-bottom order. Remaining rows
/// keep their relative order.
pub fn clear_lines(board: &Board) -> (Board, Vec<usize>) {
    let cleared: Vec<usize> = (0..BOARD_HEIGHT).filter(|&y| board.is_row_full(y)).collect();
    if cleared.is_empty() {
        return (board.clone(), cleared);
    }

    let mut result = Board::new();
    let mut dst = BOARD_HEIGHT;
    for src in (0..BOARD_HEIGHT).rev() {
        if board.is_row_full(src) {
            continue;
        }
        dst -= 1;
        for x in 0..BOARD_WIDTH {
            result.set(dst, x, board.row(src)[x]);
        }
    }
    (result, cleared)
}

/// Shift the board up by `count` rows and append `count` garbage rows at
/// the bottom, each fully filled except one randomly placed hole. Rows
/// scrolled off the top are lost; that is the garbage model, not a bug.
pub fn inject_garbage<R: Rng>(board: &Board, count: usize, rng: &mut R) -> Board {
    let count = count.min(BOARD_HEIGHT);
    let mut result = Board::new();
    for y in count..BOARD_HEIGHT {
        for x in 0..BOARD_WIDTH {
            result.set(y - count, x, board.row(y)[x]);
        }
    }
    for y in (BOARD_HEIGHT - count)..BOARD_HEIGHT {
        let hole = rng.random_range(0..BOARD_WIDTH);
        for x in 0..BOARD_WIDTH {
            result.set(y, x, if x == hole { 0 } else { GARBAGE_CELL });
        }
    }
    result
}

/// Rotate 90 degrees clockwise: transpose of the row-reversed shape.
/// No wall kicks; callers reject rotations that land invalid.
pub fn rotate(piece: &Piece) -> Piece {
    let height = piece.height();
    let width = piece.width();
    let mut shape = vec![vec![0u8; height]; width];
    for (y, row) in piece.shape.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            shape[x][height - 1 - y] = cell;
        }
    }
    Piece {
        block_type: piece.block_type,
        shape,
    }
}

/// Lowest row at which `piece` still fits in `position`'s column.
pub fn hard_drop_row(piece: &Piece, position: Position, board: &Board) -> i32 {
    let mut row = position.row;
    while valid_move(piece, Position::new(row + 1, position.col), board) {
        row += 1;
    }
    row
}
