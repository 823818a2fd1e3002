//! Block-stacking game model and rules.
//!
//! This module provides the board/piece entities shared with the wire
//! protocol and a stateless rules engine:
//! - Fixed 10x20 board with protocol-visible block type numbering
//! - Pure collision, line-clear, garbage, and rotation functions usable
//!   by either side of the connection

pub mod entities;
pub mod rules;

pub use entities::{BOARD_HEIGHT, BOARD_WIDTH, Board, Piece, PieceKind, PlayerState, Position};
