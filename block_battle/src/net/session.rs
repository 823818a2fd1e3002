//! Client-side session state and the snapshot reconciler.
//!
//! The session is a single owned value: the background receive pump is
//! its only writer, the render loop copies it out under the lock each
//! tick. Incoming `game_state` snapshots overwrite local fields
//! wholesale; the client mirrors server-declared truth instead of
//! merging sub-fields, so it cannot drift from the server.

use std::collections::HashMap;

use crate::game::entities::{Board, Piece, PlayerState, Position};
use crate::game::rules;
use crate::net::messages::ServerMessage;

#[derive(Clone, Debug)]
pub struct ClientSession {
    /// Identity assigned once by the handshake, never reassigned.
    player_id: String,
    pub nickname: String,
    pub board: Board,
    pub current_piece: Option<Piece>,
    /// The upcoming piece, shown in the preview box.
    pub next_piece: Option<Piece>,
    pub position: Option<Position>,
    pub score: u64,
    /// Every other player's mirrored state. Never contains the local
    /// `player_id`; the filter is re-enforced on every snapshot.
    pub other_players: HashMap<String, PlayerState>,
    /// Most recent server-reported diagnostic, for the status line.
    pub last_error: Option<String>,
    pub game_over: bool,
}

impl ClientSession {
    pub fn new(player_id: String, nickname: String) -> Self {
        Self {
            player_id,
            nickname,
            board: Board::new(),
            current_piece: None,
            next_piece: None,
            position: None,
            score: 0,
            other_players: HashMap::new(),
            last_error: None,
            game_over: false,
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Merge one server message into the session.
    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::GameState { players } => self.apply_snapshot(players),
            ServerMessage::Attack { lines } => {
                log::debug!("attacked with {lines} garbage line(s)");
                self.board = rules::inject_garbage(&self.board, lines as usize, &mut rand::rng());
            }
            ServerMessage::GameOver { player_id } => {
                if player_id == self.player_id {
                    self.game_over = true;
                }
            }
            ServerMessage::Error { message } => {
                log::warn!("server error: {message}");
                self.last_error = Some(message);
            }
            // The handshake already consumed its response; a late one
            // is a benign no-op.
            ServerMessage::ConnectResponse { .. } => {}
        }
    }

    /// Last-write-wins overwrite from an authoritative snapshot.
    fn apply_snapshot(&mut self, mut players: HashMap<String, PlayerState>) {
        if let Some(own) = players.remove(&self.player_id) {
            self.board = own.board;
            self.current_piece = own.current_piece;
            self.next_piece = own.next_piece;
            self.position = own.position;
            self.score = own.score;
        }
        // `remove` above already excluded the local id.
        self.other_players = players;
    }

    /// Marks the session over after socket closure or a fatal stream
    /// error.
    pub fn end(&mut self) {
        self.game_over = true;
    }
}
