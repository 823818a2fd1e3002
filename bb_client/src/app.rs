//! The control loop: input polling, gravity ticks, and rendering.
//!
//! Runs on the main thread while the receive pump reconciles inbound
//! messages on its own thread. The loop only ever writes to the socket;
//! the shared session is copied out under its lock once per tick.

use anyhow::Result;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{self, Event, KeyCode, KeyEventKind},
};
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use block_battle::{
    Client, ClientSession,
    entities::Position,
    messages::ClientCommand,
    rules::{self, SCORE_PER_LINE},
};

use crate::ui;

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Interval between automatic `move_down` requests.
const GRAVITY_INTERVAL: Duration = Duration::from_millis(500);

pub struct App {
    client: Client,
    session: Arc<Mutex<ClientSession>>,
    /// Guards against re-sending `check_game_over` for the same stuck
    /// spawn every tick.
    reported_spawn_collision: bool,
    /// Guards against flooding `request_new_piece` while the server has
    /// not assigned one yet.
    requested_piece: bool,
}

impl App {
    pub fn new(client: Client, session: Arc<Mutex<ClientSession>>) -> Self {
        Self {
            client,
            session,
            reported_spawn_collision: false,
            requested_piece: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut last_fall = Instant::now();

        loop {
            let snapshot = self
                .session
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            terminal.draw(|frame| ui::draw(frame, &snapshot))?;
            if snapshot.game_over {
                break;
            }

            self.watch_piece_state(&snapshot);

            if event::poll(POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && !self.handle_key(key.code, &snapshot) {
                        break;
                    }
                }
            }

            if last_fall.elapsed() >= GRAVITY_INTERVAL {
                self.dispatch(ClientCommand::MoveDown);
                last_fall = Instant::now();
            }
        }

        self.client.shutdown();
        Ok(())
    }

    /// Returns false when the player quits.
    fn handle_key(&mut self, code: KeyCode, snapshot: &ClientSession) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Left => self.dispatch(ClientCommand::MoveLeft),
            KeyCode::Right => self.dispatch(ClientCommand::MoveRight),
            KeyCode::Down => self.dispatch(ClientCommand::MoveDown),
            KeyCode::Up => self.dispatch(ClientCommand::Rotate),
            KeyCode::Char(' ') => {
                if let Some(advisory) = predict_line_clear(snapshot) {
                    self.dispatch(advisory);
                }
                self.dispatch(ClientCommand::HardDrop);
            }
            _ => {}
        }
        true
    }

    /// Piece-driven notifications: a spawn collision triggers one
    /// `check_game_over`, a missing piece triggers one
    /// `request_new_piece`.
    fn watch_piece_state(&mut self, snapshot: &ClientSession) {
        match (&snapshot.current_piece, snapshot.position) {
            (Some(piece), Some(position)) => {
                self.requested_piece = false;
                if !rules::valid_move(piece, position, &snapshot.board) {
                    if !self.reported_spawn_collision {
                        self.reported_spawn_collision = true;
                        self.dispatch(ClientCommand::CheckGameOver {
                            board: snapshot.board.clone(),
                            current_piece: piece.clone(),
                            position,
                        });
                    }
                } else {
                    self.reported_spawn_collision = false;
                }
            }
            _ => {
                self.reported_spawn_collision = false;
                if !self.requested_piece {
                    self.requested_piece = true;
                    self.dispatch(ClientCommand::RequestNewPiece);
                }
            }
        }
    }

    /// Send failures are reported and swallowed here: the session keeps
    /// going until the read side fails.
    fn dispatch(&mut self, command: ClientCommand) {
        if let Err(error) = self.client.send(&command) {
            log::warn!("failed to send '{command}': {error}");
        }
    }
}

/// Predict the outcome of a hard drop and, when it would clear lines,
/// build the advisory `line_clear` report. The server is authoritative
/// and may ignore everything but the line count.
fn predict_line_clear(snapshot: &ClientSession) -> Option<ClientCommand> {
    let piece = snapshot.current_piece.as_ref()?;
    let position = snapshot.position?;

    let landing = rules::hard_drop_row(piece, position, &snapshot.board);
    let landed = rules::place_piece(&snapshot.board, piece, Position::new(landing, position.col));
    let (board, cleared) = rules::clear_lines(&landed);
    if cleared.is_empty() {
        return None;
    }

    Some(ClientCommand::LineClear {
        lines: cleared.len() as u32,
        score: snapshot.score + cleared.len() as u64 * SCORE_PER_LINE,
        positions: cleared,
        board,
    })
}
