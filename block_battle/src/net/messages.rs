use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

use crate::game::entities::{Board, Piece, PlayerState, Position};

/// A message from a client to the game server.
///
/// Variant names are the protocol's `type` discriminators; the
/// snake_case renames keep the JSON wire revision canonical
/// (`{"move_left": null}`, `{"connect": {"nickname": ...}}`).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientCommand {
    /// Handshake opener carrying the chosen display nickname.
    Connect { nickname: String },
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    /// Advisory report of a local line clear. The server is
    /// authoritative and may ignore everything but `lines`.
    LineClear {
        lines: u32,
        positions: Vec<usize>,
        board: Board,
        score: u64,
    },
    /// Asks the server to confirm a spawn collision.
    CheckGameOver {
        board: Board,
        current_piece: Piece,
        position: Position,
    },
    RequestNewPiece,
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Connect { nickname } => &format!("connect as {nickname}"),
            Self::MoveLeft => "move left",
            Self::MoveRight => "move right",
            Self::MoveDown => "move down",
            Self::Rotate => "rotate",
            Self::HardDrop => "hard drop",
            Self::LineClear { lines, .. } => &format!("clear {lines} line(s)"),
            Self::CheckGameOver { .. } => "check game over",
            Self::RequestNewPiece => "request new piece",
        };
        write!(f, "{repr}")
    }
}

/// A message from the game server to a client.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake reply assigning the client's identity. Exactly one is
    /// expected per connection attempt; any later arrival is ignored.
    ConnectResponse { player_id: String },
    /// Authoritative snapshot of every player's board, piece, and score.
    /// An earlier protocol revision named this `game_state_update`; the
    /// alias keeps those frames decodable under the JSON revision.
    #[serde(alias = "game_state_update")]
    GameState {
        players: HashMap<String, PlayerState>,
    },
    /// Garbage lines pushed after an opponent's line clear.
    Attack { lines: u32 },
    /// The named player topped out.
    GameOver { player_id: String },
    /// Server-side diagnostics; does not change game state.
    Error { message: String },
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::ConnectResponse { player_id } => &format!("connect response for {player_id}"),
            Self::GameState { players } => &format!("game state for {} player(s)", players.len()),
            Self::Attack { lines } => &format!("attack of {lines} line(s)"),
            Self::GameOver { player_id } => &format!("game over for {player_id}"),
            Self::Error { message } => message.as_str(),
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_command_display() {
        let cmd = ClientCommand::Connect {
            nickname: "mina".into(),
        };
        assert_eq!(cmd.to_string(), "connect as mina");
        assert_eq!(ClientCommand::HardDrop.to_string(), "hard drop");
    }

    #[test]
    fn server_message_display() {
        let msg = ServerMessage::GameOver {
            player_id: "5".into(),
        };
        assert_eq!(msg.to_string(), "game over for 5");
    }

    #[test]
    fn json_wire_names_are_snake_case() {
        let json = serde_json::to_value(ServerMessage::ConnectResponse {
            player_id: "3".into(),
        })
        .unwrap();
        assert!(json.get("connect_response").is_some());

        let json = serde_json::to_value(ClientCommand::MoveLeft).unwrap();
        assert_eq!(json, serde_json::json!("move_left"));
    }

    #[test]
    fn commands_roundtrip_through_bincode() {
        let commands = vec![
            ClientCommand::Connect {
                nickname: "player one".into(),
            },
            ClientCommand::MoveLeft,
            ClientCommand::MoveRight,
            ClientCommand::MoveDown,
            ClientCommand::Rotate,
            ClientCommand::HardDrop,
            ClientCommand::RequestNewPiece,
        ];
        for command in commands {
            let bytes = bincode::serialize(&command).unwrap();
            let decoded: ClientCommand = bincode::deserialize(&bytes).unwrap();
            assert_eq!(command, decoded);
        }
    }

    #[test]
    fn game_state_roundtrips_through_bincode() {
        let mut players = HashMap::new();
        players.insert("7".to_string(), PlayerState::default());
        let msg = ServerMessage::GameState { players };
        let bytes = bincode::serialize(&msg).unwrap();
        let decoded: ServerMessage = bincode::deserialize(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }
}
