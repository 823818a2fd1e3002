//! # Block Battle
//!
//! The client-side core of a real-time multiplayer block-stacking game.
//! Several clients connect to an authoritative server; each mirrors its
//! own board and every opponent's board from server snapshots.
//!
//! ## Core Modules
//!
//! - [`game`]: board/piece entities and the stateless rules engine
//! - [`net`]: length-prefixed framing, the message protocol, the
//!   blocking handshake client with its background receive pump, and
//!   the session reconciler
//!
//! The rendering layer is an external collaborator: it consumes a
//! [`net::session::ClientSession`] snapshot once per tick and is
//! otherwise unknown to this crate.

pub mod game;
pub use game::{entities, rules};

pub mod net;
pub use net::{
    client::{Client, DEFAULT_PORT},
    codec::WireFormat,
    errors::NetError,
    messages,
    session::ClientSession,
};
