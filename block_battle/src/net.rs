//! Networking layer for client-server communication.
//!
//! TCP with a length-prefixed binary protocol: every logical message is
//! one frame of a 4-byte big-endian payload length followed by the
//! serialized payload. Bincode is the default wire format; a JSON
//! revision of the same framing is selectable by configuration.

/// Blocking TCP client: handshake sequencing, the send path, and the
/// background receive pump.
pub mod client;

/// Length-prefix framing and the interchangeable wire formats.
pub mod codec;

/// Network error taxonomy.
pub mod errors;

/// Message types for the client-server protocol.
pub mod messages;

/// Client-side session state and the snapshot reconciler.
pub mod session;
