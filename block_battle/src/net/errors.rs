//! Network error taxonomy.
//!
//! Startup errors (`ConnectionRefused`, `HandshakeTimeout`,
//! `UnexpectedResponseType`) are fatal before any game state exists.
//! `MalformedPayload` is recovered per frame; `SendFailure` is reported
//! to the caller and the session continues; `ConnectionClosed` is
//! terminal.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    /// The initial TCP connect failed.
    #[error("connection refused: {0}")]
    ConnectionRefused(#[source] io::Error),

    /// No complete handshake response frame arrived within the timeout.
    #[error("no handshake response before the timeout")]
    HandshakeTimeout,

    /// The first framed response was not a connect response.
    #[error("unexpected handshake response: {0}")]
    UnexpectedResponseType(String),

    /// A frame's payload could not be parsed. Recoverable: the frame is
    /// dropped and the receive loop continues.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A write failed mid-frame. Reported, never raised past the send
    /// boundary; the caller decides whether to continue.
    #[error("send failed: {0}")]
    SendFailure(#[source] io::Error),

    /// The peer closed the connection or the socket errored. Terminal.
    #[error("connection closed")]
    ConnectionClosed,

    /// A length header exceeded the frame cap. Treated as a stream
    /// desync, so terminal on the read side.
    #[error("frame size {actual} exceeds maximum {max}")]
    FrameTooLarge { actual: usize, max: usize },
}
