//! A blocking TCP client for the game server.
//!
//! Connection life cycle: one synchronous handshake (send `connect`,
//! block for exactly one framed `connect_response`), then a background
//! receive pump that decodes the inbound stream and hands every message
//! to the session reconciler. The control loop only writes to the
//! socket, the pump only reads from it; the shared session value is the
//! single guarded resource. There is no reconnect or retry: a failed
//! connection ends the session.

use std::{
    io,
    net::{Shutdown, SocketAddr, TcpStream},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use super::{
    codec::{self, WireFormat},
    errors::NetError,
    messages::{ClientCommand, ServerMessage},
    session::ClientSession,
};

/// Default server TCP port.
pub const DEFAULT_PORT: u16 = 12345;

/// How long the handshake blocks for the connect response.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for writing to the server.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Client {
    /// The display nickname sent during the handshake.
    pub nickname: String,
    /// The identity the server assigned. Set exactly once.
    pub player_id: String,
    format: WireFormat,
    stream: TcpStream,
}

impl Client {
    /// Connect to a game server and complete the handshake.
    ///
    /// Sends `connect` with the nickname, then performs one blocking
    /// framed read under [`HANDSHAKE_TIMEOUT`]. Only after the identity
    /// is assigned may the asynchronous pump be started; nothing races
    /// the handshake reply.
    ///
    /// # Errors
    ///
    /// [`NetError::ConnectionRefused`] if the TCP connect fails,
    /// [`NetError::HandshakeTimeout`] if no complete frame arrives in
    /// time, and [`NetError::UnexpectedResponseType`] if the first frame
    /// is not a connect response. All are fatal at startup.
    pub fn connect(nickname: &str, addr: &SocketAddr, format: WireFormat) -> Result<Self, NetError> {
        Self::connect_with_timeout(nickname, addr, format, HANDSHAKE_TIMEOUT)
    }

    /// [`Client::connect`] with an explicit handshake timeout.
    pub fn connect_with_timeout(
        nickname: &str,
        addr: &SocketAddr,
        format: WireFormat,
        timeout: Duration,
    ) -> Result<Self, NetError> {
        let mut stream = TcpStream::connect(addr).map_err(NetError::ConnectionRefused)?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(NetError::ConnectionRefused)?;
        stream
            .set_write_timeout(Some(WRITE_TIMEOUT))
            .map_err(NetError::ConnectionRefused)?;

        codec::write_frame(
            &mut stream,
            format,
            &ClientCommand::Connect {
                nickname: nickname.to_string(),
            },
        )?;

        let player_id = match codec::read_frame::<ServerMessage, _>(&mut stream, format)? {
            ServerMessage::ConnectResponse { player_id } => player_id,
            other => return Err(NetError::UnexpectedResponseType(other.to_string())),
        };

        // Steady-state reads block indefinitely; a healthy idle
        // connection has nothing to send.
        stream
            .set_read_timeout(None)
            .map_err(NetError::ConnectionRefused)?;

        log::info!("connected to {addr} as player {player_id}");
        Ok(Self {
            nickname: nickname.to_string(),
            player_id,
            format,
            stream,
        })
    }

    /// Create the session value this client's pump will reconcile into.
    pub fn new_session(&self) -> ClientSession {
        ClientSession::new(self.player_id.clone(), self.nickname.clone())
    }

    /// Send one command.
    ///
    /// # Errors
    ///
    /// [`NetError::SendFailure`] if the socket is closed or errors
    /// mid-write. The error is reported, never raised past this
    /// boundary; the caller decides whether to keep playing.
    pub fn send(&mut self, command: &ClientCommand) -> Result<(), NetError> {
        codec::write_frame(&mut self.stream, self.format, command)
    }

    /// Start the background receive pump.
    ///
    /// The pump owns a clone of the stream's read side and loops:
    /// accumulate one frame, decode, apply to the session. Malformed
    /// payloads are logged and dropped; socket closure or error marks
    /// the session over and ends the loop.
    pub fn spawn_pump(
        &self,
        session: Arc<Mutex<ClientSession>>,
    ) -> io::Result<thread::JoinHandle<()>> {
        let stream = self.stream.try_clone()?;
        let format = self.format;
        thread::Builder::new()
            .name("net-pump".into())
            .spawn(move || run_pump(stream, format, session))
    }

    /// Close the socket. This is the only cancellation primitive: it
    /// unblocks the pump's next read and lets the loop exit.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

fn run_pump(mut stream: TcpStream, format: WireFormat, session: Arc<Mutex<ClientSession>>) {
    loop {
        match codec::read_frame::<ServerMessage, _>(&mut stream, format) {
            Ok(message) => {
                log::debug!("received {message}");
                let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
                session.apply(message);
            }
            Err(NetError::MalformedPayload(reason)) => {
                log::warn!("dropping malformed frame: {reason}");
            }
            Err(error) => {
                log::info!("receive loop ending: {error}");
                let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
                session.end();
                break;
            }
        }
    }
}
