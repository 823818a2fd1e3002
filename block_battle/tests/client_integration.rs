//! Integration tests for the handshake and the receive pump against a
//! scripted server on a localhost listener.

use std::{
    collections::HashMap,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use block_battle::{
    Client, NetError, WireFormat,
    entities::PlayerState,
    messages::{ClientCommand, ServerMessage},
    net::codec::{read_frame, write_frame},
};

const FORMAT: WireFormat = WireFormat::Bincode;

/// Bind a listener and run `script` against the first accepted
/// connection on a background thread. Joining the returned handle
/// propagates server-side assertion failures into the test.
fn scripted_server<F>(script: F) -> (SocketAddr, thread::JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        script(stream);
    });
    (addr, handle)
}

/// Consume the client's `connect` and assign it `player_id`.
fn accept_handshake(stream: &mut TcpStream, player_id: &str) -> String {
    let nickname = match read_frame::<ClientCommand, _>(stream, FORMAT).unwrap() {
        ClientCommand::Connect { nickname } => nickname,
        other => panic!("expected connect, got {other}"),
    };
    write_frame(
        stream,
        FORMAT,
        &ServerMessage::ConnectResponse {
            player_id: player_id.to_string(),
        },
    )
    .unwrap();
    nickname
}

fn snapshot(entries: &[(&str, u64)]) -> ServerMessage {
    let players: HashMap<String, PlayerState> = entries
        .iter()
        .map(|&(id, score)| {
            let state = PlayerState {
                score,
                ..PlayerState::default()
            };
            (id.to_string(), state)
        })
        .collect();
    ServerMessage::GameState { players }
}

#[test]
fn handshake_assigns_player_id() {
    let (addr, server) = scripted_server(|mut stream| {
        let nickname = accept_handshake(&mut stream, "5");
        assert_eq!(nickname, "alice");
    });

    let client = Client::connect("alice", &addr, FORMAT).unwrap();
    assert_eq!(client.player_id, "5");
    assert_eq!(client.nickname, "alice");
    server.join().unwrap();
}

#[test]
fn handshake_times_out_without_response() {
    // Accepts the connection but never replies.
    let (addr, _server) = scripted_server(|stream| {
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let error =
        Client::connect_with_timeout("alice", &addr, FORMAT, Duration::from_millis(200))
            .unwrap_err();
    assert!(matches!(error, NetError::HandshakeTimeout));
}

#[test]
fn handshake_rejects_wrong_first_message() {
    let (addr, server) = scripted_server(|mut stream| {
        read_frame::<ClientCommand, _>(&mut stream, FORMAT).unwrap();
        write_frame(&mut stream, FORMAT, &ServerMessage::Attack { lines: 1 }).unwrap();
    });

    let error = Client::connect("alice", &addr, FORMAT).unwrap_err();
    assert!(matches!(error, NetError::UnexpectedResponseType(_)));
    server.join().unwrap();
}

#[test]
fn connect_to_closed_port_is_refused() {
    // Bind then drop to get a port with no listener behind it.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let error = Client::connect("alice", &addr, FORMAT).unwrap_err();
    assert!(matches!(error, NetError::ConnectionRefused(_)));
}

#[test]
fn commands_reach_the_server() {
    let (addr, server) = scripted_server(|mut stream| {
        accept_handshake(&mut stream, "1");
        let first = read_frame::<ClientCommand, _>(&mut stream, FORMAT).unwrap();
        assert_eq!(first, ClientCommand::MoveLeft);
        let second = read_frame::<ClientCommand, _>(&mut stream, FORMAT).unwrap();
        assert_eq!(second, ClientCommand::HardDrop);
    });

    let mut client = Client::connect("bob", &addr, FORMAT).unwrap();
    client.send(&ClientCommand::MoveLeft).unwrap();
    client.send(&ClientCommand::HardDrop).unwrap();
    server.join().unwrap();
}

#[test]
fn pump_reconciles_snapshots_and_survives_malformed_frames() {
    let (addr, server) = scripted_server(|mut stream| {
        accept_handshake(&mut stream, "5");
        write_frame(&mut stream, FORMAT, &snapshot(&[("5", 300), ("7", 100)])).unwrap();

        // A well-framed but undecodable payload; the pump must log,
        // drop it, and keep going.
        use std::io::Write;
        let junk = [0u8, 0, 0, 3, 0xff, 0xfe, 0xfd];
        stream.write_all(&junk).unwrap();

        write_frame(
            &mut stream,
            FORMAT,
            &ServerMessage::GameOver {
                player_id: "5".to_string(),
            },
        )
        .unwrap();
        // Closing unblocks the pump's next read and ends the loop.
    });

    let client = Client::connect("alice", &addr, FORMAT).unwrap();
    let session = Arc::new(Mutex::new(client.new_session()));
    let pump = client.spawn_pump(Arc::clone(&session)).unwrap();
    pump.join().unwrap();
    server.join().unwrap();

    let session = session.lock().unwrap();
    assert_eq!(session.score, 300);
    assert_eq!(session.other_players.len(), 1);
    assert_eq!(session.other_players["7"].score, 100);
    assert!(!session.other_players.contains_key("5"));
    assert!(session.game_over);
}

#[test]
fn pump_ends_session_when_server_disconnects() {
    let (addr, server) = scripted_server(|mut stream| {
        accept_handshake(&mut stream, "2");
        // Drop without sending anything further.
    });

    let client = Client::connect("carol", &addr, FORMAT).unwrap();
    let session = Arc::new(Mutex::new(client.new_session()));
    let pump = client.spawn_pump(Arc::clone(&session)).unwrap();
    pump.join().unwrap();
    server.join().unwrap();

    assert!(session.lock().unwrap().game_over);
}

#[test]
fn send_after_shutdown_is_send_failure_not_panic() {
    let (addr, _server) = scripted_server(|mut stream| {
        accept_handshake(&mut stream, "3");
        thread::sleep(Duration::from_millis(500));
    });

    let mut client = Client::connect("dave", &addr, FORMAT).unwrap();
    client.shutdown();

    // The first write may land in a buffer the kernel already gave up
    // on; within two sends the failure must surface as SendFailure.
    let result = client
        .send(&ClientCommand::MoveDown)
        .and_then(|_| client.send(&ClientCommand::MoveDown));
    assert!(matches!(result, Err(NetError::SendFailure(_))));
}

#[test]
fn json_revision_completes_the_same_flow() {
    let (addr, server) = scripted_server(|mut stream| {
        let msg = read_frame::<ClientCommand, _>(&mut stream, WireFormat::Json).unwrap();
        assert!(matches!(msg, ClientCommand::Connect { .. }));
        write_frame(
            &mut stream,
            WireFormat::Json,
            &ServerMessage::ConnectResponse {
                player_id: "9".to_string(),
            },
        )
        .unwrap();
        write_frame(&mut stream, WireFormat::Json, &snapshot(&[("9", 100)])).unwrap();
    });

    let client = Client::connect("erin", &addr, WireFormat::Json).unwrap();
    assert_eq!(client.player_id, "9");

    let session = Arc::new(Mutex::new(client.new_session()));
    let pump = client.spawn_pump(Arc::clone(&session)).unwrap();
    pump.join().unwrap();
    server.join().unwrap();
    assert_eq!(session.lock().unwrap().score, 100);
}
