//! A terminal client for the multiplayer block-stacking server.
//!
//! The client performs the blocking handshake, starts the background
//! receive pump, and then runs a fixed-tick TUI control loop that sends
//! movement commands and redraws from the latest reconciled session
//! snapshot.

use anyhow::{Context, Result};
use pico_args::Arguments;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use block_battle::{Client, DEFAULT_PORT, WireFormat};

mod app;
mod ui;

const HELP: &str = "\
Connect to a block battle server

USAGE:
  bb_client [OPTIONS]

OPTIONS:
  --server ADDR         Server address  [default: 127.0.0.1:12345]
  --nickname NAME       Display nickname  [default: player]
  --json                Use the JSON wire revision instead of bincode

FLAGS:
  -h, --help            Print help information
";

struct Args {
    server: String,
    nickname: String,
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        server: pargs
            .value_from_str("--server")
            .unwrap_or_else(|_| format!("127.0.0.1:{DEFAULT_PORT}")),
        nickname: pargs
            .value_from_str("--nickname")
            .unwrap_or_else(|_| "player".to_string()),
        json: pargs.contains("--json"),
    };

    let addr: SocketAddr = args.server.parse().context("invalid server address")?;
    let format = if args.json {
        WireFormat::Json
    } else {
        WireFormat::Bincode
    };

    // Handshake first; the pump must not start until an identity is
    // assigned.
    let client = Client::connect(&args.nickname, &addr, format)
        .with_context(|| format!("failed to connect to {addr}"))?;
    let session = Arc::new(Mutex::new(client.new_session()));
    let pump = client
        .spawn_pump(Arc::clone(&session))
        .context("failed to start the receive pump")?;

    let terminal = ratatui::init();
    let result = app::App::new(client, session).run(terminal);
    ratatui::restore();

    // The app closed the socket on exit, which unblocks the pump.
    if pump.join().is_err() {
        log::error!("receive pump panicked");
    }

    result
}
