//! Live channel listener.
//!
//! Live channels get a listener of their own next to the page server. Each
//! accepted `TcpStream` is handshaken by tungstenite and handed to a channel
//! thread, which can then poll reads between writes and put a deadline on
//! a stalled write. An upgraded `tiny_http` stream offers neither.

use std::io::{ErrorKind, Write};
use std::net::{IpAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::sync::mpsc;
use tungstenite::HandshakeError;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;

use crate::actor::messages::WsMsg;
use crate::actor::ws::LiveChannel;

/// Path of the live channel endpoint.
pub const LIVE_PATH: &str = "/ws";

/// Sleep between accept attempts on the non-blocking listener.
const ACCEPT_POLL: Duration = Duration::from_millis(50);
/// Bound on reading the upgrade request and writing the reply.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

const UPGRADE_REQUIRED: &[u8] = b"HTTP/1.1 426 Upgrade Required\r\n\
Upgrade: websocket\r\n\
Connection: close\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
Content-Length: 16\r\n\
\r\n\
Upgrade Required";

/// Running live channel listener.
pub struct LiveListener {
    port: u16,
    handle: JoinHandle<()>,
}

impl LiveListener {
    /// Bind a free port on `interface` and start accepting channels.
    ///
    /// Accepted channels are sent to the WsActor; the accept thread stops
    /// once the actor has dropped its mailbox or shutdown was requested.
    pub fn start(interface: IpAddr, ws_tx: mpsc::Sender<WsMsg>) -> Result<Self> {
        let listener = TcpListener::bind((interface, 0))
            .with_context(|| format!("Failed to bind live channel listener on {interface}"))?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let handle = thread::Builder::new()
            .name("live-accept".into())
            .spawn(move || accept_loop(listener, ws_tx))?;

        crate::debug!("live"; "listening on port {}", port);
        Ok(Self { port, handle })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn into_handle(self) -> JoinHandle<()> {
        self.handle
    }
}

fn accept_loop(listener: TcpListener, ws_tx: mpsc::Sender<WsMsg>) {
    while !crate::core::is_shutdown() && !ws_tx.is_closed() {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = open_channel(stream, &ws_tx) {
                    crate::debug!("live"; "{}: {:#}", peer, e);
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                crate::log!("live"; "accept error: {}", e);
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
    crate::debug!("live"; "listener stopped");
}

/// Handshake one connection and register the resulting channel.
fn open_channel(stream: TcpStream, ws_tx: &mpsc::Sender<WsMsg>) -> Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    stream.set_write_timeout(Some(HANDSHAKE_TIMEOUT))?;
    let mut plain = stream.try_clone()?;

    let ws = match tungstenite::accept_hdr(stream, check_path) {
        Ok(ws) => ws,
        // Well-formed HTTP that does not ask for an upgrade
        Err(HandshakeError::Failure(tungstenite::Error::Protocol(e))) => {
            let _ = plain.write_all(UPGRADE_REQUIRED);
            return Err(anyhow!("not an upgrade: {e}"));
        }
        Err(e) => return Err(anyhow!("handshake failed: {e}")),
    };

    let channel = LiveChannel::spawn(ws, ws_tx.clone())?;
    let id = channel.id();
    ws_tx
        .blocking_send(WsMsg::AddClient(channel))
        .map_err(|_| anyhow!("live channel {id} rejected: registry stopped"))
}

/// Only [`LIVE_PATH`] upgrades; tungstenite writes the rejection.
fn check_path(request: &Request, response: Response) -> Result<Response, ErrorResponse> {
    let path = request.uri().path();
    if path.strip_suffix('/').unwrap_or(path) == LIVE_PATH {
        return Ok(response);
    }
    let mut reject = ErrorResponse::new(Some("Not Found".to_string()));
    *reject.status_mut() = StatusCode::NOT_FOUND;
    Err(reject)
}
