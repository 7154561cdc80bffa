//! Loopback tests driving the whole server: gateway, live listener, actors
//! and watcher.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::Sender;
use tempfile::TempDir;
use tiny_http::Server;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{Gateway, lifecycle, run_request_loop};
use crate::actor::Coordinator;
use crate::actor::coordinator::ws_channel;
use crate::actor::fs::FsActor;
use crate::document::DocumentSet;
use crate::reload::server::LiveListener;

struct Harness {
    dir: TempDir,
    addr: SocketAddr,
    live_addr: SocketAddr,
    shutdown_tx: Sender<()>,
    actors: JoinHandle<()>,
    requests: JoinHandle<()>,
    live: JoinHandle<()>,
}

impl Harness {
    fn start(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = files
            .iter()
            .map(|(name, content)| {
                let path = dir.path().join(name);
                std::fs::write(&path, content).unwrap();
                path
            })
            .collect();
        let docs = DocumentSet::resolve(&paths).unwrap();

        let (ws_tx, ws_rx) = ws_channel();
        let fs = FsActor::new(&docs, ws_tx.clone()).unwrap();
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let live = LiveListener::start(addr.ip(), ws_tx.clone()).unwrap();
        let live_addr = SocketAddr::new(addr.ip(), live.port());

        let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded(1);
        let coordinator =
            Coordinator::new(fs, ws_rx, ws_tx, shutdown_rx).with_server(Arc::clone(&server));
        let actors = lifecycle::spawn_actors(coordinator);

        let gateway = Gateway::new(Arc::new(docs), live_addr.port());
        let requests = thread::spawn(move || {
            let _ = run_request_loop(&server, gateway);
        });

        Self {
            dir,
            addr,
            live_addr,
            shutdown_tx,
            actors,
            requests,
            live: live.into_handle(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn request(&self, method: &str, path: &str) -> (u16, String, String) {
        let mut stream = TcpStream::connect(self.addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        write!(
            stream,
            "{method} {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.addr
        )
        .unwrap();

        let mut raw = String::new();
        stream.read_to_string(&mut raw).unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((&raw, ""));
        let status = head
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap();
        (status, head.to_string(), body.to_string())
    }

    fn get(&self, path: &str) -> (u16, String, String) {
        self.request("GET", path)
    }

    /// Open a live channel and wait for its acknowledgment.
    fn connect(&self) -> WebSocket<TcpStream> {
        let stream = TcpStream::connect(self.live_addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let (mut ws, response) =
            tungstenite::client(format!("ws://{}/ws", self.live_addr), stream).unwrap();
        assert_eq!(response.status().as_u16(), 101);

        let ack = next_text(&mut ws).unwrap();
        assert!(ack.contains(r#""type":"connected""#), "{ack}");
        ws
    }

    fn shutdown(self) {
        self.shutdown_tx.send(()).unwrap();
        join_within(self.actors, Duration::from_secs(3));
        join_within(self.requests, Duration::from_secs(3));
        join_within(self.live, Duration::from_secs(3));
    }
}

/// Next text frame, skipping keep-alive frames. `None` on close or timeout.
fn next_text(ws: &mut WebSocket<TcpStream>) -> Option<String> {
    loop {
        match ws.read() {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            _ => return None,
        }
    }
}

fn set_timeout(ws: &WebSocket<TcpStream>, timeout: Duration) {
    ws.get_ref().set_read_timeout(Some(timeout)).unwrap();
}

fn join_within(handle: JoinHandle<()>, limit: Duration) {
    let start = Instant::now();
    while !handle.is_finished() {
        assert!(start.elapsed() < limit, "thread did not stop in time");
        thread::sleep(Duration::from_millis(20));
    }
    handle.join().unwrap();
}

#[test]
fn test_pages_and_navigation() {
    let h = Harness::start(&[("a.md", "# Alpha"), ("b.md", "# Beta")]);

    let (status, _, body) = h.get("/doc/0");
    assert_eq!(status, 200);
    assert!(body.contains("<h1>Alpha</h1>"));
    assert!(body.contains(r#"<a id="nav-prev" class="nav-btn disabled""#));
    assert!(body.contains(r#"<a id="nav-next" class="nav-btn" href="/doc/1">"#));
    assert!(body.contains(r#"<a class="doc-link active" aria-current="page" href="/doc/0">a.md</a>"#));
    assert!(body.contains(r#"<a class="doc-link" href="/doc/1">b.md</a>"#));

    let live_port = format!(r#"data-live-port="{}""#, h.live_addr.port());
    assert!(body.contains(&live_port));

    let (status, _, body) = h.get("/doc/1");
    assert_eq!(status, 200);
    assert!(body.contains(r#"<a id="nav-prev" class="nav-btn" href="/doc/0">"#));
    assert!(body.contains(r#"<a id="nav-next" class="nav-btn disabled""#));

    h.shutdown();
}

#[test]
fn test_status_codes() {
    let h = Harness::start(&[("a.md", "# A"), ("b.md", "# B")]);

    let (status, head, _) = h.get("/");
    assert_eq!(status, 302);
    assert!(head.contains("Location: /doc/0"));

    let (status, head, body) = h.get("/doc/5");
    assert_eq!(status, 404);
    assert_eq!(body, "Document not found");
    assert!(head.contains("Cache-Control: no-store"));

    assert_eq!(h.get("/doc/-1").0, 404);
    assert_eq!(h.get("/doc/x").0, 404);
    assert_eq!(h.get("/nope").0, 404);
    assert_eq!(h.get("/ws").0, 426);
    assert_eq!(h.request("POST", "/doc/0").0, 405);

    let (status, _, body) = h.request("HEAD", "/doc/0");
    assert_eq!(status, 200);
    assert!(body.is_empty());

    h.shutdown();
}

#[test]
fn test_change_reloads_every_viewer() {
    let h = Harness::start(&[("a.md", "# A"), ("b.md", "# B")]);
    let mut first = h.connect();
    let mut second = h.connect();

    std::fs::write(h.path("a.md"), "# A2").unwrap();

    for ws in [&mut first, &mut second] {
        let msg = next_text(ws).unwrap();
        assert_eq!(msg, r#"{"type":"reload"}"#);
    }

    // Refetching shows the saved content.
    let (_, _, body) = h.get("/doc/0");
    assert!(body.contains("<h1>A2</h1>"));

    // A viewer connecting after the change got only its ack.
    let mut late = h.connect();
    set_timeout(&late, Duration::from_millis(400));
    assert_eq!(next_text(&mut late), None);

    h.shutdown();
}

#[test]
fn test_closed_viewer_is_answered_and_skipped() {
    let h = Harness::start(&[("a.md", "# A")]);
    let mut stays = h.connect();
    let mut leaves = h.connect();

    leaves.close(None).unwrap();
    let _ = leaves.flush();
    // The server answers the closing handshake
    assert!(matches!(leaves.read(), Ok(Message::Close(_))));
    drop(leaves);

    // Let the close notice reach the registry before the change
    thread::sleep(Duration::from_millis(300));
    std::fs::write(h.path("a.md"), "# A2").unwrap();

    assert_eq!(next_text(&mut stays).unwrap(), r#"{"type":"reload"}"#);

    h.shutdown();
}

#[test]
fn test_shutdown_closes_channels_and_listener() {
    let h = Harness::start(&[("a.md", "# A")]);
    let mut ws = h.connect();
    let addr = h.addr;
    let live_addr = h.live_addr;

    h.shutdown();
    assert!(TcpStream::connect(live_addr).is_err());

    // Channel is gone: close frame or a dead socket, never a message.
    assert_eq!(next_text(&mut ws), None);

    // Listener no longer answers.
    let answered = TcpStream::connect(addr).ok().and_then(|mut stream| {
        stream
            .set_read_timeout(Some(Duration::from_millis(500)))
            .ok()?;
        stream
            .write_all(b"GET /doc/0 HTTP/1.1\r\nConnection: close\r\n\r\n")
            .ok()?;
        let mut buf = [0u8; 16];
        stream.read(&mut buf).ok().filter(|&n| n > 0)
    });
    assert!(answered.is_none());
}
