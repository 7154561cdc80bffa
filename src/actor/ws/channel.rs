//! One live channel per connected viewer.
//!
//! The socket is owned by a dedicated thread fed through a small bounded
//! queue, so a slow or stalled viewer never blocks the actor that
//! broadcasts to everyone else. Between queued writes the thread polls the
//! socket for the viewer's own frames, which is how a closed tab is noticed.

use std::fmt;
use std::io::ErrorKind;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError, TrySendError};
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::actor::messages::WsMsg;
use crate::reload::message::LiveMessage;

/// Pending outbound messages per channel before sends are skipped.
const QUEUE_CAPACITY: usize = 8;
/// Longest wait on either the queue or the socket before checking the other.
const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// A viewer that accepts no bytes for this long is given up on.
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);
/// Idle time after which the viewer is pinged.
const PING_INTERVAL: Duration = Duration::from_secs(15);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Registry key, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a message did not reach a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("outbound queue full")]
    Full,
    #[error("channel closed")]
    Closed,
}

#[derive(Debug)]
pub(crate) enum Outbound {
    Send(LiveMessage),
    Terminate,
}

/// Handle to a connected viewer's push channel.
#[derive(Debug)]
pub struct LiveChannel {
    id: ChannelId,
    queue: channel::Sender<Outbound>,
    open: Arc<AtomicBool>,
    /// Second handle on the socket, for tearing it down past a full queue
    socket: Option<TcpStream>,
}

impl LiveChannel {
    /// Hand the accepted socket to a channel thread and return its handle.
    ///
    /// The thread reports a viewer that closed or went away back to the
    /// actor as [`WsMsg::Closed`].
    pub fn spawn(ws: WebSocket<TcpStream>, ws_tx: mpsc::Sender<WsMsg>) -> std::io::Result<Self> {
        let stream = ws.get_ref();
        stream.set_read_timeout(Some(POLL_INTERVAL))?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        let socket = stream.try_clone()?;

        let id = ChannelId::next();
        let (queue, rx) = channel::bounded(QUEUE_CAPACITY);
        let open = Arc::new(AtomicBool::new(true));

        let thread_open = Arc::clone(&open);
        std::thread::Builder::new()
            .name(format!("live-{}", id.0))
            .spawn(move || run(ws, id, rx, thread_open, ws_tx))?;

        Ok(Self {
            id,
            queue,
            open,
            socket: Some(socket),
        })
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Queue a message without blocking.
    pub fn send(&self, msg: &LiveMessage) -> Result<(), DeliveryError> {
        if !self.is_open() {
            return Err(DeliveryError::Closed);
        }
        match self.queue.try_send(Outbound::Send(msg.clone())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::Full),
            Err(TrySendError::Disconnected(_)) => {
                self.open.store(false, Ordering::Release);
                Err(DeliveryError::Closed)
            }
        }
    }

    /// Ask the channel thread to send a close frame and drop the connection.
    ///
    /// When the queue is full the thread is stuck behind a slow viewer, so
    /// the socket is shut down directly instead.
    pub fn terminate(&self) {
        self.open.store(false, Ordering::Release);
        if self.queue.try_send(Outbound::Terminate).is_err() {
            self.shutdown_socket();
        }
    }

    /// Cut the connection without going through the channel thread.
    pub fn shutdown_socket(&self) {
        if let Some(socket) = &self.socket {
            let _ = socket.shutdown(Shutdown::Both);
        }
    }

    /// A channel with no socket behind it; the receiver sees what was queued.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, channel::Receiver<Outbound>) {
        let (queue, rx) = channel::bounded(QUEUE_CAPACITY);
        let channel = Self {
            id: ChannelId::next(),
            queue,
            open: Arc::new(AtomicBool::new(true)),
            socket: None,
        };
        (channel, rx)
    }

    /// A channel on a real socket whose queue nobody drains, like a thread
    /// stuck in a write.
    #[cfg(test)]
    pub(crate) fn stalled(socket: TcpStream) -> (Self, channel::Receiver<Outbound>) {
        let (mut channel, rx) = Self::detached();
        channel.socket = Some(socket);
        (channel, rx)
    }
}

/// How a channel thread ended.
enum Exit {
    /// Close frame sent on request
    Terminated,
    /// Handle dropped by the registry
    Released,
    /// Viewer sent a close frame
    PeerClosed,
    /// Socket error or EOF
    Lost(tungstenite::Error),
}

fn run(
    mut ws: WebSocket<TcpStream>,
    id: ChannelId,
    rx: channel::Receiver<Outbound>,
    open: Arc<AtomicBool>,
    ws_tx: mpsc::Sender<WsMsg>,
) {
    let mut last_write = Instant::now();

    let exit = loop {
        let written = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Outbound::Send(msg)) => Some(ws.send(Message::Text(msg.to_json().into()))),
            Ok(Outbound::Terminate) => {
                let _ = ws.close(None);
                let _ = ws.flush();
                break Exit::Terminated;
            }
            Err(RecvTimeoutError::Timeout) if last_write.elapsed() >= PING_INTERVAL => {
                Some(ws.send(Message::Ping(Default::default())))
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break Exit::Released,
        };
        match written {
            Some(Err(e)) => break Exit::Lost(e),
            Some(Ok(())) => last_write = Instant::now(),
            None => {}
        }

        match poll_inbound(&mut ws) {
            Ok(true) => {}
            Ok(false) => break Exit::PeerClosed,
            Err(e) => break Exit::Lost(e),
        }
    };

    open.store(false, Ordering::Release);
    // The registry's handle shares the socket; closing ours alone keeps it up.
    let _ = ws.get_ref().shutdown(Shutdown::Both);

    match exit {
        Exit::Terminated | Exit::Released => {}
        Exit::PeerClosed => {
            crate::debug!("ws"; "channel {} closed by viewer", id);
            let _ = ws_tx.blocking_send(WsMsg::Closed(id));
        }
        Exit::Lost(e) => {
            crate::debug!("ws"; "channel {} lost: {}", id, e);
            let _ = ws_tx.blocking_send(WsMsg::Closed(id));
        }
    }
    crate::debug!("ws"; "channel {} thread stopped", id);
}

/// Drain frames the viewer sent. `Ok(false)` once it asked to close.
///
/// Pings are answered by tungstenite on the next read or flush; anything
/// else a viewer sends is ignored.
fn poll_inbound(ws: &mut WebSocket<TcpStream>) -> tungstenite::Result<bool> {
    loop {
        match ws.read() {
            Ok(Message::Close(_)) => {
                // Sends the queued close reply
                let _ = ws.flush();
                return Ok(false);
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                return Ok(true);
            }
            Err(e) => return Err(e),
        }
    }
}
