//! Actor Coordinator - Runs the Live Reload Actor System
//!
//! # Responsibility
//!
//! The Coordinator is a thin orchestrator that:
//! - Runs the watcher and the broadcast actor concurrently
//! - Waits for the shutdown signal
//! - Tears down in order: stop watching, close channels, stop accepting
//!
//! # Architecture
//!
//! ```text
//! FsActor --Change--> WsActor <--AddClient-- LiveListener
//!    |                   |
//!    +----- Coordinator -+--> server.unblock()
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{Receiver, TryRecvError};
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::WsMsg;
use super::ws::WsActor;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;
/// How often the shutdown signal is polled
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
/// Upper bound for closing live channels
const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Create the WsActor mailbox shared by the live listener, channel threads and watcher.
pub fn ws_channel() -> (mpsc::Sender<WsMsg>, mpsc::Receiver<WsMsg>) {
    mpsc::channel(CHANNEL_BUFFER)
}

/// Coordinator - wires up and runs the actor system
pub struct Coordinator {
    fs: FsActor,
    ws_rx: mpsc::Receiver<WsMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    /// Fires (or disconnects) when the session should end
    shutdown_rx: Receiver<()>,
    /// Server to unblock once live channels are closed
    server: Option<Arc<tiny_http::Server>>,
}

impl Coordinator {
    pub fn new(
        fs: FsActor,
        ws_rx: mpsc::Receiver<WsMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        shutdown_rx: Receiver<()>,
    ) -> Self {
        Self {
            fs,
            ws_rx,
            ws_tx,
            shutdown_rx,
            server: None,
        }
    }

    /// Set the server whose request loop ends the session
    pub fn with_server(mut self, server: Arc<tiny_http::Server>) -> Self {
        self.server = Some(server);
        self
    }

    /// Run the actor system until shutdown.
    pub async fn run(self) -> Result<()> {
        let Self {
            fs,
            ws_rx,
            ws_tx,
            shutdown_rx,
            server,
        } = self;

        crate::debug!("actor"; "start");
        let fs_handle = tokio::spawn(fs.run());
        let ws_handle = tokio::spawn(WsActor::new(ws_rx).run());

        loop {
            match shutdown_rx.try_recv() {
                Err(TryRecvError::Empty) => tokio::time::sleep(SHUTDOWN_POLL).await,
                _ => break,
            }
        }
        crate::debug!("actor"; "shutdown signal received");

        // No change may be broadcast after channels start closing.
        fs_handle.abort();
        let _ = fs_handle.await;

        let _ = ws_tx.send(WsMsg::Shutdown).await;
        if tokio::time::timeout(CLOSE_TIMEOUT, ws_handle).await.is_err() {
            crate::debug!("actor"; "live channels did not close in time");
        }

        if let Some(server) = server {
            server.unblock();
        }

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
