//! WebSocket Actor - Reload Broadcast
//!
//! This actor is responsible for:
//! - Owning the registry of live channels
//! - Acknowledging new channels with a `connected` message
//! - Broadcasting `reload` to every open channel on a document change
//!
//! # Architecture
//!
//! ```text
//! FsActor --[Change]--> WsActor --[try_send]--> channel thread per viewer
//!                          ^                          |
//!                          +--------[Closed]----------+
//! ```

mod channel;
mod delivery;
mod registry;

use std::time::Duration;

use tokio::sync::mpsc;

pub use channel::{ChannelId, LiveChannel};
use delivery::broadcast;
use registry::ConnectionRegistry;

use super::messages::WsMsg;
use crate::reload::message::LiveMessage;
use crate::utils::path::display_name;

/// Time given to close frames before the sockets are cut.
const CLOSE_GRACE: Duration = Duration::from_millis(100);

/// WebSocket Actor - manages live channels and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    registry: ConnectionRegistry,
    /// Channels terminated on shutdown, cut after [`CLOSE_GRACE`]
    closing: Vec<LiveChannel>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            registry: ConnectionRegistry::new(),
            closing: Vec::new(),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            if !self.handle(msg) {
                break;
            }
        }
        // Senders gone without an explicit shutdown
        self.closing.extend(self.registry.close_all());

        // A thread stuck in a write never reaches its Terminate.
        if !self.closing.is_empty() {
            tokio::time::sleep(CLOSE_GRACE).await;
            for channel in &self.closing {
                channel.shutdown_socket();
            }
        }
        crate::debug!("ws"; "stopped, closed {} channels", self.closing.len());
    }

    /// Apply one message. Returns `false` once the actor should stop.
    fn handle(&mut self, msg: WsMsg) -> bool {
        match msg {
            WsMsg::AddClient(channel) => {
                // Registered first, so a reload racing the ack still reaches it.
                let id = self.registry.register(channel);
                let acked = self
                    .registry
                    .get(id)
                    .map(|c| c.send(&LiveMessage::connected()));
                if let Some(Err(e)) = acked {
                    crate::debug!("ws"; "channel {} not acknowledged: {}", id, e);
                    self.registry.unregister(id);
                } else {
                    crate::debug!("ws"; "channel {} connected (total: {})", id, self.registry.len());
                }
            }

            WsMsg::Closed(id) => {
                if self.registry.unregister(id).is_some() {
                    crate::debug!("ws"; "channel {} closed (total: {})", id, self.registry.len());
                }
            }

            WsMsg::Change(event) => {
                let report = broadcast(&mut self.registry, &LiveMessage::Reload);
                let name = display_name(&event.affected_path);
                crate::logger::status_success(&format!(
                    "reload {} ({} {})",
                    name,
                    report.sent,
                    if report.sent == 1 { "viewer" } else { "viewers" }
                ));
                if report.skipped > 0 || report.dropped > 0 {
                    crate::debug!("ws"; "skipped {}, dropped {}", report.skipped, report.dropped);
                }
            }

            WsMsg::Shutdown => {
                self.closing = self.registry.close_all();
                crate::debug!("ws"; "shutting down");
                return false;
            }
        }
        true
    }
}
