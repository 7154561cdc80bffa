//! Actor Message Definitions
//!
//! ```text
//! FsActor --Change--> WsActor <--AddClient/Closed-- LiveListener, channel threads
//! ```

use std::path::PathBuf;

use super::ws::{ChannelId, LiveChannel};

/// A watched document was modified on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub affected_path: PathBuf,
}

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Register a freshly handshaken channel
    AddClient(LiveChannel),
    /// The viewer closed its channel or the connection broke
    Closed(ChannelId),
    /// Document changed: reload every open channel
    Change(ChangeEvent),
    /// Close every channel and stop
    Shutdown,
}
