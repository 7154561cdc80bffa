use rustc_hash::FxHashMap;

use super::channel::{ChannelId, LiveChannel};

/// Every live channel the server currently pushes to.
///
/// Owned by the WsActor alone; other components reach it through messages.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    channels: FxHashMap<ChannelId, LiveChannel>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, channel: LiveChannel) -> ChannelId {
        let id = channel.id();
        self.channels.insert(id, channel);
        id
    }

    /// Remove a channel. Unknown ids are ignored.
    pub fn unregister(&mut self, id: ChannelId) -> Option<LiveChannel> {
        self.channels.remove(&id)
    }

    pub fn get(&self, id: ChannelId) -> Option<&LiveChannel> {
        self.channels.get(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &LiveChannel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Terminate every channel and hand back the handles, so the caller
    /// can cut sockets that do not close in time.
    pub fn close_all(&mut self) -> Vec<LiveChannel> {
        self.channels
            .drain()
            .map(|(_, channel)| {
                channel.terminate();
                channel
            })
            .collect()
    }
}
