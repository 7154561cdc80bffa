use super::channel::DeliveryError;
use super::registry::ConnectionRegistry;
use crate::reload::message::LiveMessage;

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Queued for delivery
    pub sent: usize,
    /// Queue full; the viewer already has a reload pending
    pub skipped: usize,
    /// Found closed and unregistered
    pub dropped: usize,
}

/// Push `msg` to every registered channel without blocking.
///
/// Closed channels are removed from the registry on the way.
pub fn broadcast(registry: &mut ConnectionRegistry, msg: &LiveMessage) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    let mut closed = Vec::new();

    for channel in registry.all() {
        match channel.send(msg) {
            Ok(()) => report.sent += 1,
            Err(DeliveryError::Full) => report.skipped += 1,
            Err(DeliveryError::Closed) => closed.push(channel.id()),
        }
    }

    for id in closed {
        registry.unregister(id);
        report.dropped += 1;
    }

    report
}
