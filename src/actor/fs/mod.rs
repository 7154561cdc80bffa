//! FileSystem Actor
//!
//! Watches the documents' directories and emits one [`ChangeEvent`] per
//! modified document after a short debounce.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (timing + path filter) → WsMsg::Change
//! ```
//!
//! The watcher only reports modifications after it is attached; the initial
//! state of the files never produces an event.

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::{ChangeEvent, WsMsg};
use crate::document::DocumentSet;

// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


use debouncer::Debouncer;
use types::WatchedPaths;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches the Document Set for changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Documents' parent directories, re-attached when recreated
    watch_roots: WatchRoots,
    /// Documents we report on
    watched: WatchedPaths,
    /// Channel to send change events to WsActor
    ws_tx: mpsc::Sender<WsMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    /// Create the watcher and attach it immediately.
    ///
    /// Failing to attach is a startup error.
    pub fn new(docs: &DocumentSet, ws_tx: mpsc::Sender<WsMsg>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let watched: WatchedPaths = docs.paths().map(|p| p.to_path_buf()).collect();
        let mut watch_roots = WatchRoots::for_documents(docs);
        watch_roots.attach(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            watched,
            ws_tx,
            debouncer: Debouncer::new(),
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let ws_tx = self.ws_tx;
        let watched = self.watched;
        let mut debouncer = self.debouncer;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // Bridge thread: ends when the watcher (and its sender) is dropped
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event, &watched),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    if emit_changes(&mut debouncer, &ws_tx).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Send one change event per debounced path.
///
/// Returns `Err(())` if the WsActor shut down
async fn emit_changes(debouncer: &mut Debouncer, ws_tx: &mpsc::Sender<WsMsg>) -> Result<(), ()> {
    let Some(paths) = debouncer.take_if_ready() else {
        return Ok(());
    };

    for affected_path in paths {
        crate::debug!("watch"; "changed: {}", affected_path.display());
        ws_tx
            .send(WsMsg::Change(ChangeEvent { affected_path }))
            .await
            .map_err(|_| ())?;
    }
    Ok(())
}
