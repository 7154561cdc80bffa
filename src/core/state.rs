//! Process-wide shutdown state for serve mode.
//!
//! `SHUTDOWN` is set once a termination signal arrives. From then on the
//! gateway answers `503`, and the coordinator tears the session down in
//! order before the listener is unblocked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam::channel::Sender;
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a server has been registered:
/// - Before `register_server()`: exit immediately, nothing to tear down
/// - After `register_server()`: signal the coordinator, which closes live
///   channels and then unblocks the server
/// - A second signal while shutting down exits at once
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }

        let Some(server) = SERVER.get() else {
            std::process::exit(0);
        };

        crate::log!("serve"; "shutting down...");
        let notified = SHUTDOWN_TX.get().is_some_and(|tx| tx.send(()).is_ok());
        if !notified {
            // Actor system already gone; nothing left to close first
            server.unblock();
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>, shutdown_tx: Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
///
/// Relaxed is enough: a request racing the flag is still served normally
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
