//! Preview server: HTTP pages, plus a companion listener for live channels.

mod gateway;
mod lifecycle;
mod response;
mod route;

#[cfg(test)]
mod tests;

pub use gateway::Gateway;

use crate::{
    actor::{Coordinator, coordinator::ws_channel, fs::FsActor},
    config::ServeConfig,
    document::DocumentSet,
    log,
    reload::server::LiveListener,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::sync::Arc;
use tiny_http::Server;

/// Request handler threads.
const POOL_THREADS: usize = 4;

/// Serve `docs` until a termination signal arrives.
pub fn serve(config: &ServeConfig, docs: DocumentSet) -> Result<()> {
    let docs = Arc::new(docs);
    let (ws_tx, ws_rx) = ws_channel();

    // Watch before binding: a watcher failure is a startup error.
    let fs_actor = FsActor::new(&docs, ws_tx.clone()).context("Failed to watch documents")?;

    let server = Arc::new(lifecycle::bind(config.interface, config.port)?);
    let addr = server
        .server_addr()
        .to_ip()
        .context("listener has no IP address")?;
    let url = format!("http://{addr}/");
    let live = LiveListener::start(config.interface, ws_tx.clone())?;
    let live_port = live.port();

    println!("{url}");
    log!("serve"; "previewing {} document(s), live channels on port {}", docs.len(), live_port);

    if config.open
        && let Err(e) = webbrowser::open(&url)
    {
        log!("serve"; "could not open browser: {}", e);
    }

    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    let coordinator =
        Coordinator::new(fs_actor, ws_rx, ws_tx, shutdown_rx).with_server(Arc::clone(&server));
    let actors = lifecycle::spawn_actors(coordinator);

    run_request_loop(&server, Gateway::new(docs, live_port))?;
    lifecycle::wait_for_shutdown(actors, "actor system");
    lifecycle::wait_for_shutdown(live.into_handle(), "live listener");
    Ok(())
}

/// Dispatch requests to a small pool until the server is unblocked.
pub fn run_request_loop(server: &Server, gateway: Gateway) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let gateway = gateway.clone();
        pool.spawn(move || {
            if let Err(e) = gateway.handle(request) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}
