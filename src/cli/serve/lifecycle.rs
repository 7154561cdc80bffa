//! Server lifecycle management.

use crate::{actor::Coordinator, core::register_server, log};
use anyhow::{Result, anyhow};
use crossbeam::channel::Sender;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the listener.
///
/// Port 0 asks the OS for a free port. A fixed port that is taken is
/// retried on the following ports.
pub fn bind(interface: IpAddr, port: u16) -> Result<Server> {
    if port == 0 {
        return Server::http(SocketAddr::new(interface, 0))
            .map_err(|e| anyhow!("Failed to bind {}: {}", interface, e));
    }
    bind_with_retry(interface, port)
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<Server> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };

        match Server::http(SocketAddr::new(interface, port)) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok(server);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts from port {}: {}",
        MAX_PORT_RETRIES,
        base_port,
        last_error.map_or_else(|| "port range exhausted".to_string(), |e| e.to_string())
    ))
}

/// Register server for graceful shutdown.
///
/// This registers the server with the global shutdown handler set up in main().
/// When Ctrl+C is pressed, the handler notifies the coordinator, which
/// unblocks the server once live channels are closed.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server, shutdown_tx);
}

/// Run the actor system on its own thread.
pub fn spawn_actors(coordinator: Coordinator) -> JoinHandle<()> {
    thread::spawn(move || run_actor_system(coordinator))
}

fn run_actor_system(coordinator: Coordinator) {
    // Watcher and registry are light; one thread drives both.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("actor"; "failed to create runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        if let Err(e) = coordinator.run().await {
            log!("actor"; "error: {}", e);
        }
    });
}

/// Wait for a background thread to finish (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>, what: &str) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    log!("serve"; "{} did not stop in time", what);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_port_zero_gets_os_port() {
        let server = bind(LOOPBACK, 0).unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_busy_port_falls_forward() {
        let first = bind(LOOPBACK, 0).unwrap();
        let taken = first.server_addr().to_ip().unwrap().port();
        if taken > u16::MAX - MAX_PORT_RETRIES {
            return;
        }

        let second = bind(LOOPBACK, taken).unwrap();
        let port = second.server_addr().to_ip().unwrap().port();
        assert!(port > taken && port < taken + MAX_PORT_RETRIES);
    }
}
