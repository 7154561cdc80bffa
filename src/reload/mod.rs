//! Reload Module
//!
//! Wire-level pieces of live reload.
//!
//! # Modules
//!
//! - `message` - Live channel message types (connected, reload)
//! - `server` - Listener that handshakes live channels

pub mod message;
pub mod server;
