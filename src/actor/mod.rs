//! Actor System for Live Reload
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FsActor --Change--> WsActor --reload--> LiveChannel threads <--> tabs
//! (watch)            (registry) <--Closed--------+
//!                       ^
//! LiveListener --AddClient
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `ws` - Connection registry and reload broadcast
//! - `coordinator` - Runs actors and sequences shutdown

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
