//! Resolved runtime configuration.

mod serve;

pub use serve::ServeConfig;
