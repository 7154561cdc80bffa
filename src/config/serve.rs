//! Preview server settings.
//!
//! Built from the command line; there is no config file.

use std::net::{IpAddr, Ipv4Addr};

use crate::cli::Cli;

/// Preview server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Network interface to bind. Always loopback: the preview exposes
    /// local files to anyone who can reach it.
    pub interface: IpAddr,

    /// HTTP port number. `0` lets the OS pick.
    pub port: u16,

    /// Open the preview in the default browser after binding.
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            open: true,
        }
    }
}

impl ServeConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            port: cli.port,
            open: !cli.no_open,
            ..Self::default()
        }
    }
}
