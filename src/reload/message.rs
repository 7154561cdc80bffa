//! Live Channel Message Protocol
//!
//! JSON text frames sent from the server to browser tabs.
//!
//! # Message Types
//!
//! - `connected`: acknowledgment after the channel is registered
//! - `reload`: refetch the current page
//!
//! A reload carries no document context; the tab knows what it shows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveMessage {
    /// Channel registered
    Connected {
        /// Server version
        version: String,
    },

    /// Reload the current page
    Reload,
}

impl LiveMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_json() {
        assert_eq!(LiveMessage::Reload.to_json(), r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_connected_json() {
        let json = LiveMessage::connected().to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "connected");
        assert_eq!(parsed["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_parse_reload() {
        let msg: LiveMessage = serde_json::from_str(r#"{"type":"reload"}"#).unwrap();
        assert_eq!(msg, LiveMessage::Reload);
    }
}
