//! HTTP response helpers.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::utils::mime::types::{HTML, PLAIN};

/// A response decided before touching the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub headers: Vec<(&'static str, String)>,
}

impl Reply {
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: HTML,
            body,
            headers: Vec::new(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: PLAIN,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    pub fn redirect(location: String) -> Self {
        Self::text(302, "Found").with_header("Location", location)
    }

    pub fn method_not_allowed() -> Self {
        Self::text(405, "Method Not Allowed").with_header("Allow", "GET, HEAD".to_string())
    }

    pub fn unavailable() -> Self {
        Self::text(503, "Server is shutting down")
    }

    pub fn with_header(mut self, key: &'static str, value: String) -> Self {
        self.headers.push((key, value));
        self
    }
}

/// Write `reply` to the client.
///
/// `tiny_http` omits the body for `HEAD` while keeping its length.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut response = Response::from_data(reply.body.into_bytes())
        .with_status_code(StatusCode(reply.status))
        .with_header(make_header("Content-Type", reply.content_type)?)
        .with_header(make_header("Cache-Control", "no-store")?);

    for (key, value) in &reply.headers {
        response.add_header(make_header(key, value)?);
    }

    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|_| anyhow!("invalid header {key}: {value}"))
}
