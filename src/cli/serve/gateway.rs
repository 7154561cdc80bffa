//! Request dispatch: pages and redirects.

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Method, Request};

use super::response::{self, Reply};
use super::route::{self, Route};
use crate::document::DocumentSet;
use crate::page::{compose, compose_error, doc_url};

/// Stateless per request; shared by the request pool.
#[derive(Clone)]
pub struct Gateway {
    docs: Arc<DocumentSet>,
    /// Port of the live channel listener, embedded in every page
    live_port: u16,
}

impl Gateway {
    pub fn new(docs: Arc<DocumentSet>, live_port: u16) -> Self {
        Self { docs, live_port }
    }

    /// Handle a single HTTP request
    pub fn handle(&self, request: Request) -> Result<()> {
        // Early exit if shutdown requested
        if crate::core::is_shutdown() {
            return response::send(request, Reply::unavailable());
        }

        let method = request.method().clone();
        if !matches!(method, Method::Get | Method::Head) {
            return response::send(request, Reply::method_not_allowed());
        }

        let route = route::resolve(request.url(), self.docs.len());
        crate::debug!("serve"; "{} {} -> {:?}", method, request.url(), route);
        response::send(request, self.reply(route))
    }

    /// Decide the response for a request.
    pub fn reply(&self, route: Route) -> Reply {
        match route {
            Route::Root => Reply::redirect(doc_url(0)),
            Route::Doc(index) => self.doc_page(index),
            Route::DocNotFound => Reply::text(404, "Document not found"),
            // Upgrades happen on the live listener only
            Route::LiveChannel => Reply::text(426, "Upgrade Required"),
            Route::NotFound => Reply::text(404, "Not Found"),
        }
    }

    /// Read the document fresh from disk, render it, and wrap it in a page.
    fn doc_page(&self, index: usize) -> Reply {
        let Some(doc) = self.docs.get(index) else {
            return Reply::text(404, "Document not found");
        };

        let page = match fs::read(&doc.path) {
            Ok(bytes) => {
                let markup = crate::render::render(&String::from_utf8_lossy(&bytes));
                compose(&self.docs, index, &markup, self.live_port)
                    .map(|page| Reply::html(200, page))
            }
            Err(e) => {
                let message = format!("{}: {}", doc.path.display(), e);
                crate::logger::status_error("cannot read document", &message);
                compose_error(&self.docs, index, &message, self.live_port)
                    .map(|page| Reply::html(500, page))
            }
        };
        page.unwrap_or_else(|| Reply::text(404, "Document not found"))
    }
}
