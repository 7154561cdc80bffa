//! Page Composer - wraps rendered markup into the full preview page.
//!
//! The page carries:
//! - header with the escaped document path
//! - prev/next buttons (disabled at the ends) and an `i/N` counter
//! - one link per document, the active one highlighted
//! - the rendered markup, verbatim (already sanitized)
//! - the live-update client stub, pointed at the live listener's port

use std::fmt::Write;

use crate::document::DocumentSet;
use crate::embed::page::{PageVars, page_html};
use crate::utils::html::escape;

/// URL of the view for document `index`.
pub fn doc_url(index: usize) -> String {
    format!("/doc/{index}")
}

/// Compose the full page for document `index`.
///
/// Returns `None` if `index` is out of range.
pub fn compose(docs: &DocumentSet, index: usize, markup: &str, live_port: u16) -> Option<String> {
    let doc = docs.get(index)?;
    let neighbors = docs.neighbors(index);

    let title = format!("{} - mdprev", escape(&doc.display_name));
    let path = escape(&doc.path.to_string_lossy()).into_owned();
    let prev = nav_button("nav-prev", "Prev", neighbors.prev);
    let next = nav_button("nav-next", "Next", neighbors.next);
    let doc_links = doc_links(docs, index);

    let vars = PageVars {
        title: &title,
        path: &path,
        index,
        total: docs.len(),
        prev: &prev,
        next: &next,
        doc_links: &doc_links,
        body: markup,
        live_port,
    };
    Some(page_html().render(&vars))
}

/// Compose a page reporting that document `index` could not be read.
///
/// Still carries the live client, so the tab recovers on the next change.
pub fn compose_error(
    docs: &DocumentSet,
    index: usize,
    message: &str,
    live_port: u16,
) -> Option<String> {
    let body = format!(
        "<h1>Cannot read document</h1><pre class=\"error\">{}</pre>",
        escape(message)
    );
    compose(docs, index, &body, live_port)
}

fn nav_button(id: &str, label: &str, target: Option<usize>) -> String {
    match target {
        Some(i) => format!(r#"<a id="{id}" class="nav-btn" href="{}">{label}</a>"#, doc_url(i)),
        None => format!(r#"<a id="{id}" class="nav-btn disabled" aria-disabled="true">{label}</a>"#),
    }
}

fn doc_links(docs: &DocumentSet, active: usize) -> String {
    let mut out = String::new();
    for doc in docs.all() {
        let label = escape(&doc.display_name);
        let url = doc_url(doc.index);
        if doc.index == active {
            let _ = write!(
                out,
                r#"<a class="doc-link active" aria-current="page" href="{url}">{label}</a>"#
            );
        } else {
            let _ = write!(out, r#"<a class="doc-link" href="{url}">{label}</a>"#);
        }
    }
    out
}
