//! Embedded static resources for the preview page.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `page` - Preview page template, stylesheet and live-update client
//!
//! The stylesheet and client script are minified by `build.rs` and pulled in
//! from `OUT_DIR`.
//!
//! # Usage
//!
//! ```ignore
//! use embed::page::{PageVars, page_html};
//!
//! let html = page_html().render(&vars);
//! ```

mod template;

pub use template::{Template, TemplateVars, fill};

pub mod page {
    use super::{Template, TemplateVars, fill};

    /// Minified page stylesheet.
    pub const PAGE_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/page.min.css"));

    /// Minified live-update client stub.
    pub const LIVE_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/live.min.js"));

    /// Variables for page.html template.
    ///
    /// Every field except `body` must already be escaped or be trusted markup
    /// produced by the composer itself.
    pub struct PageVars<'a> {
        pub title: &'a str,
        pub path: &'a str,
        pub index: usize,
        pub total: usize,
        pub prev: &'a str,
        pub next: &'a str,
        pub doc_links: &'a str,
        pub body: &'a str,
        /// Port the live client connects to
        pub live_port: u16,
    }

    impl TemplateVars for PageVars<'_> {
        fn apply(&self, content: &str) -> String {
            let index = self.index.to_string();
            let position = (self.index + 1).to_string();
            let total = self.total.to_string();
            let live_port = self.live_port.to_string();
            fill(
                content,
                &[
                    ("title", self.title),
                    ("css", PAGE_CSS),
                    ("index", &index),
                    ("total", &total),
                    ("position", &position),
                    ("path", self.path),
                    ("prev", self.prev),
                    ("next", self.next),
                    ("doc_links", self.doc_links),
                    ("body", self.body),
                    ("live_port", &live_port),
                    ("script", LIVE_JS),
                ],
            )
        }
    }

    const PAGE_TEMPLATE: &str = include_str!("page/page.html");

    /// Preview page template, typed for variables borrowed for `'a`.
    pub const fn page_html<'a>() -> Template<PageVars<'a>> {
        Template::new(PAGE_TEMPLATE)
    }
}
