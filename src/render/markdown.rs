//! Markdown to HTML using pulldown-cmark.
//!
//! Raw HTML in the source is never passed through: blocks and inline tags
//! are re-emitted as text, so they show up escaped.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html};

use super::linkify::{self, Segment};

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_SMART_PUNCTUATION);
    opts
}

/// Convert markdown source to (unsanitized) HTML.
pub fn to_html(source: &str) -> String {
    let mut converter = Converter::default();
    for event in Parser::new_ext(source, options()) {
        converter.push(event);
    }
    let events = converter.finish();

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Event rewriter: disarms raw HTML and linkifies text runs.
#[derive(Default)]
struct Converter<'a> {
    events: Vec<Event<'a>>,
    /// Adjacent text events are merged so URLs split by the parser are seen whole
    pending: String,
    /// Nesting depth of links, images and code blocks (no autolinking inside)
    literal_depth: usize,
}

impl<'a> Converter<'a> {
    fn push(&mut self, event: Event<'a>) {
        match disarm(event) {
            Event::Text(text) => self.pending.push_str(&text),
            event => {
                self.flush_text();
                match &event {
                    Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                        self.literal_depth += 1;
                    }
                    Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                        self.literal_depth = self.literal_depth.saturating_sub(1);
                    }
                    _ => {}
                }
                self.events.push(event);
            }
        }
    }

    fn finish(mut self) -> Vec<Event<'a>> {
        self.flush_text();
        self.events
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);

        if self.literal_depth > 0 {
            self.events.push(Event::Text(text.into()));
            return;
        }

        for segment in linkify::split(&text) {
            match segment {
                Segment::Text(s) => self.events.push(Event::Text(s.to_string().into())),
                Segment::Link { text, href } => {
                    self.events.push(Event::Start(Tag::Link {
                        link_type: LinkType::Autolink,
                        dest_url: href.into(),
                        title: CowStr::Borrowed(""),
                        id: CowStr::Borrowed(""),
                    }));
                    self.events.push(Event::Text(text.to_string().into()));
                    self.events.push(Event::End(TagEnd::Link));
                }
            }
        }
    }
}

/// Turn raw HTML events into plain text.
fn disarm(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_block_becomes_escaped_paragraph() {
        let html = to_html("<div>\n<b>hi</b>\n</div>\n");
        assert!(html.starts_with("<p>&lt;div&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_inline_html_is_escaped() {
        let html = to_html("a <span>b</span> c");
        assert_eq!(html, "<p>a &lt;span&gt;b&lt;/span&gt; c</p>\n");
    }

    #[test]
    fn test_bare_url_is_linked() {
        let html = to_html("visit https://example.com/a_b_c now");
        assert!(html.contains(r#"<a href="https://example.com/a_b_c">https://example.com/a_b_c</a>"#));
    }

    #[test]
    fn test_www_url_gets_scheme() {
        let html = to_html("see www.rust-lang.org.");
        assert!(html.contains(r#"<a href="http://www.rust-lang.org">www.rust-lang.org</a>."#));
    }

    #[test]
    fn test_no_autolink_inside_code_or_links() {
        let html = to_html("`https://a.com`\n\n[https://b.com](https://c.com)\n\n    https://d.com\n");
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains(r#"<a href="https://c.com">https://b.com</a>"#));
    }

    #[test]
    fn test_typographer() {
        let html = to_html("\"hi\" -- it's...");
        assert!(html.contains('\u{201c}'));
        assert!(html.contains('\u{2019}'));
        assert!(html.contains('\u{2026}'));
    }
}
