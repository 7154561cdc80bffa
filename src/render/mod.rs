//! Renderer pipeline: raw markdown text → sanitized markup.
//!
//! ```text
//! source --[markdown]--> raw html --[sanitize]--> safe html
//!              |
//!          [linkify]
//! ```
//!
//! Pure and stateless. Every input renders to something (malformed markdown
//! degrades to best-effort markup), and the same input always yields the
//! same bytes.

mod linkify;
mod markdown;
mod sanitize;

pub use markdown::to_html;
pub use sanitize::clean;

/// Render markdown source to markup that is safe to embed in a page body.
pub fn render(source: &str) -> String {
    clean(&to_html(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"# Title

Some *emphasis*, ~~gone~~ and "quotes" -- see https://example.com/docs.

| a | b |
|---|:-:|
| 1 | 2 |

- [x] done
- [ ] todo

```rust
fn main() {}
```

<div onclick="alert(1)">raw</div>
"#;

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(SAMPLE), render(SAMPLE));
    }

    #[test]
    fn test_render_keeps_structure() {
        let html = render(SAMPLE);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains(r#"<code class="language-rust">"#));
        assert!(html.contains(r#"href="https://example.com/docs""#));
        assert!(html.contains("\u{201c}quotes\u{201d}"));
        assert!(html.contains("\u{2013}"));
    }

    #[test]
    fn test_render_task_list_is_inert() {
        let html = render("- [x] done\n- [ ] todo\n");
        assert_eq!(html.matches("<input").count(), 2);
        assert_eq!(html.matches("disabled").count(), 2);
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_render_never_passes_raw_html() {
        let html = render(SAMPLE);
        assert!(!html.contains("<div"));
        assert!(html.contains("&lt;div onclick="));
    }

    #[test]
    fn test_render_strips_script() {
        for source in [
            "<script>alert(1)</script>",
            "text <script>alert(1)</script> inline",
            "[click](javascript:alert(1))",
            "![img](javascript:alert(1))",
            "<img src=x onerror=alert(1)>",
        ] {
            let html = render(source);
            assert!(!html.contains("<script"), "{source} -> {html}");
            assert!(!html.contains("javascript:"), "{source} -> {html}");
            assert!(!html.contains("<img src=\"x\""), "{source} -> {html}");
        }
    }

    #[test]
    fn test_render_degrades_on_malformed_input() {
        for source in ["", "[unclosed", "```\nno fence end", "| a |\n|-", "*a **b", "\0\u{feff}"] {
            let _ = render(source);
        }
        assert_eq!(render(""), "");
    }
}
