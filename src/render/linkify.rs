//! Bare URL detection for plain text runs.

use std::sync::LazyLock;

use regex::Regex;

/// `http(s)://` or `www.` followed by non-space characters, not ending in
/// trailing punctuation.
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?://|www\.)[^\x00-\x20<>"'`]*[^\x00-\x20<>"'`.,:;!?)\]}*_~]"#).unwrap()
});

#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Link { text: &'a str, href: String },
}

/// Split text into plain runs and detected links.
pub fn split(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in URL.find_iter(text) {
        // Only at a word boundary: `xhttps://` and `awww.` stay text
        let glued = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        if glued {
            continue;
        }

        if m.start() > last {
            segments.push(Segment::Text(&text[last..m.start()]));
        }
        let href = if m.as_str().starts_with("www.") {
            format!("http://{}", m.as_str())
        } else {
            m.as_str().to_string()
        };
        segments.push(Segment::Link {
            text: m.as_str(),
            href,
        });
        last = m.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_text() {
        assert_eq!(split("no links here"), vec![Segment::Text("no links here")]);
        assert!(split("").is_empty());
    }

    #[test]
    fn test_split_trailing_punctuation() {
        assert_eq!(
            split("(https://x.io/a)."),
            vec![
                Segment::Text("("),
                Segment::Link {
                    text: "https://x.io/a",
                    href: "https://x.io/a".into()
                },
                Segment::Text(")."),
            ]
        );
    }

    #[test]
    fn test_split_requires_boundary() {
        assert_eq!(split("foohttps://x.io"), vec![Segment::Text("foohttps://x.io")]);
        assert_eq!(split("awww.x.io"), vec![Segment::Text("awww.x.io")]);
    }

    #[test]
    fn test_split_bare_scheme_is_text() {
        assert_eq!(split("https://"), vec![Segment::Text("https://")]);
    }
}
