//! URL routing for the preview gateway.

use percent_encoding::percent_decode_str;

use crate::reload::server::LIVE_PATH;

const DOC_PREFIX: &str = "/doc/";

/// Where a request URL points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Root,
    /// `/doc/{i}` with `i` in range
    Doc(usize),
    /// `/doc/{x}` that does not name a document
    DocNotFound,
    /// [`LIVE_PATH`], which upgrades only on the live listener
    LiveChannel,
    NotFound,
}

/// Resolve a request URL against a Document Set of `total` documents.
pub fn resolve(url: &str, total: usize) -> Route {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    if path.is_empty() || path == "/" {
        return Route::Root;
    }
    if path.strip_suffix('/').unwrap_or(path) == LIVE_PATH {
        return Route::LiveChannel;
    }
    if let Some(segment) = path.strip_prefix(DOC_PREFIX) {
        let segment = segment.strip_suffix('/').unwrap_or(segment);
        return match parse_index(segment) {
            Some(index) if index < total => Route::Doc(index),
            _ => Route::DocNotFound,
        };
    }
    Route::NotFound
}

/// Plain decimal index, after percent-decoding. Signs, blanks and
/// fractions are rejected.
fn parse_index(segment: &str) -> Option<usize> {
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    if decoded.is_empty() || !decoded.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    decoded.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root() {
        assert_eq!(resolve("/", 2), Route::Root);
        assert_eq!(resolve("/?x=1", 2), Route::Root);
    }

    #[test]
    fn test_doc_in_range() {
        assert_eq!(resolve("/doc/0", 2), Route::Doc(0));
        assert_eq!(resolve("/doc/1/", 2), Route::Doc(1));
        assert_eq!(resolve("/doc/1?t=5", 2), Route::Doc(1));
        assert_eq!(resolve("/doc/%31", 2), Route::Doc(1));
    }

    #[test]
    fn test_doc_out_of_range_or_malformed() {
        for url in [
            "/doc/2",
            "/doc/5",
            "/doc/-1",
            "/doc/+1",
            "/doc/1.0",
            "/doc/abc",
            "/doc/",
            "/doc/%20",
            "/doc/0/extra",
            "/doc/99999999999999999999999999",
        ] {
            assert_eq!(resolve(url, 2), Route::DocNotFound, "{url}");
        }
    }

    #[test]
    fn test_live_channel() {
        assert_eq!(resolve("/ws", 1), Route::LiveChannel);
        assert_eq!(resolve("/ws/", 1), Route::LiveChannel);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(resolve("/doc", 1), Route::NotFound);
        assert_eq!(resolve("/favicon.ico", 1), Route::NotFound);
        assert_eq!(resolve("/wss", 1), Route::NotFound);
    }
}
