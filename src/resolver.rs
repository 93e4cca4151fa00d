use std::fmt;

use crate::tweet::TweetId;

/// URL prefixes recognized as a full tweet link. `x.com` is the same
/// site under its newer name.
const TWEET_URL_MARKERS: [&str; 2] = ["https://twitter.com", "https://x.com"];

/// The input was neither a tweet URL nor a numeric ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidInput;

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid tweet input")
    }
}

impl std::error::Error for InvalidInput {}

/// Resolve raw user text (a tweet URL or a bare numeric ID) into the
/// canonical identifier.
///
/// For URLs the id is the last path segment with any query string cut off:
/// https://twitter.com/lavieestbelIe/status/1589649527195115520?s=20&t=... -> 1589649527195115520
/// https://twitter.com/lavieestbelIe/status/1589649527195115520 -> 1589649527195115520
pub fn resolve(raw: &str) -> Result<TweetId, InvalidInput> {
    let raw = raw.trim();

    if TWEET_URL_MARKERS.iter().any(|marker| raw.contains(marker)) {
        let segment = raw.split('/').next_back().unwrap_or("");
        let id = segment.split('?').next().unwrap_or("");
        return TweetId::from_url_segment(id).ok_or(InvalidInput);
    }

    TweetId::new(raw).map_err(|_| InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_resolves_to_itself() {
        let id = resolve("1585396100026208257").unwrap();
        assert_eq!(id.as_str(), "1585396100026208257");
    }

    #[test]
    fn test_url_with_tracking_query() {
        let id = resolve("https://twitter.com/foo/status/1589649527195115520?s=20&t=IMsQCAsl6pkN0QO9EcTKLA")
            .unwrap();
        assert_eq!(id.as_str(), "1589649527195115520");
    }

    #[test]
    fn test_url_without_query() {
        let id = resolve("https://twitter.com/foo/status/1589649527195115520").unwrap();
        assert_eq!(id.as_str(), "1589649527195115520");
    }

    #[test]
    fn test_x_dot_com_url() {
        let id = resolve("https://x.com/foo/status/1589649527195115520").unwrap();
        assert_eq!(id.as_str(), "1589649527195115520");
    }

    #[test]
    fn test_url_with_consecutive_query_delimiters() {
        let id = resolve("https://twitter.com/foo/status/123??s=20").unwrap();
        assert_eq!(id.as_str(), "123");
    }

    #[test]
    fn test_url_with_trailing_slash_rejected() {
        assert_eq!(resolve("https://twitter.com/foo/status/"), Err(InvalidInput));
    }

    #[test]
    fn test_free_text_rejected() {
        assert_eq!(resolve("not a url or id"), Err(InvalidInput));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(resolve(""), Err(InvalidInput));
        assert_eq!(resolve("   "), Err(InvalidInput));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let id = resolve("  1585396100026208257\n").unwrap();
        assert_eq!(id.as_str(), "1585396100026208257");
    }
}
