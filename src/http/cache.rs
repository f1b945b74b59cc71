//! `ETag` generation and `If-None-Match` handling for frontend files

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` built from the content length and a hash of the bytes
///
/// Quoted, e.g. `"1f4-9a3c0e"`.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// True when the client's `If-None-Match` already names this `ETag`
///
/// Handles comma separated lists, the `*` wildcard and weak (`W/`) tags.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_quoted_and_stable() {
        let etag = generate_etag(b"<h1>contact</h1>");
        assert!(etag.starts_with("\"10-"));
        assert!(etag.ends_with('"'));
        assert_eq!(etag, generate_etag(b"<h1>contact</h1>"));
        assert_ne!(etag, generate_etag(b"<h1>Contact</h1>"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"5-abc\"";
        assert!(check_etag_match(Some("\"5-abc\""), etag));
        assert!(check_etag_match(Some("\"x\", \"5-abc\""), etag));
        assert!(check_etag_match(Some("W/\"5-abc\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"5-abd\""), etag));
        assert!(!check_etag_match(None, etag));
    }
}
