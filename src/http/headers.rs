//! Header filtering.
//!
//! Hop-by-hop keys plus this proxy's own bookkeeping headers are stripped
//! from both the outbound request and the relayed response.

use http::HeaderMap;

/// Keys removed before relaying, in either direction. `HeaderName` storage
/// is lower-case, so comparison here is case-insensitive by construction.
pub const RESERVED_HEADERS: [&str; 4] =
    ["connection", "proxy-connection", "cache-token", "request-uri"];

/// Returns `headers` minus the reserved keys. Pure; never fails.
pub fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        if !RESERVED_HEADERS.contains(&key.as_str()) {
            filtered.append(key.clone(), value.clone());
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use http::header::{HeaderName, HeaderValue};

    use super::*;

    fn header_map(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.append(
                name.parse::<HeaderName>().unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn strips_reserved_keys() {
        let filtered = filter_headers(&header_map(&[
            ("connection", "keep-alive"),
            ("proxy-connection", "keep-alive"),
            ("cache-token", "abc"),
            ("request-uri", "http://example.com/"),
            ("host", "example.com"),
        ]));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered["host"], "example.com");
    }

    #[test]
    fn reserved_match_is_case_insensitive() {
        // HeaderName parsing normalizes case before the filter ever runs.
        let filtered = filter_headers(&header_map(&[("Proxy-Connection", "keep-alive")]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn passes_everything_else_through() {
        let filtered = filter_headers(&header_map(&[
            ("accept", "*/*"),
            ("x-custom", "one"),
            ("x-custom", "two"),
        ]));

        assert_eq!(filtered.len(), 3);
        let values: Vec<_> = filtered.get_all("x-custom").iter().collect();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn empty_map_stays_empty() {
        assert!(filter_headers(&HeaderMap::new()).is_empty());
    }
}
