//! Client key derivation from request headers.
//!
//! Keys follow reverse-proxy convention: the first entry of
//! `X-Forwarded-For`, then `X-Real-IP`, then `CF-Connecting-IP`, then the
//! literal `unknown`. These headers are trusted as-is; a direct client can
//! spoof them, so deployments that are not behind a trusted proxy should
//! treat the limit as best-effort. Whether to authenticate the headers is a
//! topology decision, not one this module makes.

use axum::http::HeaderMap;
use tracing::debug;

/// Key used when no identifying header is present or parseable. All such
/// requests pool into one bucket; behind a gateway that strips forwarding
/// headers this degrades to a single shared quota.
pub const FALLBACK_KEY: &str = "ip:unknown";

/// Maps a request's headers to the string key its quota is tracked under.
///
/// Implementations namespace their keys (e.g. `ip:`) so limiters keyed
/// differently can share a [`CounterStore`](crate::ratelimit::CounterStore)
/// without collisions.
pub trait KeyExtractor: Send + Sync {
    fn key(&self, headers: &HeaderMap) -> String;
}

/// IP-based key extraction with the forwarded-header precedence above.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIp;

impl ClientIp {
    fn candidate(headers: &HeaderMap) -> Option<String> {
        if let Some(forwarded) = headers.get("x-forwarded-for") {
            // Leftmost entry is the original client; the rest are proxies.
            if let Ok(value) = forwarded.to_str() {
                if let Some(first) = value.split(',').next() {
                    let first = first.trim();
                    if !first.is_empty() {
                        return Some(first.to_string());
                    }
                }
            }
        }

        for name in ["x-real-ip", "cf-connecting-ip"] {
            if let Some(value) = headers.get(name) {
                if let Ok(value) = value.to_str() {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }

        None
    }
}

impl KeyExtractor for ClientIp {
    fn key(&self, headers: &HeaderMap) -> String {
        match Self::candidate(headers) {
            Some(addr) => format!("ip:{}", addr),
            None => {
                debug!("No client address header found, using fallback key");
                FALLBACK_KEY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let map = headers(&[("x-forwarded-for", "1.2.3.4, 10.0.0.1, 10.0.0.2")]);
        assert_eq!(ClientIp.key(&map), "ip:1.2.3.4");
    }

    #[test]
    fn test_forwarded_for_entries_are_trimmed() {
        let map = headers(&[("x-forwarded-for", "  1.2.3.4 ,10.0.0.1")]);
        assert_eq!(ClientIp.key(&map), "ip:1.2.3.4");
    }

    #[test]
    fn test_precedence_order() {
        let map = headers(&[
            ("x-forwarded-for", "1.2.3.4"),
            ("x-real-ip", "5.6.7.8"),
            ("cf-connecting-ip", "9.9.9.9"),
        ]);
        assert_eq!(ClientIp.key(&map), "ip:1.2.3.4");

        let map = headers(&[("x-real-ip", "5.6.7.8"), ("cf-connecting-ip", "9.9.9.9")]);
        assert_eq!(ClientIp.key(&map), "ip:5.6.7.8");

        let map = headers(&[("cf-connecting-ip", "9.9.9.9")]);
        assert_eq!(ClientIp.key(&map), "ip:9.9.9.9");
    }

    #[test]
    fn test_missing_headers_fall_back_to_unknown() {
        assert_eq!(ClientIp.key(&HeaderMap::new()), FALLBACK_KEY);
    }

    #[test]
    fn test_empty_forwarded_for_falls_through() {
        let map = headers(&[("x-forwarded-for", "  "), ("x-real-ip", "5.6.7.8")]);
        assert_eq!(ClientIp.key(&map), "ip:5.6.7.8");
    }

    #[test]
    fn test_non_ascii_header_degrades_to_fallback() {
        let mut map = HeaderMap::new();
        map.insert(
            "x-forwarded-for",
            HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap(),
        );
        assert_eq!(ClientIp.key(&map), FALLBACK_KEY);
    }
}
