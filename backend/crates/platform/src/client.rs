//! Client identification utilities
//!
//! Rate limits are keyed by client address, so these helpers decide which
//! address a request is attributed to.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Key used when no address can be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Which request data identifies the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientAddressSource {
    /// Socket peer only. Forwarding headers are client-controlled.
    #[default]
    Peer,
    /// First X-Forwarded-For entry, for deployments behind a trusted proxy
    ForwardedFor,
}

/// Extract client IP address
///
/// With [`ClientAddressSource::ForwardedFor`] the first X-Forwarded-For entry
/// wins; otherwise (or when it is absent or unparseable) the direct
/// connection IP is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    source: ClientAddressSource,
) -> Option<IpAddr> {
    if source == ClientAddressSource::ForwardedFor {
        // Check X-Forwarded-For header (first IP in the list)
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            if let Some(first_ip) = xff.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }
    direct_ip
}

/// Rate limit key for a request
pub fn client_key(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    source: ClientAddressSource,
) -> String {
    extract_client_ip(headers, direct_ip, source)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_client_ip_xff_behind_proxy() {
        let headers = forwarded("192.168.1.1, 10.0.0.1");

        let ip = extract_client_ip(&headers, None, ClientAddressSource::ForwardedFor);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_xff_ignored_by_default() {
        let headers = forwarded("192.168.1.1");
        let direct: IpAddr = "10.1.1.1".parse().unwrap();

        assert_eq!(
            extract_client_ip(&headers, Some(direct), ClientAddressSource::default()),
            Some(direct)
        );
        assert_eq!(
            client_key(&headers, None, ClientAddressSource::Peer),
            UNKNOWN_CLIENT
        );
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct), ClientAddressSource::ForwardedFor);
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_unparseable_xff_falls_back() {
        let headers = forwarded("garbage");
        let direct: IpAddr = "10.1.1.1".parse().unwrap();

        assert_eq!(
            extract_client_ip(&headers, Some(direct), ClientAddressSource::ForwardedFor),
            Some(direct)
        );
    }

    #[test]
    fn test_client_key() {
        let headers = HeaderMap::new();
        assert_eq!(
            client_key(&headers, None, ClientAddressSource::Peer),
            UNKNOWN_CLIENT
        );
        assert_eq!(
            client_key(&headers, Some("::1".parse().unwrap()), ClientAddressSource::Peer),
            "::1"
        );
    }
}
