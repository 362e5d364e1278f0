use authgate_core::{FORWARDED_FOR_HEADER, REAL_IP_HEADER, UNKNOWN_CLIENT};
use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Best-effort originating address, for log lines only.
///
/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header(FORWARDED_FOR_HEADER)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header(REAL_IP_HEADER) {
        return real_ip.to_string();
    }

    peer.map_or_else(|| UNKNOWN_CLIENT.to_string(), |addr| addr.ip().to_string())
}
