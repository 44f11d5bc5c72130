//! Client IP extraction from HTTP headers with trust validation
//!
//! - Validates trust chains for X-Forwarded-For and Forwarded headers
//! - Supports the Cloudflare CF-Connecting-IP header
//! - Falls back to the socket remote address when headers are absent or untrusted
//! - Handles both IPv4 and IPv6

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, warn};

use crate::config::{AnalyticsConfig, TrustedProxyMode};

/// Address recorded for a visit.
///
/// The forwarded client IP when the trust configuration allows one,
/// otherwise the peer socket address formatted as `ip:port`.
pub fn resolve_client_address(
    headers: &HeaderMap,
    peer: SocketAddr,
    config: &AnalyticsConfig,
) -> String {
    match extract_client_ip(headers, peer.ip(), config) {
        Some(ip) => ip.to_string(),
        None => peer.to_string(),
    }
}

/// Extract the client IP address from forwarding headers
///
/// Returns `None` when the configuration does not trust any header, the
/// headers are missing, or the socket peer is not a trusted proxy.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_ip: IpAddr,
    config: &AnalyticsConfig,
) -> Option<IpAddr> {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => {
            let ip = extract_cloudflare_ip(headers);
            if ip.is_none() {
                warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            }
            ip
        }
        TrustedProxyMode::Standard => {
            if !config.trusted_proxies.is_empty() && !is_trusted(socket_ip, config) {
                debug!(peer = %socket_ip, "peer is not a trusted proxy, ignoring forwarding headers");
                return None;
            }
            extract_standard_ip(headers, config)
        }
        TrustedProxyMode::None => None,
    }
}

/// Extract IP from Cloudflare-specific header
fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Extract IP from standard headers, preferring RFC 7239 Forwarded over X-Forwarded-For
fn extract_standard_ip(headers: &HeaderMap, config: &AnalyticsConfig) -> Option<IpAddr> {
    let forwarded = forwarded_chain(headers);
    if !forwarded.is_empty() {
        return select_from_chain(&forwarded, config);
    }

    select_from_chain(&x_forwarded_for_chain(headers), config)
}

/// `for=` values of every Forwarded header element, in order
fn forwarded_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    headers
        .get_all("forwarded")
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|value| value.split(','))
        .flat_map(|element| element.split(';'))
        .filter_map(|param| {
            let (key, value) = param.trim().split_once('=')?;
            if key.trim().eq_ignore_ascii_case("for") {
                parse_node(value.trim())
            } else {
                None
            }
        })
        .collect()
}

/// Parse a Forwarded node: `192.0.2.60`, `192.0.2.60:4711`, `"[2001:db8::1]:4711"`
fn parse_node(value: &str) -> Option<IpAddr> {
    let value = value.trim_matches('"');

    if let Some(rest) = value.strip_prefix('[') {
        let (addr, _) = rest.split_once(']')?;
        return addr.parse().ok();
    }

    if let Ok(ip) = value.parse::<IpAddr>() {
        return Some(ip);
    }

    // IPv4 with port
    let (addr, _port) = value.rsplit_once(':')?;
    addr.parse().ok()
}

fn x_forwarded_for_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|s| s.trim().parse::<IpAddr>().ok())
        .collect()
}

/// Pick the client from a proxy chain, walking right to left
fn select_from_chain(chain: &[IpAddr], config: &AnalyticsConfig) -> Option<IpAddr> {
    if chain.is_empty() {
        return None;
    }

    // Skip a fixed number of trusted entries from the right
    if let Some(num_trusted) = config.num_trusted_proxies {
        if chain.len() > num_trusted {
            return Some(chain[chain.len() - num_trusted - 1]);
        }
        // Not enough entries in the chain, return the leftmost (least trusted)
        return chain.first().copied();
    }

    // First entry from the right outside the trusted networks
    if !config.trusted_proxies.is_empty() {
        return chain
            .iter()
            .rev()
            .find(|ip| !is_trusted(**ip, config))
            .or_else(|| chain.first())
            .copied();
    }

    chain.last().copied()
}

fn is_trusted(ip: IpAddr, config: &AnalyticsConfig) -> bool {
    config.trusted_proxies.iter().any(|net| net.contains(&ip))
}
