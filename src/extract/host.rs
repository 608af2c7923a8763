use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;

/// Scheme followed by `//`, or a bare scheme-relative `//`
static SCHEME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+\-.]+:)?//").expect("SCHEME_PATTERN: hardcoded regex is invalid")
});

/// Host portion of an extraction input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Host {
    /// IPv4 or IPv6 literal
    Ip(IpAddr),
    /// Lowercased labels left to right, empty labels dropped
    Name(Vec<String>),
}

/// Label separators: ASCII full stop plus the ideographic, fullwidth and
/// halfwidth ideographic full stops.
fn is_separator(c: char) -> bool {
    matches!(c, '.' | '\u{3002}' | '\u{FF0E}' | '\u{FF61}')
}

/// Reduce a hostname or URL to its host labels.
///
/// Scheme, userinfo, port, path, query and fragment are stripped. Input
/// without a usable host yields an empty label list.
pub fn split_host(input: &str) -> Host {
    let trimmed = input.trim();
    if let Ok(ip) = trimmed.parse::<IpAddr>() {
        return Host::Ip(ip);
    }

    let rest = SCHEME_PATTERN
        .find(trimmed)
        .map_or(trimmed, |m| &trimmed[m.end()..]);
    let authority = rest
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if let Some(bracketed) = host_port.strip_prefix('[') {
        let inner = bracketed.split(']').next().unwrap_or_default();
        return match inner.parse::<Ipv6Addr>() {
            Ok(ip) => Host::Ip(IpAddr::V6(ip)),
            Err(_) => Host::Name(Vec::new()),
        };
    }

    let host = host_port.split(':').next().unwrap_or_default();
    let labels: Vec<String> = host
        .split(is_separator)
        .filter(|label| !label.is_empty())
        .map(str::to_lowercase)
        .collect();

    if let Ok(ip) = labels.join(".").parse::<Ipv4Addr>() {
        return Host::Ip(IpAddr::V4(ip));
    }
    Host::Name(labels)
}
