//! Domain classification — decides which traffic belongs to a session.
//!
//! A session filters to one root domain and its subdomains. Extraction is
//! best-effort and never fails: localhost and IP literals pass through
//! verbatim, multi-level public suffixes (co.uk, com.tr, …) come from a
//! built-in table, and anything unrecognized falls back to the raw hostname.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub mod selector;

pub use selector::{generate_selector, ElementDescriptor};

static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)$")
        .unwrap()
});

/// Multi-level public suffixes the extractor recognizes. Not the full PSL;
/// covers the ccTLD second-level registrations seen in recorded sessions.
const MULTI_LEVEL_SUFFIXES: &[&str] = &[
    "ac.uk", "co.uk", "gov.uk", "me.uk", "net.uk", "org.uk", "sch.uk",
    "com.au", "edu.au", "gov.au", "net.au", "org.au",
    "co.nz", "govt.nz", "net.nz", "org.nz",
    "com.br", "net.br", "org.br",
    "com.ar", "com.mx",
    "com.tr", "gov.tr", "net.tr", "org.tr",
    "com.cn", "gov.cn", "net.cn", "org.cn",
    "ac.jp", "co.jp", "go.jp", "ne.jp", "or.jp",
    "co.kr", "or.kr",
    "ac.in", "co.in", "gov.in", "net.in", "org.in",
    "co.za", "net.za", "org.za",
    "com.sg", "com.hk", "com.tw", "com.my", "co.th", "com.vn", "com.ph",
    "co.id", "com.eg", "com.sa", "com.ua", "com.pl",
];

/// Extract the root (registrable) domain from a URL.
///
/// Examples:
///   "https://shop.example.com/path"    -> "example.com"
///   "http://example.com:8080/path"     -> "example.com"
///   "http://localhost/path"            -> "localhost"
///   "http://192.168.1.1/path"          -> "192.168.1.1"
///   "https://shop.example.co.uk/path"  -> "example.co.uk"
pub fn extract_root_domain(url: &str) -> String {
    let hostname = hostname_of(url);

    if hostname == "localhost" {
        return hostname;
    }
    if is_ip_literal(&hostname) {
        return hostname;
    }

    match registrable_parts(&hostname) {
        Some((label, suffix)) => format!("{label}.{suffix}"),
        None => hostname,
    }
}

/// Extract just the registrable label (without suffix) from a URL.
///
/// Examples:
///   "https://www.allianz.com.tr/path"  -> "allianz"
///   "https://shop.example.co.uk/path"  -> "example"
///   "http://localhost/path"            -> "localhost"
///   "http://192.168.1.1/path"          -> "192.168.1.1"
pub fn extract_domain_name(url: &str) -> String {
    let hostname = hostname_of(url);

    if hostname == "localhost" {
        return hostname;
    }
    if is_ip_literal(&hostname) {
        return hostname;
    }

    match registrable_parts(&hostname) {
        Some((label, _)) => label.to_string(),
        None => hostname,
    }
}

/// Check whether a URL belongs to `root_domain` or one of its subdomains.
///
/// Matching is on hostname only (ports stripped) and requires a label
/// boundary: `fakeexample.com` is not a subdomain of `example.com`.
pub fn is_subdomain_of(url: &str, root_domain: &str) -> bool {
    let hostname = hostname_of(url);
    if hostname.is_empty() {
        return false;
    }

    let root = root_domain.to_ascii_lowercase();
    hostname == root || hostname.ends_with(&format!(".{root}"))
}

/// Lower-cased hostname of a URL, without port or IPv6 brackets.
/// Malformed URLs yield an empty string.
fn hostname_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|h| {
            h.trim_start_matches('[')
                .trim_end_matches(']')
                .to_ascii_lowercase()
        })
        .unwrap_or_default()
}

fn is_ip_literal(hostname: &str) -> bool {
    // Colons only appear in IPv6 literals once the port is stripped.
    IPV4_RE.is_match(hostname) || hostname.contains(':')
}

/// Split a hostname into (registrable label, public suffix), preferring
/// multi-level suffixes from the built-in table. `None` when the hostname
/// has no suffix to split on (single label, or empty).
fn registrable_parts(hostname: &str) -> Option<(&str, &str)> {
    let labels: Vec<&str> = hostname.split('.').collect();
    let n = labels.len();

    if n >= 3 {
        let suffix_len = labels[n - 2].len() + labels[n - 1].len() + 1;
        let suffix = &hostname[hostname.len() - suffix_len..];
        if MULTI_LEVEL_SUFFIXES.contains(&suffix) {
            return Some((labels[n - 3], suffix));
        }
    }
    if n >= 2 && !labels[n - 1].is_empty() && !labels[n - 2].is_empty() {
        return Some((labels[n - 2], labels[n - 1]));
    }
    None
}
