//! Device identity from the raw log text, falling back to the IP address.

use std::fmt;

use mac_address::MacAddress;
use once_cell::sync::Lazy;
use regex::Regex;

/// Tried in order against the raw log text, first match wins.
const MAC_PATTERNS: &[&str] = &[
    // MAC=aa:bb:cc:dd:ee:ff, MAC:aa-bb-..., MAC=aabb.ccdd.eeff
    r"MAC[=:]([a-fA-F0-9:-]{17}|[a-fA-F0-9.]{14})",
    // Client aabbccddeeff
    r"Client[ \t\n\x0B\f\r]+([a-fA-F0-9-]{12,17})",
    // {"sta_mac": "aabb.ccdd.eeff"}
    r#"sta_mac":[ \t\n\x0B\f\r]*"([a-fA-F0-9.]{14})""#,
];

static MAC_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    MAC_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("MAC pattern must compile"))
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// MAC address as spelled in the log.
    Mac(String),
    Ip(String),
}

impl Identity {
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Mac(x) | Identity::Ip(x) => x,
        }
    }

    /// Colon separated upper-case spelling for MACs. IPs and MACs that do not
    /// carry exactly 12 hex digits are returned unchanged.
    pub fn canonical(&self) -> String {
        match self {
            Identity::Mac(raw) => match parse_mac(raw) {
                Some(mac) => mac.to_string(),
                None => raw.clone(),
            },
            Identity::Ip(ip) => ip.clone(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First MAC address found in the log text.
pub fn extract_mac(log: &str) -> Option<&str> {
    MAC_REGEXES
        .iter()
        .find_map(|re| re.captures(log))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// MAC from the log text if there is one, otherwise the IP field.
pub fn resolve_identity(log: Option<&str>, ip: Option<&str>) -> Option<Identity> {
    if let Some(mac) = log.and_then(extract_mac) {
        return Some(Identity::Mac(mac.to_string()));
    }

    ip.map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(|ip| Identity::Ip(ip.to_string()))
}

/// Accepts any separator style as long as 12 hex digits remain.
fn parse_mac(raw: &str) -> Option<MacAddress> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    if digits.len() != 12 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let pairs: Vec<&str> = (0..12).step_by(2).map(|i| &digits[i..i + 2]).collect();
    pairs.join(":").parse().ok()
}
