//! Pulling AP names out of the free-text details column.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tried in order, first match wins. Group 1 is the AP name. Whitespace means
/// ASCII whitespace only, so a full-width space stays part of a name.
const AP_NAME_PATTERNS: &[&str] = &[
    // 终端在AP <name> 获取IP地址成功
    r"终端在AP[ \t\n\x0B\f\r]+([^ \t\n\x0B\f\r]+)[ \t\n\x0B\f\r]+",
    // 终端在AP <name>(无线/...)
    r"终端在AP[ \t\n\x0B\f\r]+([^ \t\n\x0B\f\r(]+)",
    // 漫游到AP <name>
    r"漫游到AP[ \t\n\x0B\f\r]+([^ \t\n\x0B\f\r(]+)",
];

static AP_NAME_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    AP_NAME_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("AP name pattern must compile"))
        .collect()
});

/// `无线/<campus>/<building>`
static WIRELESS_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"无线/([^/]+)/([^/ \t\n\x0B\f\r)]+)").expect("address pattern must compile"));

/// Extracts and normalizes the AP name mentioned in a details text.
pub fn extract_ap_name(details: &str) -> Option<String> {
    AP_NAME_REGEXES
        .iter()
        .find_map(|re| re.captures(details))
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_ap_name(m.as_str()))
}

/// Rewrites `无线/<campus>/<building>` into `<campus>-<building>`; other names
/// are returned as they are.
pub fn normalize_ap_name(name: &str) -> String {
    match WIRELESS_ADDRESS.captures(name) {
        Some(caps) => format!("{}-{}", &caps[1], &caps[2]),
        None => name.to_string(),
    }
}
