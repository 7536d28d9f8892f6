/// Substrings marking an association ("online") event. The broadest marker
/// comes last.
pub const ONLINE_MARKERS: &[&str] = &[
    "上线 (获取IP地址成功)",
    "上线 (关联成功)",
    "获取IP地址成功",
    "关联成功",
    "上线",
];

/// Whether a behavior text describes a device coming online at an AP.
pub fn is_online_event(behavior: Option<&str>) -> bool {
    behavior.is_some_and(|text| ONLINE_MARKERS.iter().any(|marker| text.contains(marker)))
}
