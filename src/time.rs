use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};

/// Epoch values above this are milliseconds, below it seconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// One accepted spelling of a log timestamp.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// chrono format of a zone-less local time
    Naive(&'static str),
    /// Like `Naive`, but the text carries a zone name (`CST`) as its fifth
    /// token. The name is dropped; the configured offset applies instead.
    ZoneName(&'static str),
    /// Unix seconds or milliseconds.
    Epoch,
}

/// Tried in order, first successful parse wins.
const LAYOUTS: &[Layout] = &[
    // Wed Mar 15 10:20:30 CST 2023
    Layout::ZoneName("%a %b %d %H:%M:%S %Y"),
    Layout::Naive("%Y-%m-%d %H:%M:%S"),
    // Mar 15 10:20:30 2023
    Layout::Naive("%b %d %H:%M:%S %Y"),
    Layout::Naive("%Y/%m/%d %H:%M:%S"),
    Layout::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::Epoch,
];

/// Parses a log timestamp, reading zone-less times at `offset`. Sub-second
/// parts are truncated.
pub fn parse_timestamp(text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = LAYOUTS
        .iter()
        .find_map(|layout| parse_with(layout, text, offset))?;
    parsed.with_nanosecond(0)
}

fn parse_with(layout: &Layout, text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let naive = match *layout {
        Layout::Naive(format) => NaiveDateTime::parse_from_str(text, format).ok()?,
        Layout::ZoneName(format) => {
            let mut tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.len() != 6 {
                return None;
            }
            tokens.remove(4);
            NaiveDateTime::parse_from_str(&tokens.join(" "), format).ok()?
        }
        Layout::Epoch => return parse_epoch(text),
    };

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_epoch(text: &str) -> Option<DateTime<Utc>> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = text.parse().ok()?;
    if value > EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

/// Offset east of UTC, in whole hours.
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}
