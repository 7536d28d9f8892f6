//! Turns one WiFi log row into a geolocated track point.
//!
//! Rows that are not association events, or that lack an AP name, an
//! identity or a usable time, are skipped. Skips are ordinary values and are
//! counted in a [`ParseReport`]; nothing in here fails.

use std::{collections::BTreeMap, fmt};

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use strum::IntoStaticStr;
use tracing::{debug, trace, warn};

use crate::{
    ap::{extract_ap_name, ApTable},
    behavior::is_online_event,
    identity::resolve_identity,
    model::TrackPoint,
    record::RawRecord,
    time::parse_timestamp,
};

pub const TIME_COLUMN: &str = "时间";
pub const BEHAVIOR_COLUMN: &str = "终端行为";
pub const DETAILS_COLUMN: &str = "轨迹详细信息";
pub const IP_COLUMN: &str = "终端IP地址";
pub const LOG_COLUMN: &str = "日志原文";

/// What to do with a row whose time cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntimedPolicy {
    /// Skip the row.
    #[default]
    Drop,
    /// Stamp the row with the current time.
    Now,
}

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub offset: FixedOffset,
    pub untimed: UntimedPolicy,
    /// Keep points whose AP had no table entry (placed at 0,0) in batch output.
    pub keep_unresolved: bool,
    pub canonical_mac: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            untimed: UntimedPolicy::Drop,
            keep_unresolved: false,
            canonical_mac: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Skip {
    NotOnline,
    NoApName,
    NoIdentity,
    UnparsedTime,
    /// Only produced by batch parsing, see [`ParseOptions::keep_unresolved`].
    Unresolved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Point(TrackPoint),
    Skipped(Skip),
}

impl Parsed {
    pub fn point(self) -> Option<TrackPoint> {
        match self {
            Parsed::Point(p) => Some(p),
            Parsed::Skipped(_) => None,
        }
    }
}

struct Outcome {
    point: TrackPoint,
    stamped_now: bool,
}

pub struct LogParser<'a> {
    table: &'a ApTable,
    options: ParseOptions,
}

impl<'a> LogParser<'a> {
    pub fn new(table: &'a ApTable, options: ParseOptions) -> Self {
        Self { table, options }
    }

    pub fn parse(&self, record: &RawRecord) -> Parsed {
        match self.parse_record(record) {
            Ok(outcome) => Parsed::Point(outcome.point),
            Err(skip) => Parsed::Skipped(skip),
        }
    }

    fn parse_record(&self, record: &RawRecord) -> Result<Outcome, Skip> {
        let behavior = record.get(BEHAVIOR_COLUMN);
        if !is_online_event(behavior) {
            return Err(Skip::NotOnline);
        }

        let details = record.get(DETAILS_COLUMN).ok_or(Skip::NoApName)?;
        let ap_name = extract_ap_name(details).ok_or(Skip::NoApName)?;

        let resolution = self.table.resolve(&ap_name);
        if !resolution.is_resolved() {
            debug!(ap = %ap_name, "no coordinates for AP");
        }

        let identity = resolve_identity(record.get(LOG_COLUMN), record.get(IP_COLUMN))
            .ok_or(Skip::NoIdentity)?;
        let account_id = if self.options.canonical_mac {
            identity.canonical()
        } else {
            identity.as_str().to_string()
        };

        let parsed_time = record
            .get(TIME_COLUMN)
            .and_then(|text| parse_timestamp(text, self.options.offset));
        let (timestamp, stamped_now) = match (parsed_time, self.options.untimed) {
            (Some(ts), _) => (ts, false),
            (None, UntimedPolicy::Drop) => return Err(Skip::UnparsedTime),
            (None, UntimedPolicy::Now) => {
                warn!(time = ?record.get(TIME_COLUMN), "unparsed time, using now");
                (Utc::now(), true)
            }
        };

        Ok(Outcome {
            point: TrackPoint::new(
                account_id,
                resolution.coordinate(),
                timestamp,
                Some(details.to_string()),
            ),
            stamped_now,
        })
    }

    /// Parses a batch of rows, dropping unresolved points unless configured
    /// otherwise.
    pub fn parse_rows<I>(&self, records: I) -> ParseReport
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut report = ParseReport::default();
        for record in records {
            report.rows += 1;
            match self.parse_record(&record) {
                Ok(outcome) => {
                    if outcome.point.coordinate.is_unresolved() {
                        report.unresolved += 1;
                        if !self.options.keep_unresolved {
                            report.skip(Skip::Unresolved);
                            continue;
                        }
                    }
                    if outcome.stamped_now {
                        report.stamped_now += 1;
                    }
                    report.points.push(outcome.point);
                }
                Err(skip) => {
                    let reason: &'static str = skip.into();
                    trace!(reason, row = report.rows, "skipped");
                    report.skip(skip);
                }
            }
        }

        report
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseReport {
    pub points: Vec<TrackPoint>,
    pub rows: usize,
    pub skipped: BTreeMap<Skip, usize>,
    /// Points whose time could not be parsed and were stamped with "now".
    pub stamped_now: usize,
    /// Points placed at (0, 0), whether or not they were kept.
    pub unresolved: usize,
}

impl ParseReport {
    fn skip(&mut self, reason: Skip) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped(&self, reason: Skip) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn merge(&mut self, other: ParseReport) {
        self.points.extend(other.points);
        self.rows += other.rows;
        self.stamped_now += other.stamped_now;
        self.unresolved += other.unresolved;
        for (reason, count) in other.skipped {
            *self.skipped.entry(reason).or_default() += count;
        }
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows -> {} points", self.rows, self.points.len())?;
        for (&reason, count) in &self.skipped {
            let reason: &'static str = reason.into();
            write!(f, ", {count} {reason}")?;
        }
        Ok(())
    }
}
