//! Track-point CSV, the hand-off format between pipeline stages.

use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    ingest::decode,
    model::{GeoCoordinate, TrackPoint},
    record::RawRecord,
    time::parse_timestamp,
};

const ACCOUNT_COLUMNS: &[&str] = &["account_id", "accountid", "user_id", "userid"];
const TRACK_COLUMNS: &[&str] = &["track_id", "trackid"];
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lng", "lon"];
const TIME_COLUMNS: &[&str] = &["timestamp", "time", "datetime"];
const DETAIL_COLUMN: &str = "detail";

#[derive(Debug, Serialize)]
struct Row<'a> {
    account_id: &'a str,
    latitude: f64,
    longitude: f64,
    timestamp: String,
    detail: Option<&'a str>,
}

impl<'a> From<&'a TrackPoint> for Row<'a> {
    fn from(point: &'a TrackPoint) -> Self {
        Self {
            account_id: &point.account_id,
            latitude: point.coordinate.latitude,
            longitude: point.coordinate.longitude,
            timestamp: point.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            detail: point.detail.as_deref(),
        }
    }
}

pub fn write_points<'a, W, I>(writer: W, points: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a TrackPoint>,
{
    let mut writer = csv::Writer::from_writer(writer);
    for point in points {
        writer.serialize(Row::from(point))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads points back. Header names are matched case-insensitively and the
/// usual aliases (`lat`, `lng`, `user_id`, ...) are accepted. Rows without an
/// account, both coordinates and a usable time are skipped.
///
/// Times without a zone are read in `offset`. Invalid UTF-8 is replaced, so a
/// mangled row is skipped like any other incomplete one.
pub fn read_points<R: Read>(reader: R, offset: FixedOffset) -> Result<Vec<TrackPoint>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = decode(reader.byte_headers().context("Failed to read header row")?)
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut output = Vec::new();
    let mut skipped = 0;
    for (i, result) in reader.byte_records().enumerate() {
        let row = result.with_context(|| format!("Bad row {}", i + 2))?;
        let record = RawRecord::from_fields(&headers, decode(&row));
        match point_from_record(&record, offset) {
            Some(point) => output.push(point),
            None => {
                debug!(row = i + 2, "incomplete track point");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped incomplete track points");
    }
    Ok(output)
}

pub fn load(path: &Path, offset: FixedOffset) -> Result<Vec<TrackPoint>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_points(file, offset).with_context(|| format!("Failed to read {}", path.display()))
}

fn first<'a>(record: &'a RawRecord, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| record.get(name))
}

fn point_from_record(record: &RawRecord, offset: FixedOffset) -> Option<TrackPoint> {
    let account_id = first(record, ACCOUNT_COLUMNS).or_else(|| first(record, TRACK_COLUMNS))?;
    let latitude = first(record, LATITUDE_COLUMNS)?.parse().ok()?;
    let longitude = first(record, LONGITUDE_COLUMNS)?.parse().ok()?;
    let timestamp = first(record, TIME_COLUMNS).and_then(|text| read_time(text, offset))?;

    Some(TrackPoint::new(
        account_id,
        GeoCoordinate::new(latitude, longitude),
        timestamp,
        record.get(DETAIL_COLUMN).map(str::to_string),
    ))
}

fn read_time(text: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(_) => parse_timestamp(text, offset),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Offset, TimeZone};

    use super::*;

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    #[test]
    fn written_form() {
        let point = TrackPoint::new(
            "10.0.0.1",
            GeoCoordinate::new(28.66, 115.8),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            Some("终端在AP 前湖北-图书馆 关联成功".to_string()),
        );
        let bare = TrackPoint {
            detail: None,
            ..point.clone()
        };

        let mut out = Vec::new();
        write_points(&mut out, [&point, &bare]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "account_id,latitude,longitude,timestamp,detail\n\
             10.0.0.1,28.66,115.8,2024-03-01T08:00:00Z,终端在AP 前湖北-图书馆 关联成功\n\
             10.0.0.1,28.66,115.8,2024-03-01T08:00:00Z,\n"
        );

        let back = read_points(text.as_bytes(), utc()).unwrap();
        assert_eq!(back, vec![point, bare]);
    }

    #[test]
    fn aliases() {
        let text = "\
Lng,LAT,user_id,time,speed
115.8,28.66,u1,2024-03-01 08:00:00,1.5
115.9,28.67,u2,1709280000,
";
        let points = read_points(text.as_bytes(), utc()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].account_id, "u1");
        assert_eq!(points[0].coordinate, GeoCoordinate::new(28.66, 115.8));
        assert_eq!(points[0].timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
        assert_eq!(points[1].timestamp, points[0].timestamp);
        assert!(points[0].detail.is_none());

        let tracks = "trackid,lat,lon,datetime\nt7,1,2,2024-03-01T08:00:00+08:00\n";
        let points = read_points(tracks.as_bytes(), utc()).unwrap();
        assert_eq!(points[0].account_id, "t7");
        assert_eq!(points[0].timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn incomplete_rows() {
        let text = "\
account_id,latitude,longitude,timestamp
a,1,2,
,1,2,2024-03-01 08:00:00
b,north,2,2024-03-01 08:00:00
c,1,2,2024-03-01 08:00:00
";
        let points = read_points(text.as_bytes(), utc()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].account_id, "c");
    }

    #[test]
    fn invalid_utf8_row() {
        let mut text = b"account_id,lat,lng,timestamp\n".to_vec();
        text.extend_from_slice(b"a,1,2,2024-03-01T00:00:00Z\n");
        text.extend_from_slice(b"\xc9\xcf,north\xdf,2,2024-03-01T00:00:00Z\n");
        text.extend_from_slice(b"\xc9\xcf,1,2,2024-03-01T00:00:00Z\n");
        text.extend_from_slice(b"b,1,2,2024-03-01T00:00:00Z\n");

        let points = read_points(text.as_slice(), utc()).unwrap();
        let accounts: Vec<_> = points.iter().map(|p| p.account_id.as_str()).collect();
        assert_eq!(accounts, vec!["a", "\u{fffd}\u{fffd}", "b"]);
    }

    #[test]
    fn local_times() {
        let text = "account_id,lat,lng,timestamp\na,1,2,2024-03-01 08:00:00\n";
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let points = read_points(text.as_bytes(), offset).unwrap();
        assert_eq!(points[0].timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        fs_write(&path, "account_id,lat,lng,timestamp\na,1,2,2024-03-01T00:00:00Z\n");
        assert_eq!(load(&path, utc()).unwrap().len(), 1);
        assert!(load(&dir.path().join("missing.csv"), utc()).is_err());
    }

    fn fs_write(path: &Path, text: &str) {
        std::fs::write(path, text).unwrap();
    }
}
