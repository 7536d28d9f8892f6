//! Reading WiFi log exports from disk and running them through the parser.

use std::{
    borrow::Cow,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::ByteRecord;
use glob::{glob, Pattern};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::{
    parser::{LogParser, ParseReport},
    record::RawRecord,
};

/// Reads a header row plus data rows. Rows may be shorter or longer than the
/// header, and bytes that are not UTF-8 are replaced rather than failing the
/// read.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = decode(reader.byte_headers().context("Failed to read header row")?)
        .into_iter()
        .map(Cow::into_owned)
        .collect();

    let mut output = Vec::new();
    let mut lossy = 0;
    for (i, result) in reader.byte_records().enumerate() {
        let row = result.with_context(|| format!("Bad row {}", i + 2))?;
        let values = decode(&row);
        if values.iter().any(|v| matches!(v, Cow::Owned(_))) {
            debug!(row = i + 2, "row is not valid UTF-8");
            lossy += 1;
        }
        output.push(RawRecord::from_fields(&headers, &values));
    }

    if lossy > 0 {
        warn!(rows = lossy, "replaced invalid UTF-8");
    }
    Ok(output)
}

/// Fields of a raw row, with invalid UTF-8 replaced by U+FFFD.
pub(crate) fn decode(row: &ByteRecord) -> Vec<Cow<'_, str>> {
    row.iter().map(String::from_utf8_lossy).collect()
}

pub fn parse_file(parser: &LogParser, path: &Path) -> Result<ParseReport> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let records =
        read_records(file).with_context(|| format!("Failed to read {}", path.display()))?;

    let report = parser.parse_rows(records);
    debug!(path = %path.display(), %report, "parsed");
    Ok(report)
}

/// Expands directories into the `.csv` files below them, sorted. Plain file
/// arguments are passed through as given.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let pattern = format!("{}/**/*.csv", Pattern::escape(&input.display().to_string()));
        let mut found: Vec<PathBuf> = glob(&pattern)
            .with_context(|| format!("Bad input directory {}", input.display()))?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("skipping {}: {e}", e.path().display());
                    None
                }
            })
            .collect();
        found.sort();
        if found.is_empty() {
            warn!(dir = %input.display(), "no csv files found");
        }
        files.extend(found);
    }

    Ok(files)
}

/// Parses every input file in parallel and merges the reports in input
/// order. A file that cannot be read is logged and left out.
pub fn parse_inputs(parser: &LogParser, inputs: &[PathBuf]) -> Result<ParseReport> {
    let files = collect_inputs(inputs)?;
    info!(files = files.len(), "parsing logs");

    let reports: Vec<_> = files
        .par_iter()
        .map(|path| (path, parse_file(parser, path)))
        .collect();

    let mut total = ParseReport::default();
    for (path, result) in reports {
        match result {
            Ok(report) => total.merge(report),
            Err(e) => warn!(path = %path.display(), "skipping file: {e:#}"),
        }
    }

    info!(%total, "parsed logs");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        ap::ApTable,
        model::GeoCoordinate,
        parser::{ParseOptions, Skip},
    };

    const LOG: &str = "\
时间,终端行为,轨迹详细信息,终端IP地址,日志原文
2024-03-01 08:00:00,上线 (获取IP地址成功),终端在AP 前湖北-图书馆 获取IP地址成功,10.0.0.1,
2024-03-01 08:05:00,漫游,终端从AP 前湖北-图书馆 漫游到AP 前湖南-食堂,10.0.0.1,
2024-03-01 08:10:00,上线 (关联成功),终端在AP 前湖南-食堂 关联成功,,MAC=aa:bb:cc:dd:ee:ff
";

    fn table() -> ApTable {
        [
            ("前湖北-图书馆", GeoCoordinate::new(28.66, 115.80)),
            ("前湖南", GeoCoordinate::new(28.65, 115.81)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn records() {
        let records = read_records(LOG.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("终端行为"), Some("漫游"));
        assert_eq!(records[2].get("终端IP地址"), None);

        let ragged = "a,b,c\n1\n1,2,3,4\n";
        let records = read_records(ragged.as_bytes()).unwrap();
        assert_eq!(records[0].get("a"), Some("1"));
        assert_eq!(records[0].get("b"), None);
        assert_eq!(records[1].get("c"), Some("3"));
    }

    #[test]
    fn file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, LOG).unwrap();

        let table = table();
        let parser = LogParser::new(&table, ParseOptions::default());
        let report = parse_file(&parser, &path).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.skipped(Skip::NotOnline), 1);
        assert_eq!(report.points[1].account_id, "aa:bb:cc:dd:ee:ff");
        assert_eq!(report.points[1].coordinate, GeoCoordinate::new(28.65, 115.81));

        assert!(parse_file(&parser, &dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn directory_scan() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("march")).unwrap();
        fs::write(dir.path().join("b.csv"), LOG).unwrap();
        fs::write(dir.path().join("march/a.csv"), LOG).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a log").unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "csv"));

        let table = table();
        let parser = LogParser::new(&table, ParseOptions::default());
        let missing = dir.path().join("missing.csv");
        let report = parse_inputs(&parser, &[dir.path().to_path_buf(), missing]).unwrap();
        assert_eq!(report.rows, 6);
        assert_eq!(report.points.len(), 4);
    }

    #[test]
    fn bracketed_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs[2024]");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("a.csv"), LOG).unwrap();

        let files = collect_inputs(&[logs.clone()]).unwrap();
        assert_eq!(files, vec![logs.join("a.csv")]);
    }

    #[test]
    fn invalid_utf8_row() {
        let mut data = Vec::new();
        data.extend_from_slice("时间,终端行为,轨迹详细信息,终端IP地址,日志原文\n".as_bytes());
        data.extend_from_slice("2024-03-01 08:00:00,上线,终端在AP 前湖北-图书馆 关联成功,10.0.0.1,\n".as_bytes());
        // GBK bytes in the behavior column
        data.extend_from_slice(b"2024-03-01 08:05:00,\xc9\xcf\xcf\xdf,x,10.0.0.1,\n");
        data.extend_from_slice("2024-03-01 08:10:00,上线,终端在AP 前湖南-食堂 关联成功,10.0.0.1,\n".as_bytes());

        let records = read_records(data.as_slice()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("时间"), Some("2024-03-01 08:05:00"));

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gbk.csv"), &data).unwrap();
        let table = table();
        let parser = LogParser::new(&table, ParseOptions::default());
        let report = parse_inputs(&parser, &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.skipped(Skip::NotOnline), 1);
    }
}
