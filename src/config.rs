use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    ap::ApTable,
    parser::{ParseOptions, UntimedPolicy},
    reduce::{simplify::SimplifyThresholds, ReducerKind},
    time::offset_from_hours,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub reducer: ReducerKind,

    // CSV with name,latitude,longitude replacing the built-in AP table
    pub ap_table: Option<PathBuf>,

    pub simplify: SimplifyThresholds,
    pub parse: ParseConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    /// Offset applied to log times that carry no zone of their own.
    pub utc_offset_hours: i32,
    pub untimed: UntimedPolicy,
    pub keep_unresolved: bool,
    pub canonical_mac: bool,
}

impl ParseConfig {
    pub fn options(&self) -> Result<ParseOptions> {
        let offset = offset_from_hours(self.utc_offset_hours)
            .with_context(|| format!("Invalid utc_offset_hours {}", self.utc_offset_hours))?;
        Ok(ParseOptions {
            offset,
            untimed: self.untimed,
            keep_unresolved: self.keep_unresolved,
            canonical_mac: self.canonical_mac,
        })
    }
}

impl Config {
    pub fn ap_table(&self) -> Result<ApTable> {
        match &self.ap_table {
            Some(path) => ApTable::load(path),
            None => Ok(ApTable::builtin()),
        }
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let config = toml::from_str(&data).context("Failed to parse config")?;
    Ok(config)
}
