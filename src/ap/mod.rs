//! Access point name → coordinate resolution.

use std::{collections::HashMap, fs::File, io::Read, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::GeoCoordinate;

mod builtin;
pub mod name;

pub use name::{extract_ap_name, normalize_ap_name};

/// Separator between the campus code and the rest of an AP name.
const CAMPUS_SEPARATOR: char = '-';

/// How an AP name was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Exact(GeoCoordinate),
    /// Only the campus prefix of the name had an entry.
    Campus(GeoCoordinate),
    Unresolved,
}

impl Resolution {
    /// Resolved coordinate, or [`GeoCoordinate::UNRESOLVED`].
    pub fn coordinate(&self) -> GeoCoordinate {
        match self {
            Resolution::Exact(c) | Resolution::Campus(c) => *c,
            Resolution::Unresolved => GeoCoordinate::UNRESOLVED,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// Read-only AP location table, built once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct ApTable {
    entries: HashMap<String, GeoCoordinate>,
}

/// CSV row of an AP table file
#[derive(Debug, Deserialize)]
struct Record {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl ApTable {
    pub fn builtin() -> Self {
        builtin::ENTRIES
            .iter()
            .map(|&(name, lat, lon)| (name, GeoCoordinate::new(lat, lon)))
            .collect()
    }

    /// Reads a `name,latitude,longitude` CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut entries = HashMap::new();
        for (i, result) in reader.deserialize().enumerate() {
            let Record {
                name,
                latitude,
                longitude,
            } = result.with_context(|| format!("Bad AP table row {}", i + 1))?;
            entries.insert(name, GeoCoordinate::new(latitude, longitude));
        }

        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open AP table {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn get(&self, name: &str) -> Option<GeoCoordinate> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact name first, then the campus code before the first `-`.
    pub fn resolve(&self, name: &str) -> Resolution {
        if let Some(c) = self.get(name) {
            return Resolution::Exact(c);
        }

        if let Some((campus, _)) = name.split_once(CAMPUS_SEPARATOR) {
            if let Some(c) = self.get(campus) {
                return Resolution::Campus(c);
            }
        }

        Resolution::Unresolved
    }
}

impl<K: Into<String>> FromIterator<(K, GeoCoordinate)> for ApTable {
    fn from_iter<T: IntoIterator<Item = (K, GeoCoordinate)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
