use chrono::{DateTime, Utc};
use geo::{Distance, HaversineMeasure, Point};
use serde::{Deserialize, Serialize};

/// Mean earth radius used for every distance in this crate, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Placeholder handed out when an AP name has no table entry.
    pub const UNRESOLVED: GeoCoordinate = GeoCoordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        *self == Self::UNRESOLVED
    }
}

impl From<GeoCoordinate> for geo_types::Coord {
    fn from(value: GeoCoordinate) -> Self {
        geo_types::coord! { x: value.longitude, y: value.latitude }
    }
}

impl From<GeoCoordinate> for Point {
    fn from(value: GeoCoordinate) -> Self {
        Point::new(value.longitude, value.latitude)
    }
}

/// Great-circle distance in meters, on a sphere of [`EARTH_RADIUS_M`].
pub fn haversine_distance(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    HaversineMeasure::new(EARTH_RADIUS_M).distance(Point::from(a), Point::from(b))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub account_id: String,
    pub coordinate: GeoCoordinate,
    pub timestamp: DateTime<Utc>,
    /// Free-text location description the point was derived from.
    pub detail: Option<String>,
}

impl TrackPoint {
    pub fn new(
        account_id: impl Into<String>,
        coordinate: GeoCoordinate,
        timestamp: DateTime<Utc>,
        detail: Option<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            coordinate,
            timestamp,
            detail,
        }
    }

    pub fn distance_to(&self, other: &TrackPoint) -> f64 {
        haversine_distance(self.coordinate, other.coordinate)
    }

    /// Whole seconds from `self` to `later`; negative if `later` is earlier.
    pub fn seconds_until(&self, later: &TrackPoint) -> i64 {
        (later.timestamp - self.timestamp).num_seconds()
    }
}

/// Points of a single account, ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub account_id: String,
    pub points: Vec<TrackPoint>,
}

impl Trajectory {
    pub fn new(account_id: impl Into<String>, points: Vec<TrackPoint>) -> Self {
        Self {
            account_id: account_id.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn summary(&self) -> Option<TrajectorySummary> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some(TrajectorySummary {
            account_id: self.account_id.clone(),
            start: first.timestamp,
            end: last.timestamp,
            total_points: self.points.len(),
        })
    }

    /// Sum of the hop distances along the trajectory, in meters.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub account_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_points: usize,
}
