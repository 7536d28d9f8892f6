//! Distance/time based trajectory simplification.

use serde::Deserialize;

use super::Reducer;
use crate::model::{TrackPoint, Trajectory};

/// A point closer than this to the last kept one is redundant, in meters.
pub const MIN_DISTANCE_THRESHOLD_M: f64 = 5.0;
/// Points arriving sooner than this after the last kept one are dropped.
pub const MIN_TIME_INTERVAL_S: i64 = 30;
/// Points arriving later than this after the last kept one are always kept.
pub const MAX_TIME_INTERVAL_S: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplifyThresholds {
    pub min_distance_m: f64,
    pub min_interval_secs: i64,
    pub max_interval_secs: i64,
}

impl Default for SimplifyThresholds {
    fn default() -> Self {
        Self {
            min_distance_m: MIN_DISTANCE_THRESHOLD_M,
            min_interval_secs: MIN_TIME_INTERVAL_S,
            max_interval_secs: MAX_TIME_INTERVAL_S,
        }
    }
}

/// Keeps the points that represent movement, and never leaves a gap longer
/// than `max_interval_secs` between kept points unless the input has one.
///
/// Input must already be sorted by time; the first and last points always
/// survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplifier {
    thresholds: SimplifyThresholds,
}

impl Simplifier {
    pub fn new(thresholds: SimplifyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn simplify(&self, points: &[TrackPoint]) -> Vec<TrackPoint> {
        if points.len() <= 2 {
            return points.to_vec();
        }

        let mut kept = vec![points[0].clone()];
        let mut last_kept = 0;
        for (i, point) in points.iter().enumerate().skip(1) {
            if self.should_keep(&points[last_kept], point) {
                kept.push(point.clone());
                last_kept = i;
            }
        }

        let last = points.len() - 1;
        if last_kept != last {
            kept.push(points[last].clone());
        }

        kept
    }

    fn should_keep(&self, last_kept: &TrackPoint, point: &TrackPoint) -> bool {
        let gap = last_kept.seconds_until(point);
        if gap < self.thresholds.min_interval_secs {
            return false;
        }
        if gap > self.thresholds.max_interval_secs {
            return true;
        }

        last_kept.distance_to(point) >= self.thresholds.min_distance_m
    }
}

impl Reducer for Simplifier {
    fn name(&self) -> &'static str {
        "simplify"
    }

    fn reduce(&self, trajectory: &Trajectory) -> Trajectory {
        Trajectory::new(trajectory.account_id.clone(), self.simplify(&trajectory.points))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::model::GeoCoordinate;

    // roughly 1.11m of latitude
    const TEN_MICRO_DEG: f64 = 0.00001;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn point(secs: i64, lat: f64, lon: f64) -> TrackPoint {
        TrackPoint::new(
            "aa:bb:cc:dd:ee:ff",
            GeoCoordinate::new(lat, lon),
            at(secs),
            Some(format!("t={secs}")),
        )
    }

    fn times(points: &[TrackPoint]) -> Vec<i64> {
        points.iter().map(|p| (p.timestamp - at(0)).num_seconds()).collect()
    }

    /// Deterministic pseudo-random walk.
    fn walk(seed: u64, len: usize) -> Vec<TrackPoint> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64
        };

        let (mut t, mut lat, mut lon) = (0i64, 28.63, 115.83);
        (0..len)
            .map(|_| {
                t += (next() * 400.0) as i64;
                lat += (next() - 0.5) * 0.0002;
                lon += (next() - 0.5) * 0.0002;
                point(t, lat, lon)
            })
            .collect()
    }

    #[test]
    fn single_point() {
        let points = vec![point(0, 28.0, 115.0)];
        assert_eq!(Simplifier::default().simplify(&points), points);
        assert!(Simplifier::default().simplify(&[]).is_empty());
    }

    #[test]
    fn two_close_points() {
        // 40s apart, ~2m apart: the second is kept because it is the last
        let points = vec![
            point(0, 28.0, 115.0),
            point(40, 28.0 + 2.0 * TEN_MICRO_DEG / 1.11, 115.0),
        ];
        assert!(points[0].distance_to(&points[1]) < 5.0);
        assert_eq!(Simplifier::default().simplify(&points), points);
    }

    #[test]
    fn too_soon() {
        let points = vec![point(0, 28.0, 115.0), point(10, 28.1, 115.1), point(20, 28.2, 115.2)];
        let out = Simplifier::default().simplify(&points);
        assert_eq!(times(&out), vec![0, 20]);
    }

    #[test]
    fn distance_rule() {
        let points = vec![
            point(0, 28.0, 115.0),
            // 60s later, ~1.1m away: dropped
            point(60, 28.0 + TEN_MICRO_DEG, 115.0),
            // ~11m from the first point: kept
            point(120, 28.0 + 10.0 * TEN_MICRO_DEG, 115.0),
            // 100s later, same place: dropped
            point(220, 28.0 + 10.0 * TEN_MICRO_DEG, 115.0),
            // 400s after the last kept point, same place: kept
            point(520, 28.0 + 10.0 * TEN_MICRO_DEG, 115.0),
            point(530, 28.0 + 10.0 * TEN_MICRO_DEG, 115.0),
        ];
        let out = Simplifier::default().simplify(&points);
        assert_eq!(times(&out), vec![0, 120, 520, 530]);
    }

    #[test]
    fn boundaries() {
        // exactly 30s is not too soon, exactly 300s is not a forced keep
        let points = vec![
            point(0, 28.0, 115.0),
            point(30, 28.001, 115.0),
            point(330, 28.001, 115.0),
            point(331, 28.001, 115.0),
        ];
        let out = Simplifier::default().simplify(&points);
        assert_eq!(times(&out), vec![0, 30, 331]);
    }

    #[test]
    fn custom_thresholds() {
        let simplifier = Simplifier::new(SimplifyThresholds {
            min_distance_m: 0.0,
            min_interval_secs: 0,
            max_interval_secs: 300,
        });
        let points = vec![point(0, 28.0, 115.0), point(1, 28.0, 115.0), point(2, 28.0, 115.0)];
        assert_eq!(simplifier.simplify(&points), points);
    }

    #[test]
    fn first_and_last_kept() {
        let simplifier = Simplifier::default();
        for seed in 1..50 {
            let points = walk(seed, 60);
            let out = simplifier.simplify(&points);
            assert_eq!(out.first(), points.first());
            assert_eq!(out.last(), points.last());
            assert!(out.len() <= points.len());
        }
    }

    #[test]
    fn gap_bound() {
        let simplifier = Simplifier::default();
        for seed in 1..50 {
            let out = simplifier.simplify(&walk(seed, 60));
            // the final pair may be the forced last point
            for pair in out.windows(2).take(out.len().saturating_sub(2)) {
                let gap = pair[0].seconds_until(&pair[1]);
                let forced = gap > MAX_TIME_INTERVAL_S;
                let moved = gap >= MIN_TIME_INTERVAL_S && pair[0].distance_to(&pair[1]) >= 5.0;
                assert!(forced || moved, "seed {seed}: gap {gap}");
            }
        }
    }

    #[test]
    fn idempotent() {
        let simplifier = Simplifier::default();
        for seed in 1..50 {
            let once = simplifier.simplify(&walk(seed, 80));
            let twice = simplifier.simplify(&once);
            assert_eq!(once, twice, "seed {seed}");
        }
    }

    #[test]
    fn reducer() {
        let trajectory = Trajectory::new("x", vec![point(0, 28.0, 115.0), point(10, 28.0, 115.0), point(20, 28.0, 115.0)]);
        let out = Simplifier::default().reduce(&trajectory);
        assert_eq!(out.account_id, "x");
        assert_eq!(out.len(), 2);
        assert_eq!(trajectory.len(), 3);
    }
}
