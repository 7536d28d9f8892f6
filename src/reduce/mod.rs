//! Reducing per-account point streams into compact trajectories.
//!
//! Accounts are independent, so a batch is grouped by account and every
//! group is reduced on the rayon pool. Inside one account the reducers walk
//! the points strictly in order.

use std::{collections::BTreeMap, fmt};

use clap::ValueEnum;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Deserialize;

use crate::model::{TrackPoint, Trajectory};

pub mod dedup;
pub mod simplify;

pub use dedup::BehaviorDedup;
pub use simplify::{Simplifier, SimplifyThresholds};

/// Trajectory → smaller trajectory of the same account.
pub trait Reducer: Send + Sync {
    fn name(&self) -> &'static str;

    fn reduce(&self, trajectory: &Trajectory) -> Trajectory;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReducerKind {
    /// distance/time thresholds
    #[default]
    Simplify,
    /// keep online events where the AP changes
    Behavior,
}

impl ReducerKind {
    pub fn build(self, thresholds: SimplifyThresholds) -> Box<dyn Reducer> {
        match self {
            ReducerKind::Simplify => Box::new(Simplifier::new(thresholds)),
            ReducerKind::Behavior => Box::new(BehaviorDedup),
        }
    }
}

/// Splits points into one trajectory per account, in account order, each
/// sorted by time. Points with equal times keep their input order.
pub fn group_by_account(points: Vec<TrackPoint>) -> Vec<Trajectory> {
    let mut groups: BTreeMap<String, Vec<TrackPoint>> = BTreeMap::new();
    for point in points {
        groups.entry(point.account_id.clone()).or_default().push(point);
    }

    groups
        .into_iter()
        .map(|(account_id, mut points)| {
            points.sort_by_key(|p| p.timestamp);
            Trajectory::new(account_id, points)
        })
        .collect()
}

/// Runs `reducer` over every trajectory in parallel. Output order follows
/// the input.
pub fn reduce_all(
    trajectories: &[Trajectory],
    reducer: &dyn Reducer,
) -> Vec<(Trajectory, ReductionStats)> {
    trajectories
        .par_iter()
        .map(|trajectory| {
            let reduced = reducer.reduce(trajectory);
            let stats = ReductionStats {
                account_id: trajectory.account_id.clone(),
                original: trajectory.len(),
                reduced: reduced.len(),
            };
            (reduced, stats)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionStats {
    pub account_id: String,
    pub original: usize,
    pub reduced: usize,
}

impl ReductionStats {
    /// Share of points removed, 0 for an empty input.
    pub fn reduction_percent(&self) -> f64 {
        if self.original == 0 {
            return 0.0;
        }
        (self.original - self.reduced) as f64 / self.original as f64 * 100.0
    }
}

impl fmt::Display for ReductionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} (reduced by {:.1}%)",
            self.account_id,
            self.original,
            self.reduced,
            self.reduction_percent()
        )
    }
}
