use super::Reducer;
use crate::{
    ap::extract_ap_name,
    behavior::is_online_event,
    model::{TrackPoint, Trajectory},
};

/// Keeps an online event only when the device shows up at a different AP
/// than at the previously kept event. Coarser than [`super::Simplifier`]: it
/// answers where a device newly appeared, not how it moved.
#[derive(Debug, Clone, Copy, Default)]
pub struct BehaviorDedup;

impl BehaviorDedup {
    pub fn dedup(&self, points: &[TrackPoint]) -> Vec<TrackPoint> {
        let mut kept = Vec::new();
        let mut last_label: Option<String> = None;

        for point in points {
            let Some(label) = online_label(point) else {
                continue;
            };
            if last_label.as_deref() != Some(label.as_str()) {
                kept.push(point.clone());
                last_label = Some(label);
            }
        }

        kept
    }
}

/// AP label of an online event, `None` for anything else.
fn online_label(point: &TrackPoint) -> Option<String> {
    let detail = point.detail.as_deref()?;
    if !is_online_event(Some(detail)) {
        return None;
    }
    extract_ap_name(detail)
}

impl Reducer for BehaviorDedup {
    fn name(&self) -> &'static str {
        "behavior"
    }

    fn reduce(&self, trajectory: &Trajectory) -> Trajectory {
        Trajectory::new(trajectory.account_id.clone(), self.dedup(&trajectory.points))
    }
}
