//! GeoJSON rendering of trajectories, one feature per account.

use std::io::Write;

use anyhow::Result;
use chrono::SecondsFormat;
use geo_types::{Coord, LineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};

use crate::model::Trajectory;

/// A LineString per account, or a Point when the account has a single point.
/// Empty trajectories are left out.
pub fn feature_collection(trajectories: &[Trajectory]) -> FeatureCollection {
    let features = trajectories.iter().filter_map(feature).collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature(trajectory: &Trajectory) -> Option<Feature> {
    let summary = trajectory.summary()?;

    let coords: Vec<Coord> = trajectory
        .points
        .iter()
        .map(|p| Coord::from(p.coordinate))
        .collect();
    let value = match coords.as_slice() {
        [single] => geojson::Value::from(&Point::from(*single)),
        _ => geojson::Value::from(&LineString::new(coords)),
    };

    let mut properties = JsonObject::new();
    properties.insert("account_id".into(), JsonValue::from(summary.account_id));
    properties.insert("points".into(), JsonValue::from(summary.total_points));
    properties.insert(
        "start".into(),
        JsonValue::from(summary.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    properties.insert(
        "end".into(),
        JsonValue::from(summary.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    properties.insert(
        "length_m".into(),
        JsonValue::from(trajectory.length_m().round()),
    );

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

pub fn write_geojson<W: Write>(mut writer: W, trajectories: &[Trajectory]) -> Result<()> {
    let geojson = GeoJson::from(feature_collection(trajectories));
    writeln!(writer, "{geojson}")?;
    Ok(())
}
