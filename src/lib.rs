//! WiFi association logs in, per-account movement trajectories out.

pub mod ap;
pub mod behavior;
pub mod config;
pub mod identity;
pub mod ingest;
pub mod map;
pub mod model;
pub mod parser;
pub mod points;
pub mod record;
pub mod reduce;
pub mod time;
