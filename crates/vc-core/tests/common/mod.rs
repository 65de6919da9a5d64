//! Shared fixtures: small precinct layers and voter point files.

#![allow(dead_code)]

use chrono::TimeZone;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use vc_common::RunId;
use vc_config::Config;
use vc_core::engine::{Feature, FeatureClass, FieldDef, Geometry};
use vc_core::RunContext;

/// A 10x10 square with its lower-left corner at (x0, 0).
pub fn square(x0: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        vec![x0, 0.0],
        vec![x0 + 10.0, 0.0],
        vec![x0 + 10.0, 10.0],
        vec![x0, 10.0],
        vec![x0, 0.0],
    ]])
}

pub fn props(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

/// One voter point.
pub fn point(x: f64, y: f64, county: i64, voters: i64) -> Feature {
    Feature::new(
        Geometry::Point(vec![x, y]),
        props(json!({"COUNTY_ID": county, "VOTERS": voters})),
    )
}

/// Precinct layer with one square per name, left to right at x = 0, 20, 40 ...
pub fn write_precincts(dir: &Path, names: &[&str]) -> PathBuf {
    let features = names
        .iter()
        .enumerate()
        .map(|(i, name)| Feature::new(square(i as f64 * 20.0), props(json!({"NAME": name}))))
        .collect();
    let path = dir.join("precincts.geojson");
    FeatureClass::new(vec![FieldDef::text("NAME")], features)
        .save(&path)
        .unwrap();
    path
}

pub fn write_points(dir: &Path, points: Vec<Feature>) -> PathBuf {
    let path = dir.join("voters.geojson");
    FeatureClass::new(
        vec![FieldDef::long("COUNTY_ID"), FieldDef::long("VOTERS")],
        points,
    )
    .save(&path)
    .unwrap();
    path
}

/// Temp layout for one scenario.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub output: PathBuf,
    pub scratch: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("output");
        let scratch = dir.path().join("scratch");
        std::fs::create_dir_all(&output).unwrap();
        Self {
            dir,
            output,
            scratch,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Context reading points from `points`, stamped at a fixed time.
    pub fn context(&self, points: &Path, second: u32) -> RunContext {
        let mut config = Config::default();
        config.point_source = points.display().to_string();
        let at = chrono::Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, second)
            .unwrap();
        RunContext::at(config, at)
            .with_run_id(RunId(format!("run-20261019-1200{second:02}-abc123")))
            .with_scratch(&self.scratch)
    }

    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(&self.scratch)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// `(sum_voters, Point_Count)` per row of a layer.
pub fn summary(layer: &Path) -> Vec<(Option<i64>, Option<i64>)> {
    FeatureClass::load(layer)
        .unwrap()
        .features
        .iter()
        .map(|f| (f.get_i64("sum_voters"), f.get_i64("Point_Count")))
        .collect()
}

pub fn field_names(layer: &Path) -> Vec<String> {
    FeatureClass::load(layer)
        .unwrap()
        .fields
        .into_iter()
        .map(|f| f.name)
        .collect()
}
