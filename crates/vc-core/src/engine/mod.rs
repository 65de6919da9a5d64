//! Geoprocessing engine capability interface.
//!
//! The pipeline never touches datasets directly. Every side effect goes
//! through a [`GeoEngine`], so orchestration can run against the bundled
//! [`LocalEngine`] or against a test double.

pub mod feature;
pub mod geometry;
pub mod local;
#[cfg(feature = "remote")]
pub mod service;

pub use feature::{Feature, FeatureClass, FieldDef, FieldType, Geometry, DATASET_EXTENSION};
pub use local::LocalEngine;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use vc_common::Result;

use crate::selection::CountyFilter;

/// Where voter points are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum PointSource {
    /// Hosted feature service layer URL.
    Service(String),
    /// Local dataset file.
    File(PathBuf),
}

impl PointSource {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            PointSource::Service(trimmed.to_string())
        } else {
            PointSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointSource::Service(url) => f.write_str(url),
            PointSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Something the engine can test for and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Artifact {
    /// Named in-memory layer.
    View(String),
    /// Dataset file in a workspace.
    Dataset(PathBuf),
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::View(name) => write!(f, "view {name}"),
            Artifact::Dataset(path) => write!(f, "dataset {}", path.display()),
        }
    }
}

/// Path of a named dataset inside a workspace directory.
pub fn dataset_path(workspace: &Path, name: &str) -> PathBuf {
    workspace.join(format!("{name}.{DATASET_EXTENSION}"))
}

/// Schema and size of a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub fields: Vec<FieldDef>,
    pub row_count: usize,
}

impl LayerInfo {
    /// Field by name, ignoring case.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Values for one long field, in layer iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAssignment {
    pub field: String,
    pub values: Vec<i64>,
}

/// A staged set of schema changes, applied in one write.
///
/// Order: deletions, then additions, then the key assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaUpdate {
    pub delete_fields: Vec<String>,
    pub add_fields: Vec<FieldDef>,
    pub assign: Option<KeyAssignment>,
}

impl SchemaUpdate {
    pub fn is_empty(&self) -> bool {
        self.delete_fields.is_empty() && self.add_fields.is_empty() && self.assign.is_none()
    }
}

/// One summed statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumField {
    /// Attribute on the summarized points.
    pub source: String,
    /// Field created on the output.
    pub output: String,
}

/// Summarize Within configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeOptions {
    /// Keep polygons that contain no points.
    pub keep_all: bool,
    pub sum_fields: Vec<SumField>,
    /// Add a contained-point count under this name.
    pub count_field: Option<String>,
}

/// Result of an attribute join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinOutcome {
    pub total: usize,
    pub matched: usize,
    /// Key values of target rows with no match. Null keys are counted in
    /// `total - matched` but not listed.
    pub unmatched_keys: Vec<i64>,
}

impl JoinOutcome {
    pub fn unmatched(&self) -> usize {
        self.total - self.matched
    }
}

/// Capabilities the voter count pipeline needs from a geoprocessing engine.
pub trait GeoEngine {
    /// Fields and row count of a layer.
    fn describe(&self, layer: &Path) -> Result<LayerInfo>;

    /// Integer values of one field, in iteration order.
    fn read_field(&self, layer: &Path, field: &str) -> Result<Vec<Option<i64>>>;

    /// Apply a staged schema update.
    fn update_schema(&mut self, layer: &Path, update: &SchemaUpdate) -> Result<()>;

    fn exists(&self, artifact: &Artifact) -> bool;

    fn delete(&mut self, artifact: &Artifact) -> Result<()>;

    /// Register a named, filtered view over a point source.
    fn make_feature_layer(
        &mut self,
        source: &PointSource,
        view: &str,
        filter: &CountyFilter,
    ) -> Result<()>;

    /// Materialize a view into a dataset. Returns the row count.
    fn copy_features(&mut self, view: &str, dest: &Path) -> Result<usize>;

    /// Aggregate points per polygon into a new dataset. Returns the row count.
    fn summarize_within(
        &mut self,
        polygons: &Path,
        points: &Path,
        out: &Path,
        options: &SummarizeOptions,
    ) -> Result<usize>;

    /// Copy `fields` from `source` onto `target`, matching rows by key.
    ///
    /// `target` is only written when every row found a match; otherwise it
    /// is left untouched and the outcome lists the unmatched keys.
    fn join_fields(
        &mut self,
        target: &Path,
        target_key: &str,
        source: &Path,
        source_key: &str,
        fields: &[String],
    ) -> Result<JoinOutcome>;
}
