//! Configuration types.
//!
//! Every field has a default so an empty `{}` file is a valid config.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::validate::ValidationError;

/// Utah voter counts by address, published as a hosted feature service.
pub const DEFAULT_POINT_SOURCE: &str = "https://services1.arcgis.com/99lidPhWCzftIe9K/arcgis/rest/services/Utah_Voter_Counts_by_Addresses/FeatureServer/0";

/// Complete voter count configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,

    /// Feature service URL or local GeoJSON path holding the voter points.
    pub point_source: String,

    pub point_fields: PointFields,

    pub join_key: JoinKey,

    pub summary: SummaryFields,

    pub artifacts: ArtifactNames,

    pub remote: RemoteOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            point_source: DEFAULT_POINT_SOURCE.to_string(),
            point_fields: PointFields::default(),
            join_key: JoinKey::default(),
            summary: SummaryFields::default(),
            artifacts: ArtifactNames::default(),
            remote: RemoteOptions::default(),
        }
    }
}

impl Config {
    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ValidationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_json(&content)
    }

    /// Parse config from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(ValidationError::Json)
    }

    /// Scratch workspace for the run's local point copy.
    pub fn scratch_dir(&self) -> PathBuf {
        self.artifacts
            .scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("voter-count").join("scratch"))
    }
}

/// Attribute names on the point source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PointFields {
    /// Integer county identifier filtered by the county predicate.
    pub county_field: String,
    /// Integer voter count summed per polygon.
    pub voters_field: String,
}

impl Default for PointFields {
    fn default() -> Self {
        Self {
            county_field: "COUNTY_ID".to_string(),
            voters_field: "VOTERS".to_string(),
        }
    }
}

/// How polygons are correlated with the aggregation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JoinKeyMode {
    /// A managed long field renumbered 1..N on every run.
    #[default]
    Surrogate,
    /// An identifier field already on the layer, used as-is.
    Existing,
}

/// Join key configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct JoinKey {
    pub mode: JoinKeyMode,
    pub field: String,
}

impl Default for JoinKey {
    fn default() -> Self {
        Self {
            mode: JoinKeyMode::Surrogate,
            field: "JoinID".to_string(),
        }
    }
}

/// Summary fields written onto the polygon layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SummaryFields {
    /// Summed voter count per polygon.
    pub sum_field: String,
    /// Number of contained points per polygon.
    pub count_field: String,
    /// Fields whose names start with any of these (case-insensitive) are
    /// removed before each run.
    pub stale_prefixes: Vec<String>,
}

impl Default for SummaryFields {
    fn default() -> Self {
        Self {
            sum_field: "sum_voters".to_string(),
            count_field: "Point_Count".to_string(),
            stale_prefixes: vec!["sum_voters".to_string(), "point_count".to_string()],
        }
    }
}

impl SummaryFields {
    /// True when `name` starts with one of the stale prefixes, ignoring case.
    pub fn is_stale(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.stale_prefixes
            .iter()
            .any(|prefix| lower.starts_with(&prefix.to_ascii_lowercase()))
    }
}

/// Names for the artifacts a run creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ArtifactNames {
    /// Prefix of the timestamped aggregation output dataset.
    pub output_prefix: String,
    /// Prefix of the filtered point view.
    pub view_prefix: String,
    /// Prefix of the local point copy in the scratch workspace.
    pub scratch_prefix: String,
    /// Scratch workspace directory. Defaults under the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            output_prefix: "voter_counts_output".to_string(),
            view_prefix: "voter_lyr".to_string(),
            scratch_prefix: "temp_voter_fc".to_string(),
            scratch_dir: None,
        }
    }
}

/// Feature service query options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RemoteOptions {
    /// Records requested per query page.
    pub page_size: u32,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self { page_size: 2000 }
    }
}
