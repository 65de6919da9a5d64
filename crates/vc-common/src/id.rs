//! Run identity types.
//!
//! Every pipeline run gets a `RunId`. Temporary artifacts (the filtered view
//! and the scratch copy) embed it so concurrent runs never share names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Run ID for scoping temporary artifacts.
///
/// Format: `run-<date>-<time>-<random>`
/// Example: `run-20260115-143022-abc123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new run ID.
    pub fn new() -> Self {
        Self::at(chrono::Utc::now())
    }

    /// Generate a run ID stamped with the given time.
    pub fn at(now: chrono::DateTime<chrono::Utc>) -> Self {
        let random: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(6)
            .collect();
        RunId(format!("run-{}-{}", now.format("%Y%m%d-%H%M%S"), random))
    }

    /// Parse an existing run ID string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("run-") && s.len() > 19 {
            Some(RunId(s.to_string()))
        } else {
            None
        }
    }

    /// Form usable inside dataset and layer names (no hyphens).
    pub fn as_name_suffix(&self) -> String {
        self.0.replace('-', "_")
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
