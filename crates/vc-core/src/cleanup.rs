//! Best-effort removal of a run's temporary artifacts.
//!
//! Failures are logged and recorded, never returned: cleanup must not mask
//! an earlier error or fail an otherwise successful run.

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{Artifact, GeoEngine};

/// Result of removing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupStatus {
    Removed,
    Absent,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub artifact: Artifact,
    #[serde(flatten)]
    pub status: CleanupStatus,
}

impl CleanupOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, CleanupStatus::Failed { .. })
    }
}

/// Remove each artifact that exists, in order.
pub fn cleanup<E: GeoEngine + ?Sized>(engine: &mut E, artifacts: &[Artifact]) -> Vec<CleanupOutcome> {
    artifacts
        .iter()
        .map(|artifact| {
            let status = if !engine.exists(artifact) {
                CleanupStatus::Absent
            } else {
                info!("Deleting {artifact} ...");
                match engine.delete(artifact) {
                    Ok(()) => CleanupStatus::Removed,
                    Err(err) => {
                        warn!(%artifact, error = %err, "cleanup failed");
                        CleanupStatus::Failed {
                            reason: err.to_string(),
                        }
                    }
                }
            };
            CleanupOutcome {
                artifact: artifact.clone(),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LocalEngine;
    use tempfile::TempDir;

    #[test]
    fn removes_present_and_skips_absent() {
        let temp = TempDir::new().unwrap();
        let copy = temp.path().join("copy.geojson");
        std::fs::write(&copy, "{}").unwrap();
        let mut engine = LocalEngine::new();

        let outcomes = cleanup(
            &mut engine,
            &[
                Artifact::View("voter_lyr_x".into()),
                Artifact::Dataset(copy.clone()),
            ],
        );
        assert_eq!(outcomes[0].status, CleanupStatus::Absent);
        assert_eq!(outcomes[1].status, CleanupStatus::Removed);
        assert!(!copy.exists());
        assert!(outcomes.iter().all(|o| !o.is_failed()));
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = CleanupOutcome {
            artifact: Artifact::View("lyr".into()),
            status: CleanupStatus::Failed {
                reason: "locked".into(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "locked");
        assert_eq!(json["artifact"]["kind"], "view");
    }
}
