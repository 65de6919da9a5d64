//! Run context: everything a pipeline run depends on besides the engine.
//!
//! Replaces ambient process state (scratch workspace, clock, artifact
//! names) with one value passed explicitly through every stage.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use vc_common::RunId;
use vc_config::Config;

use crate::engine::{dataset_path, PointSource};

/// Timestamp format of the aggregation output name.
pub const OUTPUT_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Explicit context for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub scratch: PathBuf,
}

impl RunContext {
    /// Context starting now, with the scratch workspace from config.
    pub fn new(config: Config) -> Self {
        Self::at(config, Utc::now())
    }

    /// Context with a fixed start time.
    pub fn at(config: Config, started_at: DateTime<Utc>) -> Self {
        let scratch = config.scratch_dir();
        Self {
            config,
            run_id: RunId::at(started_at),
            started_at,
            scratch,
        }
    }

    pub fn with_scratch(mut self, scratch: impl Into<PathBuf>) -> Self {
        self.scratch = scratch.into();
        self
    }

    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn point_source(&self) -> PointSource {
        PointSource::parse(&self.config.point_source)
    }

    /// Name of this run's filtered point view.
    pub fn view_name(&self) -> String {
        format!(
            "{}_{}",
            self.config.artifacts.view_prefix,
            self.run_id.as_name_suffix()
        )
    }

    /// Path of this run's local point copy.
    pub fn scratch_copy(&self) -> PathBuf {
        let name = format!(
            "{}_{}",
            self.config.artifacts.scratch_prefix,
            self.run_id.as_name_suffix()
        );
        dataset_path(&self.scratch, &name)
    }

    /// Output dataset path in `workspace`: `<prefix>_<YYYYMMDD_HHMMSS>`,
    /// suffixed `_2`, `_3`, ... if that name is already taken.
    pub fn output_dataset(&self, workspace: &Path) -> PathBuf {
        let base = format!(
            "{}_{}",
            self.config.artifacts.output_prefix,
            self.started_at.format(OUTPUT_STAMP_FORMAT)
        );
        let first = dataset_path(workspace, &base);
        if !first.exists() {
            return first;
        }
        (2u32..)
            .map(|n| dataset_path(workspace, &format!("{base}_{n}")))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }
}
