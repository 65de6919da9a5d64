//! Semantic validation of loaded configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::settings::Config;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

impl Config {
    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();

        let required = [
            ("point_source", &self.point_source),
            ("point_fields.county_field", &self.point_fields.county_field),
            ("point_fields.voters_field", &self.point_fields.voters_field),
            ("join_key.field", &self.join_key.field),
            ("summary.sum_field", &self.summary.sum_field),
            ("summary.count_field", &self.summary.count_field),
            ("artifacts.output_prefix", &self.artifacts.output_prefix),
            ("artifacts.view_prefix", &self.artifacts.view_prefix),
            ("artifacts.scratch_prefix", &self.artifacts.scratch_prefix),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                issues.push(format!("{name} must not be empty"));
            }
        }

        if self.remote.page_size == 0 {
            issues.push("remote.page_size must be greater than zero".to_string());
        }

        if self.summary.stale_prefixes.iter().any(|p| p.is_empty()) {
            issues.push("summary.stale_prefixes must not contain an empty prefix".to_string());
        }

        let key = &self.join_key.field;
        let sum = &self.summary.sum_field;
        let count = &self.summary.count_field;
        if key.eq_ignore_ascii_case(sum) || key.eq_ignore_ascii_case(count) {
            issues.push(format!("join_key.field {key} collides with a summary field"));
        }
        if sum.eq_ignore_ascii_case(count) {
            issues.push(format!("summary.sum_field and summary.count_field are both {sum}"));
        }
        if !key.is_empty() && self.summary.is_stale(key) {
            issues.push(format!(
                "join_key.field {key} matches a stale prefix and would be deleted every run"
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Invalid(issues))
        }
    }
}
