//! Voter count configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for config.json
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{resolve_config, ConfigSource, ResolvedConfig, CONFIG_ENV, POINT_SOURCE_ENV, SCRATCH_DIR_ENV};
pub use settings::{
    ArtifactNames, Config, JoinKey, JoinKeyMode, PointFields, RemoteOptions, SummaryFields,
    DEFAULT_POINT_SOURCE,
};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
