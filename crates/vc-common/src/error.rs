//! Error types for the voter count pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for voter count operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the voter count pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("unrecognized county name: {name:?}")]
    UnknownCounty { name: String },

    #[error("no county names were supplied")]
    EmptySelection,

    #[error("polygon layer not found: {}", path.display())]
    LayerNotFound { path: PathBuf },

    #[error("workspace not found: {}", path.display())]
    WorkspaceNotFound { path: PathBuf },

    // Configuration errors (20-29)
    #[error("configuration error: {0}")]
    Config(String),

    // Field lifecycle errors (30-39)
    #[error("field {field} already exists on {}", layer.display())]
    FieldConflict { layer: PathBuf, field: String },

    #[error("field {field} not found on {}", layer.display())]
    FieldMissing { layer: PathBuf, field: String },

    #[error("layer {} changed during update: expected {expected} rows, found {actual}", layer.display())]
    StaleLayer {
        layer: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("join key {field} is not a unique integer identifier: {reason}")]
    InvalidJoinKey { field: String, reason: String },

    // Point source errors (40-49)
    #[error("point source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("no points matched filter {predicate}")]
    EmptyExtraction { predicate: String },

    #[error("malformed dataset {}: {reason}", path.display())]
    MalformedDataset { path: PathBuf, reason: String },

    // Aggregation and merge errors (50-59)
    #[error("summarize within failed: {0}")]
    Summarize(String),

    #[error("{unmatched} of {total} polygon rows found no match on {field} (first keys: {sample:?})")]
    JoinMismatch {
        field: String,
        unmatched: usize,
        total: usize,
        sample: Vec<i64>,
    },

    // Engine errors (60-69)
    #[error("view {0} already exists")]
    ViewExists(String),

    #[error("view {0} not found")]
    ViewNotFound(String),

    #[error("geoprocessing engine error: {0}")]
    Engine(String),

    // I/O errors (70-79)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::UnknownCounty { .. } => 10,
            Error::EmptySelection => 11,
            Error::LayerNotFound { .. } => 12,
            Error::WorkspaceNotFound { .. } => 13,
            Error::Config(_) => 20,
            Error::FieldConflict { .. } => 30,
            Error::FieldMissing { .. } => 31,
            Error::StaleLayer { .. } => 32,
            Error::InvalidJoinKey { .. } => 33,
            Error::SourceUnavailable(_) => 40,
            Error::EmptyExtraction { .. } => 41,
            Error::MalformedDataset { .. } => 42,
            Error::Summarize(_) => 50,
            Error::JoinMismatch { .. } => 51,
            Error::ViewExists(_) => 60,
            Error::ViewNotFound(_) => 61,
            Error::Engine(_) => 62,
            Error::Io(_) => 70,
            Error::Json(_) => 71,
        }
    }

    /// True for errors caused by the invocation parameters rather than by
    /// the data or the environment.
    pub fn is_input_error(&self) -> bool {
        (10..20).contains(&self.code())
    }
}
