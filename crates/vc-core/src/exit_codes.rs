//! Exit codes for the voter-count CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.

use vc_common::Error;

/// Exit codes for voter-count operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed and summary fields were written
    Ok = 0,

    /// Bad invocation parameters (unknown county, missing layer or workspace)
    InvalidInput = 2,

    /// Configuration error
    ConfigError = 10,

    /// Point source unreachable, malformed, or empty for the selection
    SourceError = 11,

    /// Polygon layer fields could not be prepared
    FieldError = 12,

    /// Summarize Within failed
    AggregationError = 13,

    /// Polygon rows did not line up with the aggregation output
    JoinMismatch = 14,

    /// I/O error
    IoError = 15,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Ok)
    }

    /// Map a pipeline error to its exit code.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::UnknownCounty { .. }
            | Error::EmptySelection
            | Error::LayerNotFound { .. }
            | Error::WorkspaceNotFound { .. } => ExitCode::InvalidInput,
            Error::Config(_) => ExitCode::ConfigError,
            Error::SourceUnavailable(_)
            | Error::EmptyExtraction { .. }
            | Error::MalformedDataset { .. } => ExitCode::SourceError,
            Error::FieldConflict { .. }
            | Error::FieldMissing { .. }
            | Error::StaleLayer { .. }
            | Error::InvalidJoinKey { .. } => ExitCode::FieldError,
            Error::Summarize(_) => ExitCode::AggregationError,
            Error::JoinMismatch { .. } => ExitCode::JoinMismatch,
            Error::Io(_) | Error::Json(_) => ExitCode::IoError,
            Error::ViewExists(_) | Error::ViewNotFound(_) | Error::Engine(_) => {
                ExitCode::InternalError
            }
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
