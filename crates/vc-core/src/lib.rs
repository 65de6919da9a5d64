//! Voter count core library.
//!
//! Counts registered voters inside each polygon of a precinct layer:
//! the county parameter becomes a point-source filter, the layer gets a
//! fresh join key, filtered points are summarized within the polygons by a
//! [`engine::GeoEngine`], and the sums are joined back onto the layer.

pub mod aggregate;
pub mod cleanup;
pub mod cli;
pub mod context;
pub mod engine;
pub mod exit_codes;
pub mod extract;
pub mod fields;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod selection;

pub use context::RunContext;
pub use engine::{GeoEngine, LocalEngine};
pub use exit_codes::ExitCode;
pub use pipeline::{run, RunReport, RunRequest};
pub use selection::{CountyFilter, CountySelection};
