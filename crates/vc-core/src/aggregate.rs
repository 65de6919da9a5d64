//! Aggregation: Summarize Within over the polygon layer.

use std::path::{Path, PathBuf};
use tracing::info;
use vc_common::Result;
use vc_config::Config;

use crate::engine::{GeoEngine, SumField, SummarizeOptions};

/// Options for the voter count summary: keep every polygon, sum the voter
/// attribute, and add a point count.
pub fn options(config: &Config) -> SummarizeOptions {
    SummarizeOptions {
        keep_all: true,
        sum_fields: vec![SumField {
            source: config.point_fields.voters_field.clone(),
            output: config.summary.sum_field.clone(),
        }],
        count_field: Some(config.summary.count_field.clone()),
    }
}

/// Summarize `points` within `polygons` into the new dataset `out`.
pub fn summarize<E: GeoEngine + ?Sized>(
    engine: &mut E,
    polygons: &Path,
    points: &Path,
    out: PathBuf,
    config: &Config,
) -> Result<(PathBuf, usize)> {
    info!("Starting 'Summarize Within' ...");
    let rows = engine.summarize_within(polygons, points, &out, &options(config))?;
    info!("Output FC named: {} ...", out.display());
    Ok((out, rows))
}
