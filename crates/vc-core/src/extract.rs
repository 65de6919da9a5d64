//! Point extraction: filter the point source and copy it locally.
//!
//! The filtered view and the scratch copy are named per run, so a stale
//! view only exists if this engine already ran the same run id.

use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use vc_common::{Error, Result};

use crate::context::RunContext;
use crate::engine::{Artifact, GeoEngine};
use crate::selection::CountyFilter;

/// Temporary artifacts produced by extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub view: String,
    pub copy: PathBuf,
    pub points: usize,
}

/// Filter the point source by `filter` and materialize it in scratch.
///
/// An extraction with no matching points is an error.
pub fn extract<E: GeoEngine + ?Sized>(
    engine: &mut E,
    ctx: &RunContext,
    filter: &CountyFilter,
) -> Result<Extraction> {
    let view = ctx.view_name();
    let stale = Artifact::View(view.clone());
    if engine.exists(&stale) {
        info!("Deleting \"{view}\" ...");
        engine.delete(&stale)?;
    }

    let source = ctx.point_source();
    info!("Making a feature layer with query: {filter} ...");
    engine.make_feature_layer(&source, &view, filter)?;

    std::fs::create_dir_all(&ctx.scratch)?;
    info!("Scratch database: {}", ctx.scratch.display());
    let copy = ctx.scratch_copy();
    let points = engine.copy_features(&view, &copy)?;
    info!(points, "Copied points to {}", copy.display());

    if points == 0 {
        return Err(Error::EmptyExtraction {
            predicate: filter.to_sql(),
        });
    }
    Ok(Extraction { view, copy, points })
}
