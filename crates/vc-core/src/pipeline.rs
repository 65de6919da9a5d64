//! The voter count pipeline.
//!
//! ```text
//! resolve counties ─▶ prepare fields ─▶ extract points ─▶ summarize within ─▶ join back
//!                                            │                                   │
//!                                            └──────────── cleanup ◀─────────────┘
//! ```
//!
//! Input errors surface before the polygon layer is touched. Once extraction
//! starts, temporary artifacts are removed whether or not later stages
//! succeed. The aggregation output stays in the output workspace.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, info_span};
use vc_common::{County, Error, Result, RunId};

use crate::aggregate;
use crate::cleanup::{self, CleanupOutcome};
use crate::context::RunContext;
use crate::engine::{Artifact, GeoEngine, JoinOutcome, PointSource};
use crate::extract::{self, Extraction};
use crate::fields::{self, FieldReport};
use crate::merge;
use crate::selection::CountySelection;

const READABLE_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// The three invocation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Polygon layer, updated in place.
    pub polygons: PathBuf,
    /// One county name, or several joined by `;`.
    pub counties: String,
    /// Workspace receiving the aggregation output.
    pub output_workspace: PathBuf,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub polygons: PathBuf,
    pub counties: Vec<County>,
    pub predicate: String,
    pub point_source: PointSource,
    pub output: PathBuf,
    pub polygon_count: usize,
    pub point_count: usize,
    pub matched: usize,
    pub fields: FieldReport,
    pub cleanup: Vec<CleanupOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
}

/// Run the whole pipeline once.
pub fn run<E: GeoEngine + ?Sized>(
    engine: &mut E,
    ctx: &RunContext,
    request: &RunRequest,
) -> Result<RunReport> {
    let span = info_span!("run", run_id = %ctx.run_id);
    let _guard = span.enter();
    let clock = Instant::now();

    info!(
        "The script start time is: {}",
        ctx.started_at.format(READABLE_TIME)
    );
    info!("Selected counties: {}", request.counties);
    info!("Output workspace: {}", request.output_workspace.display());

    let selection =
        CountySelection::parse(&request.counties, &ctx.config.point_fields.county_field)?;
    info!("Final county list: {:?}", selection.names());
    info!("County numbers: {:?}", selection.ids());

    if !request.output_workspace.is_dir() {
        return Err(Error::WorkspaceNotFound {
            path: request.output_workspace.clone(),
        });
    }
    if !engine.exists(&Artifact::Dataset(request.polygons.clone())) {
        return Err(Error::LayerNotFound {
            path: request.polygons.clone(),
        });
    }

    let field_report = fields::prepare(engine, &request.polygons, &ctx.config)?;

    let temporaries = [
        Artifact::View(ctx.view_name()),
        Artifact::Dataset(ctx.scratch_copy()),
    ];
    let staged = run_stages(engine, ctx, request, &selection);
    let cleanup = cleanup::cleanup(engine, &temporaries);
    let (extraction, output, polygon_count, join) = staged?;

    let elapsed = clock.elapsed();
    let finished_at = ctx.started_at + chrono::Duration::milliseconds(elapsed.as_millis() as i64);
    info!("Script shutting down ...");
    info!("The script end time is: {}", finished_at.format(READABLE_TIME));
    info!("Time elapsed: {:.2}s", elapsed.as_secs_f64());

    Ok(RunReport {
        run_id: ctx.run_id.clone(),
        polygons: request.polygons.clone(),
        counties: selection.counties.clone(),
        predicate: selection.filter.to_sql(),
        point_source: ctx.point_source(),
        output,
        polygon_count,
        point_count: extraction.points,
        matched: join.matched,
        fields: field_report,
        cleanup,
        started_at: ctx.started_at,
        finished_at,
        elapsed_secs: elapsed.as_secs_f64(),
    })
}

/// Extraction, aggregation and merge: the stages bracketed by cleanup.
fn run_stages<E: GeoEngine + ?Sized>(
    engine: &mut E,
    ctx: &RunContext,
    request: &RunRequest,
    selection: &CountySelection,
) -> Result<(Extraction, PathBuf, usize, JoinOutcome)> {
    let extraction = extract::extract(engine, ctx, &selection.filter)?;
    let (output, rows) = aggregate::summarize(
        engine,
        &request.polygons,
        &extraction.copy,
        ctx.output_dataset(&request.output_workspace),
        &ctx.config,
    )?;
    let join = merge::merge(engine, &request.polygons, &output, &ctx.config)?;
    Ok((extraction, output, rows, join))
}
