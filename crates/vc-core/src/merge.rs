//! Result merge: join summary fields back onto the polygon layer.
//!
//! Keys on both sides were assigned immediately before aggregation and
//! Summarize Within keeps every polygon, so every row must match. A miss
//! means the keys drifted and is reported as an error; the layer is left
//! as it was.

use std::path::Path;
use tracing::info;
use vc_common::{Error, Result};
use vc_config::Config;

use crate::engine::{GeoEngine, JoinOutcome};

/// Keys listed in a join mismatch error.
const MISMATCH_SAMPLE: usize = 10;

/// Join the summary fields of `output` onto `layer` by join key.
pub fn merge<E: GeoEngine + ?Sized>(
    engine: &mut E,
    layer: &Path,
    output: &Path,
    config: &Config,
) -> Result<JoinOutcome> {
    let key = &config.join_key.field;
    let fields = vec![
        config.summary.sum_field.clone(),
        config.summary.count_field.clone(),
    ];
    info!("Joining {} back to {} on {key} ...", fields.join(", "), layer.display());
    let outcome = engine.join_fields(layer, key, output, key, &fields)?;

    if outcome.unmatched() > 0 {
        return Err(Error::JoinMismatch {
            field: key.clone(),
            unmatched: outcome.unmatched(),
            total: outcome.total,
            sample: outcome
                .unmatched_keys
                .iter()
                .take(MISMATCH_SAMPLE)
                .copied()
                .collect(),
        });
    }
    Ok(outcome)
}
