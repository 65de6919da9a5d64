//! Field lifecycle on the polygon layer.
//!
//! Before every run the layer loses any summary field left by an earlier run
//! (matched by prefix, ignoring case, so `SUM_VOTERS` and `sum_voters_1` go
//! too) and gets a join key that lines up with the aggregation output.
//!
//! In surrogate mode the key field is created if missing and renumbered
//! 1..N in iteration order on every run. In existing mode a pre-existing
//! identifier is checked for uniqueness and left alone.
//!
//! All changes are computed first and applied as one [`SchemaUpdate`].

use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use vc_common::{Error, Result};
use vc_config::{Config, JoinKeyMode};

use crate::engine::{FieldDef, FieldType, GeoEngine, KeyAssignment, LayerInfo, SchemaUpdate};

/// What the field lifecycle step did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub key_field: String,
    pub deleted: Vec<String>,
    pub created_key: bool,
    /// Rows renumbered; zero in existing-key mode.
    pub renumbered: usize,
}

/// Compute the schema update for a layer without touching it.
pub fn plan(info: &LayerInfo, config: &Config) -> SchemaUpdate {
    let key = &config.join_key.field;
    let summary = &config.summary;

    let mut delete_fields: Vec<String> = info
        .fields
        .iter()
        .filter(|f| !f.name.eq_ignore_ascii_case(key))
        .filter(|f| {
            summary.is_stale(&f.name)
                || f.name.eq_ignore_ascii_case(&summary.sum_field)
                || f.name.eq_ignore_ascii_case(&summary.count_field)
        })
        .map(|f| f.name.clone())
        .fold(Vec::new(), |mut names: Vec<String>, name| {
            // Deletion matches names ignoring case, so one entry per casing.
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                names.push(name);
            }
            names
        });

    if config.join_key.mode == JoinKeyMode::Existing {
        return SchemaUpdate {
            delete_fields,
            ..Default::default()
        };
    }

    let mut add_fields = Vec::new();
    match info.field(key) {
        Some(def) if def.field_type == FieldType::Long => {}
        Some(def) => {
            delete_fields.push(def.name.clone());
            add_fields.push(FieldDef::long(key.clone()));
        }
        None => add_fields.push(FieldDef::long(key.clone())),
    }

    SchemaUpdate {
        delete_fields,
        add_fields,
        assign: Some(KeyAssignment {
            field: key.clone(),
            values: (1..=info.row_count as i64).collect(),
        }),
    }
}

/// Prepare the polygon layer's join key and clear stale summary fields.
pub fn prepare<E: GeoEngine + ?Sized>(
    engine: &mut E,
    layer: &Path,
    config: &Config,
) -> Result<FieldReport> {
    let info = engine.describe(layer)?;
    let key = &config.join_key.field;

    if config.join_key.mode == JoinKeyMode::Existing {
        check_existing_key(engine, layer, &info, key)?;
    }

    let update = plan(&info, config);
    for name in &update.delete_fields {
        info!("Deleting existing {name} field ...");
    }
    let created_key = update.add_fields.iter().any(|f| f.name == *key);
    if created_key {
        info!("Adding {key} field ...");
    }
    let renumbered = update.assign.as_ref().map_or(0, |a| a.values.len());
    if renumbered > 0 {
        info!("Renumbering {key} for {renumbered} rows ...");
    }

    if !update.is_empty() {
        engine.update_schema(layer, &update)?;
    }

    Ok(FieldReport {
        key_field: key.clone(),
        deleted: update
            .delete_fields
            .into_iter()
            .filter(|name| !(created_key && name.eq_ignore_ascii_case(key)))
            .collect(),
        created_key,
        renumbered,
    })
}

fn check_existing_key<E: GeoEngine + ?Sized>(
    engine: &E,
    layer: &Path,
    info: &LayerInfo,
    key: &str,
) -> Result<()> {
    let invalid = |reason: String| Error::InvalidJoinKey {
        field: key.to_string(),
        reason,
    };
    match info.field(key) {
        None => {
            return Err(Error::FieldMissing {
                layer: layer.to_path_buf(),
                field: key.to_string(),
            })
        }
        Some(def) if def.field_type != FieldType::Long => {
            return Err(invalid(format!("field type is {:?}", def.field_type)))
        }
        Some(_) => {}
    }

    let mut seen = HashSet::with_capacity(info.row_count);
    for (row, value) in engine.read_field(layer, key)?.into_iter().enumerate() {
        let value = value.ok_or_else(|| invalid(format!("row {row} is null")))?;
        if !seen.insert(value) {
            return Err(invalid(format!("value {value} appears more than once")));
        }
    }
    Ok(())
}
