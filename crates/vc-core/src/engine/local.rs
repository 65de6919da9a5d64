//! File workspace engine.
//!
//! Datasets are GeoJSON files (see [`super::feature`]); views are kept in
//! memory for the lifetime of the engine. Every dataset write goes through
//! [`FeatureClass::save`], so a layer is either fully updated or untouched.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace, warn};
use vc_common::{Error, Result};

use super::feature::{Feature, FeatureClass, FieldDef};
use super::geometry::Area;
use super::{
    Artifact, GeoEngine, JoinOutcome, LayerInfo, PointSource, SchemaUpdate, SummarizeOptions,
};
use crate::selection::CountyFilter;

#[derive(Debug, Clone)]
struct View {
    source: PointSource,
    filter: CountyFilter,
}

/// Local geoprocessing engine over GeoJSON workspaces.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    views: HashMap<String, View>,
    page_size: u32,
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            views: HashMap::new(),
            page_size: 2000,
        }
    }

    /// Set the feature service page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn open_layer(layer: &Path) -> Result<FeatureClass> {
        if !layer.is_file() {
            return Err(Error::LayerNotFound {
                path: layer.to_path_buf(),
            });
        }
        FeatureClass::load(layer)
    }

    fn fetch(&self, view: &View) -> Result<FeatureClass> {
        let class = match &view.source {
            PointSource::File(path) => {
                if !path.is_file() {
                    return Err(Error::SourceUnavailable(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                FeatureClass::load(path)?
            }
            PointSource::Service(url) => self.fetch_service(url, &view.filter)?,
        };

        // Service rows are filtered server side; filter again so a service
        // that ignores `where` still yields the right subset.
        if class.field(&view.filter.field).is_none() && !class.is_empty() {
            return Err(Error::FieldMissing {
                layer: view.source.to_string().into(),
                field: view.filter.field.clone(),
            });
        }
        let FeatureClass {
            fields, features, ..
        } = class;
        let kept: Vec<Feature> = features
            .into_iter()
            .filter(|f| view.filter.matches(f.get_i64(&view.filter.field)))
            .collect();
        Ok(FeatureClass::new(fields, kept))
    }

    #[cfg(feature = "remote")]
    fn fetch_service(&self, url: &str, filter: &CountyFilter) -> Result<FeatureClass> {
        let features = super::service::query(url, filter, self.page_size)?;
        Ok(FeatureClass::from_features(features))
    }

    #[cfg(not(feature = "remote"))]
    fn fetch_service(&self, url: &str, _filter: &CountyFilter) -> Result<FeatureClass> {
        Err(Error::SourceUnavailable(format!(
            "{url}: built without the `remote` feature"
        )))
    }
}

/// Remove every property whose key matches `field`, ignoring case.
fn remove_property(properties: &mut Map<String, Value>, field: &str) {
    properties.retain(|k, _| !k.eq_ignore_ascii_case(field));
}

impl GeoEngine for LocalEngine {
    fn describe(&self, layer: &Path) -> Result<LayerInfo> {
        let class = Self::open_layer(layer)?;
        Ok(LayerInfo {
            row_count: class.len(),
            fields: class.fields,
        })
    }

    fn read_field(&self, layer: &Path, field: &str) -> Result<Vec<Option<i64>>> {
        let class = Self::open_layer(layer)?;
        if class.field(field).is_none() {
            return Err(Error::FieldMissing {
                layer: layer.to_path_buf(),
                field: field.to_string(),
            });
        }
        Ok(class.features.iter().map(|f| f.get_i64(field)).collect())
    }

    fn update_schema(&mut self, layer: &Path, update: &SchemaUpdate) -> Result<()> {
        let mut class = Self::open_layer(layer)?;

        for (i, name) in update.delete_fields.iter().enumerate() {
            let before = class.fields.len();
            class.fields.retain(|f| !f.name.eq_ignore_ascii_case(name));
            let removed_earlier = update.delete_fields[..i]
                .iter()
                .any(|prior| prior.eq_ignore_ascii_case(name));
            if class.fields.len() == before && !removed_earlier {
                return Err(Error::FieldMissing {
                    layer: layer.to_path_buf(),
                    field: name.clone(),
                });
            }
            for feature in &mut class.features {
                remove_property(&mut feature.properties, name);
            }
        }

        for def in &update.add_fields {
            if class.field(&def.name).is_some() {
                return Err(Error::FieldConflict {
                    layer: layer.to_path_buf(),
                    field: def.name.clone(),
                });
            }
            class.fields.push(def.clone());
            for feature in &mut class.features {
                feature.properties.insert(def.name.clone(), Value::Null);
            }
        }

        if let Some(assign) = &update.assign {
            let name = match class.field(&assign.field) {
                Some(def) => def.name.clone(),
                None => {
                    return Err(Error::FieldMissing {
                        layer: layer.to_path_buf(),
                        field: assign.field.clone(),
                    })
                }
            };
            if assign.values.len() != class.len() {
                return Err(Error::StaleLayer {
                    layer: layer.to_path_buf(),
                    expected: assign.values.len(),
                    actual: class.len(),
                });
            }
            for (feature, value) in class.features.iter_mut().zip(&assign.values) {
                remove_property(&mut feature.properties, &name);
                feature.properties.insert(name.clone(), Value::from(*value));
            }
        }

        trace!(layer = %layer.display(), ?update, "applying schema update");
        class.save(layer)
    }

    fn exists(&self, artifact: &Artifact) -> bool {
        match artifact {
            Artifact::View(name) => self.views.contains_key(name),
            Artifact::Dataset(path) => path.is_file(),
        }
    }

    fn delete(&mut self, artifact: &Artifact) -> Result<()> {
        match artifact {
            Artifact::View(name) => self
                .views
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| Error::ViewNotFound(name.clone())),
            Artifact::Dataset(path) => Ok(std::fs::remove_file(path)?),
        }
    }

    fn make_feature_layer(
        &mut self,
        source: &PointSource,
        view: &str,
        filter: &CountyFilter,
    ) -> Result<()> {
        if self.views.contains_key(view) {
            return Err(Error::ViewExists(view.to_string()));
        }
        if let PointSource::File(path) = source {
            if !path.is_file() {
                return Err(Error::SourceUnavailable(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
        }
        debug!(view, %source, predicate = %filter, "registered feature layer");
        self.views.insert(
            view.to_string(),
            View {
                source: source.clone(),
                filter: filter.clone(),
            },
        );
        Ok(())
    }

    fn copy_features(&mut self, view: &str, dest: &Path) -> Result<usize> {
        let registered = self
            .views
            .get(view)
            .ok_or_else(|| Error::ViewNotFound(view.to_string()))?;
        if dest.exists() {
            return Err(Error::Engine(format!("{} already exists", dest.display())));
        }
        let copy = self.fetch(registered)?;
        copy.save(dest)?;
        Ok(copy.len())
    }

    fn summarize_within(
        &mut self,
        polygons: &Path,
        points: &Path,
        out: &Path,
        options: &SummarizeOptions,
    ) -> Result<usize> {
        let polys = Self::open_layer(polygons)?;
        let pts = Self::open_layer(points)?;

        let mut fields = polys.fields.clone();
        let outputs = options
            .sum_fields
            .iter()
            .map(|s| s.output.as_str())
            .chain(options.count_field.as_deref());
        for name in outputs {
            if polys.field(name).is_some() {
                return Err(Error::Summarize(format!(
                    "output field {name} already exists on {}",
                    polygons.display()
                )));
            }
            fields.push(FieldDef::long(name));
        }
        for sum in &options.sum_fields {
            if pts.field(&sum.source).is_none() && !pts.is_empty() {
                return Err(Error::Summarize(format!(
                    "summary field {} not found on {}",
                    sum.source,
                    points.display()
                )));
            }
        }

        for sum in &options.sum_fields {
            let fractional = pts
                .features
                .iter()
                .filter(|f| f.get(&sum.source).is_some() && f.get_i64(&sum.source).is_none())
                .count();
            if fractional > 0 {
                warn!(
                    field = %sum.source,
                    points = fractional,
                    "non-integer values contribute 0 to {}",
                    sum.output
                );
            }
        }

        let located: Vec<&Feature> = pts.features.iter().filter(|f| f.geometry.is_some()).collect();
        let mut rows = Vec::with_capacity(polys.len());
        for polygon in &polys.features {
            let area = polygon.geometry.as_ref().and_then(Area::from_geometry);
            let inside: Vec<&Feature> = match &area {
                Some(area) => located
                    .iter()
                    .copied()
                    .filter(|p| p.geometry.as_ref().is_some_and(|g| area.contains_geometry(g)))
                    .collect(),
                None => Vec::new(),
            };
            if inside.is_empty() && !options.keep_all {
                continue;
            }

            let mut row = polygon.clone();
            for sum in &options.sum_fields {
                let total: i64 = inside.iter().filter_map(|p| p.get_i64(&sum.source)).sum();
                row.properties.insert(sum.output.clone(), Value::from(total));
            }
            if let Some(count) = &options.count_field {
                row.properties
                    .insert(count.clone(), Value::from(inside.len() as i64));
            }
            rows.push(row);
        }

        let output = FeatureClass::new(fields, rows);
        output.save(out)?;
        Ok(output.len())
    }

    fn join_fields(
        &mut self,
        target: &Path,
        target_key: &str,
        source: &Path,
        source_key: &str,
        fields: &[String],
    ) -> Result<JoinOutcome> {
        let mut dest = Self::open_layer(target)?;
        let src = Self::open_layer(source)?;

        for (class, key, path) in [(&dest, target_key, target), (&src, source_key, source)] {
            if class.field(key).is_none() {
                return Err(Error::FieldMissing {
                    layer: path.to_path_buf(),
                    field: key.to_string(),
                });
            }
        }

        let mut defs = Vec::with_capacity(fields.len());
        for name in fields {
            let def = src.field(name).cloned().ok_or_else(|| Error::FieldMissing {
                layer: source.to_path_buf(),
                field: name.clone(),
            })?;
            if dest.field(name).is_some() {
                return Err(Error::FieldConflict {
                    layer: target.to_path_buf(),
                    field: name.clone(),
                });
            }
            defs.push(def);
        }

        // First source row wins for duplicate keys.
        let mut index: HashMap<i64, &Feature> = HashMap::with_capacity(src.len());
        for row in &src.features {
            if let Some(key) = row.get_i64(source_key) {
                index.entry(key).or_insert(row);
            }
        }

        let mut outcome = JoinOutcome {
            total: dest.len(),
            ..Default::default()
        };
        for row in &mut dest.features {
            let key = row.get_i64(target_key);
            let matched = key.and_then(|k| index.get(&k));
            for def in &defs {
                let value = matched
                    .and_then(|m| m.get(&def.name))
                    .cloned()
                    .unwrap_or(Value::Null);
                row.properties.insert(def.name.clone(), value);
            }
            match (matched, key) {
                (Some(_), _) => outcome.matched += 1,
                (None, Some(k)) => outcome.unmatched_keys.push(k),
                (None, None) => {}
            }
        }
        if outcome.unmatched() > 0 {
            debug!(
                layer = %target.display(),
                unmatched = outcome.unmatched(),
                "join incomplete, target left unchanged"
            );
            return Ok(outcome);
        }
        dest.fields.extend(defs);
        dest.save(target)?;
        Ok(outcome)
    }
}
