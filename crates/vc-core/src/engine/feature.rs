//! Feature class storage: GeoJSON FeatureCollections with an explicit schema.
//!
//! A dataset on disk is a `.geojson` file. Besides the standard members it
//! carries a `fields` array so that field existence and type survive rows
//! whose values are all null. Plain GeoJSON without `fields` is accepted and
//! the schema is inferred from the properties.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use vc_common::{Error, Result};

/// File extension for datasets in a workspace.
pub const DATASET_EXTENSION: &str = "geojson";

/// Attribute field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Long,
    Double,
    Text,
}

/// Attribute field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn long(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Long,
        }
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Double,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Text,
        }
    }
}

pub type Position = Vec<f64>;
pub type Ring = Vec<Position>;

/// Supported geometry types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// One row: geometry plus attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    tag: FeatureTag,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            tag: FeatureTag::Feature,
            geometry: Some(geometry),
            properties,
        }
    }

    /// Attribute value by field name, ignoring case.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.properties
            .get(field)
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(field))
                    .map(|(_, v)| v)
            })
            .filter(|v| !v.is_null())
    }

    /// Integer attribute value. Whole floats are accepted; null is `None`.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        let value = self.get(field)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        })
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Map<String, Value>, D::Error> {
    Ok(Option::<Map<String, Value>>::deserialize(d)?.unwrap_or_default())
}

/// A dataset: schema plus rows in storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureClass {
    #[serde(rename = "type", default)]
    tag: CollectionTag,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    pub features: Vec<Feature>,
}

impl FeatureClass {
    pub fn new(fields: Vec<FieldDef>, features: Vec<Feature>) -> Self {
        Self {
            tag: CollectionTag::FeatureCollection,
            fields,
            features,
        }
    }

    /// Build a dataset whose schema is inferred from the rows.
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self::new(infer_fields(&features), features)
    }

    /// Read a dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut class: FeatureClass = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::MalformedDataset {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        if class.fields.is_empty() {
            class.fields = infer_fields(&class.features);
        }
        Ok(class)
    }

    /// Write a dataset file by staging a sibling temp file and renaming it
    /// over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let staged = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Field definition by name, ignoring case.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Infer a schema from property values, in first-seen order.
fn infer_fields(features: &[Feature]) -> Vec<FieldDef> {
    let mut fields: Vec<FieldDef> = Vec::new();
    for feature in features {
        for (name, value) in &feature.properties {
            let inferred = match value {
                Value::Null => None,
                Value::Number(n) if n.is_i64() || n.is_u64() => Some(FieldType::Long),
                Value::Number(_) => Some(FieldType::Double),
                _ => Some(FieldType::Text),
            };
            match fields.iter_mut().find(|f| &f.name == name) {
                Some(existing) => {
                    if existing.field_type == FieldType::Long && inferred == Some(FieldType::Double) {
                        existing.field_type = FieldType::Double;
                    }
                }
                None => fields.push(FieldDef {
                    name: name.clone(),
                    field_type: inferred.unwrap_or(FieldType::Text),
                }),
            }
        }
    }
    fields
}
