//! Vector features for the output layers
//!
//! The removal core reports its per-feature attribution (dissolved land
//! regions, per-segment stream and lake removal) as generic features so
//! downstream tooling can export them however it likes.

use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<f64>> for AttributeValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => AttributeValue::Float(v),
            None => AttributeValue::Null,
        }
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: HashMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            properties: HashMap::new(),
        }
    }

    /// Set an attribute
    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.set(key, value);
        self
    }

    /// Get an attribute
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttributeValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttributeValue::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn extend(&mut self, other: FeatureCollection) {
        self.features.extend(other.features);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}
