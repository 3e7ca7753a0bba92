//! Feature geometry and attributes.
//!
//! Feature services return polygons in geographic coordinates together with
//! an attribute map. Only [`Geometry::Polygon`] and [`Geometry::MultiPolygon`]
//! can be measured by [`edge_distance_km`]; everything else is carried as
//! [`Geometry::Unsupported`] so callers can still read its attributes.

mod edge;
mod geojson;

pub use edge::{edge_distance_km, edge_distance_miles, segment_distance_km};
pub use geojson::{parse_feature_collection, GeoJsonError};

use std::collections::BTreeMap;
use std::fmt;

use geo::{Contains, MultiPolygon, Polygon};

use crate::coord::GeoPoint;

/// Feature geometry as returned by a feature service.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Single polygon: exterior ring plus optional holes (`x = lon, y = lat`)
    Polygon(Polygon<f64>),
    /// Several polygons treated as one feature
    MultiPolygon(MultiPolygon<f64>),
    /// Any other geometry type, keeping its type tag for diagnostics
    Unsupported(String),
}

impl Geometry {
    /// Returns true if `point` lies strictly inside the geometry.
    ///
    /// Points on the boundary are not contained. Unsupported geometries
    /// never contain anything.
    pub fn contains(&self, point: GeoPoint) -> bool {
        let p: geo::Point<f64> = point.into();
        match self {
            Geometry::Polygon(polygon) => polygon.contains(&p),
            Geometry::MultiPolygon(multi) => multi.contains(&p),
            Geometry::Unsupported(_) => false,
        }
    }

    /// GeoJSON-style type tag.
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Unsupported(tag) => tag,
        }
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Null,
}

impl AttributeValue {
    /// Numeric view of the value. Text is parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Null => f.write_str(UNKNOWN_LABEL),
        }
    }
}

impl From<&serde_json::Value> for AttributeValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::String(s) => AttributeValue::Text(s.clone()),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => AttributeValue::Number(f),
                None => AttributeValue::Text(n.to_string()),
            },
            other => AttributeValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

/// Text shown for attributes that are missing or null.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Attribute map of a feature, keyed by field name.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A geometry plus its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub attributes: Attributes,
}

impl Feature {
    pub fn new(geometry: Geometry, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Builder-style attribute insertion, mostly for fixtures.
    pub fn with_attribute(mut self, field: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(field.to_string(), value.into());
        self
    }

    pub fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }

    /// Display label for `field`, or `"unknown"` when missing or null.
    pub fn label(&self, field: &str) -> String {
        match self.attributes.get(field) {
            Some(value) => value.to_string(),
            None => UNKNOWN_LABEL.to_string(),
        }
    }
}
