//! Decoding of GeoJSON feature collections (`f=geojson` query responses).

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use thiserror::Error;

use super::{AttributeValue, Attributes, Feature, Geometry};

/// Errors raised while decoding a feature collection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoJsonError {
    /// Body is not valid JSON or does not have the expected shape
    #[error("Failed to parse feature collection: {0}")]
    Json(String),

    /// The service answered with an error envelope instead of features
    #[error("Service error {code}: {message}")]
    Remote { code: i64, message: String },

    /// A position has fewer than two ordinates
    #[error("Invalid coordinates in {0} geometry")]
    InvalidCoordinates(String),
}

#[derive(Deserialize)]
struct CollectionDoc {
    #[serde(default)]
    features: Option<Vec<FeatureDoc>>,
    #[serde(default)]
    error: Option<ErrorDoc>,
}

#[derive(Deserialize)]
struct ErrorDoc {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    geometry: Option<GeometryDoc>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct GeometryDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// Decodes a GeoJSON `FeatureCollection`.
///
/// Polygon and MultiPolygon geometries are decoded fully; other geometry
/// types (and null geometries) become [`Geometry::Unsupported`] so the
/// feature's attributes remain usable. An ArcGIS `{"error": ...}` envelope
/// is reported as [`GeoJsonError::Remote`].
pub fn parse_feature_collection(body: &[u8]) -> Result<Vec<Feature>, GeoJsonError> {
    let doc: CollectionDoc =
        serde_json::from_slice(body).map_err(|e| GeoJsonError::Json(e.to_string()))?;

    if let Some(error) = doc.error {
        return Err(GeoJsonError::Remote {
            code: error.code,
            message: error.message,
        });
    }

    let features = doc
        .features
        .ok_or_else(|| GeoJsonError::Json("missing 'features' array".to_string()))?;

    features.into_iter().map(decode_feature).collect()
}

fn decode_feature(doc: FeatureDoc) -> Result<Feature, GeoJsonError> {
    let geometry = match doc.geometry {
        Some(g) => decode_geometry(g)?,
        None => Geometry::Unsupported("null".to_string()),
    };

    let attributes: Attributes = doc
        .properties
        .unwrap_or_default()
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::from(v)))
        .collect();

    Ok(Feature::new(geometry, attributes))
}

fn decode_geometry(doc: GeometryDoc) -> Result<Geometry, GeoJsonError> {
    match doc.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(doc.coordinates)
                .map_err(|_| GeoJsonError::InvalidCoordinates(doc.kind.clone()))?;
            Ok(Geometry::Polygon(polygon_from_rings(rings, &doc.kind)?))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(doc.coordinates)
                .map_err(|_| GeoJsonError::InvalidCoordinates(doc.kind.clone()))?;
            let polygons = polygons
                .into_iter()
                .map(|rings| polygon_from_rings(rings, &doc.kind))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon(polygons)))
        }
        _ => Ok(Geometry::Unsupported(doc.kind)),
    }
}

fn polygon_from_rings(rings: Vec<Vec<Vec<f64>>>, kind: &str) -> Result<Polygon<f64>, GeoJsonError> {
    let mut rings = rings
        .into_iter()
        .map(|ring| ring_from_positions(ring, kind))
        .collect::<Result<Vec<_>, _>>()?;

    if rings.is_empty() {
        return Ok(Polygon::new(LineString::new(vec![]), vec![]));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

fn ring_from_positions(
    positions: Vec<Vec<f64>>,
    kind: &str,
) -> Result<LineString<f64>, GeoJsonError> {
    positions
        .into_iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(GeoJsonError::InvalidCoordinates(kind.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GeoPoint;

    const FIRE_RESPONSE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 12,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-122.5, 37.7], [-122.3, 37.7], [-122.3, 37.9], [-122.5, 37.9], [-122.5, 37.7]]]
                },
                "properties": {"FHSZ_Description": "Very High", "FHSZ": 3, "SRA": null}
            }
        ]
    }"#;

    #[test]
    fn test_parse_polygon_feature() {
        let features = parse_feature_collection(FIRE_RESPONSE.as_bytes()).unwrap();
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature.label("FHSZ_Description"), "Very High");
        assert_eq!(feature.label("FHSZ"), "3");
        assert!(feature.attribute("SRA").unwrap().is_null());
        assert!(feature.geometry.contains(GeoPoint::new(37.8, -122.4)));
    }

    #[test]
    fn test_parse_multipolygon_with_hole() {
        let body = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
            "geometry":{"type":"MultiPolygon","coordinates":[
                [[[0,0],[4,0],[4,4],[0,4],[0,0]],[[1,1],[2,1],[2,2],[1,2],[1,1]]],
                [[[10,10],[11,10],[11,11],[10,10]]]
            ]},
            "properties":{}}]}"#;
        let features = parse_feature_collection(body.as_bytes()).unwrap();
        match &features[0].geometry {
            Geometry::MultiPolygon(multi) => {
                assert_eq!(multi.0.len(), 2);
                assert_eq!(multi.0[0].interiors().len(), 1);
            }
            other => panic!("expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_other_geometry_is_unsupported() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{"name":"a"}},
            {"type":"Feature","geometry":null,"properties":{"name":"b"}}
        ]}"#;
        let features = parse_feature_collection(body.as_bytes()).unwrap();
        assert_eq!(
            features[0].geometry,
            Geometry::Unsupported("Point".to_string())
        );
        assert_eq!(
            features[1].geometry,
            Geometry::Unsupported("null".to_string())
        );
        assert_eq!(features[1].label("name"), "b");
    }

    #[test]
    fn test_empty_collection() {
        let body = r#"{"type":"FeatureCollection","features":[]}"#;
        let features = parse_feature_collection(body.as_bytes()).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"error":{"code":400,"message":"Invalid or missing input parameters.","details":[]}}"#;
        let err = parse_feature_collection(body.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            GeoJsonError::Remote {
                code: 400,
                message: "Invalid or missing input parameters.".to_string()
            }
        );
    }

    #[test]
    fn test_missing_features_is_malformed() {
        let err = parse_feature_collection(br#"{"type":"FeatureCollection"}"#).unwrap_err();
        assert!(matches!(err, GeoJsonError::Json(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_feature_collection(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, GeoJsonError::Json(_)));
    }

    #[test]
    fn test_short_position_is_rejected() {
        let body = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
            "geometry":{"type":"Polygon","coordinates":[[[0],[1,1],[0,1]]]},"properties":{}}]}"#;
        let err = parse_feature_collection(body.as_bytes()).unwrap_err();
        assert_eq!(err, GeoJsonError::InvalidCoordinates("Polygon".to_string()));
    }
}
