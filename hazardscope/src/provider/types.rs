//! Service types and traits

use std::fmt;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::coord::GeoPoint;
use crate::geometry::{Feature, GeoJsonError};

/// Errors that can occur while talking to a spatial service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// Service unreachable, connection failure or non-2xx status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The configured service URL cannot be turned into a request
    #[error("Invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The service answered with an error envelope (often with HTTP 200)
    #[error("Service error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Expected fields absent or a value could not be coerced
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// True for errors caused by the response content rather than transport.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ServiceError::MalformedResponse(_))
    }
}

impl From<GeoJsonError> for ServiceError {
    fn from(e: GeoJsonError) -> Self {
        match e {
            GeoJsonError::Remote { code, message } => ServiceError::Remote { code, message },
            other => ServiceError::MalformedResponse(other.to_string()),
        }
    }
}

/// A raster sample, normalized from whatever representation the service used.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterValue {
    /// Direct numeric pixel value
    Number(f64),
    /// Text label, either returned directly or decoded from a class code
    Label(String),
}

impl RasterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RasterValue::Number(n) => Some(*n),
            RasterValue::Label(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RasterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterValue::Number(n) => write!(f, "{}", n),
            RasterValue::Label(s) => f.write_str(s),
        }
    }
}

/// A remote polygon dataset.
///
/// Every call is one network round-trip. Implementations do not cache or
/// retry; transport failures surface as errors and are never reported as an
/// empty result.
pub trait FeatureService: Send + Sync {
    /// Service name for logging and identification.
    fn name(&self) -> &str;

    /// Returns the first feature whose polygon contains `point`, if any.
    fn query_contains(
        &self,
        point: GeoPoint,
    ) -> BoxFuture<'_, Result<Option<Feature>, ServiceError>>;

    /// Returns candidate features within `radius_m` metres of `point`.
    ///
    /// This is a service-side range search: candidates may lie farther away
    /// than requested and must be re-measured by the caller.
    fn query_nearby(
        &self,
        point: GeoPoint,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<Feature>, ServiceError>>;
}

/// A remote raster (image) dataset.
pub trait RasterService: Send + Sync {
    /// Service name for logging and identification.
    fn name(&self) -> &str;

    /// Samples the raster at `point`.
    ///
    /// `tolerance_cells` widens the search around the point where the
    /// service supports it. Returns `None` when the raster has no value there.
    fn identify_at(
        &self,
        point: GeoPoint,
        tolerance_cells: u32,
    ) -> BoxFuture<'_, Result<Option<RasterValue>, ServiceError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_remote_error_keeps_code() {
        let e: ServiceError = GeoJsonError::Remote {
            code: 498,
            message: "Invalid token.".to_string(),
        }
        .into();
        assert_eq!(
            e,
            ServiceError::Remote {
                code: 498,
                message: "Invalid token.".to_string()
            }
        );
        assert!(!e.is_malformed());
    }

    #[test]
    fn test_geojson_parse_error_is_malformed() {
        let e: ServiceError = GeoJsonError::Json("expected value".to_string()).into();
        assert!(e.is_malformed());
    }

    #[test]
    fn test_raster_value_display() {
        assert_eq!(RasterValue::Number(4.0).to_string(), "4");
        assert_eq!(RasterValue::Number(0.35).to_string(), "0.35");
        assert_eq!(
            RasterValue::Label("Class VIII".to_string()).to_string(),
            "Class VIII"
        );
    }

    #[test]
    fn test_raster_value_as_f64() {
        assert_eq!(RasterValue::Number(2.0).as_f64(), Some(2.0));
        assert_eq!(RasterValue::Label("7".to_string()).as_f64(), Some(7.0));
        assert_eq!(RasterValue::Label("High".to_string()).as_f64(), None);
    }

    #[test]
    fn test_error_display() {
        let e = ServiceError::HttpError("HTTP 503 from https://example.com".to_string());
        assert_eq!(
            e.to_string(),
            "HTTP error: HTTP 503 from https://example.com"
        );
    }
}
