//! Resolution of a single source into a finding.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, warn};

use super::finding::{Finding, FindingStatus};
use super::format;
use super::source::{PolygonSource, RasterSource, SourceConfig, SourceKind};
use crate::coord::GeoPoint;
use crate::provider::ServiceError;
use crate::search::{
    NearestFeatureResolver, NearestResolution, RingProbe, DEFAULT_NEARBY_RADIUS_M,
};

/// Per-source lookup failures. Each becomes an `Error` finding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// Service unreachable, non-2xx, bad URL or service error envelope
    #[error("{0}")]
    Network(String),

    /// Response content could not be interpreted
    #[error("{0}")]
    MalformedResponse(String),

    /// Nearby candidates exist but none has a measurable geometry
    #[error("no measurable geometry among {0} candidates")]
    NoGeometrySupport(usize),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// A service, classifier or template panicked mid-lookup
    #[error("lookup panicked: {0}")]
    Panicked(String),
}

impl LookupError {
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Network(_) => "network",
            LookupError::MalformedResponse(_) => "malformed_response",
            LookupError::NoGeometrySupport(_) => "no_geometry_support",
            LookupError::Timeout(_) => "timeout",
            LookupError::Panicked(_) => "panicked",
        }
    }
}

impl From<ServiceError> for LookupError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::MalformedResponse(reason) => LookupError::MalformedResponse(reason),
            other => LookupError::Network(other.to_string()),
        }
    }
}

/// Lookup tuning shared by every source of an aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorSettings {
    /// Deadline for one source's whole lookup chain; `None` waits forever
    pub source_timeout: Option<Duration>,
    pub nearby_radius_m: f64,
    pub ring_probe: RingProbe,
}

/// Default per-source deadline.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(20);

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            source_timeout: Some(DEFAULT_SOURCE_TIMEOUT),
            nearby_radius_m: DEFAULT_NEARBY_RADIUS_M,
            ring_probe: RingProbe::default(),
        }
    }
}

/// Looks up one source at `point`. Never fails: errors, timeouts and panics
/// become an `Error` finding.
pub async fn lookup(
    source: &SourceConfig,
    point: GeoPoint,
    settings: &AggregatorSettings,
) -> Finding {
    let resolution = AssertUnwindSafe(resolve(source, point, settings))
        .catch_unwind()
        .map(|outcome| {
            outcome.unwrap_or_else(|payload| Err(LookupError::Panicked(panic_message(payload))))
        });

    let result = match settings.source_timeout {
        Some(limit) => tokio::time::timeout(limit, resolution)
            .await
            .unwrap_or(Err(LookupError::Timeout(limit))),
        None => resolution.await,
    };

    match result {
        Ok(finding) => {
            debug!(source = %source.id, status = %finding.status, "Source resolved");
            finding
        }
        Err(e) => {
            warn!(source = %source.id, kind = e.kind(), error = %e, "Source lookup failed");
            error_finding(source, &e)
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map_or_else(|| "unknown cause".to_string(), |s| s.to_string()),
    }
}

fn error_finding(source: &SourceConfig, error: &LookupError) -> Finding {
    let text = match error {
        LookupError::NoGeometrySupport(_) => format::unmeasurable(&source.label),
        other => format::error(&source.label, &other.to_string()),
    };
    Finding::new(&source.id, FindingStatus::Error, text)
}

async fn resolve(
    source: &SourceConfig,
    point: GeoPoint,
    settings: &AggregatorSettings,
) -> Result<Finding, LookupError> {
    match &source.kind {
        SourceKind::Polygon(polygon) => {
            let resolver = NearestFeatureResolver::new(settings.nearby_radius_m);
            resolve_polygon(source, polygon, point, &resolver).await
        }
        SourceKind::Raster(raster) => {
            resolve_raster(source, raster, point, &settings.ring_probe).await
        }
        SourceKind::Static { text } => Ok(Finding::new(
            &source.id,
            FindingStatus::Hit,
            format::hit(&source.label, text),
        )),
    }
}

async fn resolve_polygon(
    source: &SourceConfig,
    polygon: &PolygonSource,
    point: GeoPoint,
    resolver: &NearestFeatureResolver,
) -> Result<Finding, LookupError> {
    let service = polygon.service.as_ref();

    if let Some(feature) = service.query_contains(point).await? {
        let value = match &polygon.template {
            Some(template) => template.render(&feature),
            None => feature.label(&polygon.contains_field),
        };
        return Ok(Finding::new(
            &source.id,
            FindingStatus::Hit,
            format::hit(&source.label, &value),
        ));
    }

    let note = polygon.note.as_deref();
    match resolver
        .resolve(service, point, &polygon.contains_field)
        .await?
    {
        NearestResolution::Found(nearest) => {
            let text =
                format::nearest_polygon(&source.label, &nearest.label, nearest.distance_miles());
            Ok(Finding::new(
                &source.id,
                FindingStatus::NearestFallback,
                format::with_note(text, note),
            )
            .with_distance_km(nearest.distance_km))
        }
        NearestResolution::NoCandidates => Ok(Finding::new(
            &source.id,
            FindingStatus::Empty,
            format::with_note(format::no_nearby_zones(&source.label), note),
        )),
        NearestResolution::Unmeasurable { candidates } => {
            Err(LookupError::NoGeometrySupport(candidates))
        }
    }
}

async fn resolve_raster(
    source: &SourceConfig,
    raster: &RasterSource,
    point: GeoPoint,
    probe: &RingProbe,
) -> Result<Finding, LookupError> {
    let service = raster.service.as_ref();
    let unit = raster.unit.as_deref();

    if let Some(value) = service.identify_at(point, probe.tolerance_cells).await? {
        return Ok(Finding::new(
            &source.id,
            FindingStatus::RasterHit,
            format::hit(&source.label, &raster.classifier.classify(&value, unit)),
        ));
    }

    match probe.probe(service, point).await? {
        Some(hit) => {
            let label = raster.classifier.classify(&hit.value, unit);
            Ok(Finding::new(
                &source.id,
                FindingStatus::RasterNearestFallback,
                format::nearest_raster(&source.label, &label, hit.distance_km, hit.bearing_deg),
            )
            .with_distance_km(hit.distance_km))
        }
        None => Ok(Finding::new(
            &source.id,
            FindingStatus::Empty,
            format::no_mapped_value(&source.label),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::destination;
    use crate::geometry::{Attributes, Feature, Geometry};
    use crate::provider::{
        MemoryFeatureService, MemoryRasterService, PanickingService, RasterValue, StalledService,
    };
    use crate::report::{Classifier, MessageTemplate};
    use geo::polygon;
    use std::sync::Arc;

    fn fire_zone() -> Feature {
        let p = polygon![
            (x: -121.0, y: 38.0),
            (x: -120.0, y: 38.0),
            (x: -120.0, y: 39.0),
            (x: -121.0, y: 39.0),
            (x: -121.0, y: 38.0),
        ];
        Feature::new(Geometry::Polygon(p), Attributes::new())
            .with_attribute("FHSZ_Description", "Very High")
    }

    fn fire_source() -> SourceConfig {
        SourceConfig::polygon(
            "fire",
            "Fire Hazard Zone",
            Arc::new(MemoryFeatureService::new("fire", vec![fire_zone()])),
            "FHSZ_Description",
        )
        .with_note("Designated by CAL FIRE.")
    }

    #[tokio::test]
    async fn test_polygon_hit() {
        let point = GeoPoint::new(38.5, -120.5);
        let finding = lookup(&fire_source(), point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Hit);
        assert_eq!(finding.text, "Fire Hazard Zone: Very High");
        assert_eq!(finding.distance_km, None);
    }

    #[tokio::test]
    async fn test_polygon_hit_uses_template() {
        let source = fire_source().with_template(
            MessageTemplate::parse("within a {FHSZ_Description} zone").unwrap(),
        );
        let point = GeoPoint::new(38.5, -120.5);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.text, "Fire Hazard Zone: within a Very High zone");
    }

    #[tokio::test]
    async fn test_polygon_nearest_fallback_carries_note() {
        let point = destination(GeoPoint::new(38.5, -120.0), 5.0, 90.0);
        let finding = lookup(&fire_source(), point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::NearestFallback);
        assert!(finding
            .text
            .starts_with("Nearest Fire Hazard Zone: Very High\nDistance: "));
        assert!(finding.text.ends_with("\nNote: Designated by CAL FIRE."));
        let km = finding.distance_km.unwrap();
        assert!((km - 5.0).abs() < 0.05, "got {}", km);
    }

    #[tokio::test]
    async fn test_polygon_no_candidates_is_empty() {
        let point = GeoPoint::new(0.0, 0.0);
        let finding = lookup(&fire_source(), point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Empty);
        assert_eq!(
            finding.text,
            "Fire Hazard Zone: No nearby zones\nNote: Designated by CAL FIRE."
        );
    }

    #[tokio::test]
    async fn test_unmeasurable_candidates_is_error() {
        let odd = Feature::new(
            Geometry::Unsupported("Point".to_string()),
            Attributes::new(),
        );
        let source = SourceConfig::polygon(
            "schools",
            "School",
            Arc::new(MemoryFeatureService::new("schools", vec![odd])),
            "NAME",
        );
        let point = GeoPoint::new(0.0, 0.0);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Error);
        assert_eq!(finding.text, "School: Unable to measure distance");
    }

    #[tokio::test]
    async fn test_network_error_is_error_finding() {
        let source = SourceConfig::polygon(
            "flood",
            "Flood Hazard Zone",
            Arc::new(MemoryFeatureService::failing(
                "flood",
                ServiceError::HttpError("HTTP 503".to_string()),
            )),
            "ESRI_SYMBOLOGY",
        );
        let point = GeoPoint::new(0.0, 0.0);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Error);
        assert_eq!(
            finding.text,
            "Flood Hazard Zone: Error (HTTP error: HTTP 503)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_error_finding() {
        let source = SourceConfig::polygon(
            "slow",
            "Slow Layer",
            Arc::new(StalledService::new("slow")),
            "X",
        );
        let settings = AggregatorSettings {
            source_timeout: Some(Duration::from_secs(5)),
            ..AggregatorSettings::default()
        };
        let finding = lookup(&source, GeoPoint::new(0.0, 0.0), &settings).await;
        assert_eq!(finding.status, FindingStatus::Error);
        assert_eq!(finding.text, "Slow Layer: Error (timed out after 5s)");
    }

    #[tokio::test]
    async fn test_panicking_service_is_error_finding() {
        let source = SourceConfig::polygon(
            "fire",
            "Fire Hazard Zone",
            Arc::new(PanickingService::new("fire")),
            "FHSZ_Description",
        );
        let point = GeoPoint::new(38.5, -120.5);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Error);
        assert_eq!(
            finding.text,
            "Fire Hazard Zone: Error (lookup panicked: fire crashed in query_contains)"
        );
    }

    #[tokio::test]
    async fn test_panicking_raster_without_timeout_is_error_finding() {
        let source = SourceConfig::raster(
            "shaking",
            "Shaking Potential",
            Arc::new(PanickingService::new("shaking")),
            Classifier::Passthrough,
        );
        let settings = AggregatorSettings {
            source_timeout: None,
            ..AggregatorSettings::default()
        };
        let finding = lookup(&source, GeoPoint::new(0.0, 0.0), &settings).await;
        assert_eq!(finding.status, FindingStatus::Error);
        assert!(
            finding.text.contains("lookup panicked"),
            "got {}",
            finding.text
        );
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(42)), "unknown cause");
    }

    #[tokio::test]
    async fn test_raster_hit_is_classified() {
        let source = SourceConfig::raster(
            "shaking",
            "Shaking Potential",
            Arc::new(MemoryRasterService::new("shaking", |_| {
                Some(RasterValue::Number(95.0))
            })),
            "thresholds: 90=Very High; 50=High".parse::<Classifier>().unwrap(),
        );
        let point = GeoPoint::new(37.0, -122.0);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::RasterHit);
        assert_eq!(finding.text, "Shaking Potential: Very High");
    }

    #[tokio::test]
    async fn test_raster_ring_fallback() {
        let origin = GeoPoint::new(37.0, -122.0);
        let source = SourceConfig::raster(
            "landslide",
            "Landslide Susceptibility",
            Arc::new(MemoryRasterService::with_points(
                "landslide",
                vec![(destination(origin, 4.0, 90.0), RasterValue::Number(8.0))],
                0.01,
            )),
            Classifier::Passthrough,
        );
        let finding = lookup(&source, origin, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::RasterNearestFallback);
        assert_eq!(finding.distance_km, Some(4.0));
        assert_eq!(
            finding.text,
            "Nearest Landslide Susceptibility: 8\nNearest value at 4.00 km E"
        );
    }

    #[tokio::test]
    async fn test_raster_nothing_nearby() {
        let source = SourceConfig::raster(
            "landslide",
            "Landslide Susceptibility",
            Arc::new(MemoryRasterService::new("landslide", |_| None)),
            Classifier::Passthrough,
        );
        let point = GeoPoint::new(0.0, 0.0);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Empty);
        assert_eq!(
            finding.text,
            "Landslide Susceptibility: No mapped value nearby"
        );
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = SourceConfig::fixed("shaking", "Shaking Potential", "Visual only");
        let point = GeoPoint::new(0.0, 0.0);
        let finding = lookup(&source, point, &AggregatorSettings::default()).await;
        assert_eq!(finding.status, FindingStatus::Hit);
        assert_eq!(finding.text, "Shaking Potential: Visual only");
    }

    #[test]
    fn test_service_error_mapping() {
        assert_eq!(
            LookupError::from(ServiceError::MalformedResponse("bad".to_string())),
            LookupError::MalformedResponse("bad".to_string())
        );
        let e = LookupError::from(ServiceError::Remote {
            code: 400,
            message: "Invalid query".to_string(),
        });
        assert_eq!(e.kind(), "network");
        assert_eq!(e.to_string(), "Service error 400: Invalid query");
    }
}
