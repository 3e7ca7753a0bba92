//! Nearest polygon by edge distance.

use tracing::debug;

use crate::coord::{km_to_miles, GeoPoint};
use crate::geometry::{edge_distance_km, Feature};
use crate::provider::{FeatureService, ServiceError};

/// Default search radius: 50 miles.
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 80_467.0;

/// The closest candidate found by [`NearestFeatureResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct NearestFeature {
    pub feature: Feature,
    /// Value of the requested label field (`"unknown"` if absent)
    pub label: String,
    /// Unrounded edge distance
    pub distance_km: f64,
}

impl NearestFeature {
    pub fn distance_miles(&self) -> f64 {
        km_to_miles(self.distance_km)
    }
}

/// Outcome of a nearest-feature search.
#[derive(Debug, Clone, PartialEq)]
pub enum NearestResolution {
    /// A candidate with a measurable edge distance
    Found(NearestFeature),
    /// The range query returned nothing
    NoCandidates,
    /// Candidates exist but none has a measurable geometry
    Unmeasurable { candidates: usize },
}

impl NearestResolution {
    /// The nearest feature, if one was found.
    pub fn nearest(self) -> Option<NearestFeature> {
        match self {
            NearestResolution::Found(nearest) => Some(nearest),
            _ => None,
        }
    }
}

/// Picks the candidate polygon whose boundary is closest to a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestFeatureResolver {
    radius_m: f64,
}

impl Default for NearestFeatureResolver {
    fn default() -> Self {
        Self::new(DEFAULT_NEARBY_RADIUS_M)
    }
}

impl NearestFeatureResolver {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Queries candidates within the radius and returns the closest one.
    ///
    /// Candidates are measured to their polygon edge; those with an
    /// unsupported geometry are skipped. On equal distances the candidate
    /// returned first by the service wins.
    pub async fn resolve(
        &self,
        service: &dyn FeatureService,
        point: GeoPoint,
        label_field: &str,
    ) -> Result<NearestResolution, ServiceError> {
        let candidates = service.query_nearby(point, self.radius_m).await?;
        let resolution = pick_nearest(point, candidates, label_field);

        debug!(
            service = service.name(),
            resolution = ?resolution_kind(&resolution),
            "Nearest feature resolved"
        );
        Ok(resolution)
    }
}

/// Chooses the closest measurable candidate. Strict comparison keeps the
/// first-seen candidate on ties.
pub(crate) fn pick_nearest(
    point: GeoPoint,
    candidates: Vec<Feature>,
    label_field: &str,
) -> NearestResolution {
    if candidates.is_empty() {
        return NearestResolution::NoCandidates;
    }

    let count = candidates.len();
    let mut best: Option<(Feature, f64)> = None;

    for candidate in candidates {
        let Some(distance) = edge_distance_km(point, &candidate.geometry) else {
            continue;
        };
        let closer = match &best {
            Some((_, best_distance)) => distance < *best_distance,
            None => true,
        };
        if closer {
            best = Some((candidate, distance));
        }
    }

    match best {
        Some((feature, distance_km)) => NearestResolution::Found(NearestFeature {
            label: feature.label(label_field),
            feature,
            distance_km,
        }),
        None => NearestResolution::Unmeasurable { candidates: count },
    }
}

fn resolution_kind(resolution: &NearestResolution) -> &'static str {
    match resolution {
        NearestResolution::Found(_) => "found",
        NearestResolution::NoCandidates => "no_candidates",
        NearestResolution::Unmeasurable { .. } => "unmeasurable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::round2;
    use crate::geometry::{Attributes, Geometry};
    use crate::provider::MemoryFeatureService;
    use geo::polygon;

    /// Kilometres per degree along a great circle.
    const KM_PER_DEG: f64 = 111.19492664455873;

    /// Square west of the prime meridian whose east edge sits at `east_lon`.
    fn zone(name: &str, east_lon: f64) -> Feature {
        let p = polygon![
            (x: east_lon - 1.0, y: -0.5),
            (x: east_lon, y: -0.5),
            (x: east_lon, y: 0.5),
            (x: east_lon - 1.0, y: 0.5),
            (x: east_lon - 1.0, y: -0.5),
        ];
        Feature::new(Geometry::Polygon(p), Attributes::new()).with_attribute("ZONE", name)
    }

    #[test]
    fn test_picks_closest_edge() {
        let point = GeoPoint::new(0.0, 0.0);
        let candidates = vec![zone("far", -0.3), zone("near", -0.1), zone("mid", -0.2)];
        let nearest = pick_nearest(point, candidates, "ZONE").nearest().unwrap();
        assert_eq!(nearest.label, "near");
        assert!((nearest.distance_km - 0.1 * KM_PER_DEG).abs() < 1e-6);
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let point = GeoPoint::new(0.0, 0.0);
        let candidates = vec![zone("first", -0.1), zone("second", -0.1)];
        let nearest = pick_nearest(point, candidates, "ZONE").nearest().unwrap();
        assert_eq!(nearest.label, "first");
    }

    #[test]
    fn test_unsupported_candidates_are_skipped() {
        let point = GeoPoint::new(0.0, 0.0);
        let odd = Feature::new(
            Geometry::Unsupported("Point".to_string()),
            Attributes::new(),
        )
        .with_attribute("ZONE", "odd");
        let candidates = vec![odd, zone("real", -0.2)];
        let nearest = pick_nearest(point, candidates, "ZONE").nearest().unwrap();
        assert_eq!(nearest.label, "real");
    }

    #[test]
    fn test_only_unsupported_candidates_is_unmeasurable() {
        let point = GeoPoint::new(0.0, 0.0);
        let odd = Feature::new(
            Geometry::Unsupported("LineString".to_string()),
            Attributes::new(),
        );
        assert_eq!(
            pick_nearest(point, vec![odd.clone(), odd], "ZONE"),
            NearestResolution::Unmeasurable { candidates: 2 }
        );
    }

    #[test]
    fn test_no_candidates() {
        let resolution = pick_nearest(GeoPoint::new(0.0, 0.0), Vec::new(), "ZONE");
        assert_eq!(resolution, NearestResolution::NoCandidates);
        assert!(resolution.nearest().is_none());
    }

    #[test]
    fn test_missing_label_field_is_unknown() {
        let nearest = pick_nearest(GeoPoint::new(0.0, 0.0), vec![zone("a", -0.1)], "OTHER")
            .nearest()
            .unwrap();
        assert_eq!(nearest.label, "unknown");
    }

    #[tokio::test]
    async fn test_resolve_against_service() {
        // Edge 2 km west of the point
        let offset_deg = 2.0 / KM_PER_DEG;
        let service = MemoryFeatureService::new("flood", vec![zone("AE", -offset_deg)]);
        let resolver = NearestFeatureResolver::default();

        let nearest = resolver
            .resolve(&service, GeoPoint::new(0.0, 0.0), "ZONE")
            .await
            .unwrap()
            .nearest()
            .unwrap();
        assert_eq!(nearest.label, "AE");
        assert!((nearest.distance_km - 2.0).abs() < 1e-6);
        assert_eq!(round2(nearest.distance_miles()), 1.24);
    }

    #[tokio::test]
    async fn test_resolve_outside_radius() {
        let service = MemoryFeatureService::new("flood", vec![zone("AE", -2.0)]);
        let resolver = NearestFeatureResolver::new(1_000.0);
        let resolution = resolver
            .resolve(&service, GeoPoint::new(0.0, 0.0), "ZONE")
            .await
            .unwrap();
        assert_eq!(resolution, NearestResolution::NoCandidates);
    }

    #[tokio::test]
    async fn test_resolve_propagates_errors() {
        let service =
            MemoryFeatureService::failing("flood", ServiceError::HttpError("down".to_string()));
        let result = NearestFeatureResolver::default()
            .resolve(&service, GeoPoint::new(0.0, 0.0), "ZONE")
            .await;
        assert!(result.is_err());
    }
}
