//! Per-source report entries.

use std::fmt;

use crate::coord::km_to_miles;

/// How a source's lookup resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingStatus {
    /// The point lies inside a polygon (static sources also report this)
    Hit,
    /// Outside every polygon; nearest polygon reported instead
    NearestFallback,
    /// Raster value sampled directly at the point
    RasterHit,
    /// Raster value found by the ring probe
    RasterNearestFallback,
    /// Nothing found at or near the point
    Empty,
    /// The lookup failed; the text carries the reason
    Error,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Hit => "hit",
            FindingStatus::NearestFallback => "nearest",
            FindingStatus::RasterHit => "raster_hit",
            FindingStatus::RasterNearestFallback => "raster_nearest",
            FindingStatus::Empty => "empty",
            FindingStatus::Error => "error",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            FindingStatus::NearestFallback | FindingStatus::RasterNearestFallback
        )
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source's contribution to a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub source_id: String,
    pub status: FindingStatus,
    /// Display text, ready for the report
    pub text: String,
    /// Distance to the fallback match, when one was used
    pub distance_km: Option<f64>,
}

impl Finding {
    pub fn new(
        source_id: impl Into<String>,
        status: FindingStatus,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            status,
            text: text.into(),
            distance_km: None,
        }
    }

    pub fn with_distance_km(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    pub fn distance_miles(&self) -> Option<f64> {
        self.distance_km.map(km_to_miles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::round2;

    #[test]
    fn test_distance_miles() {
        let finding =
            Finding::new("flood", FindingStatus::NearestFallback, "x").with_distance_km(2.0);
        assert_eq!(finding.distance_miles().map(round2), Some(1.24));

        let finding = Finding::new("fire", FindingStatus::Hit, "x");
        assert_eq!(finding.distance_miles(), None);
    }

    #[test]
    fn test_status_names() {
        assert_eq!(
            FindingStatus::RasterNearestFallback.to_string(),
            "raster_nearest"
        );
        assert!(FindingStatus::NearestFallback.is_fallback());
        assert!(!FindingStatus::Empty.is_fallback());
    }
}
