//! Concentric ring sampling of a raster.

use tracing::{debug, trace};

use crate::coord::{destination, GeoPoint};
use crate::provider::{RasterService, RasterValue, ServiceError};

/// A value found by [`RingProbe`].
#[derive(Debug, Clone, PartialEq)]
pub struct RingHit {
    pub value: RasterValue,
    /// Radius of the ring the value was found on
    pub distance_km: f64,
    /// Location of the successful sample
    pub at: GeoPoint,
    pub bearing_deg: f64,
}

/// Searches outward from a point for the nearest ring holding a raster value.
///
/// Rings are visited from the innermost outward; within a ring, bearings are
/// visited clockwise from north. The first sample with a value wins, so the
/// result is the nearest ring, not the nearest sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingProbe {
    pub directions: u32,
    pub step_km: f64,
    pub max_km: f64,
    /// Identify tolerance passed to every sample
    pub tolerance_cells: u32,
}

impl Default for RingProbe {
    fn default() -> Self {
        Self {
            directions: 8,
            step_km: 2.0,
            max_km: 14.0,
            tolerance_cells: 2,
        }
    }
}

impl RingProbe {
    /// Ring radii in probe order.
    pub fn radii(&self) -> Vec<f64> {
        if !(self.step_km > 0.0) || !(self.max_km >= self.step_km) {
            return Vec::new();
        }
        let rings = (self.max_km / self.step_km + 1e-9).floor() as u32;
        (1..=rings).map(|i| self.step_km * i as f64).collect()
    }

    /// Bearings in degrees, evenly spaced from 0°.
    pub fn bearings(&self) -> Vec<f64> {
        let spacing = 360.0 / self.directions as f64;
        (0..self.directions).map(|i| spacing * i as f64).collect()
    }

    /// Probes `service` ring by ring until a sample has a value.
    ///
    /// Samples are issued one at a time. A service error aborts the probe.
    pub async fn probe(
        &self,
        service: &dyn RasterService,
        point: GeoPoint,
    ) -> Result<Option<RingHit>, ServiceError> {
        let bearings = self.bearings();

        for distance_km in self.radii() {
            for &bearing_deg in &bearings {
                let at = destination(point, distance_km, bearing_deg);
                trace!(
                    service = service.name(),
                    distance_km,
                    bearing_deg,
                    "Ring sample"
                );

                if let Some(value) = service.identify_at(at, self.tolerance_cells).await? {
                    debug!(
                        service = service.name(),
                        distance_km,
                        bearing_deg,
                        "Ring probe found value"
                    );
                    return Ok(Some(RingHit {
                        value,
                        distance_km,
                        at,
                        bearing_deg,
                    }));
                }
            }
        }

        debug!(
            service = service.name(),
            max_km = self.max_km,
            "Ring probe exhausted"
        );
        Ok(None)
    }
}
