//! Coordinate type definitions

use std::fmt;

use thiserror::Error;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius used by all great-circle math.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fixed kilometre to statute mile conversion used in report text.
pub const KM_TO_MILES: f64 = 0.621371;

/// A geographic position in decimal degrees (WGS84).
///
/// Used for clicked locations, probe positions and polygon vertices alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point without range validation.
    ///
    /// Prefer [`GeoPoint::try_new`] for values coming from user input.
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Creates a point, rejecting latitudes outside [-90, 90] and
    /// longitudes outside [-180, 180] (NaN is rejected as well).
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Returns the point mirrored about the prime meridian.
    #[inline]
    pub fn mirrored(&self) -> Self {
        Self {
            lat: self.lat,
            lon: -self.lon,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {:.5}, Lng: {:.5}", self.lat, self.lon)
    }
}

impl From<geo::Coord<f64>> for GeoPoint {
    /// Converts an `x = lon, y = lat` coordinate.
    fn from(c: geo::Coord<f64>) -> Self {
        Self { lat: c.y, lon: c.x }
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Coord { x: p.lon, y: p.lat }
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

/// Errors that can occur when validating coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside valid range (-90 to 90)
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180 to 180)
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),
}
