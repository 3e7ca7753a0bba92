//! Great-circle coordinate math.
//!
//! Everything here works on a spherical Earth of radius [`EARTH_RADIUS_KM`].
//! Bearings are in degrees, 0° = north, increasing clockwise.

mod types;

pub use types::{
    CoordError, GeoPoint, EARTH_RADIUS_KM, KM_TO_MILES, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

/// Computes the point reached by travelling `distance_km` from `origin`
/// along the great circle with initial bearing `bearing_deg`.
///
/// The resulting longitude is normalized into (-180, 180]. NaN inputs
/// propagate to NaN outputs.
#[inline]
pub fn destination(origin: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint {
        lat: lat2.to_degrees(),
        lon: normalize_lon(lon2.to_degrees()),
    }
}

/// Normalizes a longitude into (-180, 180].
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Great-circle distance between two points in kilometres (haversine).
#[inline]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    angular_distance(a, b) * EARTH_RADIUS_KM
}

/// Central angle between two points in radians.
pub(crate) fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Initial bearing from `a` towards `b` in radians, in (-π, π].
pub(crate) fn initial_bearing_rad(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x)
}

/// Initial bearing from `a` towards `b` in degrees, in [0, 360).
#[inline]
pub fn initial_bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    initial_bearing_rad(a, b).to_degrees().rem_euclid(360.0)
}

/// Converts kilometres to statute miles.
#[inline]
pub fn km_to_miles(km: f64) -> f64 {
    km * KM_TO_MILES
}

/// Rounds to two decimal places for display.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
