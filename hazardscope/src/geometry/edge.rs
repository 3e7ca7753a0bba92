//! Distance from a point to a polygon boundary.

use geo::{LineString, Polygon};

use super::Geometry;
use crate::coord::{
    angular_distance, haversine_km, initial_bearing_rad, km_to_miles, GeoPoint, EARTH_RADIUS_KM,
};

/// Minimum great-circle distance in kilometres from `point` to the boundary
/// of `geometry`.
///
/// Polygons are reduced to their rings (exterior and holes) and each ring
/// segment is measured as a great-circle arc. Multipolygons take the minimum
/// over their members. Returns `None` for unsupported geometry types and for
/// geometries without any vertices.
///
/// Containment is irrelevant here: a point deep inside a polygon still has a
/// positive distance to its edge.
pub fn edge_distance_km(point: GeoPoint, geometry: &Geometry) -> Option<f64> {
    match geometry {
        Geometry::Polygon(polygon) => polygon_edge_distance(point, polygon),
        Geometry::MultiPolygon(multi) => multi
            .0
            .iter()
            .filter_map(|polygon| polygon_edge_distance(point, polygon))
            .reduce(f64::min),
        Geometry::Unsupported(_) => None,
    }
}

/// [`edge_distance_km`] converted to statute miles.
pub fn edge_distance_miles(point: GeoPoint, geometry: &Geometry) -> Option<f64> {
    edge_distance_km(point, geometry).map(km_to_miles)
}

fn polygon_edge_distance(point: GeoPoint, polygon: &Polygon<f64>) -> Option<f64> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .filter_map(|ring| ring_distance(point, ring))
        .reduce(f64::min)
}

fn ring_distance(point: GeoPoint, ring: &LineString<f64>) -> Option<f64> {
    match ring.0.len() {
        0 => None,
        1 => Some(haversine_km(point, ring.0[0].into())),
        _ => ring
            .lines()
            .map(|line| segment_distance_km(point, line.start.into(), line.end.into()))
            .reduce(f64::min),
    }
}

/// Great-circle distance in kilometres from `p` to the arc `a`→`b`.
///
/// Uses cross-track distance when the perpendicular foot falls inside the
/// arc and the nearer endpoint otherwise.
pub fn segment_distance_km(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let d_ab = angular_distance(a, b);
    if d_ab == 0.0 {
        return haversine_km(p, a);
    }

    let d_ap = angular_distance(a, p);
    if d_ap == 0.0 {
        return 0.0;
    }

    let delta = initial_bearing_rad(a, p) - initial_bearing_rad(a, b);
    let cross = (d_ap.sin() * delta.sin()).clamp(-1.0, 1.0).asin();

    let cos_cross = cross.cos();
    let mut along = if cos_cross.abs() < f64::EPSILON {
        0.0
    } else {
        (d_ap.cos() / cos_cross).clamp(-1.0, 1.0).acos()
    };
    // Foot of the perpendicular lies behind `a`
    if delta.cos() < 0.0 {
        along = -along;
    }

    if along <= 0.0 {
        haversine_km(p, a)
    } else if along >= d_ab {
        haversine_km(p, b)
    } else {
        cross.abs() * EARTH_RADIUS_KM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use proptest::prelude::*;

    /// Kilometres per degree along a great circle.
    const KM_PER_DEG: f64 = 111.19492664455873;

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_point_on_vertex_is_zero() {
        let g = Geometry::Polygon(unit_square());
        let d = edge_distance_km(GeoPoint::new(0.0, 0.0), &g).unwrap();
        assert!(d < 1e-9, "got {}", d);
    }

    #[test]
    fn test_point_on_edge_is_zero() {
        let g = Geometry::Polygon(unit_square());
        let d = edge_distance_km(GeoPoint::new(0.0, 0.5), &g).unwrap();
        assert!(d < 1e-9, "got {}", d);
    }

    #[test]
    fn test_point_outside_measures_to_nearest_edge() {
        // One degree south of the equatorial edge
        let g = Geometry::Polygon(unit_square());
        let d = edge_distance_km(GeoPoint::new(-1.0, 0.5), &g).unwrap();
        assert!((d - KM_PER_DEG).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_point_inside_measures_to_nearest_edge() {
        let g = Geometry::Polygon(unit_square());
        let d = edge_distance_km(GeoPoint::new(0.1, 0.5), &g).unwrap();
        assert!((d - 0.1 * KM_PER_DEG).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_point_beyond_segment_end_uses_vertex() {
        // South-west of the square: nearest boundary point is the (0,0) corner
        let g = Geometry::Polygon(unit_square());
        let p = GeoPoint::new(-1.0, -1.0);
        let d = edge_distance_km(p, &g).unwrap();
        let corner = haversine_km(p, GeoPoint::new(0.0, 0.0));
        assert!((d - corner).abs() < 1e-6, "got {} expected {}", d, corner);
    }

    #[test]
    fn test_hole_boundary_counts() {
        let with_hole = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (1.5, 1.5),
                (2.5, 1.5),
                (2.5, 2.5),
                (1.5, 2.5),
                (1.5, 1.5),
            ])],
        );
        let g = Geometry::Polygon(with_hole);
        // Centre of the hole is 0.5° from the hole edge, 2° from the exterior
        let d = edge_distance_km(GeoPoint::new(2.0, 2.0), &g).unwrap();
        assert!(d < 0.6 * KM_PER_DEG, "got {}", d);
    }

    #[test]
    fn test_multipolygon_takes_minimum() {
        let far = geo::Translate::translate(&unit_square(), 10.0, 0.0);
        let g = Geometry::MultiPolygon(MultiPolygon(vec![far, unit_square()]));
        let d = edge_distance_km(GeoPoint::new(-1.0, 0.5), &g).unwrap();
        assert!((d - KM_PER_DEG).abs() < 1e-6, "got {}", d);
    }

    #[test]
    fn test_unsupported_geometry_is_undefined() {
        let g = Geometry::Unsupported("LineString".to_string());
        assert!(edge_distance_km(GeoPoint::new(0.0, 0.0), &g).is_none());
    }

    #[test]
    fn test_empty_polygon_is_undefined() {
        let g = Geometry::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        assert!(edge_distance_km(GeoPoint::new(0.0, 0.0), &g).is_none());
    }

    #[test]
    fn test_miles_conversion() {
        let g = Geometry::Polygon(unit_square());
        let p = GeoPoint::new(-1.0, 0.5);
        let km = edge_distance_km(p, &g).unwrap();
        let mi = edge_distance_miles(p, &g).unwrap();
        assert!((mi - km * 0.621371).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_segment_measures_to_point() {
        let a = GeoPoint::new(1.0, 1.0);
        let p = GeoPoint::new(2.0, 1.0);
        assert!((segment_distance_km(p, a, a) - haversine_km(p, a)).abs() < 1e-12);
    }

    fn mirrored_polygon(polygon: &Polygon<f64>) -> Polygon<f64> {
        geo::MapCoords::map_coords(polygon, |c| geo::Coord { x: -c.x, y: c.y })
    }

    proptest! {
        #[test]
        fn prop_mirror_symmetry(
            lat in -60.0f64..60.0,
            lon in 1.0f64..120.0,
            size in 0.01f64..2.0,
            plat in -60.0f64..60.0,
            plon in 1.0f64..120.0,
        ) {
            let polygon = polygon![
                (x: lon, y: lat),
                (x: lon + size, y: lat),
                (x: lon + size, y: lat + size),
                (x: lon, y: lat + size),
                (x: lon, y: lat),
            ];
            let p = GeoPoint::new(plat, plon);
            let d = edge_distance_km(p, &Geometry::Polygon(polygon.clone())).unwrap();
            let mirrored = Geometry::Polygon(mirrored_polygon(&polygon));
            let m = edge_distance_km(p.mirrored(), &mirrored).unwrap();
            prop_assert!((d - m).abs() <= 1e-9 * d.max(1.0), "{} vs {}", d, m);
        }

        #[test]
        fn prop_points_on_edges_are_zero(
            lat in -60.0f64..60.0,
            lon in -120.0f64..120.0,
            size in 0.01f64..2.0,
            t in 0.0f64..1.0,
        ) {
            let polygon = polygon![
                (x: lon, y: lat),
                (x: lon, y: lat + size),
                (x: lon + size, y: lat + size),
                (x: lon + size, y: lat),
                (x: lon, y: lat),
            ];
            // Meridian edges are great circles, so interior points are exactly on them
            let p = GeoPoint::new(lat + t * size, lon);
            let d = edge_distance_km(p, &Geometry::Polygon(polygon)).unwrap();
            prop_assert!(d < 1e-6, "got {}", d);
        }

        #[test]
        fn prop_points_off_boundary_are_positive(
            lat in -60.0f64..60.0,
            lon in -120.0f64..120.0,
            size in 0.1f64..2.0,
        ) {
            let polygon = polygon![
                (x: lon, y: lat),
                (x: lon + size, y: lat),
                (x: lon + size, y: lat + size),
                (x: lon, y: lat + size),
                (x: lon, y: lat),
            ];
            let center = GeoPoint::new(lat + size / 2.0, lon + size / 2.0);
            let d = edge_distance_km(center, &Geometry::Polygon(polygon)).unwrap();
            prop_assert!(d > 0.0);
        }
    }
}
