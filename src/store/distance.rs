//! Great-circle distances for in-process evaluation.

use geo::{Contains, Coord, Geometry, LineString, Point, Polygon};

use crate::models::GeoPoint;

const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance between two points in meters
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Minimum distance in meters from `point` to any part of `geometry`.
///
/// Zero when a polygon contains the point. Segments are approximated by
/// projecting in lng/lat space, which is accurate at city scale.
pub fn min_distance_to_geometry(point: GeoPoint, geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Point(p) => haversine_distance(point, to_geo_point(p.0)),
        Geometry::MultiPoint(mp) => mp
            .iter()
            .map(|p| haversine_distance(point, to_geo_point(p.0)))
            .fold(f64::INFINITY, f64::min),
        Geometry::Line(line) => distance_to_segment(point, line.start, line.end),
        Geometry::LineString(ls) => distance_to_line_string(point, ls),
        Geometry::MultiLineString(mls) => mls
            .iter()
            .map(|ls| distance_to_line_string(point, ls))
            .fold(f64::INFINITY, f64::min),
        Geometry::Polygon(poly) => distance_to_polygon(point, poly),
        Geometry::MultiPolygon(mp) => mp
            .iter()
            .map(|poly| distance_to_polygon(point, poly))
            .fold(f64::INFINITY, f64::min),
        Geometry::GeometryCollection(gc) => gc
            .iter()
            .map(|g| min_distance_to_geometry(point, g))
            .fold(f64::INFINITY, f64::min),
        Geometry::Rect(rect) => distance_to_polygon(point, &rect.to_polygon()),
        Geometry::Triangle(tri) => distance_to_polygon(point, &tri.to_polygon()),
    }
}

fn to_geo_point(c: Coord<f64>) -> GeoPoint {
    GeoPoint::new(c.y, c.x)
}

fn distance_to_polygon(point: GeoPoint, poly: &Polygon<f64>) -> f64 {
    if poly.contains(&Point::new(point.lng, point.lat)) {
        return 0.0;
    }
    // Outside, or inside a hole: nearest boundary of any ring
    poly.interiors()
        .iter()
        .map(|ring| distance_to_line_string(point, ring))
        .fold(distance_to_line_string(point, poly.exterior()), f64::min)
}

fn distance_to_line_string(point: GeoPoint, ls: &LineString<f64>) -> f64 {
    match ls.0.as_slice() {
        [] => f64::INFINITY,
        [only] => haversine_distance(point, to_geo_point(*only)),
        coords => coords
            .windows(2)
            .map(|w| distance_to_segment(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

fn distance_to_segment(point: GeoPoint, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    if dx == 0.0 && dy == 0.0 {
        return haversine_distance(point, to_geo_point(start));
    }

    let t = ((point.lng - start.x) * dx + (point.lat - start.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);

    let closest = GeoPoint::new(start.y + t * dy, start.x + t * dx);
    haversine_distance(point, closest)
}
