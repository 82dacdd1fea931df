//! Decoded geometry values, serialized as GeoJSON.

use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

/// A single `[longitude, latitude]` pair
pub type Position = [f64; 2];

/// Discriminant of a [`Geometry`] value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        };
        f.write_str(name)
    }
}

/// Geometry decoded from the store, tagged by `type` like GeoJSON.
///
/// Polygon rings are closed and hold at least four positions; the decoder
/// refuses anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPoint { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lng, lat],
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
            Geometry::MultiPoint { .. } => GeometryKind::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryKind::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryKind::GeometryCollection,
        }
    }

    /// Convert into a `geo` geometry for spatial predicates
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Geometry::Point { coordinates } => Point::from(coord(coordinates)).into(),
            Geometry::LineString { coordinates } => line_string(coordinates).into(),
            Geometry::Polygon { coordinates } => polygon(coordinates).into(),
            Geometry::MultiPoint { coordinates } => {
                MultiPoint::new(coordinates.iter().map(|p| Point::from(coord(p))).collect())
                    .into()
            }
            Geometry::MultiLineString { coordinates } => {
                MultiLineString::new(coordinates.iter().map(|l| line_string(l)).collect()).into()
            }
            Geometry::MultiPolygon { coordinates } => {
                MultiPolygon::new(coordinates.iter().map(|p| polygon(p)).collect()).into()
            }
            Geometry::GeometryCollection { geometries } => geo::Geometry::GeometryCollection(
                geometries.iter().map(Geometry::to_geo).collect(),
            ),
        }
    }
}

fn coord(position: &Position) -> Coord<f64> {
    Coord {
        x: position[0],
        y: position[1],
    }
}

fn line_string(positions: &[Position]) -> LineString<f64> {
    LineString::new(positions.iter().map(coord).collect())
}

fn polygon(rings: &[Vec<Position>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(|r| line_string(r));
    let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
    Polygon::new(exterior, rings.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    fn square() -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 1.0],
                [0.0, 0.0],
            ]],
        }
    }

    #[test]
    fn test_serializes_as_geojson() {
        let json = serde_json::to_value(Geometry::point(47.5, -18.9)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [47.5, -18.9]})
        );

        let collection = Geometry::GeometryCollection {
            geometries: vec![Geometry::point(1.0, 2.0)],
        };
        let json = serde_json::to_value(collection).unwrap();
        assert_eq!(json["type"], "GeometryCollection");
        assert_eq!(json["geometries"][0]["coordinates"][1], 2.0);
    }

    #[test]
    fn test_kind() {
        assert_eq!(square().kind(), GeometryKind::Polygon);
        assert_eq!(GeometryKind::MultiPolygon.to_string(), "MultiPolygon");
    }

    #[test]
    fn test_polygon_to_geo_contains_point() {
        let shape = square().to_geo();
        assert!(shape.contains(&Point::new(0.5, 0.5)));
        assert!(!shape.contains(&Point::new(1.5, 0.5)));
    }
}
