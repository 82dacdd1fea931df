//! Administrative zone (region, district, commune, ...).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{attributes, Attributes, Geometry};
use crate::pagination::Keyed;
use crate::store::ZoneRow;
use crate::wkb::{self, GeometryError};

/// Read-only administrative zone, built only from a persisted row.
///
/// The centroid is expected to lie within or near `geometry`; this is
/// upheld by the data source and not checked here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub osm_id: String,
    pub geometry: Geometry,
    pub name: String,
    pub malagasy_name: Option<String>,
    pub iso_code: Option<String>,
    pub population: Option<i64>,
    pub tags: Option<Attributes>,
    /// Surface area, used to order nested zones smallest first
    pub area: Option<f64>,
    pub centroid: Option<Geometry>,
    pub zone_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Keyed for Zone {
    fn osm_id(&self) -> &str {
        &self.osm_id
    }
}

impl TryFrom<ZoneRow> for Zone {
    type Error = GeometryError;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        let geometry = wkb::decode_hex(&row.geometry)?;
        let centroid = row.centroid.as_deref().map(wkb::decode_hex).transpose()?;

        Ok(Self {
            tags: attributes(row.tags, "tags", &row.osm_id),
            osm_id: row.osm_id,
            geometry,
            name: row.name,
            malagasy_name: row.malagasy_name,
            iso_code: row.iso_code,
            population: row.population,
            area: row.area,
            centroid,
            zone_type: row.zone_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "01030000000100000005000000000000000000000000000000000000000000000000000000000000000000F03F000000000000F03F000000000000F03F000000000000F03F000000000000000000000000000000000000000000000000";

    fn row() -> ZoneRow {
        ZoneRow {
            osm_id: "relation/7".to_string(),
            geometry: SQUARE.to_string(),
            name: "Analamanga".to_string(),
            malagasy_name: Some("Faritra Analamanga".to_string()),
            iso_code: Some("MG-T".to_string()),
            population: Some(3_618_128),
            tags: None,
            area: Some(16_911.0),
            centroid: Some("0101000000000000000000E03F000000000000E03F".to_string()),
            zone_type: "region".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_from_row_decodes_centroid() {
        let zone = Zone::try_from(row()).unwrap();
        assert_eq!(zone.centroid, Some(Geometry::point(0.5, 0.5)));
        assert!(matches!(zone.geometry, Geometry::Polygon { .. }));
        assert!(zone.tags.is_none());
    }

    #[test]
    fn test_missing_centroid() {
        let mut row = row();
        row.centroid = None;
        assert_eq!(Zone::try_from(row).unwrap().centroid, None);
    }

    #[test]
    fn test_malformed_centroid_is_an_error() {
        let mut row = row();
        row.centroid = Some("01".to_string());
        assert!(matches!(
            Zone::try_from(row),
            Err(GeometryError::Truncated { .. })
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Zone::try_from(row()).unwrap()).unwrap();
        assert_eq!(json["malagasyName"], "Faritra Analamanga");
        assert_eq!(json["zoneType"], "region");
        assert_eq!(json["centroid"]["type"], "Point");
    }
}
