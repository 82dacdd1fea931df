//! Row builders shared by the store, repository and router tests.

use super::{PoiRow, ZoneRow};

/// Little-endian EWKB point with SRID 4326
pub fn point_hex(lng: f64, lat: f64) -> String {
    let mut bytes = header(1);
    bytes.extend_from_slice(&lng.to_le_bytes());
    bytes.extend_from_slice(&lat.to_le_bytes());
    hex::encode(bytes)
}

/// Little-endian EWKB polygon covering the axis-aligned box
pub fn box_hex(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> String {
    let ring = [
        (min_lng, min_lat),
        (max_lng, min_lat),
        (max_lng, max_lat),
        (min_lng, max_lat),
        (min_lng, min_lat),
    ];
    let mut bytes = header(3);
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&(ring.len() as u32).to_le_bytes());
    for (x, y) in ring {
        bytes.extend_from_slice(&x.to_le_bytes());
        bytes.extend_from_slice(&y.to_le_bytes());
    }
    hex::encode(bytes)
}

fn header(kind: u32) -> Vec<u8> {
    let mut bytes = vec![1u8];
    bytes.extend_from_slice(&(kind | crate::wkb::SRID_FLAG).to_le_bytes());
    bytes.extend_from_slice(&4326u32.to_le_bytes());
    bytes
}

pub fn poi(osm_id: &str, category: &str, lng: f64, lat: f64) -> PoiRow {
    PoiRow {
        osm_id: osm_id.to_string(),
        geometry: point_hex(lng, lat),
        category: category.to_string(),
        subcategory: None,
        name: Some(format!("POI {}", osm_id)),
        address: None,
        phone: None,
        opening_hours: None,
        price_range: None,
        website: None,
        tags: None,
        is_24_7: None,
        formatted_address: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn zone(
    osm_id: &str,
    zone_type: &str,
    bounds: (f64, f64, f64, f64),
    area: Option<f64>,
) -> ZoneRow {
    let (min_lng, min_lat, max_lng, max_lat) = bounds;
    ZoneRow {
        osm_id: osm_id.to_string(),
        geometry: box_hex(min_lng, min_lat, max_lng, max_lat),
        name: format!("Zone {}", osm_id),
        malagasy_name: None,
        iso_code: None,
        population: None,
        tags: None,
        area,
        centroid: Some(point_hex((min_lng + max_lng) / 2.0, (min_lat + max_lat) / 2.0)),
        zone_type: zone_type.to_string(),
        created_at: None,
        updated_at: None,
    }
}
