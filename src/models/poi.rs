//! Point of interest as served by the API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{attributes, Attributes, Geometry};
use crate::pagination::Keyed;
use crate::store::PoiRow;
use crate::wkb::{self, GeometryError};

/// Read-only point of interest, built only from a persisted row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    /// Stable OSM identifier, e.g. "node/123456"; also the keyset key
    pub osm_id: String,
    pub geometry: Geometry,
    pub category: String,
    pub subcategory: Option<String>,
    pub name: Option<String>,
    /// Structured address: street, city, postcode, country and free keys
    pub address: Option<Attributes>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub price_range: Option<i32>,
    pub website: Option<String>,
    pub tags: Option<Attributes>,
    #[serde(rename = "is247")]
    pub is_24_7: Option<bool>,
    pub formatted_address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Keyed for Poi {
    fn osm_id(&self) -> &str {
        &self.osm_id
    }
}

impl TryFrom<PoiRow> for Poi {
    type Error = GeometryError;

    fn try_from(row: PoiRow) -> Result<Self, Self::Error> {
        let geometry = wkb::decode_hex(&row.geometry)?;

        Ok(Self {
            address: attributes(row.address, "address", &row.osm_id),
            tags: attributes(row.tags, "tags", &row.osm_id),
            osm_id: row.osm_id,
            geometry,
            category: row.category,
            subcategory: row.subcategory,
            name: row.name,
            phone: row.phone,
            opening_hours: row.opening_hours,
            price_range: row.price_range,
            website: row.website,
            is_24_7: row.is_24_7,
            formatted_address: row.formatted_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
