//! Spatial store: the collaborator that executes a [`SpatialQuery`].
//!
//! Stores return raw rows with geometry still hex-encoded; decoding happens
//! in the repositories so that a corrupt row fails the whole page.

mod distance;
#[cfg(test)]
pub(crate) mod fixtures;
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::{Entity, SpatialQuery};

pub use distance::{haversine_distance, min_distance_to_geometry};
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("expected a {expected} query, got {found}")]
    EntityMismatch { expected: Entity, found: Entity },

    #[error("{entity} queries cannot filter on {filter}")]
    UnsupportedFilter { entity: Entity, filter: String },

    #[error("failed to read fixtures: {0}")]
    FixtureIo(#[from] std::io::Error),

    #[error("failed to parse fixtures: {0}")]
    FixtureFormat(#[from] serde_json::Error),
}

/// A row of the `pois` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PoiRow {
    pub osm_id: String,
    /// Hex-encoded EWKB
    pub geometry: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub name: Option<String>,
    pub address: Option<serde_json::Value>,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub price_range: Option<i32>,
    pub website: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub is_24_7: Option<bool>,
    pub formatted_address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A row of the `zones` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ZoneRow {
    pub osm_id: String,
    /// Hex-encoded EWKB
    pub geometry: String,
    pub name: String,
    pub malagasy_name: Option<String>,
    pub iso_code: Option<String>,
    pub population: Option<i64>,
    pub tags: Option<serde_json::Value>,
    pub area: Option<f64>,
    /// Hex-encoded EWKB
    pub centroid: Option<String>,
    pub zone_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read-only access to the persisted POI and zone row sets.
///
/// Each call is one round-trip. Implementations honour the query's filters,
/// its keyset position (`osm_id > after`), its ordering with the `osm_id`
/// tie-break, and its row limit. Errors are returned, never retried.
#[async_trait]
pub trait SpatialStore: Send + Sync {
    async fn fetch_pois(&self, query: &SpatialQuery) -> Result<Vec<PoiRow>, StoreError>;

    async fn fetch_zones(&self, query: &SpatialQuery) -> Result<Vec<ZoneRow>, StoreError>;

    /// Check the store is reachable
    async fn health_check(&self) -> bool {
        true
    }
}
