//! PostGIS-backed store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, warn};

use super::{PoiRow, SpatialStore, StoreError, ZoneRow};
use crate::query::{sql, Entity, SpatialQuery};

/// Connection pool wrapper executing rendered queries
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool against `url`
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn ensure_entity(query: &SpatialQuery, expected: Entity) -> Result<(), StoreError> {
    if query.entity() == expected {
        Ok(())
    } else {
        Err(StoreError::EntityMismatch {
            expected,
            found: query.entity(),
        })
    }
}

#[async_trait]
impl SpatialStore for PgStore {
    async fn fetch_pois(&self, query: &SpatialQuery) -> Result<Vec<PoiRow>, StoreError> {
        ensure_entity(query, Entity::Pois)?;
        let mut qb = sql::render(query)?;
        debug!("{}", qb.sql());

        let rows = qb.build_query_as::<PoiRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn fetch_zones(&self, query: &SpatialQuery) -> Result<Vec<ZoneRow>, StoreError> {
        ensure_entity(query, Entity::Zones)?;
        let mut qb = sql::render(query)?;
        debug!("{}", qb.sql());

        let rows = qb.build_query_as::<ZoneRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        }
    }
}
