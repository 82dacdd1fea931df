//! Zone lookups, listings and point containment.

use std::sync::Arc;

use tracing::debug;

use super::{decode_all, decode_page};
use crate::error::QueryError;
use crate::models::{GeoPoint, Zone};
use crate::pagination::{CursorPage, CursorPaginationParams};
use crate::query::{Filter, Order, SpatialQuery};
use crate::store::SpatialStore;

pub struct ZoneRepository<S: SpatialStore + ?Sized> {
    store: Arc<S>,
}

impl<S: SpatialStore + ?Sized> Clone for ZoneRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SpatialStore + ?Sized> ZoneRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, osm_id: &str) -> Result<Option<Zone>, QueryError> {
        let query = SpatialQuery::zones()
            .filter(Filter::OsmId(osm_id.to_string()))
            .limit(1);
        let rows = self.store.fetch_zones(&query).await?;
        Ok(decode_all::<_, Zone>(rows)?.into_iter().next())
    }

    pub async fn find_all(&self, params: &CursorPaginationParams) -> Result<CursorPage<Zone>, QueryError> {
        self.page(SpatialQuery::zones(), params).await
    }

    /// Zones of one type (region, district, commune, ...)
    pub async fn find_by_type(
        &self,
        zone_type: &str,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Zone>, QueryError> {
        let query = SpatialQuery::zones().filter(Filter::ZoneType(zone_type.to_string()));
        self.page(query, params).await
    }

    /// Every zone containing `point`, smallest area first.
    ///
    /// Not paginated. Zones with unknown area come last; equal areas are
    /// ordered by identifier.
    pub async fn find_containing(&self, point: GeoPoint) -> Result<Vec<Zone>, QueryError> {
        let query = SpatialQuery::zones()
            .filter(Filter::ContainsPoint(point))
            .order_by(Order::AreaAscending);
        let rows = self.store.fetch_zones(&query).await?;
        debug!(
            "{} zones contain ({}, {})",
            rows.len(),
            point.lat,
            point.lng
        );
        decode_all(rows)
    }

    async fn page(
        &self,
        query: SpatialQuery,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Zone>, QueryError> {
        let query = query.paginate(params)?;
        debug!(
            "Fetching zones: {} filters, limit {:?}",
            query.filters().len(),
            query.row_limit()
        );
        let rows = self.store.fetch_zones(&query).await?;
        decode_page(rows, params)
    }
}
