//! POI lookups and listings.

use std::sync::Arc;

use tracing::debug;

use super::{decode_all, decode_page};
use crate::error::QueryError;
use crate::models::{GeoPoint, Poi, RadiusQuery};
use crate::pagination::{CursorPage, CursorPaginationParams};
use crate::query::{Filter, Order, SpatialQuery};
use crate::store::SpatialStore;

pub struct PoiRepository<S: SpatialStore + ?Sized> {
    store: Arc<S>,
}

impl<S: SpatialStore + ?Sized> Clone for PoiRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SpatialStore + ?Sized> PoiRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetch a single POI; `None` when the identifier is unknown
    pub async fn find_by_id(&self, osm_id: &str) -> Result<Option<Poi>, QueryError> {
        let query = SpatialQuery::pois()
            .filter(Filter::OsmId(osm_id.to_string()))
            .limit(1);
        let rows = self.store.fetch_pois(&query).await?;
        Ok(decode_all::<_, Poi>(rows)?.into_iter().next())
    }

    /// All POIs in identifier order
    pub async fn find_all(&self, params: &CursorPaginationParams) -> Result<CursorPage<Poi>, QueryError> {
        self.page(SpatialQuery::pois(), params).await
    }

    pub async fn find_by_category(
        &self,
        category: &str,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Poi>, QueryError> {
        let query = SpatialQuery::pois().filter(Filter::Category(category.to_string()));
        self.page(query, params).await
    }

    /// POIs by increasing distance from `point`, unbounded.
    ///
    /// The cursor only carries `osm_id`, so a later page restarts from the
    /// nearest rows whose identifier sorts after it.
    pub async fn find_near(
        &self,
        point: GeoPoint,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Poi>, QueryError> {
        let query = SpatialQuery::pois().order_by(Order::DistanceFrom(point));
        self.page(query, params).await
    }

    /// POIs within `radius_meters` of the center (inclusive), nearest first
    pub async fn find_in_radius(
        &self,
        radius: RadiusQuery,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Poi>, QueryError> {
        let query = SpatialQuery::pois()
            .filter(Filter::WithinRadius(radius))
            .order_by(Order::DistanceFrom(radius.center));
        self.page(query, params).await
    }

    /// POIs spatially inside the zone; an unknown zone gives an empty page
    pub async fn find_in_zone(
        &self,
        zone_id: &str,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Poi>, QueryError> {
        let query = SpatialQuery::pois().filter(Filter::InZone(zone_id.to_string()));
        self.page(query, params).await
    }

    async fn page(
        &self,
        query: SpatialQuery,
        params: &CursorPaginationParams,
    ) -> Result<CursorPage<Poi>, QueryError> {
        let query = query.paginate(params)?;
        debug!(
            "Fetching POIs: {} filters, {:?}, limit {:?}",
            query.filters().len(),
            query.order(),
            query.row_limit()
        );
        let rows = self.store.fetch_pois(&query).await?;
        decode_page(rows, params)
    }
}
