//! Listing dispatch: pick the repository operation a listing request maps to.

use serde::Serialize;
use tracing::debug;

use crate::error::QueryError;
use crate::models::{GeoPoint, Poi, RadiusQuery, Zone};
use crate::pagination::{CursorPage, CursorPaginationParams};
use crate::repository::{PoiRepository, ZoneRepository};
use crate::store::SpatialStore;

/// POI listing request. At most one selector is honoured, in the order
/// zone, radius, near, category; none lists everything.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPoisQuery {
    pub page: CursorPaginationParams,
    pub category: Option<String>,
    pub near: Option<GeoPoint>,
    pub radius: Option<RadiusQuery>,
    pub zone_id: Option<String>,
}

impl ListPoisQuery {
    pub fn new(page: CursorPaginationParams) -> Self {
        Self {
            page,
            category: None,
            near: None,
            radius: None,
            zone_id: None,
        }
    }
}

pub async fn list_pois<S: SpatialStore + ?Sized>(
    repo: &PoiRepository<S>,
    query: &ListPoisQuery,
) -> Result<CursorPage<Poi>, QueryError> {
    let page = &query.page;

    if let Some(zone_id) = &query.zone_id {
        debug!("Listing POIs in zone {}", zone_id);
        return repo.find_in_zone(zone_id, page).await;
    }
    if let Some(radius) = query.radius {
        debug!("Listing POIs within {}m", radius.radius_meters);
        return repo.find_in_radius(radius, page).await;
    }
    if let Some(point) = query.near {
        return repo.find_near(point, page).await;
    }
    if let Some(category) = &query.category {
        return repo.find_by_category(category, page).await;
    }
    repo.find_all(page).await
}

/// Zone listing request: containment wins over type
#[derive(Debug, Clone, PartialEq)]
pub struct ListZonesQuery {
    pub page: CursorPaginationParams,
    pub zone_type: Option<String>,
    pub containing: Option<GeoPoint>,
}

impl ListZonesQuery {
    pub fn new(page: CursorPaginationParams) -> Self {
        Self {
            page,
            zone_type: None,
            containing: None,
        }
    }
}

/// Result of a zone listing; containment is a bare list, not a page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZoneListing {
    Page(CursorPage<Zone>),
    Containing { items: Vec<Zone> },
}

pub async fn list_zones<S: SpatialStore + ?Sized>(
    repo: &ZoneRepository<S>,
    query: &ListZonesQuery,
) -> Result<ZoneListing, QueryError> {
    if let Some(point) = query.containing {
        let items = repo.find_containing(point).await?;
        return Ok(ZoneListing::Containing { items });
    }
    let page = match &query.zone_type {
        Some(zone_type) => repo.find_by_type(zone_type, &query.page).await?,
        None => repo.find_all(&query.page).await?,
    };
    Ok(ZoneListing::Page(page))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::fixtures::{poi, zone};
    use crate::store::MemoryStore;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(
            vec![
                poi("node/1", "cafe", 0.5, 0.5),
                poi("node/2", "bank", 0.1, 0.1),
                poi("node/3", "cafe", 5.0, 5.0),
            ],
            vec![
                zone("relation/1", "city", (0.0, 0.0, 1.0, 1.0), Some(1.0)),
                zone("relation/2", "region", (0.0, 0.0, 10.0, 10.0), Some(100.0)),
            ],
        ))
    }

    fn ids(page: &CursorPage<Poi>) -> Vec<&str> {
        page.items.iter().map(|p| p.osm_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_zone_wins_over_everything() {
        let repo = PoiRepository::new(store());
        let mut query = ListPoisQuery::new(CursorPaginationParams::new(10));
        query.zone_id = Some("relation/1".into());
        query.category = Some("bank".into());
        query.near = Some(GeoPoint::new(5.0, 5.0));

        let page = list_pois(&repo, &query).await.unwrap();
        assert_eq!(ids(&page), ["node/1", "node/2"]);
    }

    #[tokio::test]
    async fn test_radius_wins_over_near_and_category() {
        let repo = PoiRepository::new(store());
        let center = GeoPoint::new(5.0, 5.0);
        let mut query = ListPoisQuery::new(CursorPaginationParams::new(10));
        query.radius = Some(RadiusQuery {
            center,
            radius_meters: 100.0,
        });
        query.near = Some(GeoPoint::new(0.0, 0.0));
        query.category = Some("bank".into());

        let page = list_pois(&repo, &query).await.unwrap();
        assert_eq!(ids(&page), ["node/3"]);
    }

    #[tokio::test]
    async fn test_near_wins_over_category() {
        let repo = PoiRepository::new(store());
        let mut query = ListPoisQuery::new(CursorPaginationParams::new(10));
        query.near = Some(GeoPoint::new(5.0, 5.0));
        query.category = Some("bank".into());

        let page = list_pois(&repo, &query).await.unwrap();
        assert_eq!(ids(&page), ["node/3", "node/1", "node/2"]);
    }

    #[tokio::test]
    async fn test_category_then_all() {
        let repo = PoiRepository::new(store());
        let mut query = ListPoisQuery::new(CursorPaginationParams::new(10));
        query.category = Some("cafe".into());
        assert_eq!(ids(&list_pois(&repo, &query).await.unwrap()), ["node/1", "node/3"]);

        query.category = None;
        assert_eq!(
            ids(&list_pois(&repo, &query).await.unwrap()),
            ["node/1", "node/2", "node/3"]
        );
    }

    #[tokio::test]
    async fn test_zone_listing_dispatch() {
        let repo = ZoneRepository::new(store());

        let mut query = ListZonesQuery::new(CursorPaginationParams::new(10));
        query.zone_type = Some("region".into());
        match list_zones(&repo, &query).await.unwrap() {
            ZoneListing::Page(page) => {
                assert_eq!(page.items.len(), 1);
                assert_eq!(page.items[0].osm_id, "relation/2");
            }
            other => panic!("expected a page, got {:?}", other),
        }

        query.containing = Some(GeoPoint::new(0.5, 0.5));
        match list_zones(&repo, &query).await.unwrap() {
            ZoneListing::Containing { items } => {
                let ids: Vec<_> = items.iter().map(|z| z.osm_id.as_str()).collect();
                assert_eq!(ids, ["relation/1", "relation/2"]);
            }
            other => panic!("expected containment, got {:?}", other),
        }
    }

    #[test]
    fn test_containing_serializes_as_items() {
        let listing = ZoneListing::Containing { items: vec![] };
        assert_eq!(serde_json::to_value(&listing).unwrap(), serde_json::json!({"items": []}));
    }
}
