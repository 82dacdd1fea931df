//! In-process store evaluating spatial queries over decoded rows.
//!
//! Used for tests and fixture-backed runs. Zone envelopes sit in an R-tree;
//! everything else is a scan.
//!
//! A row whose geometry does not decode passes every spatial filter and sorts
//! first by distance, so the repositories reject the page with
//! `MalformedGeometry` as they would for the same row coming from PostGIS.

use std::path::Path;

use async_trait::async_trait;
use geo::{BoundingRect, Contains, Point};
use rstar::{RTree, RTreeObject, AABB};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{min_distance_to_geometry, PoiRow, SpatialStore, StoreError, ZoneRow};
use crate::models::GeoPoint;
use crate::query::{Entity, Filter, Order, SpatialQuery};
use crate::wkb;

/// Rows plus their decoded shape; `None` when the stored geometry is corrupt
struct Stored<R> {
    row: R,
    shape: Option<geo::Geometry<f64>>,
}

impl<R> Stored<R> {
    fn decode(row: R, osm_id: &str, geometry: &str) -> Self {
        let shape = match wkb::decode_hex(geometry) {
            Ok(geometry) => Some(geometry.to_geo()),
            Err(e) => {
                warn!("Stored geometry of {} does not decode: {}", osm_id, e);
                None
            }
        };
        Self { row, shape }
    }
}

/// Wrapper for R-tree indexing of zone envelopes
struct IndexedZone {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedZone {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// JSON fixture layout: `{"pois": [...], "zones": [...]}`
#[derive(Debug, Default, Deserialize)]
struct Fixtures {
    #[serde(default)]
    pois: Vec<PoiRow>,
    #[serde(default)]
    zones: Vec<ZoneRow>,
}

pub struct MemoryStore {
    pois: Vec<Stored<PoiRow>>,
    zones: Vec<Stored<ZoneRow>>,
    zone_tree: RTree<IndexedZone>,
}

impl MemoryStore {
    pub fn new(pois: Vec<PoiRow>, zones: Vec<ZoneRow>) -> Self {
        let pois: Vec<_> = pois
            .into_iter()
            .map(|row| {
                let (id, geometry) = (row.osm_id.clone(), row.geometry.clone());
                Stored::decode(row, &id, &geometry)
            })
            .collect();

        let zones: Vec<_> = zones
            .into_iter()
            .map(|row| {
                let (id, geometry) = (row.osm_id.clone(), row.geometry.clone());
                Stored::decode(row, &id, &geometry)
            })
            .collect();

        let indexed = zones
            .iter()
            .enumerate()
            .filter_map(|(index, zone)| {
                let rect = zone.shape.as_ref()?.bounding_rect()?;
                Some(IndexedZone {
                    index,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        let zone_tree = RTree::bulk_load(indexed);

        info!(
            "Memory store loaded {} POIs and {} zones ({} indexed)",
            pois.len(),
            zones.len(),
            zone_tree.size()
        );

        Self {
            pois,
            zones,
            zone_tree,
        }
    }

    /// Load rows from a JSON fixture file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let fixtures: Fixtures = serde_json::from_str(&content)?;
        Ok(Self::new(fixtures.pois, fixtures.zones))
    }

    fn zone(&self, osm_id: &str) -> Option<&Stored<ZoneRow>> {
        self.zones.iter().find(|z| z.row.osm_id == osm_id)
    }

    /// Zones whose envelope holds the point, exact containment still pending.
    /// Undecodable zones have no envelope and are always candidates.
    fn zone_candidates(&self, point: GeoPoint) -> Vec<usize> {
        self.zone_tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.lng, point.lat]))
            .map(|iz| iz.index)
            .chain(
                self.zones
                    .iter()
                    .enumerate()
                    .filter(|(_, zone)| zone.shape.is_none())
                    .map(|(index, _)| index),
            )
            .collect()
    }

    fn poi_matches(&self, poi: &Stored<PoiRow>, filter: &Filter) -> bool {
        match filter {
            Filter::OsmId(osm_id) => poi.row.osm_id == *osm_id,
            Filter::Category(category) => poi.row.category == *category,
            Filter::WithinRadius(radius) => poi
                .shape
                .as_ref()
                .map_or(true, |s| min_distance_to_geometry(radius.center, s) <= radius.radius_meters),
            Filter::InZone(zone_id) => match (self.zone(zone_id), poi.shape.as_ref()) {
                (Some(Stored { shape: Some(zone), .. }), Some(shape)) => zone.contains(shape),
                (Some(_), None) => true,
                _ => false,
            },
            Filter::ZoneType(_) | Filter::ContainsPoint(_) => false,
        }
    }

    fn zone_matches(zone: &Stored<ZoneRow>, filter: &Filter) -> bool {
        match filter {
            Filter::OsmId(osm_id) => zone.row.osm_id == *osm_id,
            Filter::ZoneType(zone_type) => zone.row.zone_type == *zone_type,
            Filter::ContainsPoint(point) => zone
                .shape
                .as_ref()
                .map_or(true, |s| s.contains(&Point::new(point.lng, point.lat))),
            Filter::Category(_) | Filter::WithinRadius(_) | Filter::InZone(_) => false,
        }
    }
}

fn check(query: &SpatialQuery, expected: Entity) -> Result<(), StoreError> {
    if query.entity() != expected {
        return Err(StoreError::EntityMismatch {
            expected,
            found: query.entity(),
        });
    }
    if let Some(filter) = query.filters().iter().find(|f| !f.applies_to(expected)) {
        return Err(StoreError::UnsupportedFilter {
            entity: expected,
            filter: format!("{:?}", filter),
        });
    }
    Ok(())
}

fn after_cursor(osm_id: &str, query: &SpatialQuery) -> bool {
    query.after().map_or(true, |after| osm_id > after)
}

/// Sort by primary key then identifier, keep the first `limit`
fn finish<R: Clone>(mut matched: Vec<(f64, &Stored<R>, &str)>, limit: Option<usize>) -> Vec<R> {
    matched.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.2.cmp(b.2))
    });
    if let Some(limit) = limit {
        matched.truncate(limit);
    }
    matched.into_iter().map(|(_, s, _)| s.row.clone()).collect()
}

#[async_trait]
impl SpatialStore for MemoryStore {
    async fn fetch_pois(&self, query: &SpatialQuery) -> Result<Vec<PoiRow>, StoreError> {
        check(query, Entity::Pois)?;

        let matched: Vec<_> = self
            .pois
            .iter()
            .filter(|poi| after_cursor(&poi.row.osm_id, query))
            .filter(|poi| query.filters().iter().all(|f| self.poi_matches(poi, f)))
            .map(|poi| {
                let key = match query.order() {
                    Order::DistanceFrom(point) => poi
                        .shape
                        .as_ref()
                        .map_or(f64::NEG_INFINITY, |s| min_distance_to_geometry(point, s)),
                    Order::Identifier | Order::AreaAscending => 0.0,
                };
                (key, poi, poi.row.osm_id.as_str())
            })
            .collect();

        debug!("Memory store matched {} POIs", matched.len());
        Ok(finish(matched, query.row_limit()))
    }

    async fn fetch_zones(&self, query: &SpatialQuery) -> Result<Vec<ZoneRow>, StoreError> {
        check(query, Entity::Zones)?;

        let candidates: Vec<&Stored<ZoneRow>> = match query.filters().iter().find_map(|f| match f {
            Filter::ContainsPoint(point) => Some(*point),
            _ => None,
        }) {
            Some(point) => self
                .zone_candidates(point)
                .into_iter()
                .map(|i| &self.zones[i])
                .collect(),
            None => self.zones.iter().collect(),
        };

        let matched: Vec<_> = candidates
            .into_iter()
            .filter(|zone| after_cursor(&zone.row.osm_id, query))
            .filter(|zone| query.filters().iter().all(|f| Self::zone_matches(zone, f)))
            .map(|zone| {
                let key = match query.order() {
                    Order::AreaAscending => zone.row.area.unwrap_or(f64::INFINITY),
                    Order::DistanceFrom(point) => zone
                        .shape
                        .as_ref()
                        .map_or(f64::NEG_INFINITY, |s| min_distance_to_geometry(point, s)),
                    Order::Identifier => 0.0,
                };
                (key, zone, zone.row.osm_id.as_str())
            })
            .collect();

        debug!("Memory store matched {} zones", matched.len());
        Ok(finish(matched, query.row_limit()))
    }
}
