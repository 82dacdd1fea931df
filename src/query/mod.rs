//! Store-neutral description of a spatial listing.
//!
//! A [`SpatialQuery`] names the row set, the filters (all ANDed), the primary
//! ordering and the keyset position. Every ordering ends with `osm_id ASC`,
//! and the keyset predicate `osm_id > after` is layered on top of whatever
//! filters are present.

pub mod sql;

use crate::error::QueryError;
use crate::models::{GeoPoint, RadiusQuery};
use crate::pagination::{cursor_id, CursorPaginationParams};

/// Row set a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Pois,
    Zones,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Pois => write!(f, "pois"),
            Entity::Zones => write!(f, "zones"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Exact identifier match
    OsmId(String),
    /// POI category equality
    Category(String),
    /// Zone type equality
    ZoneType(String),
    /// POIs whose geodesic distance to the center is at most the radius
    WithinRadius(RadiusQuery),
    /// POIs spatially contained by the zone with this identifier
    InZone(String),
    /// Zones whose geometry contains the point
    ContainsPoint(GeoPoint),
}

impl Filter {
    /// Whether this filter can be evaluated against `entity` rows
    pub fn applies_to(&self, entity: Entity) -> bool {
        match self {
            Filter::OsmId(_) => true,
            Filter::Category(_) | Filter::WithinRadius(_) | Filter::InZone(_) => {
                entity == Entity::Pois
            }
            Filter::ZoneType(_) | Filter::ContainsPoint(_) => entity == Entity::Zones,
        }
    }
}

/// Primary sort key; `osm_id ASC` always follows as the tie-break
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Identifier,
    /// Increasing geodesic distance from the point
    DistanceFrom(GeoPoint),
    /// Increasing zone area, unknown areas last
    AreaAscending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialQuery {
    entity: Entity,
    filters: Vec<Filter>,
    order: Order,
    after: Option<String>,
    limit: Option<usize>,
}

impl SpatialQuery {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            filters: Vec::new(),
            order: Order::Identifier,
            after: None,
            limit: None,
        }
    }

    pub fn pois() -> Self {
        Self::new(Entity::Pois)
    }

    pub fn zones() -> Self {
        Self::new(Entity::Zones)
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply the keyset position and request `limit + 1` rows.
    ///
    /// Fails on a zero limit or an undecodable cursor; a bad cursor never
    /// falls back to the first page. The over-fetch saturates at `usize::MAX`.
    pub fn paginate(mut self, params: &CursorPaginationParams) -> Result<Self, QueryError> {
        if params.limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        self.after = cursor_id(params)?;
        self.limit = Some(params.limit.saturating_add(1));
        Ok(self)
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Order {
        self.order
    }

    /// Identifier of the last row already served
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }
}
