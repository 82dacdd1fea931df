//! PostGIS rendering of a [`SpatialQuery`].
//!
//! Geometry columns are selected as hex EWKB so rows decode through
//! [`crate::wkb`]. Distances and radii use the `geography` cast, so they are
//! geodesic meters rather than planar degrees.

use sqlx::{Postgres, QueryBuilder};

use super::{Entity, Filter, Order, SpatialQuery};
use crate::models::GeoPoint;
use crate::store::StoreError;

const POI_COLUMNS: &str = "p.osm_id, \
     encode(ST_AsEWKB(p.geometry), 'hex') AS geometry, \
     p.category, p.subcategory, p.name, p.address, p.phone, p.opening_hours, \
     p.price_range::integer AS price_range, p.website, p.tags, p.is_24_7, \
     p.formatted_address, \
     p.created_at::timestamptz AS created_at, \
     p.updated_at::timestamptz AS updated_at";

const ZONE_COLUMNS: &str = "z.osm_id, \
     encode(ST_AsEWKB(z.geometry), 'hex') AS geometry, \
     z.name, z.malagasy_name, z.iso_code, \
     z.population::bigint AS population, z.tags, \
     z.area::double precision AS area, \
     encode(ST_AsEWKB(z.centroid), 'hex') AS centroid, \
     z.zone_type, \
     z.created_at::timestamptz AS created_at, \
     z.updated_at::timestamptz AS updated_at";

/// Render `query` into parameterised SQL with its binds attached
pub fn render(query: &SpatialQuery) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    if let Some(filter) = query
        .filters()
        .iter()
        .find(|f| !f.applies_to(query.entity()))
    {
        return Err(StoreError::UnsupportedFilter {
            entity: query.entity(),
            filter: format!("{:?}", filter),
        });
    }

    let (table, alias, columns) = match query.entity() {
        Entity::Pois => ("pois", "p", POI_COLUMNS),
        Entity::Zones => ("zones", "z", ZONE_COLUMNS),
    };

    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(columns).push(" FROM ").push(table).push(" ").push(alias);

    // Zone membership joins; the zone id is part of the join condition
    for (i, filter) in query.filters().iter().enumerate() {
        if let Filter::InZone(zone_id) = filter {
            qb.push(format!(" INNER JOIN zones z{i} ON z{i}.osm_id = "))
                .push_bind(zone_id.clone())
                .push(format!(" AND ST_Contains(z{i}.geometry, {alias}.geometry)"));
        }
    }

    let mut first = true;
    for filter in query.filters() {
        match filter {
            Filter::InZone(_) => continue,
            Filter::OsmId(osm_id) => {
                push_clause(&mut qb, &mut first);
                qb.push(format!("{alias}.osm_id = "))
                    .push_bind(osm_id.clone());
            }
            Filter::Category(category) => {
                push_clause(&mut qb, &mut first);
                qb.push("p.category = ").push_bind(category.clone());
            }
            Filter::ZoneType(zone_type) => {
                push_clause(&mut qb, &mut first);
                qb.push("z.zone_type = ").push_bind(zone_type.clone());
            }
            Filter::WithinRadius(radius) => {
                push_clause(&mut qb, &mut first);
                qb.push("ST_DWithin(p.geometry::geography, ");
                push_point(&mut qb, radius.center);
                qb.push("::geography, ")
                    .push_bind(radius.radius_meters)
                    .push(")");
            }
            Filter::ContainsPoint(point) => {
                push_clause(&mut qb, &mut first);
                qb.push("ST_Contains(z.geometry, ");
                push_point(&mut qb, *point);
                qb.push(")");
            }
        }
    }

    // Keyset position goes on top of every other predicate
    if let Some(after) = query.after() {
        push_clause(&mut qb, &mut first);
        qb.push(format!("{alias}.osm_id > "))
            .push_bind(after.to_string());
    }

    qb.push(" ORDER BY ");
    match query.order() {
        Order::Identifier => {}
        Order::DistanceFrom(point) => {
            qb.push(format!("ST_Distance({alias}.geometry::geography, "));
            push_point(&mut qb, point);
            qb.push("::geography) ASC, ");
        }
        Order::AreaAscending => {
            qb.push(format!("{alias}.area ASC NULLS LAST, "));
        }
    }
    qb.push(format!("{alias}.osm_id ASC"));

    if let Some(limit) = query.row_limit() {
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }

    Ok(qb)
}

fn push_clause(qb: &mut QueryBuilder<'static, Postgres>, first: &mut bool) {
    qb.push(if *first { " WHERE " } else { " AND " });
    *first = false;
}

fn push_point(qb: &mut QueryBuilder<'static, Postgres>, point: GeoPoint) {
    qb.push("ST_SetSRID(ST_MakePoint(")
        .push_bind(point.lng)
        .push(", ")
        .push_bind(point.lat)
        .push("), 4326)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RadiusQuery;
    use crate::pagination::{encode_cursor, CursorPaginationParams};

    fn tail(sql: &str) -> &str {
        let from = sql.find(" FROM ").expect("FROM clause");
        &sql[from..]
    }

    #[test]
    fn test_find_all_with_cursor() {
        let params = CursorPaginationParams::new(2).with_cursor(encode_cursor("b"));
        let query = SpatialQuery::pois().paginate(&params).unwrap();
        let qb = render(&query).unwrap();

        assert!(qb.sql().starts_with("SELECT p.osm_id, encode(ST_AsEWKB(p.geometry), 'hex')"));
        assert_eq!(
            tail(qb.sql()),
            " FROM pois p WHERE p.osm_id > $1 ORDER BY p.osm_id ASC LIMIT $2"
        );
    }

    #[test]
    fn test_find_all_first_page() {
        let query = SpatialQuery::zones()
            .paginate(&CursorPaginationParams::new(10))
            .unwrap();
        let qb = render(&query).unwrap();
        assert_eq!(
            tail(qb.sql()),
            " FROM zones z ORDER BY z.osm_id ASC LIMIT $1"
        );
    }

    #[test]
    fn test_radius_keyset_after_spatial_predicate() {
        let center = GeoPoint::new(-18.9, 47.5);
        let params = CursorPaginationParams::new(5).with_cursor(encode_cursor("node/1"));
        let query = SpatialQuery::pois()
            .filter(Filter::WithinRadius(RadiusQuery {
                center,
                radius_meters: 500.0,
            }))
            .order_by(Order::DistanceFrom(center))
            .paginate(&params)
            .unwrap();
        let qb = render(&query).unwrap();

        assert_eq!(
            tail(qb.sql()),
            " FROM pois p \
             WHERE ST_DWithin(p.geometry::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3) \
             AND p.osm_id > $4 \
             ORDER BY ST_Distance(p.geometry::geography, ST_SetSRID(ST_MakePoint($5, $6), 4326)::geography) ASC, p.osm_id ASC \
             LIMIT $7"
        );
    }

    #[test]
    fn test_category() {
        let query = SpatialQuery::pois()
            .filter(Filter::Category("cafe".into()))
            .paginate(&CursorPaginationParams::new(20))
            .unwrap();
        let qb = render(&query).unwrap();
        assert_eq!(
            tail(qb.sql()),
            " FROM pois p WHERE p.category = $1 ORDER BY p.osm_id ASC LIMIT $2"
        );
    }

    #[test]
    fn test_in_zone_is_a_single_join() {
        let params = CursorPaginationParams::new(20).with_cursor(encode_cursor("node/5"));
        let query = SpatialQuery::pois()
            .filter(Filter::InZone("relation/7".into()))
            .paginate(&params)
            .unwrap();
        let qb = render(&query).unwrap();
        assert_eq!(
            tail(qb.sql()),
            " FROM pois p \
             INNER JOIN zones z0 ON z0.osm_id = $1 AND ST_Contains(z0.geometry, p.geometry) \
             WHERE p.osm_id > $2 ORDER BY p.osm_id ASC LIMIT $3"
        );
    }

    #[test]
    fn test_containing_orders_by_area() {
        let query = SpatialQuery::zones()
            .filter(Filter::ContainsPoint(GeoPoint::new(-18.9, 47.5)))
            .order_by(Order::AreaAscending);
        let qb = render(&query).unwrap();
        assert!(qb.sql().contains("encode(ST_AsEWKB(z.centroid), 'hex') AS centroid"));
        assert_eq!(
            tail(qb.sql()),
            " FROM zones z \
             WHERE ST_Contains(z.geometry, ST_SetSRID(ST_MakePoint($1, $2), 4326)) \
             ORDER BY z.area ASC NULLS LAST, z.osm_id ASC"
        );
    }

    #[test]
    fn test_find_by_id() {
        let query = SpatialQuery::zones()
            .filter(Filter::OsmId("relation/7".into()))
            .limit(1);
        let qb = render(&query).unwrap();
        assert_eq!(
            tail(qb.sql()),
            " FROM zones z WHERE z.osm_id = $1 ORDER BY z.osm_id ASC LIMIT $2"
        );
    }

    #[test]
    fn test_rejects_filter_for_other_entity() {
        let query = SpatialQuery::zones().filter(Filter::Category("cafe".into()));
        assert!(matches!(
            render(&query),
            Err(StoreError::UnsupportedFilter {
                entity: Entity::Zones,
                ..
            })
        ));
    }
}
