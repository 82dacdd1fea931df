//! Entity repositories: compose a [`SpatialQuery`], run it against the store,
//! decode rows and assemble pages.

mod poi;
mod zone;

pub use poi::PoiRepository;
pub use zone::ZoneRepository;

use crate::error::QueryError;
use crate::pagination::{build_page, CursorPage, CursorPaginationParams, Keyed};
use crate::wkb::GeometryError;

/// Decode every row, failing on the first malformed one
fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, QueryError>
where
    T: TryFrom<R, Error = GeometryError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(QueryError::from))
        .collect()
}

/// Decode an over-fetched result set into a page of at most `params.limit` items
fn decode_page<R, T>(rows: Vec<R>, params: &CursorPaginationParams) -> Result<CursorPage<T>, QueryError>
where
    T: TryFrom<R, Error = GeometryError> + Keyed,
{
    Ok(build_page(decode_all(rows)?, params.limit))
}
