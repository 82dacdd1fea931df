//! Errors surfaced by the query layer.

use thiserror::Error;

use crate::pagination::CursorError;
use crate::store::StoreError;
use crate::wkb::GeometryError;

/// Failure of a repository operation.
///
/// Every kind reaches the caller unchanged; an absent entity is `Ok(None)`,
/// not an error.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A row carried geometry that could not be decoded
    #[error("malformed geometry: {0}")]
    MalformedGeometry(#[from] GeometryError),

    /// The client sent a cursor that does not decode
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    #[error("page limit must be positive")]
    InvalidLimit,

    /// The store could not be reached or failed the query
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl QueryError {
    /// Whether the caller supplied bad input (as opposed to a server fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, QueryError::InvalidCursor(_) | QueryError::InvalidLimit)
    }
}
