//! Cursor-based (keyset) pagination.
//!
//! Listings are ordered by `osm_id` as the final tie-break and fetched with
//! one extra row; the cursor is the encoded `osm_id` of the last item served.

mod cursor;
mod page;

use serde::{Deserialize, Serialize};

pub use cursor::{cursor_id, decode_cursor, encode_cursor, CursorError};
pub use page::build_page;

/// Items that carry the keyset ordering key
pub trait Keyed {
    fn osm_id(&self) -> &str;
}

/// Pagination request: an optional cursor and a positive page size
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CursorPaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
    pub limit: usize,
}

impl CursorPaginationParams {
    pub fn new(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
