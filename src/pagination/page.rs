//! Page assembly from an over-fetched, keyset-ordered result set.

use tracing::debug;

use super::{encode_cursor, CursorPage, Keyed};

/// Build a page from `rows`, which the caller fetched with `limit + 1`.
///
/// The extra row only signals that another page exists; it is dropped and
/// the cursor points at the last retained item.
pub fn build_page<T: Keyed>(mut rows: Vec<T>, limit: usize) -> CursorPage<T> {
    let has_more = rows.len() > limit;
    if has_more {
        rows.truncate(limit);
    }

    let next_cursor = if has_more {
        rows.last().map(|item| encode_cursor(item.osm_id()))
    } else {
        None
    };

    debug!("Built page of {} items (has_more: {})", rows.len(), has_more);

    CursorPage {
        items: rows,
        next_cursor,
        has_more,
    }
}
