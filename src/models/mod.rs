//! Core data models: geometries, POIs and zones.

pub mod geometry;
pub mod poi;
pub mod spatial;
pub mod zone;

use serde_json::{Map, Value};
use tracing::warn;

pub use geometry::{Geometry, GeometryKind, Position};
pub use poi::Poi;
pub use spatial::{GeoPoint, RadiusQuery};
pub use zone::Zone;

/// Open-ended string-keyed attributes (`tags`, `address`)
pub type Attributes = Map<String, Value>;

/// Turn a JSON column into an attribute map.
///
/// Anything other than an object or null is dropped with a warning.
pub(crate) fn attributes(value: Option<Value>, column: &str, osm_id: &str) -> Option<Attributes> {
    match value? {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(
                "Ignoring non-object {} column on {}: {}",
                column, osm_id, other
            );
            None
        }
    }
}
