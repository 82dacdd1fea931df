//! Spatial query inputs.

use serde::{Deserialize, Serialize};

/// Geographic point (lat/lng, WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Circle around a center point, radius in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusQuery {
    pub center: GeoPoint,
    pub radius_meters: f64,
}
