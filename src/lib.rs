//! Cartographer - read-only POI and zone queries over PostGIS
//!
//! This library provides the geometry codec, keyset pagination, spatial query
//! rendering, stores and repositories used by the API server binary.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod service;
pub mod store;
pub mod wkb;

pub use error::QueryError;
pub use models::{GeoPoint, Geometry, Poi, RadiusQuery, Zone};
pub use pagination::{CursorPage, CursorPaginationParams};
pub use repository::{PoiRepository, ZoneRepository};
