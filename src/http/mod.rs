//! HTTP API over the repositories.
//!
//! Thin handlers: parse the query string, dispatch, map errors to status
//! codes. Routes: `/health`, `/pois`, `/pois/{id}`, `/zones`, `/zones/{id}`
//! and `/zones/{id}/pois`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::config::PaginationConfig;
use crate::error::QueryError;
use crate::models::{GeoPoint, Poi, RadiusQuery, Zone};
use crate::pagination::{CursorPage, CursorPaginationParams};
use crate::repository::{PoiRepository, ZoneRepository};
use crate::service::{list_pois, list_zones, ListPoisQuery, ListZonesQuery, ZoneListing};
use crate::store::SpatialStore;

/// Application state shared across handlers
pub struct AppState {
    pub pois: PoiRepository<dyn SpatialStore>,
    pub zones: ZoneRepository<dyn SpatialStore>,
    pub store: Arc<dyn SpatialStore>,
    pub pagination: PaginationConfig,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn SpatialStore>, pagination: PaginationConfig) -> Self {
        Self {
            pois: PoiRepository::new(Arc::clone(&store)),
            zones: ZoneRepository::new(Arc::clone(&store)),
            store,
            pagination,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/pois", get(list_pois_handler))
        .route("/pois/{id}", get(get_poi_handler))
        .route("/zones", get(list_zones_handler))
        .route("/zones/{id}", get(get_zone_handler))
        .route("/zones/{id}/pois", get(zone_pois_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn query_error(context: &str, e: QueryError) -> ApiError {
    let status = match &e {
        QueryError::InvalidCursor(_) | QueryError::InvalidLimit => StatusCode::BAD_REQUEST,
        QueryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::MalformedGeometry(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if e.is_client_error() {
        warn!("{} rejected: {}", context, e);
    } else {
        error!("{} failed: {}", context, e);
    }
    (status, e.to_string())
}

fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

/// Latitude and longitude only count as a point when both are present
fn point(lat: Option<f64>, lng: Option<f64>) -> Option<GeoPoint> {
    Some(GeoPoint::new(lat?, lng?))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime: f64,
    database: bool,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let healthy = state.store.health_check().await;

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
        database: healthy,
    })
}

#[derive(Debug, Deserialize)]
struct PageQueryParams {
    cursor: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoiQueryParams {
    cursor: Option<String>,
    limit: Option<String>,
    category: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    /// Meters; only meaningful with `lat` and `lng`
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ZoneQueryParams {
    cursor: Option<String>,
    limit: Option<String>,
    #[serde(rename = "type")]
    zone_type: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
}

fn page_params(
    pagination: &PaginationConfig,
    cursor: Option<String>,
    limit: Option<&str>,
) -> CursorPaginationParams {
    CursorPaginationParams {
        cursor,
        limit: pagination.resolve(limit),
    }
}

async fn list_pois_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PoiQueryParams>,
) -> Result<Json<CursorPage<Poi>>, ApiError> {
    let center = point(params.lat, params.lng);
    let radius = match (center, params.radius) {
        (Some(center), Some(radius_meters)) => Some(RadiusQuery {
            center,
            radius_meters,
        }),
        _ => None,
    };

    let query = ListPoisQuery {
        page: page_params(&state.pagination, params.cursor, params.limit.as_deref()),
        category: params.category,
        near: if radius.is_some() { None } else { center },
        radius,
        zone_id: None,
    };

    let page = list_pois(&state.pois, &query)
        .await
        .map_err(|e| query_error("POI listing", e))?;
    Ok(Json(page))
}

async fn get_poi_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Poi>, ApiError> {
    state
        .pois
        .find_by_id(&id)
        .await
        .map_err(|e| query_error("POI lookup", e))?
        .map(Json)
        .ok_or_else(|| not_found("POI"))
}

async fn list_zones_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ZoneQueryParams>,
) -> Result<Json<ZoneListing>, ApiError> {
    let query = ListZonesQuery {
        page: page_params(&state.pagination, params.cursor, params.limit.as_deref()),
        zone_type: params.zone_type,
        containing: point(params.lat, params.lng),
    };

    let listing = list_zones(&state.zones, &query)
        .await
        .map_err(|e| query_error("Zone listing", e))?;
    Ok(Json(listing))
}

async fn get_zone_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Zone>, ApiError> {
    state
        .zones
        .find_by_id(&id)
        .await
        .map_err(|e| query_error("Zone lookup", e))?
        .map(Json)
        .ok_or_else(|| not_found("Zone"))
}

async fn zone_pois_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<PageQueryParams>,
) -> Result<Json<CursorPage<Poi>>, ApiError> {
    let page = page_params(&state.pagination, params.cursor, params.limit.as_deref());

    if state
        .zones
        .find_by_id(&id)
        .await
        .map_err(|e| query_error("Zone lookup", e))?
        .is_none()
    {
        return Err(not_found("Zone"));
    }

    let mut query = ListPoisQuery::new(page);
    query.zone_id = Some(id);
    let page = list_pois(&state.pois, &query)
        .await
        .map_err(|e| query_error("Zone POI listing", e))?;
    Ok(Json(page))
}
