//! API route handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::engine::{coverage, driver_options, DashboardData};
use crate::recent_races::{load_recent_races, RaceResultsSource, RecentRacesView};
use crate::selection::{resolve_view, DashboardView, SelectionSignals};
use crate::types::{
    DashboardQuery, DatasetResponse, DriversResponse, ErrorResponse, HealthResponse,
    RecentRacesQuery,
};

/// Upper bound for `top` and `limit` query parameters.
const MAX_ROWS: usize = 1000;

/// Application state shared across handlers.
pub struct AppState {
    pub data: DashboardData,
    pub config: AppConfig,
    pub races: Arc<dyn RaceResultsSource>,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

fn validate_rows(name: &str, value: usize) -> Result<usize, ApiError> {
    if value == 0 || value > MAX_ROWS {
        return Err(ApiError::bad_request(format!(
            "{} must be between 1 and {}",
            name, MAX_ROWS
        )));
    }
    Ok(value)
}

/// Unwrap a query extractor, turning a malformed query string into a JSON 400.
fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dataset", get(dataset))
        .route("/api/drivers", get(drivers))
        .route("/api/dashboard", get(dashboard))
        .route("/api/races/recent", get(recent_races))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Dataset summary endpoint.
pub async fn dataset(State(state): State<Arc<AppState>>) -> Json<DatasetResponse> {
    let data = &state.data;
    Json(DatasetResponse {
        tables: data.sizes,
        fact_rows: data.fact_table.len(),
        ranked_drivers: data.leaderboard.len(),
        total_points: data.fact_table.iter().map(|r| r.points).sum(),
        coverage: coverage(&data.fact_table),
    })
}

/// Driver search options.
pub async fn drivers(State(state): State<Arc<AppState>>) -> Json<DriversResponse> {
    Json(DriversResponse {
        drivers: driver_options(&state.data.leaderboard),
    })
}

/// Leaderboard and constructor breakdown for the current selection.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardView>, ApiError> {
    let query = parse_query(query)?;
    let n = match query.top {
        Some(top) => validate_rows("top", top)?,
        None => state.config.dashboard.top_n,
    };

    let signals = SelectionSignals {
        search: query.search,
        click: query.click,
    };

    let view = resolve_view(&state.data.fact_table, &state.data.leaderboard, &signals, n);
    Ok(Json(view))
}

/// Recent race winners, fetched only once requested.
pub async fn recent_races(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RecentRacesQuery>, QueryRejection>,
) -> Result<Json<RecentRacesView>, ApiError> {
    let query = parse_query(query)?;
    let defaults = &state.config.recent_races;
    let limit = match query.limit {
        Some(limit) => validate_rows("limit", limit)?,
        None => defaults.limit,
    };
    let season = query.season.unwrap_or_else(|| defaults.season.clone());

    let view = load_recent_races(state.races.as_ref(), query.requests, &season, limit).await;
    Ok(Json(view))
}
