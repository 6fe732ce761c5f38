//! Request and response types for the dashboard API.

use serde::{Deserialize, Serialize};

use crate::engine::{Coverage, TableSizes};

/// Query of `GET /api/dashboard`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    /// Driver search value
    pub search: Option<String>,
    /// Driver name from a chart click
    pub click: Option<String>,
    /// Override of the configured top-N
    pub top: Option<usize>,
}

/// Query of `GET /api/races/recent`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentRacesQuery {
    /// Times the "load recent races" button was pressed
    #[serde(default)]
    pub requests: u64,
    pub season: Option<String>,
    pub limit: Option<usize>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Dataset summary response
#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub tables: TableSizes,
    pub fact_rows: usize,
    pub ranked_drivers: usize,
    pub total_points: f64,
    #[serde(flatten)]
    pub coverage: Coverage,
}

/// Driver search options
#[derive(Debug, Serialize)]
pub struct DriversResponse {
    pub drivers: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
