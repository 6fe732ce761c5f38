//! Configuration for the F1 dashboard.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Location of the four source CSV tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
    #[serde(default = "default_drivers_file")]
    pub drivers: String,
    #[serde(default = "default_constructors_file")]
    pub constructors: String,
    #[serde(default = "default_races_file")]
    pub races: String,
    #[serde(default = "default_results_file")]
    pub results: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_drivers_file() -> String {
    "drivers.csv".to_string()
}

fn default_constructors_file() -> String {
    "constructors.csv".to_string()
}

fn default_races_file() -> String {
    "races.csv".to_string()
}

fn default_results_file() -> String {
    "results.csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            drivers: default_drivers_file(),
            constructors: default_constructors_file(),
            races: default_races_file(),
            results: default_results_file(),
        }
    }
}

impl DataConfig {
    /// Resolve the configured file names against the data directory.
    pub fn paths(&self) -> DatasetPaths {
        let dir = PathBuf::from(&self.dir);
        DatasetPaths {
            drivers: dir.join(&self.drivers),
            constructors: dir.join(&self.constructors),
            races: dir.join(&self.races),
            results: dir.join(&self.results),
        }
    }
}

/// Resolved paths of the source tables
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub drivers: PathBuf,
    pub constructors: PathBuf,
    pub races: PathBuf,
    pub results: PathBuf,
}

/// Dashboard view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Rows shown in the default leaderboard and breakdown
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

/// External race-results API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentRacesConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_season")]
    pub season: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.jolpi.ca/ergast/f1".to_string()
}

fn default_season() -> String {
    "current".to_string()
}

fn default_limit() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RecentRacesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            season: default_season(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub recent_races: RecentRacesConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (F1DASH__DASHBOARD__TOP_N, etc.)
            .add_source(
                config::Environment::with_prefix("F1DASH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
