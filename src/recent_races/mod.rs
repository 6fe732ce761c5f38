//! Recent race winners from an Ergast-compatible results API.
//!
//! Fetching happens only on an explicit user request. The outcome is always
//! one of three view states so the presentation layer can tell "not asked
//! yet", "loaded" and "could not load" apart.

pub mod client;
pub mod parser;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExternalFetchError;

pub use client::ErgastClient;

/// Page size requested from the API; one season never has more winners.
pub const SEASON_PAGE_SIZE: usize = 100;

/// Build the race winners URL for a season (`current` or a year).
pub fn race_winners_url(base_url: &str, season: &str) -> String {
    format!(
        "{}/{}/results/1.json?limit={}",
        base_url.trim_end_matches('/'),
        season,
        SEASON_PAGE_SIZE
    )
}

/// One race and its winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub race_name: String,
    pub circuit: String,
    pub location: String,
    pub date: String,
    pub winner: String,
    pub team: String,
}

/// Source of recent race results.
#[async_trait]
pub trait RaceResultsSource: Send + Sync {
    /// Up to `limit` races of `season`, most recent first.
    async fn fetch(&self, season: &str, limit: usize)
        -> Result<Vec<RaceSummary>, ExternalFetchError>;
}

/// Recent races as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecentRacesView {
    NotRequested,
    Loaded { races: Vec<RaceSummary> },
    Unavailable { message: String },
}

/// Message shown when the races could not be loaded.
pub const UNAVAILABLE_MESSAGE: &str = "Nu s-au putut încărca cursele recente";

/// Fetch recent races once `requests` (the button click counter) is non-zero.
///
/// Failures and empty answers both become [`RecentRacesView::Unavailable`].
pub async fn load_recent_races(
    source: &dyn RaceResultsSource,
    requests: u64,
    season: &str,
    limit: usize,
) -> RecentRacesView {
    if requests == 0 {
        return RecentRacesView::NotRequested;
    }

    match source.fetch(season, limit).await {
        Ok(races) if races.is_empty() => {
            tracing::warn!(season, "Results API returned no races");
            RecentRacesView::Unavailable {
                message: UNAVAILABLE_MESSAGE.to_string(),
            }
        }
        Ok(races) => {
            tracing::info!(season, count = races.len(), "Recent races loaded");
            RecentRacesView::Loaded { races }
        }
        Err(e) => {
            tracing::warn!(season, error = %e, "Failed to fetch recent races");
            RecentRacesView::Unavailable {
                message: UNAVAILABLE_MESSAGE.to_string(),
            }
        }
    }
}
