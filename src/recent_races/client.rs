//! HTTP client for the Ergast-compatible results API.

use async_trait::async_trait;
use std::time::Duration;

use super::parser::{most_recent, parse_race_winners};
use super::{race_winners_url, RaceResultsSource, RaceSummary};
use crate::config::RecentRacesConfig;
use crate::error::ExternalFetchError;

/// Single-shot client: no retries, one GET per fetch.
pub struct ErgastClient {
    http: reqwest::Client,
    base_url: String,
}

impl ErgastClient {
    pub fn new(config: &RecentRacesConfig) -> Result<Self, ExternalFetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("f1-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl RaceResultsSource for ErgastClient {
    async fn fetch(
        &self,
        season: &str,
        limit: usize,
    ) -> Result<Vec<RaceSummary>, ExternalFetchError> {
        let url = race_winners_url(&self.base_url, season);
        tracing::debug!(%url, "Fetching race winners");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ExternalFetchError::Status(response.status()));
        }

        let body = response.text().await?;
        let races = parse_race_winners(&body)?;

        Ok(most_recent(races, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recent_races::parser::tests::SAMPLE_JSON;
    use axum::http::StatusCode;
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `body` with `status` for every path on a local port and return
    /// the API base URL pointing at it.
    async fn serve(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().fallback(move || async move { (status, body) });
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/ergast/f1", addr)
    }

    fn client(base_url: String) -> ErgastClient {
        let config = RecentRacesConfig {
            base_url,
            timeout_secs: 2,
            ..Default::default()
        };
        ErgastClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_client_from_config() {
        let config = RecentRacesConfig {
            base_url: "http://localhost:10000/ergast/f1".to_string(),
            ..Default::default()
        };
        let client = ErgastClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:10000/ergast/f1");
    }

    #[tokio::test]
    async fn test_fetch_returns_most_recent_first() {
        let base_url = serve(StatusCode::OK, SAMPLE_JSON).await;

        let races = client(base_url).fetch("2024", 2).await.unwrap();

        assert_eq!(races.len(), 2);
        assert_eq!(races[0].race_name, "Australian Grand Prix");
        assert_eq!(races[1].race_name, "Saudi Arabian Grand Prix");
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let base_url = serve(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").await;

        let result = client(base_url).fetch("current", 5).await;
        match result {
            Err(ExternalFetchError::Status(status)) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_payload_error() {
        let base_url = serve(StatusCode::OK, "<html><body>Bad gateway</body></html>").await;

        let result = client(base_url).fetch("current", 5).await;
        assert!(matches!(result, Err(ExternalFetchError::Payload(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        // Reserve a free port, then close it so nothing is listening there.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(format!("http://{}/ergast/f1", addr))
            .fetch("current", 5)
            .await;
        assert!(matches!(result, Err(ExternalFetchError::Http(_))));
    }
}
