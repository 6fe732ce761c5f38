//! F1 Dashboard
//!
//! JSON API and CLI over the all-time Formula 1 results dataset: driver
//! leaderboard, constructor breakdowns, selection views and recent races.

mod cli;
mod config;
mod dataset;
mod engine;
mod error;
mod recent_races;
mod routes;
mod selection;
mod types;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::recent_races::ErgastClient;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => run_server(host, port, data_dir).await,
        Commands::Dashboard {
            search,
            click,
            top,
            data_dir,
            format,
        } => cli::run_dashboard(search, click, top, data_dir, format),
        Commands::Races {
            season,
            limit,
            format,
        } => cli::run_races(season, limit, format).await,
    }
}

/// Run the API server.
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "f1_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = cli::load_config(data_dir)?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("Data directory: {}", config.data.dir);

    // Without its data the dashboard cannot render; load failures abort startup.
    let data = cli::load_dashboard_data(&config)?;

    let races = ErgastClient::new(&config.recent_races)?;
    tracing::info!("Recent races API: {}", config.recent_races.base_url);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = Arc::new(AppState {
        data,
        config,
        races: Arc::new(races),
    });
    let app = routes::router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
