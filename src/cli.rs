//! CLI commands for f1-dashboard.
//!
//! Supports API server mode and printing the dashboard views in a terminal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::dataset::Dataset;
use crate::engine::DashboardData;
use crate::recent_races::{load_recent_races, ErgastClient, RecentRacesView};
use crate::selection::{resolve_view, DashboardView, Highlight, SelectionSignals};

#[derive(Parser)]
#[command(name = "f1-dashboard")]
#[command(version, about = "F1 Dashboard: all-time leaderboard, constructor breakdowns and recent races", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the dataset CSV files
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Print the leaderboard and constructor breakdown for a selection
    Dashboard {
        /// Driver full name typed in the search box
        #[arg(short, long)]
        search: Option<String>,

        /// Driver full name from a chart click
        #[arg(short, long)]
        click: Option<String>,

        /// Number of leaderboard rows
        #[arg(short, long)]
        top: Option<usize>,

        /// Directory holding the dataset CSV files
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Fetch the most recent race winners
    Races {
        /// Season year or "current"
        #[arg(short, long)]
        season: Option<String>,

        /// Number of races
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

/// Load configuration, applying a data directory override.
pub fn load_config(data_dir: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = data_dir {
        config.data.dir = dir.to_string_lossy().to_string();
    }
    Ok(config)
}

/// Load the dataset and build the aggregates.
pub fn load_dashboard_data(config: &AppConfig) -> anyhow::Result<DashboardData> {
    let dataset = Dataset::load(&config.data.paths())?;
    Ok(DashboardData::build(&dataset))
}

/// Print the dashboard view for a selection.
pub fn run_dashboard(
    search: Option<String>,
    click: Option<String>,
    top: Option<usize>,
    data_dir: Option<PathBuf>,
    format: String,
) -> anyhow::Result<()> {
    let config = load_config(data_dir)?;

    eprintln!("Loading dataset from: {}", config.data.dir);
    let data = load_dashboard_data(&config)?;
    eprintln!(
        "Loaded {} results for {} drivers",
        data.fact_table.len(),
        data.leaderboard.len()
    );

    let n = top.unwrap_or(config.dashboard.top_n);
    if n == 0 {
        anyhow::bail!("--top must be at least 1");
    }

    let signals = SelectionSignals { search, click };
    let view = resolve_view(&data.fact_table, &data.leaderboard, &signals, n);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&view)?),
        _ => print_dashboard_table(&view),
    }

    Ok(())
}

/// Print the dashboard view as text tables.
pub fn print_dashboard_table(view: &DashboardView) {
    println!("=== Top Piloți All-Time ===");
    println!("  {:>4} {:30} {:>10}", "Loc", "Pilot", "Puncte");
    println!("  {}", "-".repeat(46));
    for row in &view.leaderboard {
        let marker = match row.highlight {
            Highlight::Selected => "*",
            Highlight::Other => " ",
        };
        println!(
            "{} {:>4} {:30} {:>10}",
            marker, row.rank, row.full_name, row.total_points
        );
    }
    println!();

    println!("=== {} ===", view.title);
    if view.breakdown.is_empty() {
        println!("  (fără date)");
    }
    for row in &view.breakdown {
        println!(
            "  {:35} {:>10}",
            row.constructor_name.as_deref().unwrap_or("-"),
            row.total_points
        );
    }
}

/// Fetch and print recent race winners.
pub async fn run_races(
    season: Option<String>,
    limit: Option<usize>,
    format: String,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let season = season.unwrap_or_else(|| config.recent_races.season.clone());
    let limit = limit.unwrap_or(config.recent_races.limit);

    let client = ErgastClient::new(&config.recent_races)?;
    eprintln!("Fetching {} races of season {}...", limit, season);

    // The command itself is the explicit request.
    let view = load_recent_races(&client, 1, &season, limit).await;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&view)?),
        _ => print_races_table(&view),
    }

    Ok(())
}

/// Print recent races as a text table.
pub fn print_races_table(view: &RecentRacesView) {
    match view {
        RecentRacesView::NotRequested => println!("Recent races not requested"),
        RecentRacesView::Unavailable { message } => println!("{}", message),
        RecentRacesView::Loaded { races } => {
            println!("=== Curse Recente ===");
            println!(
                "  {:10} {:28} {:24} {:24} {:12}",
                "Data", "Cursa", "Locație", "Câștigător", "Echipa"
            );
            println!("  {}", "-".repeat(102));
            for race in races {
                println!(
                    "  {:10} {:28} {:24} {:24} {:12}",
                    race.date, race.race_name, race.location, race.winner, race.team
                );
            }
        }
    }
}
