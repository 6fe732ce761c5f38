//! Selection resolution for the interactive dashboard.
//!
//! Turns the search and chart-click signals into one of three views:
//! the default top-N aggregate, a selected driver, or "no data". Every call
//! recomputes the view from its inputs; nothing is remembered between calls.

use serde::{Deserialize, Serialize};

use crate::engine::{build_constructor_breakdown, top_n, BreakdownRow, FactRow, LeaderboardEntry};

/// Raw selection inputs coming from the presentation layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionSignals {
    /// Value typed or picked in the driver search.
    pub search: Option<String>,
    /// Driver name taken from a clicked bar's x-axis label.
    pub click: Option<String>,
}

/// Which view the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    Default,
    Selected,
    NoData,
}

/// Highlight tag of a rendered leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Selected,
    Other,
}

/// A leaderboard row as rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub full_name: String,
    pub total_points: f64,
    pub rank: usize,
    pub highlight: Highlight,
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub state: ViewState,
    pub selection: Option<String>,
    pub title: String,
    pub leaderboard: Vec<LeaderboardRow>,
    pub breakdown: Vec<BreakdownRow>,
}

/// Search wins over click. Empty values count as absent.
pub fn effective_selection<'a>(
    search: Option<&'a str>,
    click: Option<&'a str>,
) -> Option<&'a str> {
    let present = |value: Option<&'a str>| value.filter(|v| !v.trim().is_empty());
    present(search).or_else(|| present(click))
}

/// Find a driver by exact, case-sensitive full name.
///
/// Full names are not unique in the dataset; the first match in leaderboard
/// order wins.
pub fn find_driver<'a>(
    leaderboard: &'a [LeaderboardEntry],
    name: &str,
) -> Option<&'a LeaderboardEntry> {
    let mut matches = leaderboard.iter().filter(|e| e.full_name == name);
    let first = matches.next()?;

    let others: Vec<i64> = matches.map(|e| e.driver_id).collect();
    if !others.is_empty() {
        tracing::warn!(
            driver = name,
            chosen = first.driver_id,
            ignored = ?others,
            "Ambiguous driver name, using the highest ranked match"
        );
    }

    Some(first)
}

/// Title of the constructor breakdown for the given view.
pub fn breakdown_title(
    state: ViewState,
    selected: Option<&LeaderboardEntry>,
    selection: &str,
    n: usize,
) -> String {
    match (state, selected) {
        (ViewState::Selected, Some(entry)) => format!(
            "Constructori pentru {} (Loc {}, {} puncte)",
            entry.full_name, entry.rank, entry.total_points
        ),
        (ViewState::NoData, _) | (ViewState::Selected, None) => {
            format!("Nu există date pentru {}", selection)
        }
        (ViewState::Default, _) => format!("Top {} constructori all-time (după puncte)", n),
    }
}

fn render_rows(entries: &[LeaderboardEntry], selected_id: Option<i64>) -> Vec<LeaderboardRow> {
    entries
        .iter()
        .map(|e| LeaderboardRow {
            full_name: e.full_name.clone(),
            total_points: e.total_points,
            rank: e.rank,
            highlight: if Some(e.driver_id) == selected_id {
                Highlight::Selected
            } else {
                Highlight::Other
            },
        })
        .collect()
}

/// Resolve the selection signals into the view to render.
pub fn resolve_view(
    fact_table: &[FactRow],
    leaderboard: &[LeaderboardEntry],
    signals: &SelectionSignals,
    n: usize,
) -> DashboardView {
    let top = top_n(leaderboard, n);

    let Some(selection) = effective_selection(signals.search.as_deref(), signals.click.as_deref())
    else {
        let mut breakdown = build_constructor_breakdown(fact_table, None);
        breakdown.truncate(n);
        return DashboardView {
            state: ViewState::Default,
            selection: None,
            title: breakdown_title(ViewState::Default, None, "", n),
            leaderboard: render_rows(&top, None),
            breakdown,
        };
    };

    let Some(entry) = find_driver(leaderboard, selection) else {
        tracing::debug!(selection, "No driver matches selection");
        return DashboardView {
            state: ViewState::NoData,
            selection: Some(selection.to_string()),
            title: breakdown_title(ViewState::NoData, None, selection, n),
            leaderboard: render_rows(&top, None),
            breakdown: Vec::new(),
        };
    };

    let mut rows = top;
    if entry.rank > n {
        rows.push(entry.clone());
    }

    DashboardView {
        state: ViewState::Selected,
        selection: Some(selection.to_string()),
        title: breakdown_title(ViewState::Selected, Some(entry), selection, n),
        leaderboard: render_rows(&rows, Some(entry.driver_id)),
        breakdown: build_constructor_breakdown(fact_table, Some(entry.driver_id)),
    }
}
