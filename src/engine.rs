//! Join and aggregation over the source tables.
//!
//! Builds the denormalized fact table, the all-time driver leaderboard and
//! per-constructor point breakdowns.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::dataset::{Constructor, Dataset, Driver, Race, ResultRow};

/// A result row joined with its driver, constructor and race attributes.
///
/// Dimension fields are `None` when the id has no matching row.
#[derive(Debug, Clone, PartialEq)]
pub struct FactRow {
    pub race_id: i64,
    pub driver_id: i64,
    pub constructor_id: i64,
    pub points: f64,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub constructor_name: Option<String>,
    pub race_name: Option<String>,
    pub race_date: Option<NaiveDate>,
    pub season: Option<i32>,
}

/// One driver's all-time total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub driver_id: i64,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub full_name: String,
    pub total_points: f64,
    pub rank: usize,
}

/// Points scored for one constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub constructor_name: Option<String>,
    pub total_points: f64,
}

/// Left-join results with drivers, constructors and races.
///
/// Every result row produces exactly one fact row, in input order.
pub fn build_fact_table(
    results: &[ResultRow],
    drivers: &[Driver],
    constructors: &[Constructor],
    races: &[Race],
) -> Vec<FactRow> {
    let drivers: HashMap<i64, &Driver> = drivers.iter().map(|d| (d.driver_id, d)).collect();
    let constructors: HashMap<i64, &Constructor> = constructors
        .iter()
        .map(|c| (c.constructor_id, c))
        .collect();
    let races: HashMap<i64, &Race> = races.iter().map(|r| (r.race_id, r)).collect();

    results
        .iter()
        .map(|result| {
            let driver = drivers.get(&result.driver_id);
            let constructor = constructors.get(&result.constructor_id);
            let race = races.get(&result.race_id);

            FactRow {
                race_id: result.race_id,
                driver_id: result.driver_id,
                constructor_id: result.constructor_id,
                points: result.points,
                forename: driver.and_then(|d| d.forename.clone()),
                surname: driver.and_then(|d| d.surname.clone()),
                constructor_name: constructor.and_then(|c| c.name.clone()),
                race_name: race.and_then(|r| r.name.clone()),
                race_date: race.and_then(|r| r.date),
                season: race.and_then(|r| r.season),
            }
        })
        .collect()
}

/// Display name of a driver: "forename surname".
pub fn full_name(driver_id: i64, forename: Option<&str>, surname: Option<&str>) -> String {
    match (forename, surname) {
        (Some(f), Some(s)) => format!("{} {}", f, s),
        (Some(name), None) | (None, Some(name)) => name.to_string(),
        (None, None) => format!("Pilot #{}", driver_id),
    }
}

/// Group the fact table by driver and rank by total points.
///
/// Groups are formed in driver id order; the descending sort is stable so
/// drivers with equal totals keep that order.
pub fn build_leaderboard(fact_table: &[FactRow]) -> Vec<LeaderboardEntry> {
    let mut groups: BTreeMap<i64, LeaderboardEntry> = BTreeMap::new();

    for row in fact_table {
        let entry = groups.entry(row.driver_id).or_insert_with(|| LeaderboardEntry {
            driver_id: row.driver_id,
            forename: row.forename.clone(),
            surname: row.surname.clone(),
            full_name: full_name(row.driver_id, row.forename.as_deref(), row.surname.as_deref()),
            total_points: 0.0,
            rank: 0,
        });
        entry.total_points += row.points;
    }

    let mut leaderboard: Vec<LeaderboardEntry> = groups.into_values().collect();
    leaderboard.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
    for (i, entry) in leaderboard.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    leaderboard
}

/// Sum points per constructor name, optionally for a single driver.
///
/// An unknown driver yields an empty breakdown.
pub fn build_constructor_breakdown(
    fact_table: &[FactRow],
    driver_id: Option<i64>,
) -> Vec<BreakdownRow> {
    let mut groups: BTreeMap<Option<&str>, f64> = BTreeMap::new();

    for row in fact_table {
        if driver_id.is_some_and(|id| id != row.driver_id) {
            continue;
        }
        *groups.entry(row.constructor_name.as_deref()).or_insert(0.0) += row.points;
    }

    let mut breakdown: Vec<BreakdownRow> = groups
        .into_iter()
        .map(|(name, total_points)| BreakdownRow {
            constructor_name: name.map(str::to_string),
            total_points,
        })
        .collect();
    breakdown.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));

    breakdown
}

/// First `n` leaderboard rows.
pub fn top_n(leaderboard: &[LeaderboardEntry], n: usize) -> Vec<LeaderboardEntry> {
    leaderboard.iter().take(n).cloned().collect()
}

/// Options for the driver search dropdown, in leaderboard order.
pub fn driver_options(leaderboard: &[LeaderboardEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    leaderboard
        .iter()
        .filter(|e| seen.insert(e.full_name.as_str()))
        .map(|e| e.full_name.clone())
        .collect()
}

/// What the fact table spans: distinct races and constructors, seasons and
/// race dates. Rows whose race is missing count toward `races` only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coverage {
    pub races: usize,
    pub constructors: usize,
    pub first_season: Option<i32>,
    pub last_season: Option<i32>,
    pub first_race_date: Option<NaiveDate>,
    pub last_race_date: Option<NaiveDate>,
    pub latest_race: Option<String>,
}

pub fn coverage(fact_table: &[FactRow]) -> Coverage {
    let races: HashSet<i64> = fact_table.iter().map(|r| r.race_id).collect();
    let constructors: HashSet<i64> = fact_table.iter().map(|r| r.constructor_id).collect();
    let seasons = fact_table.iter().filter_map(|r| r.season);
    let dates = fact_table.iter().filter_map(|r| r.race_date);

    // Latest dated race; on equal dates the first row in input order wins.
    let latest = fact_table
        .iter()
        .filter(|r| r.race_date.is_some())
        .fold(None::<&FactRow>, |best, row| match best {
            Some(b) if b.race_date >= row.race_date => Some(b),
            _ => Some(row),
        });

    Coverage {
        races: races.len(),
        constructors: constructors.len(),
        first_season: seasons.clone().min(),
        last_season: seasons.max(),
        first_race_date: dates.clone().min(),
        last_race_date: dates.max(),
        latest_race: latest.and_then(|r| r.race_name.clone()),
    }
}

/// Row counts of the loaded tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSizes {
    pub drivers: usize,
    pub constructors: usize,
    pub races: usize,
    pub results: usize,
}

/// Derived tables, computed once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub fact_table: Vec<FactRow>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub sizes: TableSizes,
}

impl DashboardData {
    pub fn build(dataset: &Dataset) -> Self {
        let fact_table = build_fact_table(
            &dataset.results,
            &dataset.drivers,
            &dataset.constructors,
            &dataset.races,
        );
        let leaderboard = build_leaderboard(&fact_table);

        tracing::info!(
            fact_rows = fact_table.len(),
            drivers_ranked = leaderboard.len(),
            "Aggregates built"
        );

        Self {
            fact_table,
            leaderboard,
            sizes: TableSizes {
                drivers: dataset.drivers.len(),
                constructors: dataset.constructors.len(),
                races: dataset.races.len(),
                results: dataset.results.len(),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn driver(id: i64, forename: &str, surname: &str) -> Driver {
        Driver {
            driver_id: id,
            forename: Some(forename.to_string()),
            surname: Some(surname.to_string()),
        }
    }

    fn constructor(id: i64, name: &str) -> Constructor {
        Constructor {
            constructor_id: id,
            name: Some(name.to_string()),
        }
    }

    fn result(race_id: i64, driver_id: i64, constructor_id: i64, points: f64) -> ResultRow {
        ResultRow {
            race_id,
            driver_id,
            constructor_id,
            points,
        }
    }

    /// Small dataset shared with the selection and route tests.
    ///
    /// Totals: Prost 160, Piquet 155, Senna 150, Mansell 40, Alesi 20,
    /// driver 99 (no driver row) 3.
    pub(crate) fn sample_dataset() -> Dataset {
        Dataset {
            drivers: vec![
                driver(102, "Ayrton", "Senna"),
                driver(117, "Alain", "Prost"),
                driver(95, "Nigel", "Mansell"),
                driver(137, "Nelson", "Piquet"),
                driver(55, "Jean", "Alesi"),
            ],
            constructors: vec![
                constructor(1, "McLaren"),
                constructor(3, "Williams"),
                constructor(6, "Ferrari"),
                constructor(22, "Lotus"),
            ],
            races: vec![
                Race {
                    race_id: 1,
                    name: Some("Brazilian Grand Prix".to_string()),
                    date: NaiveDate::from_ymd_opt(1988, 4, 3),
                    season: Some(1988),
                },
                Race {
                    race_id: 2,
                    name: Some("San Marino Grand Prix".to_string()),
                    date: NaiveDate::from_ymd_opt(1988, 5, 1),
                    season: Some(1988),
                },
            ],
            results: vec![
                result(1, 102, 1, 90.0),
                result(1, 117, 1, 100.0),
                result(1, 137, 22, 80.0),
                result(2, 102, 22, 60.0),
                result(2, 117, 6, 60.0),
                result(2, 137, 3, 75.0),
                result(2, 95, 3, 40.0),
                result(2, 55, 6, 20.0),
                // Driver and race missing from their tables.
                result(3, 99, 6, 3.0),
            ],
        }
    }

    fn sample_facts() -> Vec<FactRow> {
        let ds = sample_dataset();
        build_fact_table(&ds.results, &ds.drivers, &ds.constructors, &ds.races)
    }

    #[test]
    fn test_fact_table_keeps_every_result() {
        let ds = sample_dataset();
        let facts = sample_facts();

        assert_eq!(facts.len(), ds.results.len());
        assert_eq!(facts[0].surname.as_deref(), Some("Senna"));
        assert_eq!(facts[0].constructor_name.as_deref(), Some("McLaren"));
        assert_eq!(facts[0].race_name.as_deref(), Some("Brazilian Grand Prix"));
        assert_eq!(facts[0].season, Some(1988));

        let orphan = facts.last().unwrap();
        assert_eq!(orphan.driver_id, 99);
        assert_eq!(orphan.forename, None);
        assert_eq!(orphan.race_name, None);
        assert_eq!(orphan.constructor_name.as_deref(), Some("Ferrari"));
        assert_eq!(orphan.points, 3.0);
    }

    #[test]
    fn test_fact_table_missing_constructor() {
        let results = vec![result(1, 1, 42, 10.0)];
        let drivers = vec![driver(1, "Juan Manuel", "Fangio")];
        let facts = build_fact_table(&results, &drivers, &[], &[]);

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].constructor_name, None);
        assert_eq!(facts[0].forename.as_deref(), Some("Juan Manuel"));
    }

    #[test]
    fn test_leaderboard_order_and_rank() {
        let leaderboard = build_leaderboard(&sample_facts());

        let names: Vec<&str> = leaderboard.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Alain Prost",
                "Nelson Piquet",
                "Ayrton Senna",
                "Nigel Mansell",
                "Jean Alesi",
                "Pilot #99"
            ]
        );

        for (i, entry) in leaderboard.iter().enumerate() {
            assert_eq!(entry.rank, i + 1);
        }
        for pair in leaderboard.windows(2) {
            assert!(pair[0].total_points >= pair[1].total_points);
        }
        assert_eq!(leaderboard[2].total_points, 150.0);
    }

    #[test]
    fn test_leaderboard_conserves_points() {
        let facts = sample_facts();
        let leaderboard = build_leaderboard(&facts);

        let fact_sum: f64 = facts.iter().map(|r| r.points).sum();
        let board_sum: f64 = leaderboard.iter().map(|e| e.total_points).sum();
        assert!((fact_sum - board_sum).abs() < 1e-9);
    }

    #[test]
    fn test_leaderboard_ties_keep_driver_id_order() {
        let results = vec![
            result(1, 30, 1, 10.0),
            result(1, 20, 1, 10.0),
            result(1, 10, 1, 10.0),
        ];
        let drivers = vec![
            driver(10, "Zed", "Zulu"),
            driver(20, "Amy", "Alpha"),
            driver(30, "Bob", "Bravo"),
        ];
        let facts = build_fact_table(&results, &drivers, &[], &[]);
        let leaderboard = build_leaderboard(&facts);

        let ids: Vec<i64> = leaderboard.iter().map(|e| e.driver_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_leaderboard_fractional_points() {
        let results = vec![result(1, 1, 1, 4.5), result(2, 1, 1, 0.5)];
        let facts = build_fact_table(&results, &[], &[], &[]);
        let leaderboard = build_leaderboard(&facts);

        assert_eq!(leaderboard[0].total_points, 5.0);
    }

    #[test]
    fn test_leaderboard_idempotent() {
        let facts = sample_facts();
        assert_eq!(build_leaderboard(&facts), build_leaderboard(&facts));
    }

    #[test]
    fn test_leaderboard_empty() {
        assert!(build_leaderboard(&[]).is_empty());
    }

    #[test]
    fn test_breakdown_all_drivers() {
        let breakdown = build_constructor_breakdown(&sample_facts(), None);

        let rows: Vec<(Option<&str>, f64)> = breakdown
            .iter()
            .map(|r| (r.constructor_name.as_deref(), r.total_points))
            .collect();
        assert_eq!(
            rows,
            vec![
                (Some("McLaren"), 190.0),
                (Some("Lotus"), 140.0),
                (Some("Williams"), 115.0),
                (Some("Ferrari"), 83.0),
            ]
        );
    }

    #[test]
    fn test_breakdown_single_driver() {
        let breakdown = build_constructor_breakdown(&sample_facts(), Some(102));

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].constructor_name.as_deref(), Some("McLaren"));
        assert_eq!(breakdown[0].total_points, 90.0);
        assert_eq!(breakdown[1].constructor_name.as_deref(), Some("Lotus"));
    }

    #[test]
    fn test_breakdown_unknown_driver_is_empty() {
        assert!(build_constructor_breakdown(&sample_facts(), Some(-1)).is_empty());
    }

    #[test]
    fn test_breakdown_sum_decomposition() {
        let facts = sample_facts();
        let all = build_constructor_breakdown(&facts, None);

        let mut summed: HashMap<Option<String>, f64> = HashMap::new();
        for entry in build_leaderboard(&facts) {
            for row in build_constructor_breakdown(&facts, Some(entry.driver_id)) {
                *summed.entry(row.constructor_name).or_insert(0.0) += row.total_points;
            }
        }

        assert_eq!(summed.len(), all.len());
        for row in &all {
            let total = summed[&row.constructor_name];
            assert!((total - row.total_points).abs() < 1e-9);
        }
    }

    #[test]
    fn test_breakdown_keeps_missing_constructor() {
        let results = vec![result(1, 1, 1, 10.0), result(1, 2, 9, 2.0)];
        let constructors = vec![constructor(1, "Ferrari")];
        let facts = build_fact_table(&results, &[], &constructors, &[]);
        let breakdown = build_constructor_breakdown(&facts, None);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[1].constructor_name, None);
        assert_eq!(breakdown[1].total_points, 2.0);
    }

    #[test]
    fn test_top_n() {
        let leaderboard = build_leaderboard(&sample_facts());

        let top = top_n(&leaderboard, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[2].full_name, "Ayrton Senna");

        assert_eq!(top_n(&leaderboard, 100).len(), leaderboard.len());
        assert!(top_n(&leaderboard, 0).is_empty());
    }

    #[test]
    fn test_full_name_fallbacks() {
        assert_eq!(full_name(1, Some("Ayrton"), Some("Senna")), "Ayrton Senna");
        assert_eq!(full_name(1, None, Some("Senna")), "Senna");
        assert_eq!(full_name(7, None, None), "Pilot #7");
    }

    #[test]
    fn test_driver_options_dedupes_names() {
        let mut leaderboard = build_leaderboard(&sample_facts());
        leaderboard[4].full_name = "Alain Prost".to_string();

        let options = driver_options(&leaderboard);
        assert_eq!(options.len(), leaderboard.len() - 1);
        assert_eq!(options[0], "Alain Prost");
    }

    #[test]
    fn test_dashboard_data_build() {
        let data = DashboardData::build(&sample_dataset());

        assert_eq!(data.sizes.results, 9);
        assert_eq!(data.sizes.drivers, 5);
        assert_eq!(data.fact_table.len(), 9);
        assert_eq!(data.leaderboard.len(), 6);
    }

    #[test]
    fn test_coverage() {
        let cov = coverage(&sample_facts());

        // Race 3 has results but no race row.
        assert_eq!(cov.races, 3);
        assert_eq!(cov.constructors, 4);
        assert_eq!(cov.first_season, Some(1988));
        assert_eq!(cov.last_season, Some(1988));
        assert_eq!(cov.first_race_date, NaiveDate::from_ymd_opt(1988, 4, 3));
        assert_eq!(cov.last_race_date, NaiveDate::from_ymd_opt(1988, 5, 1));
        assert_eq!(cov.latest_race.as_deref(), Some("San Marino Grand Prix"));
    }

    #[test]
    fn test_coverage_empty() {
        assert_eq!(coverage(&[]), Coverage::default());
    }
}
