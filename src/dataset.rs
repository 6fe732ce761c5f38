//! Source tables of the Ergast Formula 1 dataset.
//!
//! Loads `drivers.csv`, `constructors.csv`, `races.csv` and `results.csv`
//! into typed rows. The tables are immutable once loaded.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

use crate::config::DatasetPaths;
use crate::error::DataLoadError;

/// Null marker used by the Ergast CSV export.
const NULL_MARKER: &str = "\\N";

/// A driver row.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub driver_id: i64,
    pub forename: Option<String>,
    pub surname: Option<String>,
}

/// A constructor row.
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub constructor_id: i64,
    pub name: Option<String>,
}

/// A race row.
#[derive(Debug, Clone, PartialEq)]
pub struct Race {
    pub race_id: i64,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub season: Option<i32>,
}

/// A single classified result: one driver, one car, one race.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub race_id: i64,
    pub driver_id: i64,
    pub constructor_id: i64,
    pub points: f64,
}

/// The four source tables.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub drivers: Vec<Driver>,
    pub constructors: Vec<Constructor>,
    pub races: Vec<Race>,
    pub results: Vec<ResultRow>,
}

impl Dataset {
    /// Load all four tables. Any failure is fatal for the dashboard.
    pub fn load(paths: &DatasetPaths) -> Result<Self, DataLoadError> {
        let drivers = load_drivers(&paths.drivers)?;
        let constructors = load_constructors(&paths.constructors)?;
        let races = load_races(&paths.races)?;
        let results = load_results(&paths.results)?;

        tracing::info!(
            drivers = drivers.len(),
            constructors = constructors.len(),
            races = races.len(),
            results = results.len(),
            "Dataset loaded"
        );

        Ok(Self {
            drivers,
            constructors,
            races,
            results,
        })
    }
}

/// Expected columns: driverId, forename, surname
pub fn load_drivers<P: AsRef<Path>>(path: P) -> Result<Vec<Driver>, DataLoadError> {
    const TABLE: &str = "drivers";
    let df = read_csv(TABLE, path.as_ref())?;

    let ids = required_ids(&df, TABLE, "driverId")?;
    let forenames = string_column(&df, TABLE, "forename")?;
    let surnames = string_column(&df, TABLE, "surname")?;
    ensure_unique(TABLE, &ids)?;

    Ok(ids
        .into_iter()
        .zip(forenames)
        .zip(surnames)
        .map(|((driver_id, forename), surname)| Driver {
            driver_id,
            forename,
            surname,
        })
        .collect())
}

/// Expected columns: constructorId, name
pub fn load_constructors<P: AsRef<Path>>(path: P) -> Result<Vec<Constructor>, DataLoadError> {
    const TABLE: &str = "constructors";
    let df = read_csv(TABLE, path.as_ref())?;

    let ids = required_ids(&df, TABLE, "constructorId")?;
    let names = string_column(&df, TABLE, "name")?;
    ensure_unique(TABLE, &ids)?;

    Ok(ids
        .into_iter()
        .zip(names)
        .map(|(constructor_id, name)| Constructor {
            constructor_id,
            name,
        })
        .collect())
}

/// Expected columns: raceId, year, name, date
pub fn load_races<P: AsRef<Path>>(path: P) -> Result<Vec<Race>, DataLoadError> {
    const TABLE: &str = "races";
    let df = read_csv(TABLE, path.as_ref())?;

    let ids = required_ids(&df, TABLE, "raceId")?;
    let seasons = i64_column(&df, TABLE, "year")?;
    let names = string_column(&df, TABLE, "name")?;
    let dates = string_column(&df, TABLE, "date")?;
    ensure_unique(TABLE, &ids)?;

    Ok(ids
        .into_iter()
        .zip(seasons)
        .zip(names)
        .zip(dates)
        .map(|(((race_id, season), name), date)| Race {
            race_id,
            name,
            date: date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            season: season.and_then(|s| i32::try_from(s).ok()),
        })
        .collect())
}

/// Expected columns: raceId, driverId, constructorId, points
pub fn load_results<P: AsRef<Path>>(path: P) -> Result<Vec<ResultRow>, DataLoadError> {
    const TABLE: &str = "results";
    let df = read_csv(TABLE, path.as_ref())?;

    let race_ids = required_ids(&df, TABLE, "raceId")?;
    let driver_ids = required_ids(&df, TABLE, "driverId")?;
    let constructor_ids = required_ids(&df, TABLE, "constructorId")?;
    let points = f64_column(&df, TABLE, "points")?;

    let mut rows = Vec::with_capacity(df.height());
    for (i, points) in points.into_iter().enumerate() {
        let points = match points {
            Some(p) if p.is_finite() && p >= 0.0 => p,
            Some(p) => {
                return Err(DataLoadError::InvalidValue {
                    table: TABLE,
                    row: i + 1,
                    column: "points",
                    reason: format!("expected a non-negative number, got {}", p),
                })
            }
            None => {
                return Err(DataLoadError::InvalidValue {
                    table: TABLE,
                    row: i + 1,
                    column: "points",
                    reason: "missing or not numeric".to_string(),
                })
            }
        };

        rows.push(ResultRow {
            race_id: race_ids[i],
            driver_id: driver_ids[i],
            constructor_id: constructor_ids[i],
            points,
        });
    }

    Ok(rows)
}

fn read_csv(table: &'static str, path: &Path) -> Result<DataFrame, DataLoadError> {
    let read_err = |source| DataLoadError::Read {
        table,
        path: path.to_path_buf(),
        source,
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_null_values(Some(NullValues::AllColumnsSingle(NULL_MARKER.into()))),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(read_err)?
        .finish()
        .map_err(read_err)
}

fn column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    name: &'static str,
) -> Result<&'a Column, DataLoadError> {
    df.column(name).map_err(|_| DataLoadError::MissingColumn {
        table,
        column: name,
    })
}

fn cast(
    df: &DataFrame,
    table: &'static str,
    name: &'static str,
    dtype: &DataType,
) -> Result<Column, DataLoadError> {
    column(df, table, name)?
        .cast(dtype)
        .map_err(|source| DataLoadError::Column { table, source })
}

fn i64_column(
    df: &DataFrame,
    table: &'static str,
    name: &'static str,
) -> Result<Vec<Option<i64>>, DataLoadError> {
    let col = cast(df, table, name, &DataType::Int64)?;
    let values = col
        .i64()
        .map_err(|source| DataLoadError::Column { table, source })?;
    Ok(values.into_iter().collect())
}

fn f64_column(
    df: &DataFrame,
    table: &'static str,
    name: &'static str,
) -> Result<Vec<Option<f64>>, DataLoadError> {
    let col = cast(df, table, name, &DataType::Float64)?;
    let values = col
        .f64()
        .map_err(|source| DataLoadError::Column { table, source })?;
    Ok(values.into_iter().collect())
}

fn string_column(
    df: &DataFrame,
    table: &'static str,
    name: &'static str,
) -> Result<Vec<Option<String>>, DataLoadError> {
    let col = cast(df, table, name, &DataType::String)?;
    let values = col
        .str()
        .map_err(|source| DataLoadError::Column { table, source })?;
    Ok(values
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// Id columns must hold a whole number on every row.
///
/// Integer columns are read as-is. Anything else goes through `Float64` so a
/// fractional id such as `1.9` is rejected instead of truncated to `1`.
fn required_ids(
    df: &DataFrame,
    table: &'static str,
    name: &'static str,
) -> Result<Vec<i64>, DataLoadError> {
    let invalid = |row: usize, reason: String| DataLoadError::InvalidValue {
        table,
        row,
        column: name,
        reason,
    };

    if column(df, table, name)?.dtype().is_integer() {
        return i64_column(df, table, name)?
            .into_iter()
            .enumerate()
            .map(|(i, id)| id.ok_or_else(|| invalid(i + 1, "missing id".to_string())))
            .collect();
    }

    f64_column(df, table, name)?
        .into_iter()
        .enumerate()
        .map(|(i, id)| match id {
            Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Ok(v as i64)
            }
            Some(v) => Err(invalid(i + 1, format!("expected an integer id, got {}", v))),
            None => Err(invalid(i + 1, "missing or not an integer id".to_string())),
        })
        .collect()
}

fn ensure_unique(table: &'static str, ids: &[i64]) -> Result<(), DataLoadError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for &id in ids {
        if !seen.insert(id) {
            return Err(DataLoadError::DuplicateKey { table, id });
        }
    }
    Ok(())
}
