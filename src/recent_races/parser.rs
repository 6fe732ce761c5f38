//! Parser for the Ergast `results/1.json` payload.
//!
//! Structure: `MRData.RaceTable.Races[]`, each race with `raceName`, `date`,
//! `Circuit { circuitName, Location { locality, country } }` and
//! `Results[]` holding the winner's `Driver` and `Constructor`.

use serde::Deserialize;

use super::RaceSummary;
use crate::error::ExternalFetchError;

#[derive(Deserialize)]
struct Payload {
    #[serde(rename = "MRData")]
    mr_data: MrData,
}

#[derive(Deserialize)]
struct MrData {
    #[serde(rename = "RaceTable")]
    race_table: RaceTable,
}

#[derive(Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<ApiRace>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRace {
    race_name: String,
    date: String,
    #[serde(rename = "Circuit")]
    circuit: ApiCircuit,
    #[serde(rename = "Results", default)]
    results: Vec<ApiResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCircuit {
    circuit_name: String,
    #[serde(rename = "Location")]
    location: ApiLocation,
}

#[derive(Deserialize)]
struct ApiLocation {
    #[serde(default)]
    locality: String,
    #[serde(default)]
    country: String,
}

#[derive(Deserialize)]
struct ApiResult {
    #[serde(rename = "Driver")]
    driver: ApiDriver,
    #[serde(rename = "Constructor")]
    constructor: ApiConstructor,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDriver {
    given_name: String,
    family_name: String,
}

#[derive(Deserialize)]
struct ApiConstructor {
    name: String,
}

/// Parse race winners in API order (ascending by round).
///
/// Races without a classified result are skipped.
pub fn parse_race_winners(body: &str) -> Result<Vec<RaceSummary>, ExternalFetchError> {
    let payload: Payload = serde_json::from_str(body)?;

    Ok(payload
        .mr_data
        .race_table
        .races
        .into_iter()
        .filter_map(|race| {
            let winner = race.results.into_iter().next()?;
            let location = match (
                race.circuit.location.locality.is_empty(),
                race.circuit.location.country.is_empty(),
            ) {
                (false, false) => format!(
                    "{}, {}",
                    race.circuit.location.locality, race.circuit.location.country
                ),
                (false, true) => race.circuit.location.locality,
                (true, _) => race.circuit.location.country,
            };

            Some(RaceSummary {
                race_name: race.race_name,
                circuit: race.circuit.circuit_name,
                location,
                date: race.date,
                winner: format!("{} {}", winner.driver.given_name, winner.driver.family_name),
                team: winner.constructor.name,
            })
        })
        .collect())
}

/// The last `limit` races, most recent first.
pub fn most_recent(mut races: Vec<RaceSummary>, limit: usize) -> Vec<RaceSummary> {
    races.reverse();
    races.truncate(limit);
    races
}
