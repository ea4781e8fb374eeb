//! Lap CSV ingestion
//!
//! Reads FastF1-style lap exports (one row per driver-lap) into
//! [`DriverLaps`] tables. Column names are supplied through
//! [`IngestConfig`] rather than hard-wired.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compound::Compound;
use crate::error::{PitwallError, Result};
use crate::laps::{DriverLaps, LapRecord};

/// Column mapping for lap CSV files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub driver_column: String,
    pub lap_number_column: String,
    pub compound_column: String,
    pub lap_time_column: String,
    pub pit_in_column: String,
    pub stint_column: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            driver_column: "DriverNumber".to_string(),
            lap_number_column: "LapNumber".to_string(),
            compound_column: "Compound".to_string(),
            lap_time_column: "LapTime".to_string(),
            pit_in_column: "PitInTime".to_string(),
            stint_column: "Stint".to_string(),
        }
    }
}

/// One parsed CSV row
#[derive(Debug, Clone)]
struct DriverLap {
    driver: Option<String>,
    record: LapRecord,
}

/// Every lap row of a CSV file, across all drivers it contains
#[derive(Debug, Clone)]
pub struct LapTable {
    rows: Vec<DriverLap>,
    has_driver_column: bool,
}

struct Columns {
    driver: Option<usize>,
    lap_number: usize,
    compound: usize,
    lap_time: usize,
    pit_in: Option<usize>,
    stint: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, config: &IngestConfig) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| PitwallError::MissingColumn(name.to_string()));

        Ok(Self {
            driver: find(config.driver_column.as_str()),
            lap_number: require(config.lap_number_column.as_str())?,
            compound: require(config.compound_column.as_str())?,
            lap_time: require(config.lap_time_column.as_str())?,
            pit_in: find(config.pit_in_column.as_str()),
            stint: find(config.stint_column.as_str()),
        })
    }
}

impl LapTable {
    pub fn from_reader<R: Read>(reader: R, config: &IngestConfig) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = Columns::resolve(&headers, config)?;

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);
            rows.push(parse_row(&record, &columns, line)?);
        }

        debug!("Loaded {} lap rows", rows.len());

        Ok(Self {
            rows,
            has_driver_column: columns.driver.is_some(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, config)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct driver ids, numeric ids in numeric order
    pub fn drivers(&self) -> Vec<String> {
        let unique: BTreeSet<&str> = self
            .rows
            .iter()
            .filter_map(|row| row.driver.as_deref())
            .collect();

        let mut drivers: Vec<String> = unique.into_iter().map(str::to_string).collect();
        drivers.sort_by_key(|d| (d.parse::<u32>().unwrap_or(u32::MAX), d.clone()));
        drivers
    }

    /// Lap table for one driver.
    ///
    /// With `driver = None` the file must hold a single driver (or have no
    /// driver column at all).
    pub fn driver_laps(&self, driver: Option<&str>) -> Result<DriverLaps> {
        match driver {
            Some(id) => {
                if !self.has_driver_column {
                    return Err(PitwallError::DriverNotFound(id.to_string()));
                }
                let records: Vec<LapRecord> = self
                    .rows
                    .iter()
                    .filter(|row| row.driver.as_deref() == Some(id))
                    .map(|row| row.record.clone())
                    .collect();
                if records.is_empty() {
                    return Err(PitwallError::DriverNotFound(id.to_string()));
                }
                DriverLaps::with_driver(id, records)
            }
            None => {
                let drivers = self.drivers();
                match drivers.len() {
                    0 => DriverLaps::new(self.rows.iter().map(|row| row.record.clone()).collect()),
                    1 => self.driver_laps(Some(drivers[0].as_str())),
                    _ => Err(PitwallError::MultipleDrivers(drivers)),
                }
            }
        }
    }

    /// One lap table per driver, in [`LapTable::drivers`] order
    pub fn all_drivers(&self) -> Result<Vec<DriverLaps>> {
        let drivers = self.drivers();
        if drivers.is_empty() {
            return Ok(vec![self.driver_laps(None)?]);
        }
        drivers
            .iter()
            .map(|id| self.driver_laps(Some(id.as_str())))
            .collect()
    }
}

/// Load the lap table for a single driver from a CSV file
pub fn load_driver_laps(
    path: impl AsRef<Path>,
    driver: Option<&str>,
    config: &IngestConfig,
) -> Result<DriverLaps> {
    LapTable::from_path(path, config)?.driver_laps(driver)
}

/// Distinct driver ids in a CSV file, numeric ids in numeric order
pub fn list_drivers(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Vec<String>> {
    Ok(LapTable::from_path(path, config)?.drivers())
}

fn parse_row(record: &csv::StringRecord, columns: &Columns, line: u64) -> Result<DriverLap> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let invalid = |reason: String| PitwallError::InvalidRecord { line, reason };

    let lap_cell = cell(columns.lap_number);
    let lap_number = parse_lap_number(lap_cell)
        .ok_or_else(|| invalid(format!("invalid lap number {lap_cell:?}")))?;

    let compound_cell = cell(columns.compound);
    let compound = (!is_missing(compound_cell)).then(|| Compound::from(compound_cell));

    let time_cell = cell(columns.lap_time);
    let lap_time = if is_missing(time_cell) {
        None
    } else {
        Some(parse_lap_time(time_cell).ok_or_else(|| invalid(format!("invalid lap time {time_cell:?}")))?)
    };

    let pit_in = columns.pit_in.is_some_and(|idx| !is_missing(cell(idx)));

    let stint = match columns.stint.map(cell) {
        Some(value) if !is_missing(value) => Some(
            parse_lap_number(value).ok_or_else(|| invalid(format!("invalid stint {value:?}")))?,
        ),
        _ => None,
    };

    let driver = columns
        .driver
        .map(cell)
        .filter(|value| !is_missing(value))
        .map(str::to_string);

    Ok(DriverLap {
        driver,
        record: LapRecord {
            lap_number,
            compound,
            lap_time,
            pit_in,
            stint,
        },
    })
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || ["nan", "nat", "none", "null"]
            .iter()
            .any(|marker| value.eq_ignore_ascii_case(marker))
}

/// Whole positive number, also accepting float text such as `12.0`
fn parse_lap_number(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return Some(n);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) {
        Some(float as u32)
    } else {
        None
    }
}

/// Parse a lap time into seconds.
///
/// Accepts pandas timedelta text (`0 days 00:01:35.123000`), clock text
/// (`1:35.123`, `0:01:35.123`) and plain seconds (`95.123`).
pub fn parse_lap_time(value: &str) -> Option<f64> {
    let value = value.trim();

    let (days, clock) = match value.split_once("days") {
        Some((days, rest)) => (days.trim().parse::<f64>().ok()?, rest.trim()),
        None => match value.split_once("day") {
            Some((days, rest)) => (days.trim().parse::<f64>().ok()?, rest.trim()),
            None => (0.0, value),
        },
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let seconds = match parts.as_slice() {
        [secs] => secs.parse::<f64>().ok()?,
        [mins, secs] => mins.parse::<f64>().ok()? * 60.0 + secs.parse::<f64>().ok()?,
        [hours, mins, secs] => {
            hours.parse::<f64>().ok()? * 3600.0
                + mins.parse::<f64>().ok()? * 60.0
                + secs.parse::<f64>().ok()?
        }
        _ => return None,
    };

    let total = days * 86_400.0 + seconds;
    (total.is_finite() && total >= 0.0).then_some(total)
}
