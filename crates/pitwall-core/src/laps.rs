//! Per-lap records and the single-driver lap table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compound::Compound;
use crate::error::{PitwallError, Result};

/// Highest lap number accepted in lap data
pub const MAX_LAP_NUMBER: u32 = 1_000;

/// One timed lap of one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub lap_number: u32,
    pub compound: Option<Compound>,
    /// Recorded lap time in seconds
    pub lap_time: Option<f64>,
    #[serde(default)]
    pub pit_in: bool,
    #[serde(default)]
    pub stint: Option<u32>,
}

impl LapRecord {
    pub fn new(lap_number: u32, compound: Option<Compound>, lap_time: Option<f64>) -> Self {
        Self {
            lap_number,
            compound,
            lap_time,
            pit_in: false,
            stint: None,
        }
    }

    pub fn with_pit_in(mut self, pit_in: bool) -> Self {
        self.pit_in = pit_in;
        self
    }

    pub fn with_stint(mut self, stint: u32) -> Self {
        self.stint = Some(stint);
        self
    }
}

/// Lap time-series for exactly one driver across one race.
///
/// Immutable once built. Lap numbers may repeat (duplicate timing rows) and
/// may have gaps; lookups average duplicates and report gaps as `None`.
#[derive(Debug, Clone, Serialize)]
pub struct DriverLaps {
    driver: Option<String>,
    records: Vec<LapRecord>,
    #[serde(skip)]
    base_times: BTreeMap<u32, f64>,
}

impl DriverLaps {
    pub fn new(records: Vec<LapRecord>) -> Result<Self> {
        Self::build(None, records)
    }

    pub fn with_driver(driver: impl Into<String>, records: Vec<LapRecord>) -> Result<Self> {
        Self::build(Some(driver.into()), records)
    }

    fn build(driver: Option<String>, records: Vec<LapRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(PitwallError::NoLaps);
        }

        let mut sums: BTreeMap<u32, (f64, u32)> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            if record.lap_number == 0 || record.lap_number > MAX_LAP_NUMBER {
                return Err(PitwallError::InvalidRecord {
                    line: idx as u64 + 1,
                    reason: format!(
                        "lap number {} outside 1..={MAX_LAP_NUMBER}",
                        record.lap_number
                    ),
                });
            }
            if let Some(time) = record.lap_time {
                if !time.is_finite() || time < 0.0 {
                    return Err(PitwallError::InvalidRecord {
                        line: idx as u64 + 1,
                        reason: format!("lap time {time} is not a non-negative duration"),
                    });
                }
                let entry = sums.entry(record.lap_number).or_insert((0.0, 0));
                entry.0 += time;
                entry.1 += 1;
            }
        }

        let base_times = sums
            .into_iter()
            .map(|(lap, (sum, count))| (lap, sum / f64::from(count)))
            .collect();

        Ok(Self {
            driver,
            records,
            base_times,
        })
    }

    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    pub fn records(&self) -> &[LapRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest lap number present
    pub fn total_laps(&self) -> u32 {
        self.records
            .iter()
            .map(|r| r.lap_number)
            .max()
            .unwrap_or(0)
    }

    /// Mean recorded lap time for `lap`, or `None` when the lap was never timed
    pub fn base_lap_time(&self, lap: u32) -> Option<f64> {
        self.base_times.get(&lap).copied()
    }

    /// Number of distinct lap numbers with at least one recorded time
    pub fn timed_lap_count(&self) -> usize {
        self.base_times.len()
    }

    /// Distinct compounds in first-seen order, missing values skipped
    pub fn compounds(&self) -> Vec<Compound> {
        let mut seen: Vec<Compound> = Vec::new();
        for compound in self.records.iter().filter_map(|r| r.compound.as_ref()) {
            if !seen.contains(compound) {
                seen.push(compound.clone());
            }
        }
        seen
    }
}
