//! Driver-level aggregate features

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::compound::Compound;
use crate::laps::DriverLaps;

/// Aggregate features for one driver's race, computed over timed laps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub driver: Option<String>,
    pub laps_completed: u32,
    pub timed_laps: usize,
    pub avg_lap_time: Option<f64>,
    pub total_pit_stops: usize,
    pub num_stints: usize,
    pub main_compound: Option<Compound>,
}

impl DriverSummary {
    pub fn from_laps(laps: &DriverLaps) -> Self {
        let timed: Vec<_> = laps
            .records()
            .iter()
            .filter(|r| r.lap_time.is_some())
            .collect();

        let avg_lap_time = if timed.is_empty() {
            None
        } else {
            let total: f64 = timed.iter().filter_map(|r| r.lap_time).sum();
            Some(total / timed.len() as f64)
        };

        let total_pit_stops = timed.iter().filter(|r| r.pit_in).count();

        let stint_ids: BTreeSet<u32> = timed.iter().filter_map(|r| r.stint).collect();
        let num_stints = if stint_ids.is_empty() {
            total_pit_stops + 1
        } else {
            stint_ids.len()
        };

        let main_compound = mode_compound(timed.iter().filter_map(|r| r.compound.as_ref()));

        Self {
            driver: laps.driver().map(str::to_string),
            laps_completed: timed.iter().map(|r| r.lap_number).max().unwrap_or(0),
            timed_laps: timed.len(),
            avg_lap_time,
            total_pit_stops,
            num_stints,
            main_compound,
        }
    }
}

/// Most frequent compound; ties go to the lexicographically smallest label
fn mode_compound<'a>(compounds: impl Iterator<Item = &'a Compound>) -> Option<Compound> {
    let mut counts: HashMap<&Compound, usize> = HashMap::new();
    for compound in compounds {
        *counts.entry(compound).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|(a, count_a), (b, count_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| b.as_str().cmp(a.as_str()))
        })
        .map(|(compound, _)| compound.clone())
}
