//! Pitwall Core - lap data types, ingestion and shared functionality
//!
//! This crate provides the race data model consumed by the strategy
//! simulator: tire compounds, per-lap records for one driver, driver-level
//! summary features and the CSV ingestion that produces them.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod compound;
pub mod error;
pub mod ingest;
pub mod laps;
pub mod summary;

pub use compound::Compound;
pub use error::{PitwallError, Result};
pub use ingest::{list_drivers, load_driver_laps, IngestConfig, LapTable};
pub use laps::{DriverLaps, LapRecord, MAX_LAP_NUMBER};
pub use summary::DriverSummary;
