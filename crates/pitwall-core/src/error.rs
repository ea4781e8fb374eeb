//! Error types for Pitwall

use thiserror::Error;

/// Main error type for Pitwall
#[derive(Error, Debug)]
pub enum PitwallError {
    #[error("No lap records supplied")]
    NoLaps,

    #[error("No tire compounds present in lap data")]
    EmptyCompoundSet,

    #[error("Invalid action: {0:?} (expected \"stay\" or \"pit\")")]
    InvalidAction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    #[error("Lap data holds several drivers ({}), select one", .0.join(", "))]
    MultipleDrivers(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pitwall operations
pub type Result<T> = std::result::Result<T, PitwallError>;
