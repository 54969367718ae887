//! Errors
//!
//! Custom error types used throughout the `churn_drift` crate.
use thiserror::Error;

/// Errors that can occur while ingesting histories or walking windows.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// A player identifier appeared more than once in the input.
    #[error("Duplicate player id {0} found during ingestion.")]
    DuplicatePlayer(String),
    /// A player's history does not span the same number of days as the rest.
    #[error("Player {player} has a history of {found} days, expected {expected}.")]
    UnevenHistory {
        player: String,
        expected: usize,
        found: usize,
    },
    /// A player expected by the accepted threshold state is missing from a window record.
    #[error("Player {0} is missing from a window record, all records must share the same player set.")]
    InconsistentRecords(String),
    /// Unable to write records or reports to file.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read records from a file.
    #[error("Unable to read from a file {0}")]
    UnableToRead(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
}
