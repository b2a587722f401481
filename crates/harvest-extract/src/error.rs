//! Error types for the extraction subsystem.
//!
//! Extraction failures are structured so callers can tell "no data" apart
//! from "the source changed shape"; the engine absorbs both into empty
//! results but counts the latter separately.

use thiserror::Error;

/// Errors that can occur while extracting records from a payload.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The response body contains no recognizable payload envelope
    #[error("no recognizable payload envelope in response body")]
    NoEnvelope,

    /// A payload envelope was found but its contents are not valid JSON
    #[error("payload envelope is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload parsed but its structure is not the expected shape
    #[error("unexpected payload shape: {reason}")]
    UnexpectedShape {
        /// What was missing or malformed
        reason: String,
    },
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
