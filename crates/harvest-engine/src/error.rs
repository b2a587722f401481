//! Error types for the fetch engine.
//!
//! Per-sector fetch failures are absorbed into empty results and counters;
//! the only errors surfaced to the caller of a run are configuration
//! problems discovered before any fetch begins.

use thiserror::Error;

/// Errors that can abort a harvest run before fetching starts.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Grid or country-definition error (unknown country, bad definition)
    #[error("grid error: {0}")]
    Grid(#[from] harvest_grid::GridError),

    /// I/O error reading run inputs such as the proxy list
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
