//! Error types for the grid subsystem.

use thiserror::Error;

/// Errors that can occur in grid and country-definition operations.
#[derive(Error, Debug)]
pub enum GridError {
    /// Country definition not found
    #[error("country not supported: {country_id}")]
    UnsupportedCountry {
        /// The country ID that was not found
        country_id: String,
    },

    /// Failed to load country definition from file
    #[error("failed to load country definition from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse country definition TOML
    #[error("failed to parse country definition TOML in {path}: {source}")]
    ParseError {
        /// Path to the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid country definition (validation failed)
    #[error("invalid country definition for {country_id}: {reason}")]
    ValidationError {
        /// Country ID being validated
        country_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Country definition directory not found
    #[error("country definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// Invalid grid parameters
    #[error("invalid grid size: {0}")]
    InvalidGridSize(usize),

    /// I/O error while accessing country definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize sectors for a dump
    #[error("failed to serialize sectors: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid country ID format
    #[error("invalid country ID: {0}")]
    InvalidId(#[from] harvest_core::HarvestError),
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
