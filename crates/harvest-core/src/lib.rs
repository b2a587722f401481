//! Harvest Core - Foundation crate for the gridharvest workspace.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other gridharvest crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration and run profiles
//! - [`types`] - Shared newtypes and records (`CountryId`, `SourceTag`, `PlaceRecord`)
//!
//! # Example
//!
//! ```rust
//! use harvest_core::{AppConfig, ProfileName, RunProfile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//!
//! // Pacing is chosen from how many proxies the run can use
//! let profile = RunProfile::auto_select(0);
//! assert_eq!(profile, ProfileName::Slow);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, FetchConfig, GeneralConfig, ProfileName, RunProfile, StorageConfig,
};
pub use error::{ConfigError, ConfigResult, HarvestError, Result};
pub use types::{CountryId, PlaceRecord, SourceTag};
