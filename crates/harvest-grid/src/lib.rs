//! Harvest Grid - Geographic sector generation and land filtering.
//!
//! This crate partitions a country's bounding box into a grid of sectors
//! and prunes the ones unlikely to yield results (open sea, neighboring
//! territory). Country geography is data-driven: each country is a TOML
//! definition carrying its bounding box and an ordered list of
//! include/exclude classification rules, evaluated first-match-wins.
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_grid::{CountryLoader, CountryRegistry, Grid, filter_land};
//! use harvest_core::CountryId;
//!
//! let loader = CountryLoader::with_default_dir()?;
//! let registry = CountryRegistry::load_from(&loader)?;
//!
//! let definition = registry.get(&CountryId::new("spain")?)?;
//! let grid = Grid::new(definition, 165)?;
//! let sectors = grid.generate();
//! let land = filter_land(&sectors);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod grid;
pub mod loader;
pub mod registry;

// Re-export commonly used types
pub use definition::{ClassificationRule, CountryDefinition, CountryMetadata, Region, RuleEffect};
pub use error::{GridError, Result};
pub use grid::{filter_land, write_sectors_json, Grid, GridStats, Sector};
pub use loader::CountryLoader;
pub use registry::CountryRegistry;
