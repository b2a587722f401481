//! Sector grid generation and land filtering.
//!
//! A grid partitions a country's bounding box into `grid_size²` equal
//! cells in row-major order. Each cell becomes a [`Sector`], the unit of
//! work dispatched to the fetch engine. Sectors are classified as land or
//! water once, at generation time, using the country's declarative rules.

use crate::definition::{CountryDefinition, Region};
use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One cell of the geographic grid.
///
/// Immutable after generation; `is_land` is set exactly once by
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Stable row/column key, e.g. `"12_40"`
    pub id: String,
    /// Latitude of the cell midpoint
    pub lat: f64,
    /// Longitude of the cell midpoint
    pub lng: f64,
    /// Cell bounds
    pub bounds: Region,
    /// Land/water classification, set once at generation
    pub is_land: bool,
}

/// Grid generator for one country.
pub struct Grid {
    definition: CountryDefinition,
    grid_size: usize,
}

impl Grid {
    /// Create a grid over the given country definition.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidGridSize`] when `grid_size` is zero.
    pub fn new(definition: CountryDefinition, grid_size: usize) -> Result<Self> {
        if grid_size == 0 {
            return Err(GridError::InvalidGridSize(grid_size));
        }
        Ok(Self {
            definition,
            grid_size,
        })
    }

    /// The country definition this grid is laid over.
    #[must_use]
    pub fn definition(&self) -> &CountryDefinition {
        &self.definition
    }

    /// The grid density (sectors per axis).
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Generate all sectors, row-major, classified land/water.
    ///
    /// Produces exactly `grid_size²` sectors with cell-midpoint centers.
    /// Deterministic for a fixed definition and size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn generate(&self) -> Vec<Sector> {
        let bounds = &self.definition.country.bounds;
        let size = self.grid_size as f64;
        let lat_step = (bounds.lat_max - bounds.lat_min) / size;
        let lng_step = (bounds.lng_max - bounds.lng_min) / size;

        let mut sectors = Vec::with_capacity(self.grid_size * self.grid_size);

        for i in 0..self.grid_size {
            for j in 0..self.grid_size {
                let lat_min = bounds.lat_min + i as f64 * lat_step;
                let lng_min = bounds.lng_min + j as f64 * lng_step;
                let lat = lat_min + lat_step / 2.0;
                let lng = lng_min + lng_step / 2.0;

                sectors.push(Sector {
                    id: format!("{i}_{j}"),
                    lat,
                    lng,
                    bounds: Region {
                        lat_min,
                        lat_max: lat_min + lat_step,
                        lng_min,
                        lng_max: lng_min + lng_step,
                    },
                    is_land: self.definition.is_land(lat, lng),
                });
            }
        }

        sectors
    }

    /// Summarize a generated sector set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self, sectors: &[Sector]) -> GridStats {
        let total = sectors.len();
        let land = sectors.iter().filter(|s| s.is_land).count();
        let water = total - land;

        GridStats {
            country: self.definition.name().to_string(),
            grid_size: self.grid_size,
            total_sectors: total,
            land_sectors: land,
            water_sectors: water,
            water_elimination: if total == 0 {
                0.0
            } else {
                water as f64 / total as f64
            },
            estimated_requests: land,
        }
    }
}

/// Keep only land sectors.
///
/// Pure filter with no side effects; idempotent.
#[must_use]
pub fn filter_land(sectors: &[Sector]) -> Vec<Sector> {
    sectors.iter().filter(|s| s.is_land).cloned().collect()
}

/// Write a sector set to a JSON file, for grid inspection.
pub fn write_sectors_json(path: impl AsRef<Path>, sectors: &[Sector]) -> Result<()> {
    let json = serde_json::to_string_pretty(sectors)?;
    std::fs::write(path.as_ref(), json)?;
    Ok(())
}

/// Grid generation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GridStats {
    /// Country display name
    pub country: String,
    /// Sectors per axis
    pub grid_size: usize,
    /// Total generated sectors (`grid_size²`)
    pub total_sectors: usize,
    /// Sectors classified as land
    pub land_sectors: usize,
    /// Sectors classified as water
    pub water_sectors: usize,
    /// Fraction of sectors eliminated as water
    pub water_elimination: f64,
    /// Upper bound on fetches the run will issue
    pub estimated_requests: usize,
}
