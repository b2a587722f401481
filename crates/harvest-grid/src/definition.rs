//! Country definition types and structures.
//!
//! This module defines the data structures for country definitions loaded
//! from TOML files. A definition carries the country's bounding box plus an
//! ordered list of declarative classification rules, so adding a country is
//! configuration rather than code.

use crate::error::{GridError, Result};
use harvest_core::CountryId;
use serde::{Deserialize, Serialize};

/// Complete country definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryDefinition {
    /// Core country metadata
    pub country: CountryMetadata,

    /// Ordered land/water classification rules, first match wins.
    ///
    /// Empty for countries where the plain bounding box is good enough.
    #[serde(default)]
    pub rules: Vec<ClassificationRule>,

    /// Final containment check applied when no rule matches.
    ///
    /// Defaults to the country bounds when absent. Countries with complex
    /// coastlines declare a tighter core region here.
    #[serde(default)]
    pub land_bounds: Option<Region>,
}

impl CountryDefinition {
    /// Get the country ID.
    #[must_use]
    pub fn id(&self) -> &CountryId {
        &self.country.id
    }

    /// Get the country display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.country.name
    }

    /// Validate the country definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.country.name.is_empty() {
            return Err(GridError::ValidationError {
                country_id: self.country.id.to_string(),
                reason: "country name cannot be empty".to_string(),
            });
        }

        self.country
            .bounds
            .validate()
            .map_err(|reason| GridError::ValidationError {
                country_id: self.country.id.to_string(),
                reason: format!("bounds: {reason}"),
            })?;

        if let Some(land_bounds) = &self.land_bounds {
            land_bounds
                .validate()
                .map_err(|reason| GridError::ValidationError {
                    country_id: self.country.id.to_string(),
                    reason: format!("land_bounds: {reason}"),
                })?;
        }

        for (index, rule) in self.rules.iter().enumerate() {
            rule.region
                .validate()
                .map_err(|reason| GridError::ValidationError {
                    country_id: self.country.id.to_string(),
                    reason: format!("rule {index}: {reason}"),
                })?;
        }

        if let Some(ratio) = self.country.expected_water_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(GridError::ValidationError {
                    country_id: self.country.id.to_string(),
                    reason: format!("expected_water_ratio must be 0.0-1.0, got {ratio}"),
                });
            }
        }

        Ok(())
    }

    /// Classify a point as land or water.
    ///
    /// Rules are evaluated in declaration order and the first region
    /// containing the point decides. When no rule matches, the point is
    /// land iff it sits inside `land_bounds` (or the country bounds when
    /// no tighter core region is declared). This is a hand-tuned
    /// heuristic, not geometric ground truth; coastal sectors can be
    /// misclassified.
    #[must_use]
    pub fn is_land(&self, lat: f64, lng: f64) -> bool {
        for rule in &self.rules {
            if rule.region.contains(lat, lng) {
                return matches!(rule.effect, RuleEffect::Include);
            }
        }

        self.land_bounds
            .as_ref()
            .unwrap_or(&self.country.bounds)
            .contains(lat, lng)
    }
}

/// Core country metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryMetadata {
    /// Unique country identifier (e.g., "spain", "france")
    pub id: CountryId,

    /// Human-readable country name
    pub name: String,

    /// Bounding box the grid is laid over
    pub bounds: Region,

    /// Rough fraction of grid sectors expected to be water, for sanity
    /// reporting only
    #[serde(default)]
    pub expected_water_ratio: Option<f64>,
}

/// Axis-aligned latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Southern edge
    pub lat_min: f64,
    /// Northern edge
    pub lat_max: f64,
    /// Western edge
    pub lng_min: f64,
    /// Eastern edge
    pub lng_max: f64,
}

impl Region {
    /// Whether the region contains the given point (edges inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lng_min..=self.lng_max).contains(&lng)
    }

    /// Check that edges are ordered and within valid coordinate ranges.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.lat_min >= self.lat_max {
            return Err(format!(
                "lat_min ({}) must be below lat_max ({})",
                self.lat_min, self.lat_max
            ));
        }
        if self.lng_min >= self.lng_max {
            return Err(format!(
                "lng_min ({}) must be below lng_max ({})",
                self.lng_min, self.lng_max
            ));
        }
        if self.lat_min < -90.0 || self.lat_max > 90.0 {
            return Err(format!(
                "latitude range {}..{} outside -90..90",
                self.lat_min, self.lat_max
            ));
        }
        if self.lng_min < -180.0 || self.lng_max > 180.0 {
            return Err(format!(
                "longitude range {}..{} outside -180..180",
                self.lng_min, self.lng_max
            ));
        }
        Ok(())
    }
}

/// One ordered land/water classification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Whether a point inside the region is land or water
    pub effect: RuleEffect,

    /// The region this rule covers
    pub region: Region,

    /// Optional human-readable label ("Bay of Biscay", "Canary Islands")
    #[serde(default)]
    pub label: Option<String>,
}

/// Effect of a matching classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleEffect {
    /// Points inside the region are land
    Include,
    /// Points inside the region are water (or otherwise out of scope)
    Exclude,
}
