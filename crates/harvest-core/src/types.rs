//! Shared types used across the gridharvest workspace.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling for the harvesting pipeline.

use crate::error::HarvestError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for country identifiers with validation.
///
/// Country IDs must be lowercase alphanumeric with hyphens, 2-40 characters,
/// matching the file names under `country-definitions/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryId(String);

impl CountryId {
    /// Create a new `CountryId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, HarvestError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate country ID format: lowercase alphanumeric with hyphens, 2-40 chars.
    fn validate(id: &str) -> Result<(), HarvestError> {
        static COUNTRY_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = COUNTRY_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]*[a-z0-9]$").expect("valid regex"));

        if id.len() < 2 || id.len() > 40 {
            return Err(HarvestError::Validation(format!(
                "invalid country ID: must be 2-40 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(HarvestError::Validation(format!(
                "invalid country ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upstream data sources a record can originate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    /// Map search results with listings embedded in script payloads
    MapSearch,
    /// OpenStreetMap data via the Overpass API
    Overpass,
}

impl SourceTag {
    /// Get a short machine-readable tag, as persisted in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MapSearch => "map-search",
            Self::Overpass => "overpass",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A business listing extracted from one source payload.
///
/// Records are immutable once constructed; the aggregator owns them from
/// extraction until hand-off to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Business name (never empty)
    pub name: String,
    /// Street address, empty when the source omits it
    pub address: String,
    /// Phone number, empty when the source omits it
    pub phone: String,
    /// Website URL, empty when the source omits it
    pub website: String,
    /// Business category, empty when the source omits it
    pub category: String,
    /// Aggregate rating, 0.0 when the source omits it
    pub rating: f64,
    /// Review count, 0 when the source omits it
    pub review_count: u32,
    /// Latitude (sector center when the payload carries none)
    pub latitude: f64,
    /// Longitude (sector center when the payload carries none)
    pub longitude: f64,
    /// Source-scoped identifier, synthesized from coordinates when absent
    pub place_id: String,
    /// Which upstream source produced this record
    pub source: SourceTag,
    /// Opening hours as an opaque structured blob
    pub hours: serde_json::Value,
}

impl PlaceRecord {
    /// Heuristic identity surrogate used to merge near-duplicates.
    ///
    /// Truncated normalized name plus coordinates rounded to three decimal
    /// places. Two distinct nearby businesses with similar names can
    /// collide; that is accepted by design.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        let normalized: String = self
            .name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(20)
            .collect();
        format!(
            "{normalized}_{:.3}_{:.3}",
            round3(self.latitude),
            round3(self.longitude)
        )
    }

    /// Synthesize a place id from raw coordinates, used when a payload
    /// carries no identifier of its own.
    #[must_use]
    pub fn synthesize_place_id(lat: f64, lng: f64) -> String {
        format!("lat{lat}lng{lng}")
    }
}

/// Round a coordinate to three decimal places.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
