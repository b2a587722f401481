//! In-memory country definition registry.

use crate::{
    definition::CountryDefinition,
    error::{GridError, Result},
    loader::CountryLoader,
};
use harvest_core::CountryId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory cache of country definitions.
///
/// The registry loads definitions from disk and caches them in memory
/// for fast lookups by country ID.
#[derive(Clone)]
pub struct CountryRegistry {
    /// Cached country definitions, indexed by country ID
    definitions: Arc<RwLock<HashMap<CountryId, CountryDefinition>>>,
}

impl CountryRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry and load all definitions from the given loader.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &CountryLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Reload all country definitions from the loader.
    ///
    /// This replaces the current cache with freshly loaded definitions.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn reload(&self, loader: &CountryLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();

        for definition in definitions {
            let country_id = definition.id().clone();
            cache.insert(country_id, definition);
        }

        info!(count = cache.len(), "reloaded country definitions");

        Ok(())
    }

    /// Get a country definition by ID.
    ///
    /// # Errors
    /// Returns [`GridError::UnsupportedCountry`] if the country is not known.
    pub fn get(&self, country_id: &CountryId) -> Result<CountryDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache
            .get(country_id)
            .cloned()
            .ok_or_else(|| GridError::UnsupportedCountry {
                country_id: country_id.to_string(),
            })
    }

    /// Get all country definitions.
    #[must_use]
    pub fn get_all(&self) -> Vec<CountryDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.values().cloned().collect()
    }

    /// Get all country IDs in the registry.
    #[must_use]
    pub fn get_all_ids(&self) -> Vec<CountryId> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.keys().cloned().collect()
    }

    /// Get the total number of countries in the registry.
    #[must_use]
    pub fn count(&self) -> usize {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.len()
    }

    /// Check if a country exists in the registry.
    #[must_use]
    pub fn contains(&self, country_id: &CountryId) -> bool {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.contains_key(country_id)
    }

    /// Add or update a country definition in the registry.
    ///
    /// This is useful for testing or dynamic updates.
    pub fn insert(&self, definition: CountryDefinition) -> Result<()> {
        // Validate before inserting
        definition.validate()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        let country_id = definition.id().clone();
        cache.insert(country_id.clone(), definition);

        debug!(country_id = %country_id, "inserted country definition");

        Ok(())
    }
}

impl Default for CountryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
