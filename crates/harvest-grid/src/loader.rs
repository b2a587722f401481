//! Country definition loading from TOML files.
//!
//! This module handles loading country definitions from the
//! `country-definitions/` directory.

use crate::{
    definition::CountryDefinition,
    error::{GridError, Result},
};
use harvest_core::CountryId;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loader for country definitions from TOML files.
pub struct CountryLoader {
    /// Base directory containing country definitions
    definitions_dir: PathBuf,
}

impl CountryLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.exists() || !definitions_dir.is_dir() {
            return Err(GridError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Create a loader using the default definitions directory.
    ///
    /// Looks for `country-definitions/` relative to the workspace root.
    ///
    /// # Errors
    /// Returns error if the default directory doesn't exist.
    pub fn with_default_dir() -> Result<Self> {
        // Find workspace root by looking for Cargo.toml with [workspace]
        let mut current_dir = std::env::current_dir()?;

        loop {
            let cargo_toml = current_dir.join("Cargo.toml");
            if cargo_toml.exists() {
                if let Ok(contents) = std::fs::read_to_string(&cargo_toml) {
                    if contents.contains("[workspace]") {
                        let definitions_dir = current_dir.join("country-definitions");
                        return Self::new(definitions_dir);
                    }
                }
            }

            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        // Fallback: try relative path
        let definitions_dir = PathBuf::from("country-definitions");
        Self::new(definitions_dir)
    }

    /// Load a single country definition by ID.
    ///
    /// # Errors
    /// Returns error if the definition file doesn't exist, can't be read,
    /// or is invalid.
    pub fn load(&self, country_id: &CountryId) -> Result<CountryDefinition> {
        let definition = self.find_and_load(country_id)?;

        // Validate after loading
        definition.validate()?;

        debug!(
            country_id = %country_id,
            name = %definition.name(),
            rules = definition.rules.len(),
            "loaded country definition"
        );

        Ok(definition)
    }

    /// Load all country definitions from the definitions directory.
    ///
    /// Invalid definitions are logged as warnings and skipped.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<CountryDefinition>> {
        let mut definitions = Vec::new();

        Self::walk_and_load_recursive(&self.definitions_dir, &mut definitions)?;

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded country definitions"
        );

        Ok(definitions)
    }

    /// Recursively walk directory and load all TOML files.
    fn walk_and_load_recursive(dir: &Path, definitions: &mut Vec<CountryDefinition>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                Self::walk_and_load_recursive(&path, definitions)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                match Self::load_from_path(&path) {
                    Ok(definition) => {
                        if let Err(e) = definition.validate() {
                            warn!(
                                path = %path.display(),
                                error = %e,
                                "skipping invalid country definition"
                            );
                            continue;
                        }
                        definitions.push(definition);
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to load country definition"
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Find and load a country definition file by ID.
    fn find_and_load(&self, country_id: &CountryId) -> Result<CountryDefinition> {
        let filename = format!("{}.toml", country_id.as_str());

        if let Some(path) = Self::find_file_recursive(&self.definitions_dir, &filename)? {
            Self::load_from_path(&path)
        } else {
            Err(GridError::UnsupportedCountry {
                country_id: country_id.to_string(),
            })
        }
    }

    /// Recursively search for a file by name.
    fn find_file_recursive(dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                if let Some(found) = Self::find_file_recursive(&path, filename)? {
                    return Ok(Some(found));
                }
            } else if path.file_name().and_then(|s| s.to_str()) == Some(filename) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Load a country definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<CountryDefinition> {
        let contents = std::fs::read_to_string(path).map_err(|e| GridError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| GridError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_definition(dir: &Path, country_id: &str) -> PathBuf {
        let file_path = dir.join(format!("{country_id}.toml"));

        let content = format!(
            r#"
[country]
id = "{country_id}"
name = "Test Country"
expected_water_ratio = 0.4

[country.bounds]
lat_min = 40.0
lat_max = 50.0
lng_min = -5.0
lng_max = 5.0

[[rules]]
effect = "exclude"
label = "northern sea"

[rules.region]
lat_min = 48.0
lat_max = 50.0
lng_min = -5.0
lng_max = 5.0
"#
        );

        std::fs::write(&file_path, content).expect("write test file");
        file_path
    }

    #[test]
    fn test_loader_new_with_existing_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        assert!(CountryLoader::new(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_loader_new_with_nonexistent_dir() {
        let loader = CountryLoader::new("/nonexistent/path/to/definitions");
        assert!(matches!(
            loader,
            Err(GridError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_load_single_country() {
        let temp_dir = TempDir::new().expect("create temp dir");
        write_definition(temp_dir.path(), "testland");

        let loader = CountryLoader::new(temp_dir.path()).expect("create loader");
        let country_id = CountryId::new("testland").expect("valid country ID");
        let definition = loader.load(&country_id).expect("load country definition");

        assert_eq!(definition.id(), &country_id);
        assert_eq!(definition.name(), "Test Country");
        assert_eq!(definition.rules.len(), 1);
        // The rule excludes the northern strip
        assert!(!definition.is_land(49.0, 0.0));
        assert!(definition.is_land(45.0, 0.0));
    }

    #[test]
    fn test_load_unknown_country() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let loader = CountryLoader::new(temp_dir.path()).expect("create loader");
        let country_id = CountryId::new("atlantis").expect("valid country ID");

        let result = loader.load(&country_id);
        assert!(matches!(
            result,
            Err(GridError::UnsupportedCountry { .. })
        ));
    }

    #[test]
    fn test_load_all_countries() {
        let temp_dir = TempDir::new().expect("create temp dir");
        write_definition(temp_dir.path(), "alpha");
        write_definition(temp_dir.path(), "beta");

        let nested = temp_dir.path().join("islands");
        std::fs::create_dir_all(&nested).expect("create nested dir");
        write_definition(&nested, "gamma");

        let loader = CountryLoader::new(temp_dir.path()).expect("create loader");
        let definitions = loader.load_all().expect("load all definitions");

        assert_eq!(definitions.len(), 3);
    }

    #[test]
    fn test_load_all_skips_invalid() {
        let temp_dir = TempDir::new().expect("create temp dir");
        write_definition(temp_dir.path(), "valid-country");

        let invalid_path = temp_dir.path().join("broken.toml");
        std::fs::write(&invalid_path, "invalid toml content [[[").expect("write invalid file");

        let loader = CountryLoader::new(temp_dir.path()).expect("create loader");
        let definitions = loader.load_all().expect("load all definitions");

        assert_eq!(definitions.len(), 1);
    }
}
