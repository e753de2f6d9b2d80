//! Database configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use prodcat_core::{StorageConfig, ValidationConfig};

use crate::error::Error;

/// Database configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Storage settings.
    pub storage: StorageConfig,

    /// Category constraint settings.
    pub validation: ValidationConfig,
}

/// On-disk configuration file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    path: Option<PathBuf>,
    cache_capacity: Option<u64>,
    flush_every_ms: Option<u64>,
    validation: ValidationConfig,
}

impl DatabaseConfig {
    /// Create a configuration storing data under `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig::new(path),
            validation: ValidationConfig::default(),
        }
    }

    /// Create an in-memory configuration.
    pub fn temporary() -> Self {
        Self {
            storage: StorageConfig::temporary(),
            validation: ValidationConfig::default(),
        }
    }

    /// Set the validation settings.
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Set the storage settings.
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Parse a JSON configuration.
    ///
    /// Without a `path` the database is temporary.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let file: ConfigFile =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;

        let mut storage = match file.path {
            Some(path) => StorageConfig::new(path),
            None => StorageConfig::temporary(),
        };
        if let Some(bytes) = file.cache_capacity {
            storage = storage.with_cache_capacity(bytes);
        }
        if file.flush_every_ms.is_some() {
            storage = storage.with_flush_every_ms(file.flush_every_ms);
        }

        Ok(Self {
            storage,
            validation: file.validation,
        })
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = DatabaseConfig::from_json(
            r#"{
                "path": "/var/lib/prodcat",
                "cache_capacity": 1024,
                "validation": { "required_accepts_self": true, "max_reported_names": 5 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/var/lib/prodcat"));
        assert_eq!(config.storage.cache_capacity, 1024);
        assert!(!config.storage.temporary);
        assert!(config.validation.required_accepts_self);
        assert_eq!(config.validation.max_reported_names, 5);
        assert!(config.validation.allow_view_assignment);
    }

    #[test]
    fn test_empty_json_is_temporary() {
        let config = DatabaseConfig::from_json("{}").unwrap();
        assert!(config.storage.temporary);
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            DatabaseConfig::from_json("{\"path\": 7"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prodcat.json");
        std::fs::write(&file, r#"{"validation": {"unique_counts_self": true}}"#).unwrap();

        let config = DatabaseConfig::load(&file).unwrap();
        assert!(config.validation.unique_counts_self);

        assert!(matches!(
            DatabaseConfig::load(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
