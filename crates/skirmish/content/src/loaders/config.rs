//! Core configuration loader.

use std::path::Path;

use skirmish_core::CoreConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CoreConfig`] from TOML files. Missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing `CoreConfig`
    ///
    /// # Returns
    ///
    /// Returns a `CoreConfig`; missing fields take their defaults.
    pub fn load(path: &Path) -> LoadResult<CoreConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<CoreConfig> {
        toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}
