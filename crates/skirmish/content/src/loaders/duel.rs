//! Duel script loader.

use std::path::Path;

use crate::duel::DuelSpec;
use crate::loaders::{LoadResult, read_file};

pub struct DuelLoader;

impl DuelLoader {
    /// Load a duel script from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a `DuelSpec`
    pub fn load(path: &Path) -> LoadResult<DuelSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a duel script from RON text.
    pub fn parse(content: &str) -> LoadResult<DuelSpec> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse duel RON: {}", e))
    }
}
