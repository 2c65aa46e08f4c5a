//! Loaders reading content from RON/TOML files.
//!
//! Each loader has a `load(path)` for data directories and a `parse(text)`
//! used for the embedded defaults.

pub mod config;
pub mod duel;
pub mod factory;
pub mod templates;

pub use config::ConfigLoader;
pub use duel::DuelLoader;
pub use factory::ContentFactory;
pub use templates::TemplateLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
