//! Content factory loading everything from one data directory.

use std::path::{Path, PathBuf};

use skirmish_core::CoreConfig;

use crate::duel::DuelSpec;
use crate::loaders::{ConfigLoader, DuelLoader, LoadResult, TemplateLoader};
use crate::templates::{TemplateFactory, TemplateRegistry};

const EMBEDDED_CONFIG: &str = include_str!("../../data/config.toml");
const EMBEDDED_ACTIONS: &str = include_str!("../../data/actions.ron");
const EMBEDDED_DUEL: &str = include_str!("../../data/duel.ron");

/// Loads content from a data directory, or from the data set compiled into
/// the crate when no directory is given.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── actions.ron
/// └── duel.ron
/// ```
#[derive(Clone, Debug, Default)]
pub struct ContentFactory {
    data_dir: Option<PathBuf>,
}

impl ContentFactory {
    /// Creates a content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
        }
    }

    /// Factory serving the embedded data set.
    pub fn embedded() -> Self {
        Self { data_dir: None }
    }

    /// Load core configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CoreConfig> {
        match &self.data_dir {
            Some(dir) => ConfigLoader::load(&dir.join("config.toml")),
            None => ConfigLoader::parse(EMBEDDED_CONFIG),
        }
    }

    /// Load action templates from `actions.ron`.
    pub fn load_templates(&self) -> LoadResult<TemplateRegistry> {
        match &self.data_dir {
            Some(dir) => TemplateLoader::load(&dir.join("actions.ron")),
            None => TemplateLoader::parse(EMBEDDED_ACTIONS),
        }
    }

    /// Load the duel script from `duel.ron`.
    pub fn load_duel(&self) -> LoadResult<DuelSpec> {
        match &self.data_dir {
            Some(dir) => DuelLoader::load(&dir.join("duel.ron")),
            None => DuelLoader::parse(EMBEDDED_DUEL),
        }
    }

    /// Template registry wrapped as an action factory.
    pub fn action_factory(&self) -> LoadResult<TemplateFactory> {
        Ok(TemplateFactory::new(self.load_templates()?))
    }

    /// Data directory, or `None` for the embedded data set.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}
