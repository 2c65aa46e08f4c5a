//! Data-driven action templates and scenario loaders.
//!
//! This crate turns data files into things the resolution core can run:
//! - Action templates (RON): an action kind plus the effect handlers it carries
//! - Duel scripts (RON): who fights, where they start and what they queue
//! - Core configuration (TOML)
//!
//! [`TemplateFactory`] implements the core's [`ActionFactory`](skirmish_core::ActionFactory),
//! so callers build actions by kind without knowing which components make them up.

pub mod duel;
pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use duel::{DuelSpec, DuelistSpec};
pub use templates::{ActionTemplate, EffectSpec, FactoryError, TemplateFactory, TemplateRegistry};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, DuelLoader, TemplateLoader};
