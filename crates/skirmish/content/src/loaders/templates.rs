//! Action template loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::templates::{ActionTemplate, TemplateRegistry};

/// Loader for action templates from RON files.
///
/// RON format: `Vec<ActionTemplate>`.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load action templates from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a list of `ActionTemplate`s
    ///
    /// # Returns
    ///
    /// Returns a `TemplateRegistry`. Duplicate kinds are an error.
    pub fn load(path: &Path) -> LoadResult<TemplateRegistry> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse action templates from RON text.
    pub fn parse(content: &str) -> LoadResult<TemplateRegistry> {
        let templates: Vec<ActionTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse action templates RON: {}", e))?;
        Ok(TemplateRegistry::from_templates(templates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::EffectSpec;
    use skirmish_core::Bonus;

    #[test]
    fn parses_every_effect_shape() {
        let registry = TemplateLoader::parse(
            r#"[
                (kind: "rally", effects: [Empower(Flat(2)), Armor(1)]),
                (kind: "feint", effects: [Stagger(reason: "feint", priority: Some(-1))]),
                (kind: "lunge", effects: [Attack(2)], follows_predecessor: true),
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get("rally").unwrap().effects,
            vec![EffectSpec::Empower(Bonus::Flat(2)), EffectSpec::Armor(1)]
        );
        assert!(registry.get("lunge").unwrap().follows_predecessor);
        assert!(!registry.get("rally").unwrap().follows_predecessor);
    }

    #[test]
    fn stagger_priority_is_optional() {
        let registry =
            TemplateLoader::parse(r#"[(kind: "trip", effects: [Stagger(reason: "tripped")])]"#)
                .unwrap();
        assert_eq!(
            registry.get("trip").unwrap().effects,
            vec![EffectSpec::Stagger {
                reason: "tripped".into(),
                priority: None
            }]
        );
    }

    #[test]
    fn duplicate_kinds_fail_the_load() {
        let err = TemplateLoader::parse(
            r#"[(kind: "jab", effects: []), (kind: "jab", effects: [Attack(1)])]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("jab"));
    }
}
