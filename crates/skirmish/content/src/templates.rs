//! Action templates and the factory that builds actions from them.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use skirmish_core::effects::{
    AreaEffect, ArmorEffect, AttackEffect, BlockEffect, EmpowerEffect, SelfDamageEffect,
    StaggerEffect,
};
use skirmish_core::{
    ActionFactory, ActionId, ActionKind, Bonus, CoreError, ErrorSeverity, FollowsPredecessor,
    HandlerError, World,
};

/// One effect handler of a template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSpec {
    Attack(i32),
    Block(i32),
    Armor(i32),
    SelfDamage(i32),
    Area(i32),
    Empower(Bonus),
    Stagger {
        reason: String,
        #[cfg_attr(feature = "serde", serde(default))]
        priority: Option<i32>,
    },
}

impl EffectSpec {
    fn attach(&self, world: &mut World, action: ActionId) -> Result<bool, HandlerError> {
        match self {
            Self::Attack(damage) => world.attach_to_action(action, AttackEffect::new(*damage)),
            Self::Block(amount) => world.attach_to_action(action, BlockEffect::new(*amount)),
            Self::Armor(amount) => world.attach_to_action(action, ArmorEffect::new(*amount)),
            Self::SelfDamage(amount) => {
                world.attach_to_action(action, SelfDamageEffect::new(*amount))
            }
            Self::Area(damage) => world.attach_to_action(action, AreaEffect::new(*damage)),
            Self::Empower(bonus) => world.attach_to_action(action, EmpowerEffect::new(*bonus)),
            Self::Stagger { reason, priority } => {
                let effect = StaggerEffect::new(reason.clone());
                let effect = match priority {
                    Some(priority) => effect.at_priority(*priority),
                    None => effect,
                };
                world.attach_to_action(action, effect)
            }
        }
    }
}

/// Recipe for one action kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionTemplate {
    pub kind: String,
    pub effects: Vec<EffectSpec>,
    /// Joins the chain of whatever action is queued right before it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub follows_predecessor: bool,
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown action kind '{0}'")]
    UnknownKind(String),

    #[error("duplicate template for action kind '{0}'")]
    DuplicateKind(String),

    #[error("failed to compose action '{kind}': {source}")]
    Compose {
        kind: String,
        #[source]
        source: HandlerError,
    },
}

impl CoreError for FactoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownKind(_) | Self::DuplicateKind(_) => ErrorSeverity::Validation,
            Self::Compose { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "FACTORY_UNKNOWN_KIND",
            Self::DuplicateKind(_) => "FACTORY_DUPLICATE_KIND",
            Self::Compose { .. } => "FACTORY_COMPOSE_FAILED",
        }
    }
}

/// Templates keyed by kind.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, ActionTemplate>,
}

impl TemplateRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry, refusing two templates with the same kind.
    pub fn from_templates(
        templates: impl IntoIterator<Item = ActionTemplate>,
    ) -> Result<Self, FactoryError> {
        let mut registry = Self::new();
        for template in templates {
            registry.insert(template)?;
        }
        Ok(registry)
    }

    /// Adds `template`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::DuplicateKind`] if its kind is already registered.
    pub fn insert(&mut self, template: ActionTemplate) -> Result<(), FactoryError> {
        if self.templates.contains_key(&template.kind) {
            return Err(FactoryError::DuplicateKind(template.kind));
        }
        self.templates.insert(template.kind.clone(), template);
        Ok(())
    }

    /// Template registered under `kind`.
    pub fn get(&self, kind: &str) -> Option<&ActionTemplate> {
        self.templates.get(kind)
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionTemplate> {
        self.templates.values()
    }
}

/// [`ActionFactory`] backed by a [`TemplateRegistry`].
#[derive(Clone, Debug, Default)]
pub struct TemplateFactory {
    registry: TemplateRegistry,
}

impl TemplateFactory {
    /// Creates a factory building actions from `registry`.
    pub fn new(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }
}

impl ActionFactory for TemplateFactory {
    type Error = FactoryError;

    fn build(&self, world: &mut World, kind: &str) -> Result<ActionId, FactoryError> {
        let template = self
            .registry
            .get(kind)
            .ok_or_else(|| FactoryError::UnknownKind(kind.to_owned()))?;

        let id = world.spawn_action(ActionKind::new(template.kind.clone()));
        let compose = |world: &mut World| -> Result<(), HandlerError> {
            for effect in &template.effects {
                effect.attach(world, id)?;
            }
            if template.follows_predecessor {
                world.attach_to_action(id, FollowsPredecessor::default())?;
            }
            Ok(())
        };
        if let Err(source) = compose(world) {
            world.destroy_action(id);
            return Err(FactoryError::Compose {
                kind: template.kind.clone(),
                source,
            });
        }
        debug!(action = %id, kind, effects = template.effects.len(), "action built from template");
        Ok(id)
    }

    fn kinds(&self) -> Vec<ActionKind> {
        self.registry
            .iter()
            .map(|template| ActionKind::new(template.kind.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::Capabilities;

    fn template(kind: &str, effects: Vec<EffectSpec>) -> ActionTemplate {
        ActionTemplate {
            kind: kind.to_owned(),
            effects,
            follows_predecessor: false,
        }
    }

    fn factory() -> TemplateFactory {
        let mut follow = template("follow_through", vec![EffectSpec::Attack(2)]);
        follow.follows_predecessor = true;
        let registry = TemplateRegistry::from_templates([
            template("strike", vec![EffectSpec::Attack(3)]),
            template(
                "feint",
                vec![
                    EffectSpec::Stagger {
                        reason: "feint".into(),
                        priority: Some(-1),
                    },
                    EffectSpec::Block(1),
                ],
            ),
            follow,
        ])
        .unwrap();
        TemplateFactory::new(registry)
    }

    #[test]
    fn builds_action_with_template_effects() {
        let mut world = World::default();
        let id = factory().build(&mut world, "feint").unwrap();
        let action = world.action(id).unwrap();

        assert_eq!(action.kind().as_str(), "feint");
        let handlers = action.components().dispatch_list(Capabilities::EFFECT);
        let priorities: Vec<i32> = handlers.entries().iter().map(|e| e.priority()).collect();
        assert_eq!(priorities, vec![-10, -1]);
    }

    #[test]
    fn follow_up_template_links_into_chain() {
        let mut world = World::default();
        let actor = world.spawn_actor();
        let factory = factory();
        let first = factory.build(&mut world, "strike").unwrap();
        let second = factory.build(&mut world, "follow_through").unwrap();
        world.add_action(actor, first).unwrap();
        world.add_action(actor, second).unwrap();

        assert_eq!(world.action(first).unwrap().followers(), &[second]);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut world = World::default();
        let err = factory().build(&mut world, "fireball").unwrap_err();
        assert!(matches!(err, FactoryError::UnknownKind(ref kind) if kind == "fireball"));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let err = TemplateRegistry::from_templates([
            template("strike", vec![]),
            template("strike", vec![EffectSpec::Attack(1)]),
        ])
        .unwrap_err();
        assert_eq!(err.error_code(), "FACTORY_DUPLICATE_KIND");
    }

    #[test]
    fn kinds_are_sorted() {
        let kinds: Vec<String> = factory()
            .kinds()
            .into_iter()
            .map(|kind| kind.to_string())
            .collect();
        assert_eq!(kinds, vec!["feint", "follow_through", "strike"]);
    }
}
