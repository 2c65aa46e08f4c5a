//! Actions, per-actor queues and chain building.
//!
//! An [`Action`] lives in the world's action arena and carries its own
//! [`ComponentContainer`] of effect handlers. It belongs to at most one
//! [`ActionQueue`] at a time; the queue only stores ids.
//!
//! Chains are assembled by following subscriptions: an action's `followers`
//! are the actions that asked to be pulled in whenever it builds a chain (see
//! [`FollowsPredecessor`]).

mod chain;
mod cycle;
mod queue;

pub use chain::{ActionChain, ChainError, FollowsPredecessor};
pub use cycle::CyclePolicy;
pub use queue::ActionQueue;

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::component::{ComponentContainer, EffectContext, HandlerError};
use crate::ids::{ActionId, ActorId, Owner};
use crate::world::World;

/// Type identifier of an action ("attack", "block", ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActionKind(Cow<'static, str>);

impl ActionKind {
    /// Kind label, e.g. `"strike"`.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ActionKind {
    fn from(kind: &'static str) -> Self {
        Self::new(kind)
    }
}

/// Intrinsic behavior of an action, run in the execute phase before any
/// effect handler.
pub trait ActionBehavior {
    fn execute(&self, action: ActionId, ctx: &mut EffectContext<'_>) -> Result<(), HandlerError>;
}

/// Builds actions from a type identifier.
pub trait ActionFactory {
    type Error;

    /// Spawns a fully composed action of `kind` into `world`.
    fn build(&self, world: &mut World, kind: &str) -> Result<ActionId, Self::Error>;

    /// Every kind this factory can build.
    fn kinds(&self) -> Vec<ActionKind>;
}

/// A queued unit of intent.
pub struct Action {
    id: ActionId,
    kind: ActionKind,
    queue: Option<ActorId>,
    components: ComponentContainer,
    followers: Vec<ActionId>,
    behavior: Option<Rc<dyn ActionBehavior>>,
    executions: u32,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("queue", &self.queue)
            .field("components", &self.components)
            .field("followers", &self.followers)
            .field("executions", &self.executions)
            .finish()
    }
}

impl Action {
    pub(crate) fn new(id: ActionId, kind: ActionKind) -> Self {
        Self {
            id,
            kind,
            queue: None,
            components: ComponentContainer::new(Owner::Action(id)),
            followers: Vec::new(),
            behavior: None,
            executions: 0,
        }
    }

    /// Arena id of this action.
    pub fn id(&self) -> ActionId {
        self.id
    }

    /// Kind this action was built as.
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Actor whose queue currently holds this action.
    pub fn queue(&self) -> Option<ActorId> {
        self.queue
    }

    /// Effect handlers and other components attached to this action.
    pub fn components(&self) -> &ComponentContainer {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentContainer {
        &mut self.components
    }

    /// Actions pulled into a chain right after this one.
    pub fn followers(&self) -> &[ActionId] {
        &self.followers
    }

    /// How many times the resolver executed this action.
    pub fn executions(&self) -> u32 {
        self.executions
    }

    pub fn set_behavior(&mut self, behavior: impl ActionBehavior + 'static) {
        self.behavior = Some(Rc::new(behavior));
    }

    pub(crate) fn behavior(&self) -> Option<Rc<dyn ActionBehavior>> {
        self.behavior.clone()
    }

    pub(crate) fn set_queue(&mut self, queue: Option<ActorId>) -> Option<ActorId> {
        std::mem::replace(&mut self.queue, queue)
    }

    pub(crate) fn record_execution(&mut self) {
        self.executions = self.executions.saturating_add(1);
    }

    pub(crate) fn add_follower(&mut self, follower: ActionId) -> bool {
        if self.followers.contains(&follower) {
            return false;
        }
        self.followers.push(follower);
        true
    }

    pub(crate) fn remove_follower(&mut self, follower: ActionId) -> bool {
        let before = self.followers.len();
        self.followers.retain(|&f| f != follower);
        before != self.followers.len()
    }
}
