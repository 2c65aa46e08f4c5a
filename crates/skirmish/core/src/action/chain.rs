use arrayvec::ArrayVec;
use thiserror::Error;
use tracing::trace;

use crate::component::{
    ComponentEvent, EffectContext, EntityComponent, EventKind, HandlerError, InitScope,
};
use crate::config::CoreConfig;
use crate::error::{CoreError, ErrorSeverity};
use crate::ids::ActionId;
use crate::world::World;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("action chain exceeds {limit} actions")]
    TooLong { limit: usize },
}

impl CoreError for ChainError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        "CHAIN_TOO_LONG"
    }
}

/// Ordered list of actions to execute together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionChain {
    actions: ArrayVec<ActionId, { CoreConfig::MAX_CHAIN_LENGTH }>,
}

impl ActionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: ActionId) -> Result<(), ChainError> {
        self.actions.try_push(action).map_err(|_| ChainError::TooLong {
            limit: CoreConfig::MAX_CHAIN_LENGTH,
        })
    }

    pub fn contains(&self, action: ActionId) -> bool {
        self.actions.contains(&action)
    }

    pub fn get(&self, index: usize) -> Option<ActionId> {
        self.actions.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn as_slice(&self) -> &[ActionId] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().copied()
    }
}

impl World {
    /// Appends `action` to `chain`, then lets every subscribed follower extend it.
    ///
    /// An action already in the chain ends that branch, so follower cycles
    /// terminate. Unknown ids are ignored.
    pub fn build_chain(&self, action: ActionId, chain: &mut ActionChain) -> Result<(), ChainError> {
        let Some(entry) = self.action(action) else {
            return Ok(());
        };
        if chain.contains(action) {
            trace!(%action, "follower cycle cut");
            return Ok(());
        }
        chain.push(action)?;
        for &follower in entry.followers() {
            self.build_chain(follower, chain)?;
        }
        Ok(())
    }

    /// Subscribes `follower` to `predecessor`'s chain-extension signal.
    pub fn subscribe_chain(&mut self, predecessor: ActionId, follower: ActionId) -> bool {
        if predecessor == follower {
            return false;
        }
        self.action_mut(predecessor)
            .is_some_and(|p| p.add_follower(follower))
    }

    pub fn unsubscribe_chain(&mut self, predecessor: ActionId, follower: ActionId) -> bool {
        self.action_mut(predecessor)
            .is_some_and(|p| p.remove_follower(follower))
    }
}

/// Pulls its action into the chain of whichever action is queued right before it.
///
/// Rebinds every time the action's queue assignment changes; the previous
/// subscription is always torn down first.
#[derive(Debug, Default)]
pub struct FollowsPredecessor {
    action: Option<ActionId>,
    bound_to: Option<ActionId>,
}

impl FollowsPredecessor {
    /// Predecessor this action is currently subscribed to.
    pub fn bound_to(&self) -> Option<ActionId> {
        self.bound_to
    }

    fn rebind(&mut self, world: &mut World, action: ActionId) {
        if let Some(old) = self.bound_to.take() {
            world.unsubscribe_chain(old, action);
        }
        if let Some(predecessor) = world.predecessor(action) {
            world.subscribe_chain(predecessor, action);
            self.bound_to = Some(predecessor);
            trace!(%action, %predecessor, "chain link bound");
        }
    }
}

impl EntityComponent for FollowsPredecessor {
    fn name(&self) -> &'static str {
        "follows_predecessor"
    }

    fn initialize(&mut self, scope: &InitScope<'_>) {
        self.action = scope.owner().action();
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        match *event.kind() {
            EventKind::QueueAssigned { action, .. } if self.action == Some(action) => {
                self.rebind(ctx.world, action);
            }
            _ => {}
        }
        Ok(())
    }
}
