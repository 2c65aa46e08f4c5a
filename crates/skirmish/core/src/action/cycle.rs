use tracing::{debug, warn};

use crate::component::{
    ComponentEvent, EffectContext, EntityComponent, EventKind, HandlerError, InitScope,
};
use crate::ids::{ActionId, ActorId};

/// Re-queues a preset rotation: whenever one of its actions is consumed, the
/// action goes to the back of its actor's queue again.
#[derive(Clone, Debug, Default)]
pub struct CyclePolicy {
    rotation: Vec<ActionId>,
    actor: Option<ActorId>,
    requeued: u32,
}

impl CyclePolicy {
    pub fn new(rotation: impl IntoIterator<Item = ActionId>) -> Self {
        Self {
            rotation: rotation.into_iter().collect(),
            actor: None,
            requeued: 0,
        }
    }

    pub fn rotation(&self) -> &[ActionId] {
        &self.rotation
    }

    /// Number of actions put back so far.
    pub fn requeued(&self) -> u32 {
        self.requeued
    }
}

impl EntityComponent for CyclePolicy {
    fn name(&self) -> &'static str {
        "cycle_policy"
    }

    fn initialize(&mut self, scope: &InitScope<'_>) {
        self.actor = scope.owner().actor();
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let EventKind::ActionConsumed(action) = *event.kind() else {
            return Ok(());
        };
        let Some(actor) = self.actor else {
            return Ok(());
        };
        if !self.rotation.contains(&action) {
            return Ok(());
        }
        if ctx.world.add_action(actor, action)? {
            self.requeued += 1;
            debug!(%actor, %action, "rotation action requeued");
        } else {
            warn!(%actor, %action, "rotation action could not be requeued");
        }
        Ok(())
    }
}
