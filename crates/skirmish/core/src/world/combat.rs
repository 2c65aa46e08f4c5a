use tracing::debug;

use crate::component::{EventKind, HandlerError};
use crate::effects::Health;
use crate::ids::{ActorId, Owner};
use crate::value::ValueChanged;

use super::World;

impl World {
    /// Processed decrease of `target`'s health.
    ///
    /// Fires `Damaged` with the applied delta, and `Defeated` once health
    /// reaches zero. A fully absorbed hit reports nothing.
    pub fn damage(
        &mut self,
        target: ActorId,
        amount: i32,
        source: Option<ActorId>,
    ) -> Result<Option<ValueChanged>, HandlerError> {
        let Some(change) = self.with_health(target, |health| health.damage(amount, source)) else {
            return Ok(None);
        };
        debug!(%target, source = ?source, amount, delta = change.delta(), "damage applied");
        self.send_event(Owner::Actor(target), EventKind::Damaged(change))?;
        if change.current == 0 {
            self.send_event(Owner::Actor(target), EventKind::Defeated { by: source })?;
        }
        Ok(Some(change))
    }

    /// Processed increase of `target`'s health; fires `Healed`.
    pub fn heal(
        &mut self,
        target: ActorId,
        amount: i32,
        source: Option<ActorId>,
    ) -> Result<Option<ValueChanged>, HandlerError> {
        let Some(change) = self.with_health(target, |health| health.heal(amount, source)) else {
            return Ok(None);
        };
        debug!(%target, amount, delta = change.delta(), "heal applied");
        self.send_event(Owner::Actor(target), EventKind::Healed(change))?;
        Ok(Some(change))
    }

    fn with_health(
        &self,
        target: ActorId,
        f: impl FnOnce(&mut Health) -> Option<ValueChanged>,
    ) -> Option<ValueChanged> {
        let actor = self.actors.get(&target)?;
        let mut health = actor.components.get_mut::<Health>()?;
        f(&mut health)
    }
}
