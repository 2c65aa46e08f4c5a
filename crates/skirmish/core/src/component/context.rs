use crate::ids::{ActorId, Owner};
use crate::world::World;

/// Mutable execution context handed to every component handler.
///
/// Handlers reach the rest of the simulation through `world`; everything else
/// is addressing information about the dispatch they are part of.
pub struct EffectContext<'w> {
    pub world: &'w mut World,
    owner: Owner,
    actor: Option<ActorId>,
    opponent: Option<ActorId>,
}

impl<'w> EffectContext<'w> {
    pub fn new(
        world: &'w mut World,
        owner: Owner,
        actor: Option<ActorId>,
        opponent: Option<ActorId>,
    ) -> Self {
        Self {
            world,
            owner,
            actor,
            opponent,
        }
    }

    /// Context for an event sent to an actor's own container.
    pub fn for_actor(world: &'w mut World, actor: ActorId) -> Self {
        Self::new(world, Owner::Actor(actor), Some(actor), None)
    }

    /// Container the dispatched components belong to.
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Actor on whose behalf the dispatch runs: the container itself for actor
    /// containers, the owning queue's actor for action containers.
    pub fn actor(&self) -> Option<ActorId> {
        self.actor
    }

    /// The other party of the resolution pass, if any.
    pub fn opponent(&self) -> Option<ActorId> {
        self.opponent
    }
}
