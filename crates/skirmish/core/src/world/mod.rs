//! In-memory session state.
//!
//! The [`World`] owns every actor and action. Everything else (queues,
//! chains, components) refers to them by id, so a lookup of something that
//! was removed just fails.
//!
//! Operations are split by concern:
//! - `queue`: queue operations and their notifications
//! - `combat`: damage/heal routed through the value pipeline
//! - `grid`: the placement collaborator

mod combat;
mod grid;
mod queue;

pub use grid::{GridOracle, OccupancyChange, Position, SharedGrid, TileGrid};

use std::collections::BTreeMap;

use tracing::debug;

use crate::action::{Action, ActionKind, ActionQueue};
use crate::component::{
    Capabilities, ComponentContainer, ComponentError, ComponentEvent, Dispatch, EffectContext,
    EntityComponent, EventKind, HandlerError,
};
use crate::config::CoreConfig;
use crate::effects::{ActionConsumer, AttackPower, Health};
use crate::ids::{ActionId, ActorId, Owner};

/// An actor: a component container plus its action queue.
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    components: ComponentContainer,
    queue: ActionQueue,
}

impl Actor {
    fn new(id: ActorId, queue_capacity: usize) -> Self {
        Self {
            id,
            components: ComponentContainer::new(Owner::Actor(id)),
            queue: ActionQueue::new(queue_capacity),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn components(&self) -> &ComponentContainer {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentContainer {
        &mut self.components
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }
}

pub struct World {
    config: CoreConfig,
    actors: BTreeMap<ActorId, Actor>,
    actions: BTreeMap<ActionId, Action>,
    next_actor: u64,
    next_action: u64,
    grid: Option<Box<dyn GridOracle>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("actors", &self.actors)
            .field("actions", &self.actions)
            .field("grid", &self.grid.is_some())
            .finish()
    }
}

impl World {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            actors: BTreeMap::new(),
            actions: BTreeMap::new(),
            next_actor: 1,
            next_action: 1,
            grid: None,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ===== actors =====

    /// Creates an actor with an empty container and a queue of the configured capacity.
    pub fn spawn_actor(&mut self) -> ActorId {
        self.spawn_actor_with_capacity(self.config.queue_capacity)
    }

    pub fn spawn_actor_with_capacity(&mut self, queue_capacity: usize) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        self.actors.insert(id, Actor::new(id, queue_capacity));
        debug!(actor = %id, queue_capacity, "actor spawned");
        id
    }

    /// Actor carrying the standard combat stats: health (with block and armor
    /// wired in front of it), attack power and an active consumer.
    pub fn spawn_combatant(&mut self, max_health: i32) -> Result<ActorId, ComponentError> {
        let id = self.spawn_actor();
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.components.attach(Health::new(max_health))?;
            actor.components.attach(AttackPower::default())?;
            actor.components.attach(ActionConsumer::default())?;
        }
        Ok(id)
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn attach_to_actor<T: EntityComponent>(
        &mut self,
        actor: ActorId,
        component: T,
    ) -> Result<bool, ComponentError> {
        match self.actors.get_mut(&actor) {
            Some(entry) => entry.components.attach(component).map(|()| true),
            None => Ok(false),
        }
    }

    /// Empties the actor's queue (with notifications), disposes its components
    /// and forgets it. Actions it held stay alive in the arena.
    pub fn dispose_actor(&mut self, id: ActorId) -> Result<bool, HandlerError> {
        if !self.actors.contains_key(&id) {
            return Ok(false);
        }
        self.clear_queue(id)?;
        if let Some(mut actor) = self.actors.remove(&id) {
            actor.components.dispose();
        }
        debug!(actor = %id, "actor disposed");
        Ok(true)
    }

    // ===== actions =====

    pub fn spawn_action(&mut self, kind: impl Into<ActionKind>) -> ActionId {
        let id = ActionId(self.next_action);
        self.next_action += 1;
        self.actions.insert(id, Action::new(id, kind.into()));
        id
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(&id)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.actions.get_mut(&id)
    }

    /// Attaches a component to an action.
    ///
    /// A queued action immediately gets a `QueueAssigned` refresh so that
    /// queue-dependent components bind to their current neighbors.
    pub fn attach_to_action<T: EntityComponent>(
        &mut self,
        action: ActionId,
        component: T,
    ) -> Result<bool, HandlerError> {
        let Some(entry) = self.actions.get_mut(&action) else {
            return Ok(false);
        };
        entry.components_mut().attach(component)?;
        if let Some(queue) = entry.queue() {
            self.notify_assigned(action, Some(queue), Some(queue))?;
        }
        Ok(true)
    }

    /// Removes the action from its queue without notifications, drops every
    /// chain subscription pointing at it and disposes its components.
    pub fn destroy_action(&mut self, id: ActionId) -> bool {
        let Some(mut action) = self.actions.remove(&id) else {
            return false;
        };
        if let Some(actor) = action.queue().and_then(|owner| self.actors.get_mut(&owner)) {
            actor.queue.remove(id);
        }
        for other in self.actions.values_mut() {
            other.remove_follower(id);
        }
        action.components_mut().dispose();
        debug!(action = %id, kind = %action.kind(), "action destroyed");
        true
    }

    // ===== containers and events =====

    pub fn container(&self, owner: Owner) -> Option<&ComponentContainer> {
        match owner {
            Owner::Actor(id) => self.actors.get(&id).map(Actor::components),
            Owner::Action(id) => self.actions.get(&id).map(Action::components),
            Owner::Detached => None,
        }
    }

    /// Sends `kind` to every enabled listener of `owner`'s container.
    ///
    /// Returns the event after dispatch so callers can inspect cancellation.
    /// An unknown owner receives nothing.
    pub fn send_event(
        &mut self,
        owner: Owner,
        kind: EventKind,
    ) -> Result<ComponentEvent, HandlerError> {
        let dispatch = self
            .container(owner)
            .map(|c| c.dispatch_list(Capabilities::LISTENER))
            .unwrap_or_default();
        self.deliver(owner, kind, dispatch)
    }

    /// Like [`send_event`](Self::send_event) but only the listener of type `T` receives it.
    pub fn send_event_to<T: EntityComponent>(
        &mut self,
        owner: Owner,
        kind: EventKind,
    ) -> Result<ComponentEvent, HandlerError> {
        let dispatch = self
            .container(owner)
            .map(|c| c.dispatch_list_of::<T>())
            .unwrap_or_default();
        self.deliver(owner, kind, dispatch)
    }

    fn deliver(
        &mut self,
        owner: Owner,
        kind: EventKind,
        dispatch: Dispatch,
    ) -> Result<ComponentEvent, HandlerError> {
        let mut event = ComponentEvent::new(kind, owner);
        if dispatch.is_empty() {
            return Ok(event);
        }
        let actor = match owner {
            Owner::Actor(id) => Some(id),
            Owner::Action(id) => self.actions.get(&id).and_then(Action::queue),
            Owner::Detached => None,
        };
        let mut ctx = EffectContext::new(self, owner, actor, None);
        dispatch.deliver(&mut event, &mut ctx)?;
        Ok(event)
    }

    // ===== grid =====

    pub fn set_grid(&mut self, grid: impl GridOracle + 'static) {
        self.grid = Some(Box::new(grid));
    }

    pub fn grid(&self) -> Option<&dyn GridOracle> {
        self.grid.as_deref()
    }

    /// Actors at `position`; empty without a grid.
    pub fn actors_at(&self, position: Position) -> Vec<ActorId> {
        self.grid
            .as_ref()
            .map(|grid| grid.actors_at(position))
            .unwrap_or_default()
    }

    pub fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.grid.as_ref().and_then(|grid| grid.position_of(actor))
    }
}
