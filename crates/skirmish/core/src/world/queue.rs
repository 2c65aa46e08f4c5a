use tracing::{debug, trace};

use crate::action::ActionQueue;
use crate::component::{EventKind, HandlerError};
use crate::ids::{ActionId, ActorId, Owner};

use super::World;

impl World {
    /// Queue of `actor`, or `None` for an unknown actor.
    pub fn queue(&self, actor: ActorId) -> Option<&ActionQueue> {
        self.actors.get(&actor).map(|a| &a.queue)
    }

    /// Appends `action` to `actor`'s queue and fires `ActionAdded`.
    ///
    /// Returns false without touching anything when the queue is full, the
    /// action already sits in a queue, or either id is unknown.
    pub fn add_action(&mut self, actor: ActorId, action: ActionId) -> Result<bool, HandlerError> {
        match self.actions.get(&action) {
            Some(entry) if entry.queue().is_none() => {}
            Some(entry) => {
                trace!(%action, queue = ?entry.queue(), "action already queued");
                return Ok(false);
            }
            None => return Ok(false),
        }
        let Some(owner) = self.actors.get_mut(&actor) else {
            return Ok(false);
        };
        if !owner.queue.push_back(action) {
            debug!(
                %actor,
                %action,
                capacity = owner.queue.capacity(),
                "queue full, action refused"
            );
            return Ok(false);
        }
        self.bind_queue(action, Some(actor));
        self.notify_assigned(action, Some(actor), None)?;
        self.send_event(Owner::Actor(actor), EventKind::ActionAdded(action))?;
        Ok(true)
    }

    /// Front action of `actor`'s queue, without removing it.
    pub fn peek_action(&self, actor: ActorId) -> Option<ActionId> {
        self.queue(actor).and_then(ActionQueue::front)
    }

    /// Removes the front action. Does not fire `ActionConsumed`.
    pub fn consume_action_without_execution(
        &mut self,
        actor: ActorId,
    ) -> Result<Option<ActionId>, HandlerError> {
        let Some(action) = self.peek_action(actor) else {
            return Ok(None);
        };
        self.consume_specific_action(actor, action)?;
        Ok(Some(action))
    }

    /// Removes `action` wherever it sits in `actor`'s queue. Does not fire
    /// `ActionConsumed`.
    pub fn consume_specific_action(
        &mut self,
        actor: ActorId,
        action: ActionId,
    ) -> Result<bool, HandlerError> {
        let Some(queue) = self.actors.get_mut(&actor).map(|a| &mut a.queue) else {
            return Ok(false);
        };
        let successor = queue.successor(action);
        if !queue.remove(action) {
            return Ok(false);
        }
        self.bind_queue(action, None);
        self.notify_assigned(action, None, Some(actor))?;
        // The successor's predecessor changed.
        if let Some(next) = successor {
            self.notify_assigned(next, Some(actor), Some(actor))?;
        }
        Ok(true)
    }

    /// Empties the queue, notifying each released action, then fires
    /// `QueueCleared`. Returns how many actions were released.
    pub fn clear_queue(&mut self, actor: ActorId) -> Result<usize, HandlerError> {
        let Some(released) = self.actors.get_mut(&actor).map(|a| a.queue.drain_all()) else {
            return Ok(0);
        };
        for &action in &released {
            self.bind_queue(action, None);
            self.notify_assigned(action, None, Some(actor))?;
        }
        self.send_event(Owner::Actor(actor), EventKind::QueueCleared)?;
        Ok(released.len())
    }

    /// Queued actions in order; empty for an unknown actor.
    pub fn all_actions(&self, actor: ActorId) -> Vec<ActionId> {
        self.queue(actor)
            .map(|q| q.iter().collect())
            .unwrap_or_default()
    }

    /// Action right before `action` in its current queue.
    pub fn predecessor(&self, action: ActionId) -> Option<ActionId> {
        let actor = self.actions.get(&action)?.queue()?;
        self.queue(actor)?.predecessor(action)
    }

    /// Action right after `action` in its current queue.
    pub fn successor(&self, action: ActionId) -> Option<ActionId> {
        let actor = self.actions.get(&action)?.queue()?;
        self.queue(actor)?.successor(action)
    }

    /// Fires `BeforeExecution` on `actor`.
    pub fn trigger_before_execution(
        &mut self,
        actor: ActorId,
        action: ActionId,
    ) -> Result<(), HandlerError> {
        self.send_event(Owner::Actor(actor), EventKind::BeforeExecution(action))
            .map(drop)
    }

    /// Fires `ActionConsumed` on `actor`.
    pub fn trigger_consumed(
        &mut self,
        actor: ActorId,
        action: ActionId,
    ) -> Result<(), HandlerError> {
        self.send_event(Owner::Actor(actor), EventKind::ActionConsumed(action))
            .map(drop)
    }

    pub(super) fn notify_assigned(
        &mut self,
        action: ActionId,
        queue: Option<ActorId>,
        previous: Option<ActorId>,
    ) -> Result<(), HandlerError> {
        self.send_event(
            Owner::Action(action),
            EventKind::QueueAssigned {
                action,
                queue,
                previous,
            },
        )
        .map(drop)
    }

    fn bind_queue(&mut self, action: ActionId, queue: Option<ActorId>) {
        if let Some(entry) = self.actions.get_mut(&action) {
            entry.set_queue(queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::component::{ComponentEvent, EffectContext, EntityComponent};
    use crate::config::CoreConfig;

    use super::*;

    struct Recorder(Rc<RefCell<Vec<&'static str>>>);

    impl EntityComponent for Recorder {
        fn on_event(
            &mut self,
            event: &mut ComponentEvent,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<(), HandlerError> {
            self.0.borrow_mut().push(event.name());
            Ok(())
        }
    }

    fn recorded_world(capacity: usize) -> (World, ActorId, Rc<RefCell<Vec<&'static str>>>) {
        let mut world = World::new(CoreConfig::with_queue_capacity(capacity));
        let actor = world.spawn_actor();
        let log = Rc::new(RefCell::new(Vec::new()));
        world.attach_to_actor(actor, Recorder(log.clone())).unwrap();
        (world, actor, log)
    }

    #[test]
    fn add_fires_action_added_and_binds_queue() {
        let (mut world, actor, log) = recorded_world(4);
        let x = world.spawn_action("x");

        assert!(world.add_action(actor, x).unwrap());
        assert_eq!(world.action(x).unwrap().queue(), Some(actor));
        assert_eq!(*log.borrow(), vec!["action_added"]);
    }

    #[test]
    fn add_to_full_queue_is_refused_silently() {
        let (mut world, actor, log) = recorded_world(1);
        let x = world.spawn_action("x");
        let y = world.spawn_action("y");
        world.add_action(actor, x).unwrap();

        assert!(!world.add_action(actor, y).unwrap());
        assert_eq!(world.all_actions(actor), vec![x]);
        assert_eq!(world.action(y).unwrap().queue(), None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn action_belongs_to_one_queue_at_a_time() {
        let mut world = World::default();
        let a = world.spawn_actor();
        let b = world.spawn_actor();
        let x = world.spawn_action("x");

        assert!(world.add_action(a, x).unwrap());
        assert!(!world.add_action(b, x).unwrap());
        assert!(world.all_actions(b).is_empty());
    }

    #[test]
    fn consuming_does_not_fire_consumed() {
        let (mut world, actor, log) = recorded_world(4);
        let x = world.spawn_action("x");
        let y = world.spawn_action("y");
        world.add_action(actor, x).unwrap();
        world.add_action(actor, y).unwrap();

        assert_eq!(world.peek_action(actor), Some(x));
        assert!(world.consume_specific_action(actor, y).unwrap());
        assert_eq!(
            world.consume_action_without_execution(actor).unwrap(),
            Some(x)
        );
        assert_eq!(
            world.consume_action_without_execution(actor).unwrap(),
            None
        );
        assert_eq!(*log.borrow(), vec!["action_added", "action_added"]);
    }

    #[test]
    fn clear_releases_everything() {
        let (mut world, actor, log) = recorded_world(4);
        let x = world.spawn_action("x");
        world.add_action(actor, x).unwrap();

        assert_eq!(world.clear_queue(actor).unwrap(), 1);
        assert_eq!(world.action(x).unwrap().queue(), None);
        assert_eq!(log.borrow().last(), Some(&"queue_cleared"));
    }

    #[test]
    fn explicit_triggers() {
        let (mut world, actor, log) = recorded_world(4);
        let x = world.spawn_action("x");
        world.trigger_before_execution(actor, x).unwrap();
        world.trigger_consumed(actor, x).unwrap();
        assert_eq!(*log.borrow(), vec!["before_execution", "action_consumed"]);
    }

    #[test]
    fn neighbors_follow_current_queue() {
        let mut world = World::default();
        let actor = world.spawn_actor();
        let [x, y, z] = ["x", "y", "z"].map(|k| world.spawn_action(k));
        for id in [x, y, z] {
            world.add_action(actor, id).unwrap();
        }

        assert_eq!(world.predecessor(y), Some(x));
        assert_eq!(world.successor(y), Some(z));
        world.consume_specific_action(actor, y).unwrap();
        assert_eq!(world.predecessor(y), None);
        assert_eq!(world.predecessor(z), Some(x));
    }
}
