//! Stable identifiers used across the resolution core.
//!
//! Actors and actions are owned by the [`World`](crate::world::World); everything
//! else refers to them by id so that stale references degrade to a failed lookup
//! instead of a dangling handle.

use core::fmt;

/// Process-unique handle of an actor.
///
/// Ordered by numeric value; the collision lock and every id-keyed map rely on
/// this ordering for deterministic iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Handle of an action instance living in the world's action arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// The container a component is attached to.
///
/// Actors and actions both implement the container role; components learn
/// their owner when they are initialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Owner {
    Actor(ActorId),
    Action(ActionId),
    /// Container that is not (yet) registered with a world.
    Detached,
}

impl Owner {
    pub const fn actor(self) -> Option<ActorId> {
        match self {
            Owner::Actor(id) => Some(id),
            _ => None,
        }
    }

    pub const fn action(self) -> Option<ActionId> {
        match self {
            Owner::Action(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Actor(id) => id.fmt(f),
            Owner::Action(id) => id.fmt(f),
            Owner::Detached => f.write_str("detached"),
        }
    }
}

/// Identity of whoever contributed a processor or modifier to a value.
///
/// Together with the concrete processor/modifier type it forms the stacking
/// key: registering the same type for the same provider again adds a stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provider {
    Actor(ActorId),
    Action(ActionId),
    /// A named component slot, e.g. the block pool wired into health.
    Named(&'static str),
}

impl From<ActorId> for Provider {
    fn from(id: ActorId) -> Self {
        Provider::Actor(id)
    }
}

impl From<ActionId> for Provider {
    fn from(id: ActionId) -> Self {
        Provider::Action(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_accessors() {
        assert_eq!(Owner::Actor(ActorId(3)).actor(), Some(ActorId(3)));
        assert_eq!(Owner::Actor(ActorId(3)).action(), None);
        assert_eq!(Owner::Action(ActionId(7)).action(), Some(ActionId(7)));
        assert_eq!(Owner::Detached.actor(), None);
    }

    #[test]
    fn providers_from_ids_do_not_collide() {
        assert_ne!(Provider::from(ActorId(1)), Provider::from(ActionId(1)));
    }

    #[test]
    fn display_formats() {
        assert_eq!(ActorId(4).to_string(), "actor#4");
        assert_eq!(Owner::Action(ActionId(2)).to_string(), "action#2");
    }
}
