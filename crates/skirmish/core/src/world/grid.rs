use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::ids::ActorId;

/// Tile coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Read-only view of actor placement, implemented by the grid collaborator.
pub trait GridOracle {
    /// Actors occupying `position`, in ascending id order.
    fn actors_at(&self, position: Position) -> Vec<ActorId>;

    fn position_of(&self, actor: ActorId) -> Option<Position>;
}

/// Occupancy notification raised when an actor moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OccupancyChange {
    /// `mover` arrived on a tile already held by `occupant`.
    Entered {
        mover: ActorId,
        occupant: ActorId,
        at: Position,
    },
    /// `mover` left a tile it shared with `occupant`.
    Exited {
        mover: ActorId,
        occupant: ActorId,
        at: Position,
    },
}

impl OccupancyChange {
    pub fn parties(&self) -> (ActorId, ActorId) {
        match *self {
            Self::Entered {
                mover, occupant, ..
            }
            | Self::Exited {
                mover, occupant, ..
            } => (mover, occupant),
        }
    }
}

/// Minimal in-memory grid: one position per actor, any number of actors per tile.
#[derive(Clone, Debug, Default)]
pub struct TileGrid {
    positions: BTreeMap<ActorId, Position>,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves (or places) `actor` onto `to`.
    ///
    /// Reports an exit for every actor left behind on the old tile and an
    /// enter for every actor already on the new one.
    pub fn place(&mut self, actor: ActorId, to: Position) -> Vec<OccupancyChange> {
        let from = self.positions.insert(actor, to);
        if from == Some(to) {
            return Vec::new();
        }
        let mut changes = Vec::new();
        if let Some(from) = from {
            changes.extend(self.others_at(from, actor).map(|occupant| {
                OccupancyChange::Exited {
                    mover: actor,
                    occupant,
                    at: from,
                }
            }));
        }
        changes.extend(self.others_at(to, actor).map(|occupant| {
            OccupancyChange::Entered {
                mover: actor,
                occupant,
                at: to,
            }
        }));
        changes
    }

    /// Takes `actor` off the grid, reporting exits for its tile mates.
    pub fn remove(&mut self, actor: ActorId) -> Vec<OccupancyChange> {
        let Some(from) = self.positions.remove(&actor) else {
            return Vec::new();
        };
        self.others_at(from, actor)
            .map(|occupant| OccupancyChange::Exited {
                mover: actor,
                occupant,
                at: from,
            })
            .collect()
    }

    fn others_at(&self, at: Position, actor: ActorId) -> impl Iterator<Item = ActorId> + '_ {
        self.positions
            .iter()
            .filter(move |&(&id, &pos)| pos == at && id != actor)
            .map(|(&id, _)| id)
    }
}

impl GridOracle for TileGrid {
    fn actors_at(&self, position: Position) -> Vec<ActorId> {
        self.positions
            .iter()
            .filter(|&(_, &pos)| pos == position)
            .map(|(&id, _)| id)
            .collect()
    }

    fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.positions.get(&actor).copied()
    }
}

/// Grid shared between the world (reads) and the movement driver (writes).
pub type SharedGrid = Rc<RefCell<TileGrid>>;

impl GridOracle for SharedGrid {
    fn actors_at(&self, position: Position) -> Vec<ActorId> {
        self.try_borrow()
            .map(|grid| grid.actors_at(position))
            .unwrap_or_default()
    }

    fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.try_borrow().ok()?.position_of(actor)
    }
}
