//! Collision resolution.
//!
//! [`CollisionResolver`] owns the per-pair lock and assembles both sides'
//! chains; [`PairwiseResolver`] runs one lock-step of the two chains through
//! the four phases (before-execution, execute, component, consumed).
//! Execution is either immediate or deferred to a [`ChainScheduler`].

mod collision;
mod pairwise;
mod report;
mod scheduler;

pub use collision::{CollisionResolver, LockToken, PairKey};
pub use pairwise::PairwiseResolver;
pub use report::{Cancellation, Invocation, PassReport, StepReport};
pub use scheduler::{ChainExecution, ChainScheduler, ScheduledStep, TurnClock};

use thiserror::Error;

use crate::action::ChainError;
use crate::component::HandlerError;
use crate::error::{CoreError, ErrorSeverity};
use crate::ids::{ActionId, ActorId};

/// The two actors of a collision, in request order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parties {
    pub a: ActorId,
    pub b: ActorId,
}

impl Parties {
    pub const fn new(a: ActorId, b: ActorId) -> Self {
        Self { a, b }
    }

    /// The other party; `a` for anything that is not `a`.
    pub fn opponent_of(&self, actor: ActorId) -> ActorId {
        if actor == self.a { self.b } else { self.a }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.a, self.b)
    }
}

/// Side of a pairwise step. `A` sorts before `B` on priority ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    A,
    B,
}

/// A resolution pass was aborted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("handler fault while resolving {action}")]
    Handler {
        action: ActionId,
        source: HandlerError,
    },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl CoreError for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Handler { source, .. } => source.severity(),
            Self::Chain(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Handler { source, .. } => source.error_code(),
            Self::Chain(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_the_other_party() {
        let parties = Parties::new(ActorId(4), ActorId(2));
        assert_eq!(parties.opponent_of(ActorId(4)), ActorId(2));
        assert_eq!(parties.opponent_of(ActorId(2)), ActorId(4));
        assert_eq!(parties.key(), PairKey::new(ActorId(2), ActorId(4)));
    }

    #[test]
    fn handler_error_keeps_source_classification() {
        let err = ResolveError::Handler {
            action: ActionId(1),
            source: HandlerError::fault("attack", "boom"),
        };
        assert_eq!(err.error_code(), "HANDLER_FAULT");
        assert!(err.severity().is_internal());
    }
}
