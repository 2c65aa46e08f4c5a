use crate::ids::{ActionId, ActorId, Owner};
use crate::value::ValueChanged;

/// Closed set of events a component can receive.
///
/// Listeners match on the variants they care about and ignore the rest.
#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// An action was appended to the receiving actor's queue.
    ActionAdded(ActionId),
    /// An action was executed and consumed by the resolver.
    ActionConsumed(ActionId),
    /// The receiving actor's queue was emptied.
    QueueCleared,
    /// An action of the receiving actor is about to execute.
    BeforeExecution(ActionId),
    /// Sent to an action's own components when its queue assignment changes.
    QueueAssigned {
        action: ActionId,
        queue: Option<ActorId>,
        previous: Option<ActorId>,
    },
    /// Effect phase of a pairwise step, dispatched to effect handlers.
    Execute {
        action: ActionId,
        owner: ActorId,
        opponent: ActorId,
    },
    /// Health of the receiving actor went down.
    Damaged(ValueChanged),
    /// Health of the receiving actor went up.
    Healed(ValueChanged),
    /// Health of the receiving actor reached zero.
    Defeated { by: Option<ActorId> },
}

/// Event plus its mutable cancellation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentEvent {
    kind: EventKind,
    sender: Owner,
    cancelled: bool,
    reason: Option<String>,
}

impl ComponentEvent {
    pub fn new(kind: EventKind, sender: Owner) -> Self {
        Self {
            kind,
            sender,
            cancelled: false,
            reason: None,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Stable snake_case name of the event kind.
    pub fn name(&self) -> &'static str {
        (&self.kind).into()
    }

    pub fn sender(&self) -> Owner {
        self.sender
    }

    /// Cancels the event for every handler that has not run yet.
    ///
    /// The first reason wins; cancelling twice keeps it.
    pub fn cancel(&mut self, reason: impl Into<String>) {
        if !self.cancelled {
            self.cancelled = true;
            self.reason = Some(reason.into());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
