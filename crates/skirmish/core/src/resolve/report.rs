use crate::action::ActionChain;
use crate::ids::{ActionId, ActorId};

use super::{PairKey, Parties, Side};

/// A handler slot of the component phase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Invocation {
    pub side: Side,
    pub action: ActionId,
    pub component: &'static str,
    pub priority: i32,
}

/// A queue-scoped event that ended the step cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cancellation {
    pub owner: ActorId,
    pub reason: String,
}

/// Outcome of one pairwise step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StepReport {
    /// Actions that went through the execute phase, side A first.
    pub executed: Vec<(Side, ActionId)>,
    /// Handlers that ran, in invocation order.
    pub invocations: Vec<Invocation>,
    /// Handlers passed over because their event was cancelled or they were busy.
    pub skipped: Vec<Invocation>,
    pub cancellations: Vec<Cancellation>,
}

impl StepReport {
    /// Priorities of the handlers that ran, in order.
    pub fn priorities(&self) -> Vec<i32> {
        self.invocations.iter().map(|i| i.priority).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }
}

/// Outcome of a whole resolution pass for one pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PassReport {
    pub pair: PairKey,
    pub parties: Parties,
    pub chain_a: ActionChain,
    pub chain_b: ActionChain,
    pub steps: Vec<StepReport>,
}

impl PassReport {
    pub fn new(parties: Parties, chain_a: ActionChain, chain_b: ActionChain) -> Self {
        Self {
            pair: parties.key(),
            parties,
            chain_a,
            chain_b,
            steps: Vec::new(),
        }
    }

    /// Every handler invocation of the pass, step by step.
    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.steps.iter().flat_map(|step| step.invocations.iter())
    }

    /// Every action executed during the pass.
    pub fn executed(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.steps
            .iter()
            .flat_map(|step| step.executed.iter().map(|&(_, action)| action))
    }
}
