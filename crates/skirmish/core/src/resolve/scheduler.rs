use std::collections::VecDeque;

use crate::action::ActionChain;
use crate::ids::ActionId;

use super::{PairKey, Parties};

/// Both chains of a locked pair, handed to a scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainExecution {
    pub parties: Parties,
    pub chain_a: ActionChain,
    pub chain_b: ActionChain,
}

impl ChainExecution {
    pub fn pair(&self) -> PairKey {
        self.parties.key()
    }

    /// Number of lock-steps needed to drain both chains.
    pub fn steps(&self) -> usize {
        self.chain_a.len().max(self.chain_b.len())
    }

    pub fn step(&self, index: usize) -> Option<ScheduledStep> {
        (index < self.steps()).then(|| ScheduledStep {
            parties: self.parties,
            index,
            a: self.chain_a.get(index),
            b: self.chain_b.get(index),
            last: index + 1 == self.steps(),
        })
    }
}

/// One lock-step released by a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledStep {
    pub parties: Parties,
    pub index: usize,
    pub a: Option<ActionId>,
    pub b: Option<ActionId>,
    /// Final step of its execution.
    pub last: bool,
}

impl ScheduledStep {
    pub fn pair(&self) -> PairKey {
        self.parties.key()
    }
}

/// Turn/clock collaborator that defers chain execution.
pub trait ChainScheduler {
    fn submit(&mut self, execution: ChainExecution);

    /// Steps due now. Called by the resolver's pump.
    fn next_steps(&mut self) -> Vec<ScheduledStep>;

    /// Drops whatever is still pending for `pair`; returns the number of steps dropped.
    fn cancel(&mut self, pair: PairKey) -> usize;

    /// Number of executions with steps left.
    fn pending(&self) -> usize;
}

#[derive(Debug)]
struct Pending {
    execution: ChainExecution,
    cursor: usize,
}

/// Releases one step of every pending execution per tick, in submission order.
#[derive(Debug, Default)]
pub struct TurnClock {
    pending: VecDeque<Pending>,
    tick: u64,
}

impl TurnClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks elapsed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

impl ChainScheduler for TurnClock {
    fn submit(&mut self, execution: ChainExecution) {
        if execution.steps() > 0 {
            self.pending.push_back(Pending {
                execution,
                cursor: 0,
            });
        }
    }

    fn next_steps(&mut self) -> Vec<ScheduledStep> {
        self.tick += 1;
        let steps: Vec<ScheduledStep> = self
            .pending
            .iter_mut()
            .filter_map(|pending| {
                let step = pending.execution.step(pending.cursor)?;
                pending.cursor += 1;
                Some(step)
            })
            .collect();
        self.pending
            .retain(|pending| pending.cursor < pending.execution.steps());
        steps
    }

    fn cancel(&mut self, pair: PairKey) -> usize {
        let mut dropped = 0;
        self.pending.retain(|pending| {
            let keep = pending.execution.pair() != pair;
            if !keep {
                dropped += pending.execution.steps() - pending.cursor;
            }
            keep
        });
        dropped
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}
