use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::action::{ActionChain, ChainError};
use crate::effects::ActionConsumer;
use crate::ids::ActorId;
use crate::world::{OccupancyChange, World};

use super::{ChainExecution, ChainScheduler, PairwiseResolver, Parties, PassReport, ResolveError};

/// Unordered pair of actors: `(a, b)` and `(b, a)` produce the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey {
    low: ActorId,
    high: ActorId,
}

impl PairKey {
    pub fn new(a: ActorId, b: ActorId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> ActorId {
        self.low
    }

    pub fn high(&self) -> ActorId {
        self.high
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.low == actor || self.high == actor
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}

/// Proof of a held collision lock. Hand it back to [`CollisionResolver::release`].
#[must_use = "a lock that is never released starves its pair"]
#[derive(Debug, PartialEq, Eq)]
pub struct LockToken(PairKey);

impl LockToken {
    pub fn pair(&self) -> PairKey {
        self.0
    }
}

/// Collision-triggered resolution with at most one pass in flight per pair.
pub struct CollisionResolver {
    locks: BTreeSet<PairKey>,
    pairwise: PairwiseResolver,
    scheduler: Option<Box<dyn ChainScheduler>>,
    in_flight: BTreeMap<PairKey, PassReport>,
    reports: Vec<PassReport>,
    passes: u64,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollisionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionResolver")
            .field("locks", &self.locks)
            .field("deferred", &self.scheduler.is_some())
            .field("in_flight", &self.in_flight.len())
            .field("passes", &self.passes)
            .finish()
    }
}

impl CollisionResolver {
    /// Resolver that executes chains synchronously inside [`request`](Self::request).
    pub fn new() -> Self {
        Self {
            locks: BTreeSet::new(),
            pairwise: PairwiseResolver::new(),
            scheduler: None,
            in_flight: BTreeMap::new(),
            reports: Vec::new(),
            passes: 0,
        }
    }

    /// Resolver that hands chains to `scheduler`; see [`execute_next_actions`](Self::execute_next_actions).
    pub fn with_scheduler(scheduler: impl ChainScheduler + 'static) -> Self {
        Self {
            scheduler: Some(Box::new(scheduler)),
            ..Self::new()
        }
    }

    /// Locks the pair and resolves (or schedules) its collision.
    ///
    /// Returns `Ok(None)` when the pair is already locked. On a fault the lock
    /// is released before the error is returned.
    pub fn request(
        &mut self,
        world: &mut World,
        a: ActorId,
        b: ActorId,
    ) -> Result<Option<LockToken>, ResolveError> {
        let pair = PairKey::new(a, b);
        if !self.locks.insert(pair) {
            tracing::debug!(%pair, "pair already resolving, duplicate request dropped");
            return Ok(None);
        }
        tracing::debug!(%pair, "collision lock acquired");

        match self.start_pass(world, Parties::new(a, b)) {
            Ok(()) => Ok(Some(LockToken(pair))),
            Err(err) => {
                self.abort(pair);
                Err(err)
            }
        }
    }

    /// Releases a lock taken by [`request`](Self::request).
    pub fn release(&mut self, token: LockToken) -> bool {
        self.release_pair(token.0.low, token.0.high)
    }

    /// Releases the lock of `(a, b)` without its token (collision-exit path).
    ///
    /// Steps still pending in the scheduler for that pair are dropped.
    pub fn release_pair(&mut self, a: ActorId, b: ActorId) -> bool {
        let pair = PairKey::new(a, b);
        if !self.locks.remove(&pair) {
            return false;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            let dropped = scheduler.cancel(pair);
            if dropped > 0 {
                tracing::debug!(%pair, dropped, "pending steps dropped on release");
            }
        }
        if let Some(report) = self.in_flight.remove(&pair) {
            self.reports.push(report);
        }
        tracing::debug!(%pair, "collision lock released");
        true
    }

    pub fn is_locked(&self, a: ActorId, b: ActorId) -> bool {
        self.locks.contains(&PairKey::new(a, b))
    }

    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    /// Number of resolution passes started so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Drains the reports of finished passes.
    pub fn take_reports(&mut self) -> Vec<PassReport> {
        std::mem::take(&mut self.reports)
    }

    /// Maps grid occupancy onto the lock: enter requests, exit releases.
    pub fn handle_occupancy(
        &mut self,
        world: &mut World,
        change: OccupancyChange,
    ) -> Result<Option<LockToken>, ResolveError> {
        match change {
            OccupancyChange::Entered {
                mover, occupant, ..
            } => self.request(world, mover, occupant),
            OccupancyChange::Exited {
                mover, occupant, ..
            } => {
                self.release_pair(mover, occupant);
                Ok(None)
            }
        }
    }

    /// Pump for deferred mode: runs the steps the scheduler releases now.
    ///
    /// Returns the number of steps run. A fault cancels the rest of that
    /// pair's execution and releases its lock; steps of other pairs in the
    /// same batch still run, and the first fault is returned afterwards.
    pub fn execute_next_actions(&mut self, world: &mut World) -> Result<usize, ResolveError> {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return Ok(0);
        };
        let steps = scheduler.next_steps();
        let mut ran = 0;
        let mut first_error = None;
        for step in steps {
            let pair = step.pair();
            if !self.locks.contains(&pair) {
                continue;
            }
            let report = match self.pairwise.resolve_step(world, step.parties, step.a, step.b) {
                Ok(report) => report,
                Err(err) => {
                    self.abort(pair);
                    first_error.get_or_insert(err);
                    continue;
                }
            };
            ran += 1;
            if let Some(pass) = self.in_flight.get_mut(&pair) {
                pass.steps.push(report);
            }
            if step.last {
                self.finish(pair);
            }
        }
        first_error.map_or(Ok(ran), Err)
    }

    /// Builds the chain `owner` executes when `consumer` drains its queue.
    ///
    /// Empty unless `consumer` has an active [`ActionConsumer`].
    pub fn build_side_chain(
        world: &World,
        owner: ActorId,
        consumer: ActorId,
    ) -> Result<ActionChain, ChainError> {
        let mut chain = ActionChain::new();
        let active = world
            .actor(consumer)
            .and_then(|actor| actor.components().get::<ActionConsumer>().map(|c| c.is_active()))
            .unwrap_or(false);
        if !active {
            return Ok(chain);
        }
        if let Some(front) = world.peek_action(owner) {
            world.build_chain(front, &mut chain)?;
        }
        Ok(chain)
    }

    fn start_pass(&mut self, world: &mut World, parties: Parties) -> Result<(), ResolveError> {
        let chain_a = Self::build_side_chain(world, parties.a, parties.b)?;
        let chain_b = Self::build_side_chain(world, parties.b, parties.a)?;
        let pair = parties.key();
        self.passes += 1;
        tracing::info!(
            %pair,
            chain_a = chain_a.len(),
            chain_b = chain_b.len(),
            deferred = self.scheduler.is_some(),
            "resolution pass started"
        );

        let execution = ChainExecution {
            parties,
            chain_a: chain_a.clone(),
            chain_b: chain_b.clone(),
        };
        self.in_flight
            .insert(pair, PassReport::new(parties, chain_a, chain_b));

        if execution.steps() == 0 {
            self.finish(pair);
            return Ok(());
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.submit(execution);
            return Ok(());
        }
        for index in 0..execution.steps() {
            let step = self.pairwise.resolve_step(
                world,
                parties,
                execution.chain_a.get(index),
                execution.chain_b.get(index),
            )?;
            if let Some(pass) = self.in_flight.get_mut(&pair) {
                pass.steps.push(step);
            }
        }
        self.finish(pair);
        Ok(())
    }

    fn finish(&mut self, pair: PairKey) {
        if let Some(report) = self.in_flight.remove(&pair) {
            tracing::debug!(%pair, steps = report.steps.len(), "resolution pass finished");
            self.reports.push(report);
        }
    }

    fn abort(&mut self, pair: PairKey) {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.cancel(pair);
        }
        self.in_flight.remove(&pair);
        self.locks.remove(&pair);
        tracing::warn!(%pair, "resolution pass aborted, collision lock released");
    }
}
