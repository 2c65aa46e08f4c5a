use std::collections::BTreeMap;

use crate::component::{
    Capabilities, ComponentEvent, DispatchEntry, EffectContext, EventKind, HandlerError,
};
use crate::ids::{ActionId, ActorId, Owner};
use crate::world::World;

use super::{Cancellation, Invocation, Parties, ResolveError, Side, StepReport};

/// A present action together with its owning queue.
#[derive(Clone, Copy, Debug)]
struct Participant {
    side: Side,
    action: ActionId,
    owner: ActorId,
    opponent: ActorId,
}

/// Runs one lock-step of two chains.
///
/// # Phases
///
/// 1. **Before-execution**: `BeforeExecution` on each owning actor
/// 2. **Execute**: each action's intrinsic behavior
/// 3. **Component**: effect handlers of both actions, interleaved by
///    `(priority, side, attach sequence)`, one cancellable event per owning queue
/// 4. **Consumed**: each action leaves its queue and `ActionConsumed` fires
///
/// A handler fault aborts the component phase; the consumed phase still runs
/// for every side that went through before-execution, then the fault is
/// returned.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairwiseResolver;

impl PairwiseResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve_step(
        &self,
        world: &mut World,
        parties: Parties,
        a: Option<ActionId>,
        b: Option<ActionId>,
    ) -> Result<StepReport, ResolveError> {
        let b = b.filter(|&b| Some(b) != a);
        let participants: Vec<Participant> = [(Side::A, a), (Side::B, b)]
            .into_iter()
            .filter_map(|(side, action)| {
                let action = action?;
                let Some(owner) = world.action(action).and_then(|entry| entry.queue()) else {
                    tracing::trace!(%action, "action left its queue, side skipped");
                    return None;
                };
                Some(Participant {
                    side,
                    action,
                    owner,
                    opponent: parties.opponent_of(owner),
                })
            })
            .collect();

        let mut report = StepReport::default();
        let mut prepared = Vec::with_capacity(participants.len());
        let outcome = self.run(world, &participants, &mut prepared, &mut report);
        let consumed = self.consume(world, &prepared);
        outcome?;
        consumed?;
        Ok(report)
    }

    fn run(
        &self,
        world: &mut World,
        participants: &[Participant],
        prepared: &mut Vec<Participant>,
        report: &mut StepReport,
    ) -> Result<(), ResolveError> {
        for p in participants {
            world
                .trigger_before_execution(p.owner, p.action)
                .map_err(fault(p.action))?;
            prepared.push(*p);
        }

        for p in participants {
            let behavior = world.action_mut(p.action).and_then(|action| {
                action.record_execution();
                action.behavior()
            });
            if let Some(behavior) = behavior {
                let mut ctx = EffectContext::new(
                    world,
                    Owner::Action(p.action),
                    Some(p.owner),
                    Some(p.opponent),
                );
                behavior
                    .execute(p.action, &mut ctx)
                    .map_err(fault(p.action))?;
            }
            report.executed.push((p.side, p.action));
        }

        self.component_phase(world, participants, report)
    }

    fn component_phase(
        &self,
        world: &mut World,
        participants: &[Participant],
        report: &mut StepReport,
    ) -> Result<(), ResolveError> {
        let mut events: BTreeMap<ActorId, ComponentEvent> = BTreeMap::new();
        let mut handlers: Vec<(usize, DispatchEntry)> = Vec::new();
        for (index, p) in participants.iter().enumerate() {
            events.entry(p.owner).or_insert_with(|| {
                ComponentEvent::new(
                    EventKind::Execute {
                        action: p.action,
                        owner: p.owner,
                        opponent: p.opponent,
                    },
                    Owner::Action(p.action),
                )
            });
            if let Some(action) = world.action(p.action) {
                handlers.extend(
                    action
                        .components()
                        .dispatch_list(Capabilities::EFFECT)
                        .into_entries()
                        .into_iter()
                        .map(|entry| (index, entry)),
                );
            }
        }
        handlers.sort_by_key(|(index, entry)| {
            (entry.priority(), participants[*index].side, entry.seq())
        });

        for (index, entry) in handlers {
            let p = participants[index];
            let Some(event) = events.get_mut(&p.owner) else {
                continue;
            };
            let invocation = Invocation {
                side: p.side,
                action: p.action,
                component: entry.name(),
                priority: entry.priority(),
            };
            if event.is_cancelled() {
                tracing::trace!(
                    component = invocation.component,
                    owner = %p.owner,
                    reason = event.reason().unwrap_or_default(),
                    "handler skipped, event cancelled"
                );
                report.skipped.push(invocation);
                continue;
            }
            let mut ctx = EffectContext::new(
                world,
                Owner::Action(p.action),
                Some(p.owner),
                Some(p.opponent),
            );
            match entry.invoke(event, &mut ctx) {
                Ok(true) => report.invocations.push(invocation),
                Ok(false) => report.skipped.push(invocation),
                Err(source) => {
                    tracing::error!(
                        component = invocation.component,
                        action = %p.action,
                        error = %source,
                        "effect handler faulted, component phase aborted"
                    );
                    return Err(ResolveError::Handler {
                        action: p.action,
                        source,
                    });
                }
            }
        }

        report.cancellations.extend(events.into_iter().filter_map(|(owner, event)| {
            event.is_cancelled().then(|| Cancellation {
                owner,
                reason: event.reason().unwrap_or_default().to_owned(),
            })
        }));
        Ok(())
    }

    fn consume(&self, world: &mut World, prepared: &[Participant]) -> Result<(), ResolveError> {
        let mut first_error = None;
        for p in prepared {
            let result = world
                .consume_specific_action(p.owner, p.action)
                .and_then(|_| world.trigger_consumed(p.owner, p.action));
            if let Err(source) = result {
                tracing::error!(
                    action = %p.action,
                    error = %source,
                    "consumed notification faulted"
                );
                first_error.get_or_insert(ResolveError::Handler {
                    action: p.action,
                    source,
                });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn fault(action: ActionId) -> impl Fn(HandlerError) -> ResolveError {
    move |source| ResolveError::Handler { action, source }
}
