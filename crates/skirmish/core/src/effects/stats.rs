use tracing::trace;

use crate::component::{
    Capabilities, ComponentEvent, EffectContext, EntityComponent, EventKind, HandlerError,
    InitScope, Requirement,
};
use crate::ids::{ActorId, Provider};
use crate::value::{
    AbsorbProcessor, Bonus, BonusModifier, ProcessableValue, SharedValue, ValueChanged,
};

use super::layer;

/// Upper bound of the transient and persistent defense pools.
const POOL_CAP: i32 = 999;
const ATTACK_CAP: i32 = 999;

/// Actor health. Block and armor pools absorb decreases before they land.
#[derive(Debug)]
pub struct Health {
    value: ProcessableValue,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            value: ProcessableValue::full(max),
        }
    }

    pub fn current(&self) -> i32 {
        self.value.current()
    }

    pub fn max(&self) -> i32 {
        self.value.max()
    }

    pub fn is_defeated(&self) -> bool {
        self.value.is_empty()
    }

    pub fn value(&self) -> &ProcessableValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut ProcessableValue {
        &mut self.value
    }

    pub fn damage(&mut self, amount: i32, source: Option<ActorId>) -> Option<ValueChanged> {
        self.value.decrease(amount, source)
    }

    pub fn heal(&mut self, amount: i32, source: Option<ActorId>) -> Option<ValueChanged> {
        self.value.increase(amount, source)
    }
}

impl EntityComponent for Health {
    fn name(&self) -> &'static str {
        "health"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn requires(&self) -> Vec<Requirement> {
        vec![Requirement::of::<BlockValue>(), Requirement::of::<ArmorValue>()]
    }

    fn initialize(&mut self, scope: &InitScope<'_>) {
        if let Some(block) = scope.get::<BlockValue>() {
            self.value
                .processors_mut()
                .register(
                    Provider::Named("block"),
                    AbsorbProcessor::new(block.pool(), layer::BLOCK),
                );
        }
        if let Some(armor) = scope.get::<ArmorValue>() {
            self.value
                .processors_mut()
                .register(
                    Provider::Named("armor"),
                    AbsorbProcessor::new(armor.pool(), layer::ARMOR),
                );
        }
    }

    fn dispose(&mut self) {
        self.value.dispose();
    }
}

/// Pool shared with the absorb processor wired into health.
#[derive(Debug)]
struct Pool(SharedValue);

impl Default for Pool {
    fn default() -> Self {
        Self(ProcessableValue::new(0, POOL_CAP).shared())
    }
}

impl Pool {
    fn current(&self) -> i32 {
        self.0.try_borrow().map_or(0, |pool| pool.current())
    }

    fn add(&self, amount: i32) -> Option<ValueChanged> {
        self.0.try_borrow_mut().ok()?.increase(amount, None)
    }

    fn clear(&self) -> Option<ValueChanged> {
        self.0.try_borrow_mut().ok()?.set_current(0)
    }
}

/// Transient defense, cleared whenever its actor starts executing an action.
#[derive(Debug, Default)]
pub struct BlockValue {
    pool: Pool,
}

impl BlockValue {
    pub fn current(&self) -> i32 {
        self.pool.current()
    }

    pub fn add(&self, amount: i32) -> Option<ValueChanged> {
        self.pool.add(amount)
    }

    pub fn clear(&self) -> Option<ValueChanged> {
        self.pool.clear()
    }

    pub fn pool(&self) -> SharedValue {
        self.pool.0.clone()
    }
}

impl EntityComponent for BlockValue {
    fn name(&self) -> &'static str {
        "block"
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        if let EventKind::BeforeExecution(action) = *event.kind() {
            if let Some(change) = self.clear() {
                trace!(%action, dropped = -change.delta(), "stale block cleared");
            }
        }
        Ok(())
    }
}

/// Persistent defense, drained only by damage.
#[derive(Debug, Default)]
pub struct ArmorValue {
    pool: Pool,
}

impl ArmorValue {
    pub fn current(&self) -> i32 {
        self.pool.current()
    }

    pub fn add(&self, amount: i32) -> Option<ValueChanged> {
        self.pool.add(amount)
    }

    pub fn pool(&self) -> SharedValue {
        self.pool.0.clone()
    }
}

impl EntityComponent for ArmorValue {
    fn name(&self) -> &'static str {
        "armor"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

/// Base attack plus stacking bonuses.
#[derive(Debug)]
pub struct AttackPower {
    value: ProcessableValue,
}

impl Default for AttackPower {
    fn default() -> Self {
        Self::new(0)
    }
}

impl AttackPower {
    pub fn new(base: i32) -> Self {
        Self {
            value: ProcessableValue::new(base, ATTACK_CAP),
        }
    }

    pub fn base(&self) -> i32 {
        self.value.current()
    }

    /// Base attack after every bonus.
    pub fn final_value(&self) -> i32 {
        self.value.final_value()
    }

    /// Adds one stack of `bonus` from `provider`; returns the stack count of that bonus.
    ///
    /// Only an identical bonus from the same provider stacks.
    pub fn add_bonus(&mut self, provider: Provider, bonus: Bonus) -> u32 {
        self.value
            .modifiers_mut()
            .register(provider, BonusModifier::new(bonus))
    }

    /// Drops every bonus contributed by `provider`.
    pub fn clear_bonuses(&mut self, provider: Provider) -> usize {
        self.value.modifiers_mut().remove_provider(provider)
    }
}

impl EntityComponent for AttackPower {
    fn name(&self) -> &'static str {
        "attack_power"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn dispose(&mut self) {
        self.value.dispose();
    }
}

/// Gate deciding whether its actor drains the opponent's queue on collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionConsumer {
    active: bool,
}

impl Default for ActionConsumer {
    fn default() -> Self {
        Self { active: true }
    }
}

impl ActionConsumer {
    pub fn new(active: bool) -> Self {
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl EntityComponent for ActionConsumer {
    fn name(&self) -> &'static str {
        "action_consumer"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}
