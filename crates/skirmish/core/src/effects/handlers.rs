//! Effect handlers attached to actions.
//!
//! Each handler reacts to the `Execute` event of the pairwise resolver's
//! component phase and ignores everything else.

use tracing::debug;

use crate::component::{
    Capabilities, ComponentEvent, EffectContext, EntityComponent, EventKind, HandlerError,
};
use crate::ids::{ActionId, ActorId, Provider};
use crate::value::Bonus;

use super::priority;
use super::stats::{ArmorValue, AttackPower, BlockValue};

/// `(action, owner, opponent)` of an `Execute` event.
fn execute_target(event: &ComponentEvent) -> Option<(ActionId, ActorId, ActorId)> {
    match *event.kind() {
        EventKind::Execute {
            action,
            owner,
            opponent,
        } => Some((action, owner, opponent)),
        _ => None,
    }
}

/// Damages the opponent by `damage` plus the owner's attack power.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackEffect {
    pub damage: i32,
}

impl AttackEffect {
    pub fn new(damage: i32) -> Self {
        Self { damage }
    }
}

impl EntityComponent for AttackEffect {
    fn name(&self) -> &'static str {
        "attack"
    }

    fn priority(&self) -> i32 {
        priority::ATTACK
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let Some((_, owner, opponent)) = execute_target(event) else {
            return Ok(());
        };
        let bonus = ctx
            .world
            .actor(owner)
            .and_then(|a| a.components().get::<AttackPower>().map(|p| p.final_value()))
            .unwrap_or(0);
        ctx.world
            .damage(opponent, self.damage.saturating_add(bonus), Some(owner))?;
        Ok(())
    }
}

/// Raises the owner's block pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockEffect {
    pub amount: i32,
}

impl BlockEffect {
    pub fn new(amount: i32) -> Self {
        Self { amount }
    }
}

impl EntityComponent for BlockEffect {
    fn name(&self) -> &'static str {
        "block"
    }

    fn priority(&self) -> i32 {
        priority::BLOCK
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let Some((_, owner, _)) = execute_target(event) else {
            return Ok(());
        };
        if let Some(block) = ctx
            .world
            .actor(owner)
            .and_then(|a| a.components().get::<BlockValue>())
        {
            block.add(self.amount);
        }
        Ok(())
    }
}

/// Raises the owner's armor pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmorEffect {
    pub amount: i32,
}

impl ArmorEffect {
    pub fn new(amount: i32) -> Self {
        Self { amount }
    }
}

impl EntityComponent for ArmorEffect {
    fn name(&self) -> &'static str {
        "armor"
    }

    fn priority(&self) -> i32 {
        priority::ARMOR
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let Some((_, owner, _)) = execute_target(event) else {
            return Ok(());
        };
        if let Some(armor) = ctx
            .world
            .actor(owner)
            .and_then(|a| a.components().get::<ArmorValue>())
        {
            armor.add(self.amount);
        }
        Ok(())
    }
}

/// Recoil: the owner takes `amount` damage right after attacks land.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelfDamageEffect {
    pub amount: i32,
}

impl SelfDamageEffect {
    pub fn new(amount: i32) -> Self {
        Self { amount }
    }
}

impl EntityComponent for SelfDamageEffect {
    fn name(&self) -> &'static str {
        "self_damage"
    }

    fn priority(&self) -> i32 {
        priority::SELF_DAMAGE
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let Some((_, owner, _)) = execute_target(event) else {
            return Ok(());
        };
        ctx.world.damage(owner, self.amount, Some(owner))?;
        Ok(())
    }
}

/// Cancels its own side's event, suppressing every later handler of that side
/// for the current step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaggerEffect {
    reason: String,
    priority: i32,
}

impl StaggerEffect {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            priority: priority::STAGGER,
        }
    }

    /// Same effect at a custom priority.
    #[must_use]
    pub fn at_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl EntityComponent for StaggerEffect {
    fn name(&self) -> &'static str {
        "stagger"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        if let Some((action, owner, _)) = execute_target(event) {
            debug!(%action, %owner, reason = %self.reason, "step staggered");
            event.cancel(self.reason.clone());
        }
        Ok(())
    }
}

/// Adds one stack of `bonus` to the owner's attack power each time it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmpowerEffect {
    pub bonus: Bonus,
}

impl EmpowerEffect {
    pub fn new(bonus: Bonus) -> Self {
        Self { bonus }
    }
}

impl EntityComponent for EmpowerEffect {
    fn name(&self) -> &'static str {
        "empower"
    }

    fn priority(&self) -> i32 {
        priority::EMPOWER
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let Some((action, owner, _)) = execute_target(event) else {
            return Ok(());
        };
        let Some(actor) = ctx.world.actor(owner) else {
            return Ok(());
        };
        if let Some(mut attack) = actor.components().get_mut::<AttackPower>() {
            let stacks = attack.add_bonus(Provider::from(action), self.bonus);
            debug!(%owner, %action, stacks, "attack empowered");
        }
        Ok(())
    }
}

/// Damages every actor standing on the opponent's tile except the owner.
///
/// Without a grid only the opponent is hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AreaEffect {
    pub damage: i32,
}

impl AreaEffect {
    pub fn new(damage: i32) -> Self {
        Self { damage }
    }
}

impl EntityComponent for AreaEffect {
    fn name(&self) -> &'static str {
        "area"
    }

    fn priority(&self) -> i32 {
        priority::AREA
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let Some((_, owner, opponent)) = execute_target(event) else {
            return Ok(());
        };
        let targets = match ctx.world.position_of(opponent) {
            Some(at) => ctx.world.actors_at(at),
            None => vec![opponent],
        };
        for target in targets.into_iter().filter(|&t| t != owner) {
            ctx.world.damage(target, self.damage, Some(owner))?;
        }
        Ok(())
    }
}
