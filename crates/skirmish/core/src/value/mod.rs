//! Value pipeline: bounded quantities with write-side processors and read-side modifiers.
//!
//! A [`ProcessableValue`] stores `current` within `[0, max]`:
//!
//! - `increase` / `decrease` route the amount through the [`ProcessorChain`]
//!   (e.g. a block pool absorbs damage before it reaches health), then apply and
//!   clamp.
//! - `set_current` bypasses processors entirely (initialization and resets).
//! - `final_value` runs the [`ModifierChain`] over `current` without storing
//!   the result (e.g. base attack plus stacking bonuses).
//!
//! Mutations return a [`ValueChanged`] record only when the stored value
//! actually moved; the owning component turns that record into events.

mod bonus;
mod chain;
mod processors;

pub use bonus::{Bonus, BonusModifier};
pub use chain::{ModifierChain, ProcessorChain, StackChain, StackEntry, StackKey};
pub use processors::{AbsorbProcessor, ReductionProcessor};

use core::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ids::ActorId;

/// Value shared between its owning component and processors that drain it.
pub type SharedValue = Rc<RefCell<ProcessableValue>>;

/// Direction of a processed mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueOp {
    Increase,
    Decrease,
}

/// A requested mutation travelling through the processor chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueChange {
    pub op: ValueOp,
    /// Non-negative magnitude still to be applied.
    pub amount: i32,
    /// Actor responsible for the change, if any.
    pub source: Option<ActorId>,
}

impl ValueChange {
    pub fn increase(amount: i32, source: Option<ActorId>) -> Self {
        Self {
            op: ValueOp::Increase,
            amount: amount.max(0),
            source,
        }
    }

    pub fn decrease(amount: i32, source: Option<ActorId>) -> Self {
        Self {
            op: ValueOp::Decrease,
            amount: amount.max(0),
            source,
        }
    }

    /// Same change with a different remaining amount.
    #[must_use]
    pub fn with_amount(self, amount: i32) -> Self {
        Self {
            amount: amount.max(0),
            ..self
        }
    }
}

/// Record of a mutation that actually changed the stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueChanged {
    pub previous: i32,
    pub current: i32,
    pub source: Option<ActorId>,
}

impl ValueChanged {
    /// Signed applied delta (`current - previous`).
    pub fn delta(&self) -> i32 {
        self.current - self.previous
    }
}

/// Write-side pipeline stage.
///
/// Processors see every processed mutation in priority order and return what is
/// left of it; returning a smaller amount means the processor absorbed the rest.
pub trait ValueProcessor: Any {
    /// Lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    fn process(&mut self, change: ValueChange, stacks: u32) -> ValueChange;
}

/// Read-side pipeline stage. Must not depend on anything but its inputs.
pub trait ValueModifier: Any {
    /// Lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    /// Tells apart instances of one modifier type that must not stack together.
    fn stack_tag(&self) -> u64 {
        0
    }

    fn modify(&self, value: i32, stacks: u32) -> i32;
}

/// Bounded numeric quantity with processor and modifier chains.
#[derive(Debug, Default)]
pub struct ProcessableValue {
    current: i32,
    max: i32,
    processors: ProcessorChain,
    modifiers: ModifierChain,
}

impl ProcessableValue {
    /// Creates a value, clamping `current` into `[0, max]` (negative `max` becomes 0).
    pub fn new(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
            processors: ProcessorChain::new(),
            modifiers: ModifierChain::new(),
        }
    }

    /// Value starting at its maximum.
    pub fn full(max: i32) -> Self {
        Self::new(max, max)
    }

    /// Wraps the value for sharing with processors that drain it.
    pub fn shared(self) -> SharedValue {
        Rc::new(RefCell::new(self))
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Raw write, bypassing processors. Clamps and reports net change only.
    pub fn set_current(&mut self, value: i32) -> Option<ValueChanged> {
        self.store(value, None)
    }

    /// Changes the bound, pulling `current` down if it no longer fits.
    pub fn set_max(&mut self, max: i32) -> Option<ValueChanged> {
        self.max = max.max(0);
        self.store(self.current, None)
    }

    /// Processed increase; only the applied delta is reported.
    pub fn increase(&mut self, amount: i32, source: Option<ActorId>) -> Option<ValueChanged> {
        self.apply(ValueChange::increase(amount, source))
    }

    /// Processed decrease; only the applied delta is reported.
    pub fn decrease(&mut self, amount: i32, source: Option<ActorId>) -> Option<ValueChanged> {
        self.apply(ValueChange::decrease(amount, source))
    }

    /// Runs `change` through the processor chain and applies the remainder.
    pub fn apply(&mut self, change: ValueChange) -> Option<ValueChanged> {
        if change.amount <= 0 {
            return None;
        }
        let processed = self.processors.process(change);
        let target = match processed.op {
            ValueOp::Increase => self.current.saturating_add(processed.amount),
            ValueOp::Decrease => self.current.saturating_sub(processed.amount),
        };
        self.store(target, processed.source)
    }

    /// Modifier-adjusted reading of `current`; never mutates.
    pub fn final_value(&self) -> i32 {
        self.modifiers.apply(self.current)
    }

    pub fn processors(&self) -> &ProcessorChain {
        &self.processors
    }

    pub fn processors_mut(&mut self) -> &mut ProcessorChain {
        &mut self.processors
    }

    pub fn modifiers(&self) -> &ModifierChain {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierChain {
        &mut self.modifiers
    }

    /// Unregisters every processor and modifier.
    pub fn dispose(&mut self) {
        self.processors.clear();
        self.modifiers.clear();
    }

    fn store(&mut self, value: i32, source: Option<ActorId>) -> Option<ValueChanged> {
        let previous = self.current;
        self.current = value.clamp(0, self.max);
        (self.current != previous).then_some(ValueChanged {
            previous,
            current: self.current,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Provider;

    #[test]
    fn new_clamps_into_range() {
        let v = ProcessableValue::new(15, 10);
        assert_eq!(v.current(), 10);

        let v = ProcessableValue::new(-3, 10);
        assert_eq!(v.current(), 0);

        let v = ProcessableValue::new(5, -1);
        assert_eq!(v.max(), 0);
        assert_eq!(v.current(), 0);
    }

    #[test]
    fn set_current_clamps_to_boundaries() {
        let mut v = ProcessableValue::new(5, 10);

        let change = v.set_current(42).unwrap();
        assert_eq!(change.previous, 5);
        assert_eq!(change.current, 10);

        let change = v.set_current(-8).unwrap();
        assert_eq!(change.delta(), -10);
        assert_eq!(v.current(), 0);
    }

    #[test]
    fn no_change_reports_nothing() {
        let mut v = ProcessableValue::full(10);
        assert!(v.increase(5, None).is_none());
        assert!(v.set_current(10).is_none());
        assert!(v.decrease(0, None).is_none());
        assert!(v.decrease(-4, None).is_none());
    }

    #[test]
    fn decrease_reports_applied_delta_only() {
        let mut v = ProcessableValue::new(2, 10);
        let change = v.decrease(5, Some(ActorId(9))).unwrap();
        assert_eq!(change.delta(), -2);
        assert_eq!(change.source, Some(ActorId(9)));
        assert!(v.is_empty());
    }

    #[test]
    fn set_current_bypasses_processors() {
        let mut v = ProcessableValue::full(10);
        v.processors_mut()
            .register(Provider::Named("fortify"), ReductionProcessor::new(3));

        v.set_current(4);
        assert_eq!(v.current(), 4);

        v.decrease(5, None);
        assert_eq!(v.current(), 2);
    }

    #[test]
    fn set_max_pulls_current_down() {
        let mut v = ProcessableValue::full(10);
        let change = v.set_max(6).unwrap();
        assert_eq!(change.current, 6);
        assert!(v.is_full());
    }

    #[test]
    fn final_value_does_not_mutate() {
        let mut v = ProcessableValue::new(4, 100);
        v.modifiers_mut()
            .register(Provider::Named("rage"), BonusModifier::new(Bonus::Flat(2)));
        v.modifiers_mut()
            .register(Provider::Named("rage"), BonusModifier::new(Bonus::Flat(2)));

        assert_eq!(v.final_value(), 8);
        assert_eq!(v.current(), 4);
    }

    #[test]
    fn dispose_unregisters_everything() {
        let mut v = ProcessableValue::full(10);
        v.processors_mut()
            .register(Provider::Named("a"), ReductionProcessor::new(1));
        v.modifiers_mut()
            .register(Provider::Named("b"), BonusModifier::new(Bonus::Flat(1)));

        v.dispose();
        assert!(v.processors().is_empty());
        assert!(v.modifiers().is_empty());
    }
}
