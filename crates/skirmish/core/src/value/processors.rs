//! Built-in write-side processors.

use tracing::trace;

use super::{SharedValue, ValueChange, ValueOp, ValueProcessor};

/// Drains a separate pool before a decrease reaches the value it guards.
///
/// Used to put block and armor in front of health: the pool loses whatever it
/// absorbs and only the remainder continues down the chain.
pub struct AbsorbProcessor {
    pool: SharedValue,
    priority: i32,
}

impl AbsorbProcessor {
    pub fn new(pool: SharedValue, priority: i32) -> Self {
        Self { pool, priority }
    }
}

impl ValueProcessor for AbsorbProcessor {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn process(&mut self, change: ValueChange, _stacks: u32) -> ValueChange {
        if change.op != ValueOp::Decrease {
            return change;
        }
        // A pool that is being mutated further up the stack absorbs nothing.
        let Ok(mut pool) = self.pool.try_borrow_mut() else {
            return change;
        };
        let absorbed = pool.current().min(change.amount);
        if absorbed == 0 {
            return change;
        }
        let left_in_pool = pool.current() - absorbed;
        pool.set_current(left_in_pool);
        trace!(absorbed, remaining = change.amount - absorbed, "pool absorbed decrease");
        change.with_amount(change.amount - absorbed)
    }
}

/// Flat reduction of every decrease, `per_stack` points per stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReductionProcessor {
    per_stack: i32,
}

impl ReductionProcessor {
    pub fn new(per_stack: i32) -> Self {
        Self { per_stack }
    }
}

impl ValueProcessor for ReductionProcessor {
    fn priority(&self) -> i32 {
        50
    }

    fn process(&mut self, change: ValueChange, stacks: u32) -> ValueChange {
        if change.op != ValueOp::Decrease {
            return change;
        }
        let reduction = self.per_stack.saturating_mul(stacks.min(i32::MAX as u32) as i32);
        change.with_amount(change.amount.saturating_sub(reduction))
    }
}
