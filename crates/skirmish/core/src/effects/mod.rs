//! Illustrative effect catalog built on the component container.
//!
//! - Stats (`Health`, `BlockValue`, `ArmorValue`, `AttackPower`) live on actors.
//! - Effect handlers live on actions and react to the `Execute` dispatch of
//!   the pairwise resolver, ordered by the constants in [`priority`].
//! - [`CombatLog`] is a plain listener recording what happened to its actor.

mod handlers;
mod log;
mod stats;

pub use handlers::{
    AreaEffect, ArmorEffect, AttackEffect, BlockEffect, EmpowerEffect, SelfDamageEffect,
    StaggerEffect,
};
pub use log::{CombatEntry, CombatLog};
pub use stats::{ActionConsumer, ArmorValue, AttackPower, BlockValue, Health};

/// Declared priorities of the built-in effect handlers. Lower runs first.
pub mod priority {
    /// Cancels the rest of its own side's step.
    pub const STAGGER: i32 = -20;
    /// Block lands before any damage of the same step.
    pub const BLOCK: i32 = -10;
    pub const EMPOWER: i32 = -5;
    pub const ATTACK: i32 = 0;
    pub const AREA: i32 = 5;
    pub const SELF_DAMAGE: i32 = 10;
    pub const ARMOR: i32 = 20;
}

/// Processor priorities of the pools wired in front of health.
pub mod layer {
    pub const BLOCK: i32 = 0;
    pub const ARMOR: i32 = 10;
}
