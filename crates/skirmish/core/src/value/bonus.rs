//! Stackable read-side bonuses.
//!
//! Bonuses follow the layered order Flat → %Inc → More → Less; each kind carries a
//! default priority that places it in that layer of a [`ModifierChain`](super::ModifierChain).
//! A bonus registered `n` times for the same provider contributes as `n` stacks.

use super::ValueModifier;

/// A single bonus that can be applied to a value.
///
/// - **Flat**: additive, `+v` per stack
/// - **Increased**: percentage increase, `+p%` per stack (stacks sum)
/// - **More**: multiplier `×(1 + p/100)` applied once per stack
/// - **Less**: multiplier `×(1 - p/100)` applied once per stack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i32),
    Increased(i32),
    More(i32),
    Less(i32),
}

impl Bonus {
    /// Layer priority: flat bonuses first, reductions last.
    pub const fn layer(&self) -> i32 {
        match self {
            Bonus::Flat(_) => 0,
            Bonus::Increased(_) => 100,
            Bonus::More(_) => 200,
            Bonus::Less(_) => 300,
        }
    }

    /// Identity used for stacking: layer in the high half, magnitude in the low half.
    pub const fn stack_tag(&self) -> u64 {
        let magnitude = match *self {
            Bonus::Flat(v) | Bonus::Increased(v) | Bonus::More(v) | Bonus::Less(v) => v,
        };
        ((self.layer() as u32 as u64) << 32) | magnitude as u32 as u64
    }

    /// Applies `stacks` stacks of this bonus to `value`.
    ///
    /// # Formula
    /// ```text
    /// Flat(v)      : value + v × stacks
    /// Increased(p) : value × (100 + p × stacks) / 100
    /// More(p)      : value × ((100 + p) / 100)^stacks
    /// Less(p)      : value × ((100 - p) / 100)^stacks
    /// ```
    pub fn apply(&self, value: i32, stacks: u32) -> i32 {
        let stacks = stacks.min(i32::MAX as u32) as i32;
        match *self {
            Bonus::Flat(v) => value.saturating_add(v.saturating_mul(stacks)),
            Bonus::Increased(p) => {
                let multiplier = 100i64 + i64::from(p) * i64::from(stacks);
                scale(i64::from(value), multiplier)
            }
            Bonus::More(p) => {
                (0..stacks).fold(value, |acc, _| scale(i64::from(acc), 100 + i64::from(p)))
            }
            Bonus::Less(p) => {
                (0..stacks).fold(value, |acc, _| scale(i64::from(acc), 100 - i64::from(p)))
            }
        }
    }
}

fn scale(value: i64, percent: i64) -> i32 {
    (value * percent / 100).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Modifier adapter placing a [`Bonus`] into a modifier chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusModifier {
    bonus: Bonus,
}

impl BonusModifier {
    pub fn new(bonus: Bonus) -> Self {
        Self { bonus }
    }

    pub fn bonus(&self) -> Bonus {
        self.bonus
    }
}

impl ValueModifier for BonusModifier {
    fn priority(&self) -> i32 {
        self.bonus.layer()
    }

    fn stack_tag(&self) -> u64 {
        self.bonus.stack_tag()
    }

    fn modify(&self, value: i32, stacks: u32) -> i32 {
        self.bonus.apply(value, stacks)
    }
}
