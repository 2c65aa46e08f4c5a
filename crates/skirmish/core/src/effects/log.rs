use crate::component::{ComponentEvent, EffectContext, EntityComponent, EventKind, HandlerError};
use crate::ids::ActorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEntry {
    Damaged {
        delta: i32,
        current: i32,
        source: Option<ActorId>,
    },
    Healed {
        delta: i32,
        current: i32,
    },
    Defeated {
        by: Option<ActorId>,
    },
}

/// Records health events of its actor.
#[derive(Clone, Debug, Default)]
pub struct CombatLog {
    entries: Vec<CombatEntry>,
}

impl CombatLog {
    pub fn entries(&self) -> &[CombatEntry] {
        &self.entries
    }

    /// Total damage taken (positive).
    pub fn damage_taken(&self) -> i32 {
        self.entries
            .iter()
            .map(|entry| match *entry {
                CombatEntry::Damaged { delta, .. } => -delta,
                _ => 0,
            })
            .sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl EntityComponent for CombatLog {
    fn name(&self) -> &'static str {
        "combat_log"
    }

    // Runs after every other listener of the same event.
    fn priority(&self) -> i32 {
        i32::MAX
    }

    fn on_event(
        &mut self,
        event: &mut ComponentEvent,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        let entry = match *event.kind() {
            EventKind::Damaged(change) => CombatEntry::Damaged {
                delta: change.delta(),
                current: change.current,
                source: change.source,
            },
            EventKind::Healed(change) => CombatEntry::Healed {
                delta: change.delta(),
                current: change.current,
            },
            EventKind::Defeated { by } => CombatEntry::Defeated { by },
            _ => return Ok(()),
        };
        self.entries.push(entry);
        Ok(())
    }
}
