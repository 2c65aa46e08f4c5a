//! Duel session: two combatants on a tile grid, colliding once per round.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use anyhow::{Context, Result};
use skirmish_content::{DuelSpec, DuelistSpec, FactoryError};
use skirmish_core::effects::{ArmorValue, BlockValue, CombatLog, Health};
use skirmish_core::{
    ActionFactory, ActorId, CollisionResolver, CoreConfig, CyclePolicy, Position, SharedGrid,
    TileGrid, World,
};

struct Duelist {
    id: ActorId,
    name: String,
    start: Position,
}

/// Snapshot of one duelist's stats.
#[derive(Debug, PartialEq, Eq)]
pub struct DuelistStatus {
    pub health: i32,
    pub max_health: i32,
    pub block: i32,
    pub armor: i32,
    pub queued: usize,
}

pub struct Duel {
    world: World,
    grid: SharedGrid,
    resolver: CollisionResolver,
    challenger: Duelist,
    defender: Duelist,
}

impl Duel {
    pub fn setup(
        config: CoreConfig,
        spec: &DuelSpec,
        factory: &impl ActionFactory<Error = FactoryError>,
    ) -> Result<Self> {
        let mut world = World::new(config);
        let grid: SharedGrid = Rc::new(RefCell::new(TileGrid::new()));
        world.set_grid(grid.clone());

        let challenger = spawn(&mut world, &spec.challenger, factory)?;
        let defender = spawn(&mut world, &spec.defender, factory)?;

        let mut duel = Self {
            world,
            grid,
            resolver: CollisionResolver::new(),
            challenger,
            defender,
        };
        for duelist in [duel.challenger.id, duel.defender.id] {
            let start = duel.duelist(duelist).start;
            duel.move_to(duelist, start)?;
        }
        Ok(duel)
    }

    /// Challenger steps onto the defender's tile and back.
    pub fn round(&mut self) -> Result<()> {
        let target = self
            .world
            .position_of(self.defender.id)
            .unwrap_or(self.defender.start);
        self.move_to(self.challenger.id, target)?;
        self.move_to(self.challenger.id, self.challenger.start)?;

        for report in self.resolver.take_reports() {
            for (index, step) in report.steps.iter().enumerate() {
                tracing::debug!(
                    pair = %report.pair,
                    step = index,
                    handlers = ?step.priorities(),
                    skipped = step.skipped.len(),
                    cancelled = step.cancellations.len(),
                    "step resolved"
                );
            }
        }
        Ok(())
    }

    pub fn status(&self, actor: ActorId) -> Option<DuelistStatus> {
        let entry = self.world.actor(actor)?;
        let components = entry.components();
        let health = components.get::<Health>()?;
        Some(DuelistStatus {
            health: health.current(),
            max_health: health.max(),
            block: components.get::<BlockValue>().map_or(0, |b| b.current()),
            armor: components.get::<ArmorValue>().map_or(0, |a| a.current()),
            queued: entry.queue().len(),
        })
    }

    pub fn status_line(&self, round: u32) -> String {
        let sides: Vec<String> = [&self.challenger, &self.defender]
            .into_iter()
            .map(|duelist| match self.status(duelist.id) {
                Some(status) => format!("{} {}", duelist.name, status),
                None => format!("{} (gone)", duelist.name),
            })
            .collect();
        format!("round {round:>2} | {}", sides.join(" | "))
    }

    /// Name of the only duelist still standing.
    pub fn winner(&self) -> Option<&str> {
        let down = |duelist: &Duelist| {
            self.status(duelist.id)
                .is_none_or(|status| status.health == 0)
        };
        match (down(&self.challenger), down(&self.defender)) {
            (false, true) => Some(self.challenger.name.as_str()),
            (true, false) => Some(self.defender.name.as_str()),
            _ => None,
        }
    }

    fn duelist(&self, id: ActorId) -> &Duelist {
        if id == self.challenger.id {
            &self.challenger
        } else {
            &self.defender
        }
    }

    fn move_to(&mut self, actor: ActorId, to: Position) -> Result<()> {
        let changes = self.grid.borrow_mut().place(actor, to);
        for change in changes {
            // Tokens are not kept: the matching exit releases by pair.
            let _ = self
                .resolver
                .handle_occupancy(&mut self.world, change)
                .with_context(|| format!("collision at ({}, {}) failed", to.x, to.y))?;
        }
        Ok(())
    }
}

impl fmt::Display for DuelistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hp {:>3}/{:<3} block {:>2} armor {:>2} queued {}",
            self.health, self.max_health, self.block, self.armor, self.queued
        )
    }
}

fn spawn(
    world: &mut World,
    spec: &DuelistSpec,
    factory: &impl ActionFactory<Error = FactoryError>,
) -> Result<Duelist> {
    let id = world.spawn_combatant(spec.health)?;
    world.attach_to_actor(id, CombatLog::default())?;

    let mut rotation = Vec::with_capacity(spec.rotation.len());
    for kind in &spec.rotation {
        let action = factory
            .build(world, kind)
            .with_context(|| format!("building rotation of {}", spec.name))?;
        if !world.add_action(id, action)? {
            tracing::warn!(duelist = %spec.name, kind = %kind, "queue full, action dropped");
            world.destroy_action(action);
            continue;
        }
        rotation.push(action);
    }
    if spec.cycle {
        world.attach_to_actor(id, CyclePolicy::new(rotation))?;
    }
    tracing::info!(duelist = %spec.name, actor = %id, health = spec.health, "duelist ready");

    Ok(Duelist {
        id,
        name: spec.name.clone(),
        start: spec.start,
    })
}
