use skirmish_core::effects::{
    ArmorEffect, AttackEffect, BlockEffect, BlockValue, CombatEntry, CombatLog, Health,
    SelfDamageEffect, StaggerEffect,
};
use skirmish_core::{
    ActionId, ActorId, Capabilities, CollisionResolver, ComponentEvent, EffectContext,
    EntityComponent, HandlerError, ResolveError, Side, World,
};

fn combatants(world: &mut World) -> (ActorId, ActorId) {
    let a = world.spawn_combatant(10).unwrap();
    let b = world.spawn_combatant(10).unwrap();
    (a, b)
}

fn queue_action<C: EntityComponent>(
    world: &mut World,
    actor: ActorId,
    kind: &'static str,
    effects: Vec<C>,
) -> ActionId {
    let id = world.spawn_action(kind);
    for effect in effects {
        world.attach_to_action(id, effect).unwrap();
    }
    assert!(world.add_action(actor, id).unwrap());
    id
}

fn health(world: &World, actor: ActorId) -> i32 {
    world
        .actor(actor)
        .unwrap()
        .components()
        .get::<Health>()
        .unwrap()
        .current()
}

fn block(world: &World, actor: ActorId) -> i32 {
    world
        .actor(actor)
        .unwrap()
        .components()
        .get::<BlockValue>()
        .unwrap()
        .current()
}

#[test]
fn attack_into_block_lands_the_remainder() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    world.attach_to_actor(b, CombatLog::default()).unwrap();
    world
        .actor(b)
        .unwrap()
        .components()
        .get::<BlockValue>()
        .unwrap()
        .add(2);
    queue_action(&mut world, a, "attack", vec![AttackEffect::new(3)]);

    let mut resolver = CollisionResolver::new();
    let _token = resolver.request(&mut world, a, b).unwrap().unwrap();

    assert_eq!(health(&world, b), 9);
    assert_eq!(block(&world, b), 0);
    let log = world
        .actor(b)
        .unwrap()
        .components()
        .get::<CombatLog>()
        .unwrap()
        .entries()
        .to_vec();
    assert_eq!(
        log,
        vec![CombatEntry::Damaged {
            delta: -1,
            current: 9,
            source: Some(a)
        }]
    );
}

#[test]
fn duplicate_enter_resolves_once() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    queue_action(&mut world, a, "attack", vec![AttackEffect::new(3)]);

    let mut resolver = CollisionResolver::new();
    let first = resolver.request(&mut world, a, b).unwrap();
    let second = resolver.request(&mut world, b, a).unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(resolver.passes(), 1);
    assert_eq!(health(&world, b), 7);
    assert_eq!(resolver.take_reports().len(), 1);
}

#[test]
fn handlers_interleave_by_priority_across_sides() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    let x = world.spawn_action("strike");
    world.attach_to_action(x, ArmorEffect::new(1)).unwrap();
    world.attach_to_action(x, AttackEffect::new(4)).unwrap();
    world.add_action(a, x).unwrap();
    let y = world.spawn_action("reckless_guard");
    world.attach_to_action(y, SelfDamageEffect::new(1)).unwrap();
    world.attach_to_action(y, BlockEffect::new(2)).unwrap();
    world.add_action(b, y).unwrap();

    let mut resolver = CollisionResolver::new();
    let _token = resolver.request(&mut world, a, b).unwrap().unwrap();
    let report = resolver.take_reports().remove(0);

    let step = &report.steps[0];
    assert_eq!(step.priorities(), vec![-10, 0, 10, 20]);
    let sides: Vec<Side> = step.invocations.iter().map(|i| i.side).collect();
    assert_eq!(sides, vec![Side::B, Side::A, Side::B, Side::A]);
    // Block landed before the attack: 4 - 2 = 2, then 1 recoil.
    assert_eq!(health(&world, b), 7);
    assert_eq!(health(&world, a), 10);
}

#[test]
fn cancellation_stays_on_its_own_side() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    let x = world.spawn_action("feint");
    world
        .attach_to_action(x, StaggerEffect::new("off balance").at_priority(-1))
        .unwrap();
    world.attach_to_action(x, AttackEffect::new(5)).unwrap();
    world.add_action(a, x).unwrap();
    queue_action(&mut world, b, "jab", vec![AttackEffect::new(2)]);

    let mut resolver = CollisionResolver::new();
    let _token = resolver.request(&mut world, a, b).unwrap().unwrap();
    let report = resolver.take_reports().remove(0);
    let step = &report.steps[0];

    assert_eq!(health(&world, b), 10);
    assert_eq!(health(&world, a), 8);
    assert_eq!(step.skipped.len(), 1);
    assert_eq!(step.skipped[0].side, Side::A);
    assert_eq!(step.cancellations.len(), 1);
    assert_eq!(step.cancellations[0].owner, a);
    assert_eq!(step.cancellations[0].reason, "off balance");
}

#[test]
fn cancellation_does_not_outlive_the_step() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    let x = world.spawn_action("feint");
    world
        .attach_to_action(x, StaggerEffect::new("off balance").at_priority(-1))
        .unwrap();
    world.add_action(a, x).unwrap();
    queue_action(&mut world, a, "attack", vec![AttackEffect::new(3)]);

    let mut resolver = CollisionResolver::new();
    let token = resolver.request(&mut world, a, b).unwrap().unwrap();
    resolver.release(token);
    let _token = resolver.request(&mut world, a, b).unwrap().unwrap();

    assert_eq!(health(&world, b), 7);
}

struct Exploding;

impl EntityComponent for Exploding {
    fn priority(&self) -> i32 {
        -50
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EFFECT
    }

    fn on_event(
        &mut self,
        _event: &mut ComponentEvent,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        Err(HandlerError::fault("exploding", "handler blew up"))
    }
}

#[test]
fn handler_fault_releases_lock_and_consumes() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    let x = world.spawn_action("cursed");
    world.attach_to_action(x, Exploding).unwrap();
    world.attach_to_action(x, AttackEffect::new(3)).unwrap();
    world.add_action(a, x).unwrap();
    let z = queue_action(&mut world, a, "attack", vec![AttackEffect::new(3)]);

    let mut resolver = CollisionResolver::new();
    let err = resolver.request(&mut world, a, b).unwrap_err();

    assert!(matches!(err, ResolveError::Handler { action, .. } if action == x));
    assert!(!resolver.is_locked(a, b));
    assert_eq!(world.all_actions(a), vec![z]);
    assert_eq!(health(&world, b), 10);

    // The pair is not starved.
    assert!(resolver.request(&mut world, a, b).unwrap().is_some());
    assert_eq!(health(&world, b), 7);
}

#[test]
fn block_is_cleared_when_its_owner_acts() {
    let mut world = World::default();
    let (a, b) = combatants(&mut world);
    world
        .actor(b)
        .unwrap()
        .components()
        .get::<BlockValue>()
        .unwrap()
        .add(5);
    queue_action(&mut world, a, "attack", vec![AttackEffect::new(3)]);
    queue_action(&mut world, b, "attack", vec![AttackEffect::new(1)]);

    let mut resolver = CollisionResolver::new();
    let _token = resolver.request(&mut world, a, b).unwrap().unwrap();

    // B's stale block is gone before A's attack lands.
    assert_eq!(block(&world, b), 0);
    assert_eq!(health(&world, b), 7);
    assert_eq!(health(&world, a), 9);
}
