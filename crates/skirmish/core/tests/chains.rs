use skirmish_core::effects::{AttackEffect, AttackPower, EmpowerEffect, Health};
use skirmish_core::{
    ActionChain, ActionId, ActorId, Bonus, CollisionResolver, CyclePolicy, FollowsPredecessor,
    World,
};

fn combo(world: &mut World, actor: ActorId, length: usize) -> Vec<ActionId> {
    let mut ids = Vec::new();
    for index in 0..length {
        let id = world.spawn_action("combo");
        world.attach_to_action(id, AttackEffect::new(1)).unwrap();
        if index > 0 {
            world
                .attach_to_action(id, FollowsPredecessor::default())
                .unwrap();
        }
        world.add_action(actor, id).unwrap();
        ids.push(id);
    }
    ids
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

#[test]
fn follow_ups_link_into_one_chain() {
    let mut world = World::default();
    let actor = world.spawn_actor();
    let ids = combo(&mut world, actor, 3);

    let mut chain = ActionChain::new();
    world.build_chain(ids[0], &mut chain).unwrap();
    assert_eq!(chain.as_slice(), ids.as_slice());

    // Starting mid-combo only pulls in what follows.
    let mut tail = ActionChain::new();
    world.build_chain(ids[1], &mut tail).unwrap();
    assert_eq!(tail.as_slice(), &ids[1..]);
}

#[test]
fn collision_executes_whole_combo() {
    let mut world = World::default();
    let a = world.spawn_combatant(10).unwrap();
    let b = world.spawn_combatant(10).unwrap();
    let ids = combo(&mut world, a, 3);
    let lone = world.spawn_action("lone");
    world.attach_to_action(lone, AttackEffect::new(4)).unwrap();
    world.add_action(a, lone).unwrap();

    let mut resolver = CollisionResolver::new();
    let _token = resolver.request(&mut world, a, b).unwrap().unwrap();
    let report = resolver.take_reports().remove(0);

    assert_eq!(report.chain_a.as_slice(), ids.as_slice());
    assert_eq!(report.steps.len(), 3);
    assert_eq!(health(&world, b), 7);
    assert_eq!(world.all_actions(a), vec![lone]);
}

#[test]
fn cycle_policy_requeues_rotation() {
    let mut world = World::default();
    let a = world.spawn_combatant(10).unwrap();
    let b = world.spawn_combatant(20).unwrap();
    let jab = world.spawn_action("jab");
    world.attach_to_action(jab, AttackEffect::new(2)).unwrap();
    world.add_action(a, jab).unwrap();
    world.attach_to_actor(a, CyclePolicy::new([jab])).unwrap();

    let mut resolver = CollisionResolver::new();
    for _ in 0..3 {
        let token = resolver.request(&mut world, a, b).unwrap().unwrap();
        resolver.release(token);
    }

    assert_eq!(health(&world, b), 14);
    assert_eq!(world.all_actions(a), vec![jab]);
    assert_eq!(world.action(jab).unwrap().executions(), 3);
    let policy = world
        .actor(a)
        .unwrap()
        .components()
        .get::<CyclePolicy>()
        .unwrap()
        .requeued();
    assert_eq!(policy, 3);
}

#[test]
fn empower_stacks_across_passes() {
    let mut world = World::default();
    let a = world.spawn_combatant(10).unwrap();
    let b = world.spawn_combatant(30).unwrap();
    let rally = world.spawn_action("rally");
    world
        .attach_to_action(rally, EmpowerEffect::new(Bonus::Flat(1)))
        .unwrap();
    world.attach_to_action(rally, AttackEffect::new(1)).unwrap();
    world.add_action(a, rally).unwrap();
    world.attach_to_actor(a, CyclePolicy::new([rally])).unwrap();

    let mut resolver = CollisionResolver::new();
    for _ in 0..3 {
        let token = resolver.request(&mut world, a, b).unwrap().unwrap();
        resolver.release(token);
    }

    // Empower runs before the attack: 1+1, 1+2, 1+3.
    assert_eq!(health(&world, b), 21);
    let bonus = world
        .actor(a)
        .unwrap()
        .components()
        .get::<AttackPower>()
        .unwrap()
        .final_value();
    assert_eq!(bonus, 3);
}
