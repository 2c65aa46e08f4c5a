use std::collections::BTreeSet;

use proptest::prelude::*;
use skirmish_core::{ActorId, CollisionResolver, CoreConfig, PairKey, ProcessableValue, World};

#[derive(Clone, Debug)]
enum Op {
    Increase(i32),
    Decrease(i32),
    Set(i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Increase),
        any::<i32>().prop_map(Op::Decrease),
        any::<i32>().prop_map(Op::Set),
    ]
}

proptest! {
    /// `current` never leaves `[0, max]`, whatever the mutation sequence.
    #[test]
    fn value_stays_clamped(max in 0i32..1_000, start in any::<i32>(), ops in prop::collection::vec(op(), 0..64)) {
        let mut value = ProcessableValue::new(start, max);
        for op in ops {
            match op {
                Op::Increase(n) => { value.increase(n, None); }
                Op::Decrease(n) => { value.decrease(n, None); }
                Op::Set(n) => { value.set_current(n); }
            }
            prop_assert!(value.current() >= 0);
            prop_assert!(value.current() <= value.max());
        }
    }

    /// Out-of-range writes land on the nearest boundary.
    #[test]
    fn set_current_clamps_to_boundary(max in 0i32..1_000, target in any::<i32>()) {
        let mut value = ProcessableValue::full(max);
        value.set_current(target);
        prop_assert_eq!(value.current(), target.clamp(0, max));
    }

    /// Adding past capacity never changes the queue.
    #[test]
    fn queue_never_exceeds_capacity(capacity in 0usize..8, adds in 0usize..16) {
        let mut world = World::new(CoreConfig::with_queue_capacity(capacity));
        let actor = world.spawn_actor();
        for index in 0..adds {
            let action = world.spawn_action("filler");
            let accepted = world.add_action(actor, action).unwrap();
            prop_assert_eq!(accepted, index < capacity);
        }
        prop_assert_eq!(world.all_actions(actor).len(), adds.min(capacity));
    }

    /// At most one token per unordered pair is ever outstanding.
    #[test]
    fn lock_is_exclusive_per_pair(requests in prop::collection::vec((0u64..4, 0u64..4, any::<bool>()), 1..64)) {
        let mut world = World::default();
        let actors: Vec<ActorId> = (0..4).map(|_| world.spawn_combatant(10).unwrap()).collect();
        let mut resolver = CollisionResolver::new();
        let mut held: BTreeSet<PairKey> = BTreeSet::new();

        for (x, y, release) in requests {
            let (a, b) = (actors[x as usize], actors[y as usize]);
            let key = PairKey::new(a, b);
            if release {
                prop_assert_eq!(resolver.release_pair(b, a), held.remove(&key));
            } else {
                let token = resolver.request(&mut world, a, b).unwrap();
                prop_assert_eq!(token.is_some(), held.insert(key));
            }
            prop_assert_eq!(resolver.lock_count(), held.len());
        }
    }
}
