//! Integration tests for designation reconciliation.
//!
//! Runs [`reconcile`] against the in-memory host from `steward-testing`:
//! 1. Sync and prune the job's local set against the registry
//! 2. Adopt matching designations nobody else owns
//! 3. Issue on the best candidates while short, withdraw while over

use std::collections::HashSet;

use proptest::prelude::*;
use steward_id::{DesignationKind, ThingId};
use steward_reconcile::{
    assess, reconcile, Designation, DesignationRegistry, LocalDesignations, Position,
    ReconcilePass, Scoring, Thing, WorldMap,
};
use steward_testing::{FakeMap, FakeWorld};

fn meat(thing: &Thing) -> u32 {
    thing.animal().map_or(0, |a| a.meat_yield)
}

fn hunt_pass<'a>(def: &'a str, target: i64, current: i64) -> ReconcilePass<'a> {
    ReconcilePass::new(DesignationKind::Hunt, target, current)
        .eligible(move |t| t.def == def)
        .yields(meat)
}

fn no_siblings() -> HashSet<Designation> {
    HashSet::new()
}

fn run(world: &mut FakeWorld, local: &mut LocalDesignations, passes: &[ReconcilePass<'_>]) -> steward_reconcile::ReconcileOutcome {
    reconcile(local, &mut world.registry, &world.map, &no_siblings(), passes)
}

fn hunt(target: ThingId) -> Designation {
    Designation::new(target, DesignationKind::Hunt)
}

#[test]
fn test_issues_best_candidates_until_budget_runs_out() {
    let mut map = FakeMap::new();
    let a = map.spawn_animal("deer", Position::new(5, 0), 20);
    let b = map.spawn_animal("deer", Position::new(10, 0), 25);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();

    let outcome = run(&mut world, &mut local, &[hunt_pass("deer", 100, 40)]);

    // 20/5 outranks 25/10.
    assert_eq!(outcome.issued, vec![hunt(a), hunt(b)]);
    let order: Vec<_> = local.iter().copied().collect();
    assert_eq!(order, vec![hunt(a), hunt(b)]);

    let balance = outcome.balances[0];
    assert_eq!(balance.pending, 45);
    assert_eq!(balance.deficit(), 15);
    assert!(balance.is_short());
    assert!(world.registry.contains(&hunt(a)));
    assert!(world.registry.contains(&hunt(b)));
}

#[test]
fn test_second_call_is_noop() {
    let mut map = FakeMap::new();
    for x in 1..=6 {
        map.spawn_animal("deer", Position::new(x * 3, 0), 20);
    }
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();
    let passes = [hunt_pass("deer", 70, 0)];

    let first = run(&mut world, &mut local, &passes);
    assert_eq!(first.issued.len(), 4);

    let adds = world.registry.adds();
    let second = run(&mut world, &mut local, &passes);
    assert!(second.is_noop(), "{second:?}");
    assert_eq!(world.registry.adds(), adds);
    assert_eq!(world.registry.deletes(), 0);
}

#[test]
fn test_overshoot_settles_in_one_call() {
    let mut map = FakeMap::new();
    let small = map.spawn_animal("deer", Position::new(1, 0), 2);
    let big = map.spawn_animal("deer", Position::new(10, 0), 10);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();
    let passes = [hunt_pass("deer", 10, 0)];

    // 2/1 outranks 10/10, but once the big one is in the small one is spare.
    let first = run(&mut world, &mut local, &passes);
    assert_eq!(first.issued, vec![hunt(big)]);
    assert!(first.withdrawn.is_empty());
    assert!(first.balances[0].is_balanced());
    assert!(!world.registry.contains(&hunt(small)));

    let second = run(&mut world, &mut local, &passes);
    assert!(second.is_noop(), "{second:?}");
    let order: Vec<_> = local.iter().copied().collect();
    assert_eq!(order, vec![hunt(big)]);
}

#[test]
fn test_adopted_designation_made_spare_by_issue_is_withdrawn() {
    let mut map = FakeMap::new();
    let lean = map.spawn_animal("deer", Position::new(1, 0), 1);
    let fat = map.spawn_animal("deer", Position::new(2, 0), 10);
    let mut world = FakeWorld::new(map);
    world.registry.designate_by_hand(lean, DesignationKind::Hunt);
    let mut local = LocalDesignations::new();
    let passes = [hunt_pass("deer", 10, 0)];

    let first = run(&mut world, &mut local, &passes);
    assert_eq!(first.adopted, vec![hunt(lean)]);
    assert_eq!(first.issued, vec![hunt(fat)]);
    assert_eq!(first.withdrawn, vec![hunt(lean)]);
    assert!(!first.balances[0].retractable);

    let deletes = world.registry.deletes();
    let second = run(&mut world, &mut local, &passes);
    assert!(second.is_noop(), "{second:?}");
    assert_eq!(world.registry.deletes(), deletes);
}

#[test]
fn test_stops_once_target_covered() {
    let mut map = FakeMap::new();
    let near = map.spawn_animal("deer", Position::new(1, 0), 30);
    map.spawn_animal("deer", Position::new(50, 0), 30);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();

    let outcome = run(&mut world, &mut local, &[hunt_pass("deer", 50, 25)]);
    assert_eq!(outcome.issued, vec![hunt(near)]);
    assert!(outcome.balances[0].is_balanced());
}

#[test]
fn test_adopts_manual_designation() {
    let mut map = FakeMap::new();
    let deer = map.spawn_animal("deer", Position::new(1, 0), 20);
    let boar = map.spawn_animal("boar", Position::new(1, 1), 20);
    let mut world = FakeWorld::new(map);
    world.registry.designate_by_hand(deer, DesignationKind::Hunt);
    world.registry.designate_by_hand(boar, DesignationKind::Hunt);
    let mut local = LocalDesignations::new();

    let outcome = run(&mut world, &mut local, &[hunt_pass("deer", 20, 0)]);

    assert_eq!(outcome.adopted, vec![hunt(deer)]);
    assert!(outcome.issued.is_empty());
    assert!(local.contains(&hunt(deer)));
    assert!(!local.contains(&hunt(boar)));
    // Not ours and not matching: left alone.
    assert!(world.registry.contains(&hunt(boar)));
}

#[test]
fn test_sibling_designations_are_not_adopted() {
    let mut map = FakeMap::new();
    let deer = map.spawn_animal("deer", Position::new(1, 0), 20);
    let mut world = FakeWorld::new(map);
    world.registry.designate_by_hand(deer, DesignationKind::Hunt);
    let siblings: HashSet<_> = [hunt(deer)].into_iter().collect();
    let mut local = LocalDesignations::new();

    let outcome = reconcile(
        &mut local,
        &mut world.registry,
        &world.map,
        &siblings,
        &[hunt_pass("deer", 20, 0)],
    );

    assert!(outcome.adopted.is_empty());
    assert!(local.is_empty());
    assert!(world.registry.contains(&hunt(deer)));
}

#[test]
fn test_releases_designations_removed_externally() {
    let mut map = FakeMap::new();
    let deer = map.spawn_animal("deer", Position::new(1, 0), 20);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();
    let passes = [hunt_pass("deer", 10, 0)];

    run(&mut world, &mut local, &passes);
    assert!(local.contains(&hunt(deer)));

    // The player cancels it and the deer wanders off.
    world.registry.delete(&hunt(deer));
    world.map.despawn(deer);

    let outcome = run(&mut world, &mut local, &passes);
    assert_eq!(outcome.released, vec![hunt(deer)]);
    assert!(local.is_empty());
}

#[test]
fn test_prunes_after_configuration_change() {
    let mut map = FakeMap::new();
    let deer = map.spawn_animal("deer", Position::new(1, 0), 20);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();

    run(&mut world, &mut local, &[hunt_pass("deer", 20, 0)]);
    assert_eq!(world.registry.len(), 1);

    // Deer are no longer allowed.
    let outcome = run(&mut world, &mut local, &[hunt_pass("boar", 20, 0)]);
    assert_eq!(outcome.pruned, vec![hunt(deer)]);
    assert!(local.is_empty());
    assert!(world.registry.is_empty());
}

#[test]
fn test_prunes_kind_no_longer_used() {
    let mut map = FakeMap::new();
    let deer = map.spawn_animal("deer", Position::new(1, 0), 20);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();
    run(&mut world, &mut local, &[hunt_pass("deer", 20, 0)]);

    let tame = ReconcilePass::new(DesignationKind::Tame, 1, 0).eligible(|t| t.def == "deer");
    let outcome = run(&mut world, &mut local, &[tame]);

    assert_eq!(outcome.pruned, vec![hunt(deer)]);
    assert_eq!(outcome.issued, vec![Designation::new(deer, DesignationKind::Tame)]);
}

#[test]
fn test_withdraws_newest_without_reopening_deficit() {
    let mut map = FakeMap::new();
    let a = map.spawn_animal("deer", Position::new(1, 0), 20);
    let b = map.spawn_animal("deer", Position::new(2, 0), 25);
    let c = map.spawn_animal("deer", Position::new(3, 0), 30);
    let mut world = FakeWorld::new(map);
    for id in [a, b, c] {
        world.registry.designate_by_hand(id, DesignationKind::Hunt);
    }
    let mut local = LocalDesignations::new();

    // 40 + 75 pending against 70: 45 over.
    let outcome = run(&mut world, &mut local, &[hunt_pass("deer", 70, 40)]);

    // Dropping c leaves 15 over; dropping b or a next would leave a deficit.
    assert_eq!(outcome.withdrawn, vec![hunt(c)]);
    let balance = outcome.balances[0];
    assert_eq!(balance.deficit(), -15);
    assert!(!balance.retractable);
    assert!(balance.is_balanced());
    assert!(!world.registry.contains(&hunt(c)));

    let again = run(&mut world, &mut local, &[hunt_pass("deer", 70, 40)]);
    assert!(again.is_noop());
}

#[test]
fn test_withdrawal_is_lifo() {
    let mut map = FakeMap::new();
    let ids: Vec<_> = (1..=4)
        .map(|x| map.spawn_animal("deer", Position::new(x, 0), 10))
        .collect();
    let mut world = FakeWorld::new(map);
    for id in &ids {
        world.registry.designate_by_hand(*id, DesignationKind::Hunt);
    }
    let mut local = LocalDesignations::new();

    let outcome = run(&mut world, &mut local, &[hunt_pass("deer", 20, 0)]);
    assert_eq!(outcome.withdrawn, vec![hunt(ids[3]), hunt(ids[2])]);
    let kept: Vec<_> = local.iter().copied().collect();
    assert_eq!(kept, vec![hunt(ids[0]), hunt(ids[1])]);
}

#[test]
fn test_skips_zero_yield_and_designated_candidates() {
    let mut map = FakeMap::new();
    let empty = map.spawn_animal("deer", Position::new(1, 0), 0);
    let taken = map.spawn_animal("deer", Position::new(2, 0), 20);
    let free = map.spawn_animal("deer", Position::new(9, 0), 20);
    let mut world = FakeWorld::new(map);
    world.registry.designate_by_hand(taken, DesignationKind::Tame);
    let mut local = LocalDesignations::new();

    let outcome = run(&mut world, &mut local, &[hunt_pass("deer", 100, 0)]);

    assert_eq!(outcome.issued, vec![hunt(free)]);
    assert!(world.registry.designation_on(empty).is_none());
    assert_eq!(
        world.registry.designation_on(taken),
        Some(Designation::new(taken, DesignationKind::Tame))
    );
}

#[test]
fn test_equal_scores_keep_host_order() {
    let mut map = FakeMap::new();
    let first = map.spawn_animal("deer", Position::new(30, 0), 10);
    let second = map.spawn_animal("deer", Position::new(2, 0), 10);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();

    let pass = hunt_pass("deer", 10, 0).scoring(Scoring::Yield);
    let outcome = run(&mut world, &mut local, &[pass]);
    assert_eq!(outcome.issued, vec![hunt(first)]);
    assert!(world.registry.designation_on(second).is_none());
}

#[test]
fn test_disjoint_passes_share_candidates() {
    use steward_reconcile::{AnimalTraits, Sex};

    let mut map = FakeMap::new();
    let animal = |sex| AnimalTraits {
        wild: true,
        sex,
        adult: true,
        meat_yield: 40,
    };
    let cow = map.spawn_animal_with("muffalo", Position::new(1, 0), animal(Sex::Female));
    let bull = map.spawn_animal_with("muffalo", Position::new(2, 0), animal(Sex::Male));
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();

    let of_sex = |sex: Sex| {
        ReconcilePass::new(DesignationKind::Tame, 1, 0)
            .eligible(move |t| t.animal().is_some_and(|a| a.sex == sex))
            .scoring(Scoring::Yield)
    };
    let passes = [of_sex(Sex::Female), of_sex(Sex::Male)];

    let outcome = run(&mut world, &mut local, &passes);
    assert_eq!(
        outcome.issued,
        vec![
            Designation::new(cow, DesignationKind::Tame),
            Designation::new(bull, DesignationKind::Tame),
        ]
    );
    assert!(outcome.balances.iter().all(|b| b.is_balanced()));
    assert!(run(&mut world, &mut local, &passes).is_noop());
}

#[test]
fn test_assess_does_not_mutate() {
    let mut map = FakeMap::new();
    let deer = map.spawn_animal("deer", Position::new(1, 0), 20);
    let mut world = FakeWorld::new(map);
    let mut local = LocalDesignations::new();
    run(&mut world, &mut local, &[hunt_pass("deer", 100, 0)]);

    let balances = assess(&local, &world.map, &[hunt_pass("deer", 100, 0)]);
    assert_eq!(balances[0].pending, 20);
    assert!(world.map.thing(deer).is_some());
    assert_eq!(world.registry.adds(), 1);
}

proptest! {
    #[test]
    fn prop_converges_and_stays_consistent(
        herd in proptest::collection::vec((0i32..40, 0i32..40, 0u32..60), 0..25),
        manual in proptest::collection::vec(any::<prop::sample::Index>(), 0..5),
        target in 0i64..600,
        current in 0i64..300,
    ) {
        let mut map = FakeMap::new();
        let ids: Vec<_> = herd
            .iter()
            .map(|(x, z, y)| map.spawn_animal("deer", Position::new(*x, *z), *y))
            .collect();
        let mut world = FakeWorld::new(map);
        if !ids.is_empty() {
            for index in &manual {
                world.registry.designate_by_hand(*index.get(&ids), DesignationKind::Hunt);
            }
        }
        let mut local = LocalDesignations::new();
        let passes = [hunt_pass("deer", target, current)];

        let outcome = run(&mut world, &mut local, &passes);

        // Every local designation is in the registry.
        for d in local.iter() {
            prop_assert!(world.registry.contains(d));
        }

        // Short only if every useful candidate is already taken.
        let balance = outcome.balances[0];
        if balance.is_short() {
            for thing in world.map.candidates(DesignationKind::Hunt) {
                if meat(&thing) > 0 {
                    prop_assert!(world.registry.designation_on(thing.id).is_some());
                }
            }
        }
        prop_assert!(!balance.retractable);

        // Nothing left to do.
        let again = run(&mut world, &mut local, &passes);
        prop_assert!(again.is_noop(), "{:?}", again);
    }
}
