//! End-to-end convergence tests.
//!
//! These run the scheduler for many ticks against the in-memory host, with
//! colonists fulfilling the oldest designations at a fixed rate, verifying:
//!
//! 1. Jobs reach their targets and settle without oscillating
//! 2. Deleting a job cancels everything it owns
//! 3. A save and reload picks up where it left off
//! 4. A broken job does not stop the others
//! 5. Jobs sharing candidates never take over each other's designations
//! 6. Livestock culls down to its bucket targets
//!
//! ## Running
//!
//! ```bash
//! cargo test -p steward-e2e --test convergence
//! ```

use std::collections::HashSet;

use steward_events::{event_types, EngineEvent, EventEnvelope};
use steward_id::{AreaId, DesignationKind, JobId};
use steward_manager::{
    AgeSex, HuntingConfig, JobKind, JobRecord, JobState, LivestockConfig, Scheduler,
    SchedulerConfig,
};
use steward_reconcile::{
    AnimalTraits, Position, Sex, StockFilter, ThresholdTrigger, Tick, WorldMap,
};
use steward_testing::{FakeMap, FakeWorld};
use tracing::info;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,steward_manager=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Twelve deer of 20 meat each, spread along a line from base.
fn deer_world() -> FakeWorld {
    let mut map = FakeMap::new();
    map.set_stock("meat", 0);
    for x in 1..=12 {
        map.spawn_animal("deer", Position::new(x * 4, 0), 20);
    }
    FakeWorld::new(map).producing(DesignationKind::Hunt, "meat")
}

fn hunting(scheduler: &Scheduler, target: u32) -> steward_manager::Job {
    scheduler.create_job(
        JobKind::Hunting(HuntingConfig::new(["deer"])),
        ThresholdTrigger::new(target, StockFilter::new(["meat"])),
    )
}

/// Tick `from..to`, fulfilling `rate` designations every 100 ticks.
/// Returns every event raised.
fn run(
    scheduler: &mut Scheduler,
    world: &mut FakeWorld,
    from: Tick,
    to: Tick,
    rate: usize,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    for now in from..to {
        let summary = scheduler.tick(&mut world.context(now));
        assert_eq!(summary.ticked, scheduler.len());
        if now % 100 == 0 {
            world.work(rate);
        }
        events.extend(scheduler.drain_events());
    }
    events
}

fn count(events: &[EventEnvelope], event_type: &str) -> usize {
    events.iter().filter(|e| e.event_type() == event_type).count()
}

#[test]
fn e2e_hunting_reaches_target_and_settles() {
    init_tracing();
    let mut world = deer_world();
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let job = hunting(&scheduler, 100);
    let id = scheduler.add(job);

    let events = run(&mut scheduler, &mut world, 0, 12_000, 2);

    assert!(world.map.stock("meat") >= 100);
    assert!(world.registry.is_empty());
    assert_eq!(scheduler.get(id).unwrap().state(), JobState::Completed);
    assert_eq!(count(&events, event_types::DESIGNATION_ISSUED), 5);
    assert_eq!(count(&events, event_types::DESIGNATION_WITHDRAWN), 0);
    info!(meat = world.map.stock("meat"), "Hunting settled");
}

#[test]
fn e2e_target_raised_after_completion_reactivates() {
    init_tracing();
    let mut world = deer_world();
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let job = hunting(&scheduler, 40);
    let id = scheduler.add(job);

    run(&mut scheduler, &mut world, 0, 3_000, 2);
    assert_eq!(world.map.stock("meat"), 40);
    assert_eq!(scheduler.get(id).unwrap().state(), JobState::Completed);

    scheduler.set_target(id, 100).unwrap();
    let events = run(&mut scheduler, &mut world, 3_000, 9_000, 2);
    assert_eq!(world.map.stock("meat"), 100);

    let activated = events.iter().any(|e| {
        matches!(
            e.event,
            EngineEvent::TriggerChanged { active: true, .. }
        )
    });
    assert!(activated);
}

#[test]
fn e2e_deleting_job_cancels_all_designations() {
    init_tracing();
    let mut world = deer_world();
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let job = hunting(&scheduler, 100);
    let id = scheduler.add(job);

    scheduler.tick(&mut world.context(0));
    assert_eq!(world.registry.len(), 5);
    assert_eq!(scheduler.get(id).unwrap().designations().len(), 5);

    let cancelled = scheduler.delete(id, &mut world.registry).unwrap();
    assert_eq!(cancelled, 5);
    assert!(world.registry.is_empty());
    assert!(scheduler.is_empty());

    let events = scheduler.drain_events();
    let deleted = events.last().map(|e| &e.event);
    assert_eq!(deleted, Some(&EngineEvent::JobDeleted { cancelled: 5 }));
}

#[test]
fn e2e_save_and_reload_continues_without_reissuing() {
    init_tracing();
    let mut world = deer_world();
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let job = hunting(&scheduler, 200);
    let id = scheduler.add(job);

    run(&mut scheduler, &mut world, 0, 150, 2);
    let outstanding = world.registry.len();
    assert!(outstanding > 0);

    let saved = serde_json::to_string(&scheduler.snapshot()).unwrap();
    let records: Vec<JobRecord> = serde_json::from_str(&saved).unwrap();
    let mut restored = Scheduler::restore(SchedulerConfig::default(), records, &world.map);
    let adds = world.registry.adds();

    let job = restored.get(id).unwrap();
    assert_eq!(job.designations(), scheduler.get(id).unwrap().designations());
    assert_eq!(job.last_action(), Some(0));

    // Before the action interval passes, nothing is placed again.
    run(&mut restored, &mut world, 150, 2_000, 0);
    assert_eq!(world.registry.adds(), adds);

    run(&mut restored, &mut world, 2_000, 20_000, 2);
    assert!(world.map.stock("meat") >= 200);
    assert_eq!(restored.get(id).unwrap().state(), JobState::Completed);
}

#[test]
fn e2e_broken_job_does_not_stop_others() {
    init_tracing();
    let mut world = deer_world();
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let broken = scheduler.create_job(
        JobKind::Hunting(HuntingConfig::new(["deer"]).in_area(AreaId::new(99))),
        ThresholdTrigger::new(100, StockFilter::new(["meat"])),
    );
    let broken = scheduler.add(broken);
    let job = hunting(&scheduler, 60);
    let healthy = scheduler.add(job);

    let events = run(&mut scheduler, &mut world, 0, 6_000, 2);

    assert_eq!(scheduler.get(broken).unwrap().state(), JobState::Invalid);
    assert_eq!(scheduler.get(healthy).unwrap().state(), JobState::Completed);
    assert!(world.map.stock("meat") >= 60);

    let invalidated: Vec<Option<JobId>> = events
        .iter()
        .filter(|e| e.event_type() == event_types::JOB_INVALIDATED)
        .map(|e| e.job_id)
        .collect();
    assert_eq!(invalidated, vec![Some(broken)]);
}

#[test]
fn e2e_sibling_jobs_keep_their_own_designations() {
    init_tracing();
    let mut world = deer_world();
    world.produce.clear();
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let job = hunting(&scheduler, 60);
    let first = scheduler.add(job);
    let job = hunting(&scheduler, 60);
    let second = scheduler.add(job);

    // No work done: both jobs keep their orders outstanding.
    let events = run(&mut scheduler, &mut world, 0, 5_100, 0);

    let own = |id| -> HashSet<_> {
        scheduler.get(id).unwrap().designations().iter().copied().collect()
    };
    let (a, b) = (own(first), own(second));
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 3);
    assert!(a.is_disjoint(&b));
    assert_eq!(world.registry.len(), 6);
    assert_eq!(count(&events, event_types::DESIGNATION_ADOPTED), 0);
}

#[test]
fn e2e_livestock_culls_to_bucket_targets() {
    init_tracing();
    let mut map = FakeMap::new();
    let cow = AnimalTraits {
        wild: false,
        sex: Sex::Female,
        adult: true,
        meat_yield: 100,
    };
    for x in 1..=3 {
        map.spawn_animal_with("muffalo", Position::new(x, 0), cow.clone());
    }
    map.spawn_animal_with(
        "muffalo",
        Position::new(9, 9),
        AnimalTraits {
            wild: true,
            ..cow.clone()
        },
    );
    let mut world = FakeWorld::new(map).producing(DesignationKind::Slaughter, "meat");

    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let job = scheduler.create_job(
        JobKind::Livestock(LivestockConfig::new("muffalo").with_target(AgeSex::AdultFemale, 1)),
        ThresholdTrigger::new(0, StockFilter::new(["muffalo"])),
    );
    let id = scheduler.add(job);

    let events = run(&mut scheduler, &mut world, 0, 3_000, 1);

    assert_eq!(world.map.colony_animals("muffalo").len(), 1);
    assert_eq!(world.map.stock("meat"), 200);
    assert_eq!(count(&events, event_types::DESIGNATION_ISSUED), 2);
    assert_eq!(scheduler.get(id).unwrap().state(), JobState::Completed);
}
