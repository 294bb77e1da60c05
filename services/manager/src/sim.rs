//! Seeded world and tick loop for the simulator binary.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use steward_id::{AreaId, DesignationKind};
use steward_manager::{
    AgeSex, ForagingConfig, ForestryConfig, HuntingConfig, JobKind, JobRecord, LivestockConfig,
    Scheduler, SchedulerConfig,
};
use steward_reconcile::{AnimalTraits, Position, Sex, StockFilter, ThresholdTrigger, Tick};
use steward_testing::{FakeMap, FakeWorld, Rect};
use tracing::{debug, info};

const MAP_SIZE: i32 = 120;
const PROGRESS_EVERY: Tick = 10_000;

/// Simulator settings.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub ticks: Tick,
    pub seed: u64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    pub log_json: bool,
    pub snapshot_path: Option<String>,
    pub work_rate: usize,
}

impl SimConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let ticks = parse_var("STEWARD_TICKS")?.unwrap_or(120_000);
        let seed = parse_var("STEWARD_SEED")?.unwrap_or(7);
        let work_rate = parse_var("STEWARD_WORK_RATE")?.unwrap_or(2);

        let log_level = std::env::var("STEWARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = std::env::var("STEWARD_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");
        let snapshot_path = std::env::var("STEWARD_SNAPSHOT_PATH").ok();

        Ok(Self {
            ticks,
            seed,
            log_level,
            log_json,
            snapshot_path,
            work_rate,
        })
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("invalid {name}: {raw}")),
        Err(_) => Ok(None),
    }
}

pub struct Simulation {
    world: FakeWorld,
    scheduler: Scheduler,
    work_rate: usize,
    now: Tick,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let world = generate_world(&mut rng);

        let mut scheduler = Scheduler::new(SchedulerConfig::default());
        for (kind, trigger) in starting_jobs() {
            let job = scheduler.create_job(kind, trigger);
            scheduler.add(job);
        }

        Self {
            world,
            scheduler,
            work_rate: config.work_rate,
            now: 0,
        }
    }

    pub fn run(&mut self, ticks: Tick) {
        for _ in 0..ticks {
            let summary = self.scheduler.tick(&mut self.world.context(self.now));
            if let Some(error) = &summary.error {
                debug!(tick = self.now, error = %error, "Job failed this tick");
            }

            if self.now % 100 == 0 {
                self.world.work(self.work_rate);
            }
            for event in self.scheduler.drain_events() {
                debug!(tick = event.tick, seq = event.seq, event_type = event.event_type(), "Engine event");
            }
            if self.now % PROGRESS_EVERY == 0 {
                self.report();
            }
            self.now += 1;
        }
    }

    pub fn report(&self) {
        for job in self.scheduler.iter() {
            let (current, pending, target) = job
                .status()
                .map_or((0, 0, 0), |s| (s.current, s.pending, s.target));
            info!(
                tick = self.now,
                job_id = %job.id(),
                kind = %job.tag(),
                state = ?job.state(),
                current,
                pending,
                target,
                designated = job.designations().len(),
                "Job progress"
            );
        }
    }

    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.scheduler.snapshot()
    }
}

fn starting_jobs() -> Vec<(JobKind, ThresholdTrigger)> {
    vec![
        (
            JobKind::Hunting(HuntingConfig::new(["deer", "boar"])),
            ThresholdTrigger::new(300, StockFilter::new(["meat"])),
        ),
        (
            JobKind::Forestry(ForestryConfig::new(["oak", "pine"]).in_area(AreaId::new(1))),
            ThresholdTrigger::new(400, StockFilter::new(["wood"])),
        ),
        (
            JobKind::Foraging(ForagingConfig::new(["berry_bush"])),
            ThresholdTrigger::new(120, StockFilter::new(["berries"])),
        ),
        (
            JobKind::Livestock(
                LivestockConfig::new("muffalo")
                    .with_target(AgeSex::AdultFemale, 4)
                    .with_target(AgeSex::AdultMale, 1),
            ),
            ThresholdTrigger::new(0, StockFilter::new(["muffalo"])),
        ),
    ]
}

fn random_position(rng: &mut StdRng) -> Position {
    Position::new(rng.random_range(0..MAP_SIZE), rng.random_range(0..MAP_SIZE))
}

fn generate_world(rng: &mut StdRng) -> FakeWorld {
    let mut map = FakeMap::new().with_base(Position::new(MAP_SIZE / 2, MAP_SIZE / 2));
    map.add_area(
        AreaId::new(1),
        Rect::new(Position::new(0, 0), Position::new(MAP_SIZE / 2, MAP_SIZE)),
    );
    for def in ["meat", "wood", "berries"] {
        map.set_stock(def, 0);
    }

    for _ in 0..40 {
        let def = if rng.random_bool(0.7) { "deer" } else { "boar" };
        let position = random_position(rng);
        map.spawn_animal(def, position, rng.random_range(15..60));
    }
    for _ in 0..12 {
        let traits = AnimalTraits {
            wild: true,
            sex: if rng.random_bool(0.5) { Sex::Female } else { Sex::Male },
            adult: rng.random_bool(0.8),
            meat_yield: rng.random_range(80..140),
        };
        let position = random_position(rng);
        map.spawn_animal_with("muffalo", position, traits);
    }
    for _ in 0..80 {
        let def = if rng.random_bool(0.5) { "oak" } else { "pine" };
        let position = random_position(rng);
        map.spawn_tree(def, position, rng.random_range(20..45));
    }
    for _ in 0..60 {
        let position = random_position(rng);
        map.spawn_plant("berry_bush", position, rng.random_range(3..12));
    }

    let world = FakeWorld::new(map)
        .producing(DesignationKind::Hunt, "meat")
        .producing(DesignationKind::Slaughter, "meat")
        .producing(DesignationKind::CutPlant, "wood")
        .producing(DesignationKind::HarvestPlant, "berries");
    info!(things = world.map.things().count(), "World generated");
    world
}
