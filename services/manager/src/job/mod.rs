//! Jobs: one configured target, the trigger watching it, and the
//! designations placed to meet it.

mod kind;
mod livestock;

use std::collections::HashSet;

use steward_history::History;
use steward_id::{DesignationKind, JobId};
use steward_reconcile::{
    assess, reconcile, Designation, DesignationRegistry, HostContext, LocalDesignations,
    PassBalance, ReconcileOutcome, StockCounter, ThresholdTrigger, Tick, TimedValue, Transition,
    TriggerError, WorldMap,
};
use tracing::instrument;

pub use kind::{
    ForagingConfig, ForestryConfig, HuntingConfig, JobKind, JobKindTag, DEFAULT_MIN_GROWTH,
};
pub use livestock::{AgeSex, LivestockConfig};

use crate::config::SchedulerConfig;
use crate::error::JobError;
use crate::record::{JobRecord, RECORD_VERSION};
use crate::training::TrainingGraph;

/// History chapter labels every job records.
pub const CHAPTER_STOCK: &str = "stock";
pub const CHAPTER_DESIGNATED: &str = "designated";
pub const CHAPTER_TARGET: &str = "target";

/// Where a job stands, as shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Invalid,
    Suspended,
    /// Short of target; will issue designations.
    Active,
    /// Target met, but owns designations it can withdraw.
    Retracting,
    Completed,
}

/// Counts from the last status refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub current: i64,
    /// Net yield of outstanding designations; culls count negative.
    pub pending: i64,
    pub target: i64,
    pub designated: usize,
    pub balances: Vec<PassBalance>,
}

impl JobStatus {
    fn new(current: i64, target: i64, designated: usize, balances: Vec<PassBalance>) -> Self {
        let pending = balances
            .iter()
            .map(|b| match b.kind {
                DesignationKind::Slaughter => -b.pending,
                _ => b.pending,
            })
            .sum();
        Self {
            current,
            pending,
            target,
            designated,
            balances,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.balances.iter().all(PassBalance::is_balanced)
    }

    pub fn is_short(&self) -> bool {
        self.balances.iter().any(PassBalance::is_short)
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    priority: usize,
    managed: bool,
    suspended: bool,
    valid: bool,
    invalid_reason: Option<String>,
    last_action: Option<Tick>,
    action_interval: Tick,
    kind: JobKind,
    trigger: ThresholdTrigger,
    history: History,
    local: LocalDesignations,
    status: TimedValue<JobStatus>,
}

impl Job {
    pub fn new(kind: JobKind, trigger: ThresholdTrigger, config: &SchedulerConfig) -> Self {
        let mut job = Self {
            id: JobId::new(),
            priority: 0,
            managed: false,
            suspended: false,
            valid: true,
            invalid_reason: None,
            last_action: None,
            action_interval: config.default_action_interval,
            kind,
            trigger,
            history: History::new(
                config.history,
                [CHAPTER_STOCK, CHAPTER_DESIGNATED, CHAPTER_TARGET],
            ),
            local: LocalDesignations::new(),
            status: TimedValue::new(config.status_interval),
        };
        job.sync_livestock_target();
        job
    }

    pub(crate) fn from_record(record: JobRecord, config: &SchedulerConfig) -> Self {
        Self {
            id: record.id,
            priority: record.priority,
            managed: false,
            suspended: record.suspended,
            valid: true,
            invalid_reason: None,
            last_action: record.last_action,
            action_interval: record.action_interval,
            kind: record.kind,
            trigger: record.trigger,
            history: record.history,
            local: record.designations,
            status: TimedValue::new(config.status_interval),
        }
    }

    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            version: RECORD_VERSION,
            id: self.id,
            priority: self.priority,
            suspended: self.suspended,
            last_action: self.last_action,
            action_interval: self.action_interval,
            kind: self.kind.clone(),
            trigger: self.trigger.clone(),
            history: self.history.clone(),
            designations: self.local.clone(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn priority(&self) -> usize {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: usize) {
        self.priority = priority;
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub(crate) fn set_managed(&mut self, managed: bool) {
        self.managed = managed;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Returns false if already in that state.
    pub fn set_suspended(&mut self, suspended: bool) -> bool {
        std::mem::replace(&mut self.suspended, suspended) != suspended
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalid_reason(&self) -> Option<&str> {
        self.invalid_reason.as_deref()
    }

    /// Exclude the job from scheduling. Returns true only the first time,
    /// so callers report each invalidation once.
    pub fn invalidate(&mut self, reason: impl Into<String>) -> bool {
        if !self.valid {
            return false;
        }
        self.valid = false;
        self.invalid_reason = Some(reason.into());
        true
    }

    pub fn last_action(&self) -> Option<Tick> {
        self.last_action
    }

    pub fn action_interval(&self) -> Tick {
        self.action_interval
    }

    pub fn set_action_interval(&mut self, interval: Tick) {
        self.action_interval = interval;
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    pub fn tag(&self) -> JobKindTag {
        self.kind.tag()
    }

    pub fn trigger(&self) -> &ThresholdTrigger {
        &self.trigger
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn designations(&self) -> &LocalDesignations {
        &self.local
    }

    /// The last computed status, however old.
    pub fn status(&self) -> Option<&JobStatus> {
        self.status.last()
    }

    pub fn is_completed(&self) -> bool {
        self.status().is_some_and(JobStatus::is_completed)
    }

    pub fn state(&self) -> JobState {
        if !self.valid {
            return JobState::Invalid;
        }
        if self.suspended {
            return JobState::Suspended;
        }
        match self.status() {
            None => JobState::Active,
            Some(status) if status.is_completed() => JobState::Completed,
            Some(status) if status.is_short() => JobState::Active,
            Some(_) => JobState::Retracting,
        }
    }

    pub fn should_do_now(&self, now: Tick) -> bool {
        self.managed
            && self.valid
            && !self.suspended
            && !self.is_completed()
            && self
                .last_action
                .is_none_or(|last| now.saturating_sub(last) >= self.action_interval)
    }

    pub fn touch(&mut self, now: Tick) {
        self.last_action = Some(now);
    }

    /// Replace the configuration if the host accepts it. A job invalidated
    /// by its old configuration becomes valid again.
    pub fn configure(&mut self, kind: JobKind, map: &dyn WorldMap) -> Result<(), JobError> {
        kind.validate(&self.trigger, map)?;
        self.kind = kind;
        self.valid = true;
        self.invalid_reason = None;
        self.sync_livestock_target();
        self.status.invalidate();
        Ok(())
    }

    /// Livestock targets are set per bucket; see [`set_bucket_target`](Self::set_bucket_target).
    pub fn set_target(&mut self, value: u32) -> Result<(), JobError> {
        if let JobKind::Livestock(_) = self.kind {
            return Err(JobError::DerivedTarget(JobKindTag::Livestock));
        }
        self.trigger.set_target(value)?;
        self.status.invalidate();
        Ok(())
    }

    /// Set one livestock bucket. Rejected, with nothing changed, if the herd
    /// total would exceed the trigger's bound.
    pub fn set_bucket_target(&mut self, bucket: AgeSex, value: u32) -> Result<(), JobError> {
        let actual = self.kind.tag();
        let JobKind::Livestock(config) = &mut self.kind else {
            return Err(JobError::WrongKind {
                expected: JobKindTag::Livestock,
                actual,
            });
        };
        let total = (config.total_target() - config.target_for(bucket)).saturating_add(value);
        self.trigger.set_target(total)?;
        config.targets.insert(bucket, value);
        self.status.invalidate();
        Ok(())
    }

    pub fn set_trigger(&mut self, trigger: ThresholdTrigger) -> Result<(), TriggerError> {
        if trigger.filter().is_empty() {
            return Err(TriggerError::EmptyFilter);
        }
        self.trigger = trigger;
        self.sync_livestock_target();
        self.status.invalidate();
        Ok(())
    }

    pub fn training_mut(&mut self) -> Option<&mut TrainingGraph> {
        match &mut self.kind {
            JobKind::Livestock(config) => Some(&mut config.training),
            _ => None,
        }
    }

    fn sync_livestock_target(&mut self) {
        if let JobKind::Livestock(config) = &self.kind {
            self.trigger.set_target_clamped(config.total_target());
        }
    }

    /// Per-tick bookkeeping: refresh the cached status when stale, feed the
    /// trigger and record history. Runs for every job, eligible or not.
    pub fn tick(&mut self, now: Tick, map: &dyn WorldMap, stock: &dyn StockCounter) -> Transition {
        let (kind, trigger, local) = (&self.kind, &self.trigger, &self.local);
        let status = self
            .status
            .get_or_update(now, || compute_status(kind, trigger, local, map, stock));
        let (current, pending, target, designated) =
            (status.current, status.pending, status.target, status.designated as i64);

        self.history.record(
            now,
            [
                (CHAPTER_STOCK, current),
                (CHAPTER_DESIGNATED, designated),
                (CHAPTER_TARGET, target),
            ],
        );
        self.trigger.update(current, pending)
    }

    /// Reconcile this job's designations against the host.
    ///
    /// `siblings` are designations owned by other jobs. Configuration errors
    /// are returned without touching the registry.
    #[instrument(skip_all, fields(job_id = %self.id, kind = %self.kind.tag()))]
    pub fn run(
        &mut self,
        ctx: &mut HostContext<'_>,
        siblings: &HashSet<Designation>,
    ) -> Result<ReconcileOutcome, JobError> {
        self.kind.validate(&self.trigger, ctx.map)?;

        let current = self.kind.current(&self.trigger, ctx.map, ctx.stock);
        let passes = self.kind.passes(&self.trigger, current, ctx.map);
        let outcome = reconcile(&mut self.local, ctx.registry, ctx.map, siblings, &passes);

        let status = JobStatus::new(
            current,
            i64::from(self.trigger.target()),
            self.local.len(),
            outcome.balances.clone(),
        );
        self.status.set(ctx.tick, status);
        Ok(outcome)
    }

    /// Cancel every owned designation in both the registry and the local
    /// set. Returns how many the job owned.
    pub fn cancel_all(&mut self, registry: &mut dyn DesignationRegistry) -> usize {
        let owned = self.local.clear();
        for d in &owned {
            registry.delete(d);
        }
        self.status.invalidate();
        owned.len()
    }
}

/// Read-only standing of a job against the host, without reconciling.
fn compute_status(
    kind: &JobKind,
    trigger: &ThresholdTrigger,
    local: &LocalDesignations,
    map: &dyn WorldMap,
    stock: &dyn StockCounter,
) -> JobStatus {
    let current = kind.current(trigger, map, stock);
    let passes = kind.passes(trigger, current, map);
    let balances = assess(local, map, &passes);
    JobStatus::new(current, i64::from(trigger.target()), local.len(), balances)
}
