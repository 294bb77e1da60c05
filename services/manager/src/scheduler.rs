//! Priority-ordered job scheduler.
//!
//! The scheduler owns every job in a dense priority order (0 is highest)
//! and drives them from the host's tick loop:
//! - Every job is ticked for bookkeeping (status, trigger, history)
//! - At most one job reconciles per tick: the first eligible one in
//!   priority order
//! - A job whose configuration fails is invalidated and reported once; the
//!   others keep running

use std::collections::HashSet;

use steward_events::{EngineEvent, EventEnvelope, EventLog};
use steward_id::JobId;
use steward_reconcile::{
    Designation, DesignationRegistry, HostContext, ReconcileOutcome, ThresholdTrigger, Tick,
    Transition, WorldMap,
};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::error::{JobError, SchedulerError, SchedulerResult};
use crate::job::{AgeSex, Job, JobKind, JobKindTag};
use crate::record::{JobRecord, RECORD_VERSION};

/// What one [`Scheduler::tick`] did.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    pub ticked: usize,
    /// The job that reconciled, if any.
    pub ran: Option<JobId>,
    pub outcome: Option<ReconcileOutcome>,
    pub error: Option<JobError>,
}

#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    jobs: Vec<Job>,
    events: EventLog,
    /// Tick of the last [`tick`](Self::tick); stamps events raised between ticks.
    now: Tick,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let events = EventLog::with_capacity(config.event_capacity);
        Self {
            config,
            jobs: Vec::new(),
            events,
            now: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A new unmanaged job using this scheduler's defaults.
    pub fn create_job(&self, kind: JobKind, trigger: ThresholdTrigger) -> Job {
        Job::new(kind, trigger, &self.config)
    }

    /// Append at the lowest priority.
    pub fn add(&mut self, mut job: Job) -> JobId {
        let id = job.id();
        let priority = self.jobs.len();
        job.set_priority(priority);
        job.set_managed(true);

        info!(job_id = %id, kind = %job.tag(), priority, "Job added");
        self.events.record(
            self.now,
            Some(id),
            EngineEvent::JobAdded {
                kind: job.tag().to_string(),
                priority,
            },
        );
        self.jobs.push(job);
        id
    }

    /// Remove a job after cancelling every designation it owns. Returns how
    /// many were cancelled.
    pub fn delete(&mut self, id: JobId, registry: &mut dyn DesignationRegistry) -> SchedulerResult<usize> {
        let index = self.position(id)?;
        let mut job = self.jobs.remove(index);
        let cancelled = job.cancel_all(registry);
        job.set_managed(false);
        self.renumber();

        info!(job_id = %id, cancelled, "Job deleted");
        self.events
            .record(self.now, Some(id), EngineEvent::JobDeleted { cancelled });
        Ok(cancelled)
    }

    pub fn increase_priority(&mut self, id: JobId) -> SchedulerResult<usize> {
        let from = self.position(id)?;
        Ok(self.move_job(from, from.saturating_sub(1)))
    }

    pub fn decrease_priority(&mut self, id: JobId) -> SchedulerResult<usize> {
        let from = self.position(id)?;
        let last = self.jobs.len() - 1;
        Ok(self.move_job(from, (from + 1).min(last)))
    }

    pub fn top_priority(&mut self, id: JobId) -> SchedulerResult<usize> {
        let from = self.position(id)?;
        Ok(self.move_job(from, 0))
    }

    pub fn bottom_priority(&mut self, id: JobId) -> SchedulerResult<usize> {
        let from = self.position(id)?;
        let last = self.jobs.len() - 1;
        Ok(self.move_job(from, last))
    }

    pub fn get(&self, id: JobId) -> SchedulerResult<&Job> {
        let index = self.position(id)?;
        Ok(&self.jobs[index])
    }

    pub fn get_mut(&mut self, id: JobId) -> SchedulerResult<&mut Job> {
        let index = self.position(id)?;
        Ok(&mut self.jobs[index])
    }

    /// Jobs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Valid jobs of one kind, in priority order.
    pub fn jobs_of(&self, tag: JobKindTag) -> impl Iterator<Item = &Job> {
        self.jobs
            .iter()
            .filter(move |job| job.is_valid() && job.tag() == tag)
    }

    pub fn suspend(&mut self, id: JobId) -> SchedulerResult<()> {
        self.set_suspended(id, true)
    }

    pub fn resume(&mut self, id: JobId) -> SchedulerResult<()> {
        self.set_suspended(id, false)
    }

    fn set_suspended(&mut self, id: JobId, suspended: bool) -> SchedulerResult<()> {
        let index = self.position(id)?;
        if self.jobs[index].set_suspended(suspended) {
            let event = if suspended {
                EngineEvent::JobSuspended
            } else {
                EngineEvent::JobResumed
            };
            info!(job_id = %id, suspended, "Job suspension changed");
            self.events.record(self.now, Some(id), event);
        }
        Ok(())
    }

    pub fn set_target(&mut self, id: JobId, value: u32) -> SchedulerResult<()> {
        self.get_mut(id)?.set_target(value)?;
        Ok(())
    }

    pub fn set_bucket_target(&mut self, id: JobId, bucket: AgeSex, value: u32) -> SchedulerResult<()> {
        self.get_mut(id)?.set_bucket_target(bucket, value)?;
        Ok(())
    }

    /// Replace a job's configuration; rejected configurations leave the job
    /// as it was.
    pub fn configure(&mut self, id: JobId, kind: JobKind, map: &dyn WorldMap) -> SchedulerResult<()> {
        self.get_mut(id)?.configure(kind, map)?;
        Ok(())
    }

    /// One simulation step.
    pub fn tick(&mut self, ctx: &mut HostContext<'_>) -> TickSummary {
        let now = ctx.tick;
        self.now = now;
        let mut summary = TickSummary::default();

        for job in &mut self.jobs {
            let transition = job.tick(now, ctx.map, ctx.stock);
            summary.ticked += 1;
            if transition == Transition::Unchanged {
                continue;
            }
            if let Some(status) = job.status() {
                debug!(
                    job_id = %job.id(),
                    ?transition,
                    current = status.current,
                    pending = status.pending,
                    target = status.target,
                    "Trigger changed"
                );
                self.events.record(
                    now,
                    Some(job.id()),
                    EngineEvent::TriggerChanged {
                        active: transition == Transition::Activated,
                        current: status.current,
                        pending: status.pending,
                        target: status.target,
                    },
                );
            }
        }

        let Some(index) = self.jobs.iter().position(|job| job.should_do_now(now)) else {
            return summary;
        };

        let siblings: HashSet<Designation> = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .flat_map(|(_, job)| job.designations().iter().copied())
            .collect();

        let job = &mut self.jobs[index];
        let id = job.id();
        let result = job.run(ctx, &siblings);
        job.touch(now);
        summary.ran = Some(id);

        match result {
            Ok(outcome) => {
                if outcome.is_noop() {
                    debug!(job_id = %id, "Job reconciled, nothing to change");
                } else {
                    info!(
                        job_id = %id,
                        issued = outcome.issued.len(),
                        withdrawn = outcome.withdrawn.len(),
                        pruned = outcome.pruned.len(),
                        adopted = outcome.adopted.len(),
                        released = outcome.released.len(),
                        "Job reconciled"
                    );
                }
                record_outcome(&mut self.events, now, id, &outcome);
                summary.outcome = Some(outcome);
            }
            Err(err) => {
                if job.invalidate(err.to_string()) {
                    report_invalid(&mut self.events, now, id, &err);
                }
                summary.error = Some(err);
            }
        }

        summary
    }

    /// Records for every job, in priority order.
    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.jobs.iter().map(Job::to_record).collect()
    }

    /// Rebuild from saved records. Records of another version, or whose
    /// configuration the host no longer accepts, load as invalid jobs.
    pub fn restore(config: SchedulerConfig, mut records: Vec<JobRecord>, map: &dyn WorldMap) -> Self {
        let mut scheduler = Self::new(config);
        records.sort_by_key(|record| record.priority);

        for record in records {
            let version = record.version;
            let mut job = Job::from_record(record, &scheduler.config);
            let problem = if version == RECORD_VERSION {
                job.kind().validate(job.trigger(), map).err()
            } else {
                Some(JobError::UnsupportedVersion(version))
            };
            if let Some(err) = problem {
                if job.invalidate(err.to_string()) {
                    report_invalid(&mut scheduler.events, scheduler.now, job.id(), &err);
                }
            }
            job.set_managed(true);
            scheduler.jobs.push(job);
        }
        scheduler.renumber();

        info!(jobs = scheduler.jobs.len(), "Scheduler restored");
        scheduler
    }

    /// Like [`restore`](Self::restore), from loosely typed values. Values
    /// that are not job records at all are skipped.
    pub fn restore_values(
        config: SchedulerConfig,
        values: Vec<serde_json::Value>,
        map: &dyn WorldMap,
    ) -> Self {
        let records = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<JobRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable job record");
                    None
                }
            })
            .collect();
        Self::restore(config, records, map)
    }

    pub fn drain_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn position(&self, id: JobId) -> SchedulerResult<usize> {
        self.jobs
            .iter()
            .position(|job| job.id() == id)
            .ok_or(SchedulerError::JobNotFound(id))
    }

    fn renumber(&mut self) {
        for (rank, job) in self.jobs.iter_mut().enumerate() {
            job.set_priority(rank);
        }
    }

    /// Returns the job's new rank.
    fn move_job(&mut self, from: usize, to: usize) -> usize {
        if from == to {
            return to;
        }
        let job = self.jobs.remove(from);
        let id = job.id();
        self.jobs.insert(to, job);
        self.renumber();

        debug!(job_id = %id, from, to, "Job priority changed");
        self.events
            .record(self.now, Some(id), EngineEvent::JobPriorityChanged { from, to });
        to
    }
}

fn report_invalid(events: &mut EventLog, now: Tick, id: JobId, err: &JobError) {
    warn!(job_id = %id, error = %err, "Job invalidated");
    events.record(
        now,
        Some(id),
        EngineEvent::JobInvalidated {
            reason: err.to_string(),
        },
    );
}

fn record_outcome(events: &mut EventLog, now: Tick, id: JobId, outcome: &ReconcileOutcome) {
    let groups: [(&[Designation], fn(Designation) -> EngineEvent); 5] = [
        (outcome.released.as_slice(), |d| EngineEvent::DesignationReleased {
            target: d.target,
            kind: d.kind,
        }),
        (outcome.pruned.as_slice(), |d| EngineEvent::DesignationPruned {
            target: d.target,
            kind: d.kind,
        }),
        (outcome.adopted.as_slice(), |d| EngineEvent::DesignationAdopted {
            target: d.target,
            kind: d.kind,
        }),
        (outcome.issued.as_slice(), |d| EngineEvent::DesignationIssued {
            target: d.target,
            kind: d.kind,
        }),
        (outcome.withdrawn.as_slice(), |d| EngineEvent::DesignationWithdrawn {
            target: d.target,
            kind: d.kind,
        }),
    ];
    for (designations, event) in groups {
        for d in designations {
            events.record(now, Some(id), event(*d));
        }
    }
}
