//! Configuration for the scheduler.

use steward_events::DEFAULT_EVENT_LOG_CAPACITY;
use steward_history::HistoryConfig;
use steward_reconcile::Tick;

/// Scheduler tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Minimum ticks between two reconciliations of the same job.
    pub default_action_interval: Tick,

    /// How long a job's status (counts and per-pass balances) is reused.
    pub status_interval: Tick,

    /// Period lengths for job history.
    pub history: HistoryConfig,

    /// Events kept before the oldest are discarded.
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_action_interval: 2_500,
            status_interval: 250,
            history: HistoryConfig::default(),
            event_capacity: DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}
