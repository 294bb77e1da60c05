//! Bounded in-memory event log.

use std::collections::VecDeque;

use steward_id::JobId;

use crate::{EngineEvent, EventEnvelope};

/// Default number of events retained before the oldest are discarded.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1024;

/// Bounded FIFO of engine events waiting to be drained by the host.
#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    next_seq: u64,
    discarded: u64,
    events: VecDeque<EventEnvelope>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Create a log that retains at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_seq: 0,
            discarded: 0,
            events: VecDeque::new(),
        }
    }

    /// Append an event and return its sequence number.
    pub fn record(&mut self, tick: u64, job_id: Option<JobId>, event: EngineEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.discarded += 1;
        }
        self.events.push_back(EventEnvelope::new(seq, tick, job_id, event));
        seq
    }

    /// Remove and return every retained event, oldest first.
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        self.events.drain(..).collect()
    }

    /// Retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventEnvelope> {
        self.events.iter()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events dropped because the log was full.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
