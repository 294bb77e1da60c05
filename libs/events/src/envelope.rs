//! Event envelope - the common wrapper for all events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_id::JobId;

use crate::{EngineEvent, EventError};

/// The event envelope - common metadata for all events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Monotonic sequence number within one event log.
    pub seq: u64,

    /// Simulation tick the event happened on.
    pub tick: u64,

    /// Wall-clock time the event was recorded.
    pub recorded_at: DateTime<Utc>,

    /// Job the event belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    /// The event itself.
    pub event: EngineEvent,
}

impl EventEnvelope {
    /// Wrap an event.
    pub fn new(seq: u64, tick: u64, job_id: Option<JobId>, event: EngineEvent) -> Self {
        Self {
            seq,
            tick,
            recorded_at: Utc::now(),
            job_id,
            event,
        }
    }

    /// The dotted event type name.
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an envelope from JSON.
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(json)?)
    }
}
