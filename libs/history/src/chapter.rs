//! One named channel of the history.

use serde::{Deserialize, Serialize};

use crate::{HistoryConfig, Period, SampleBuffer, NO_SAMPLE};

fn shown_by_default() -> bool {
    true
}

/// A named channel with one sample buffer per [`Period`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    label: String,

    #[serde(default = "shown_by_default")]
    shown: bool,

    /// Floor applied to `max` queries, e.g. to keep a target line on scale.
    #[serde(default)]
    max_override: Option<i64>,

    buffers: [SampleBuffer; 3],
}

impl Chapter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shown: true,
            max_override: None,
            buffers: Default::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn set_shown(&mut self, shown: bool) {
        self.shown = shown;
    }

    pub fn set_max_override(&mut self, value: Option<i64>) {
        self.max_override = value;
    }

    /// Offer a sample to every period buffer.
    ///
    /// A buffer only takes the sample when `tick` falls on its interval.
    /// Returns true if at least one buffer recorded it.
    pub fn record(&mut self, tick: u64, value: i64, config: &HistoryConfig) -> bool {
        let mut recorded = false;
        for period in Period::ALL {
            if tick % config.interval(period) == 0 {
                self.buffers[period.index()].push(value);
                recorded = true;
            }
        }
        recorded
    }

    pub fn samples(&self, period: Period) -> &SampleBuffer {
        &self.buffers[period.index()]
    }

    /// Newest sample, or [`NO_SAMPLE`].
    pub fn last(&self, period: Period) -> i64 {
        self.samples(period).last().unwrap_or(NO_SAMPLE)
    }

    /// Largest of the newest `window` samples, raised to the override if one
    /// is set. [`NO_SAMPLE`] when there is neither.
    pub fn max(&self, period: Period, window: usize) -> i64 {
        let observed = self.samples(period).max_recent(window);
        match (observed, self.max_override) {
            (Some(observed), Some(floor)) => observed.max(floor),
            (Some(value), None) | (None, Some(value)) => value,
            (None, None) => NO_SAMPLE,
        }
    }

    /// Sample `offset` steps back from the newest, or [`NO_SAMPLE`] when out
    /// of range.
    pub fn value_at(&self, period: Period, offset: usize) -> i64 {
        self.samples(period).value_at(offset).unwrap_or(NO_SAMPLE)
    }
}
