//! Fixed-capacity sample ring.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of samples every buffer retains.
pub const CAPACITY: usize = 100;

/// A ring of at most [`CAPACITY`] samples, oldest first.
///
/// Serialized as a plain list; oversized lists are cut down to the newest
/// [`CAPACITY`] samples on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<i64>", into = "Vec<i64>")]
pub struct SampleBuffer {
    samples: VecDeque<i64>,
}

impl SampleBuffer {
    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, value: i64) {
        if self.samples.len() == CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The newest sample.
    pub fn last(&self) -> Option<i64> {
        self.samples.back().copied()
    }

    /// Largest of the newest `window` samples.
    pub fn max_recent(&self, window: usize) -> Option<i64> {
        self.samples.iter().rev().take(window).copied().max()
    }

    /// Sample `offset` steps back from the newest (0 = newest).
    pub fn value_at(&self, offset: usize) -> Option<i64> {
        let index = self.samples.len().checked_sub(offset)?.checked_sub(1)?;
        self.samples.get(index).copied()
    }

    /// Samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.samples.iter().copied()
    }
}

impl From<Vec<i64>> for SampleBuffer {
    fn from(values: Vec<i64>) -> Self {
        let skip = values.len().saturating_sub(CAPACITY);
        Self {
            samples: values.into_iter().skip(skip).collect(),
        }
    }
}

impl From<SampleBuffer> for Vec<i64> {
    fn from(buffer: SampleBuffer) -> Self {
        buffer.samples.into()
    }
}
