//! # steward-history
//!
//! Trend history for job counters.
//!
//! A [`History`] is a set of named [`Chapter`]s. Every chapter keeps three
//! independent ring buffers of [`CAPACITY`] samples, one per [`Period`].
//! A buffer samples only on ticks that are a multiple of its interval, which
//! is the period length divided by the capacity, so a full buffer spans
//! exactly one period.
//!
//! Callers offer a value every tick; recording is a no-op on ticks that fall
//! between intervals. Queries never fail: out-of-range lookups return
//! [`NO_SAMPLE`].

mod buffer;
mod chapter;

use serde::{Deserialize, Serialize};

pub use buffer::{SampleBuffer, CAPACITY};
pub use chapter::Chapter;

/// Returned by queries that have no sample to report.
pub const NO_SAMPLE: i64 = -1;

/// Ticks in one simulated day.
pub const TICKS_PER_DAY: u64 = 60_000;

/// Sampling resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Day, Period::Month, Period::Year];

    fn index(self) -> usize {
        match self {
            Period::Day => 0,
            Period::Month => 1,
            Period::Year => 2,
        }
    }
}

/// Period lengths in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub day_ticks: u64,
    pub month_ticks: u64,
    pub year_ticks: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            day_ticks: TICKS_PER_DAY,
            month_ticks: TICKS_PER_DAY * 15,
            year_ticks: TICKS_PER_DAY * 60,
        }
    }
}

impl HistoryConfig {
    pub fn period_ticks(&self, period: Period) -> u64 {
        match period {
            Period::Day => self.day_ticks,
            Period::Month => self.month_ticks,
            Period::Year => self.year_ticks,
        }
    }

    /// Ticks between two samples of `period`. Never zero.
    pub fn interval(&self, period: Period) -> u64 {
        (self.period_ticks(period) / CAPACITY as u64).max(1)
    }

    /// Returns true if any period samples on `tick`.
    pub fn is_sample_tick(&self, tick: u64) -> bool {
        Period::ALL
            .into_iter()
            .any(|period| tick % self.interval(period) == 0)
    }
}

/// Named chapters sharing one sampling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    config: HistoryConfig,
    chapters: Vec<Chapter>,
}

impl History {
    pub fn new<I, S>(config: HistoryConfig, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config,
            chapters: labels.into_iter().map(Chapter::new).collect(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, label: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.label() == label)
    }

    pub fn chapter_mut(&mut self, label: &str) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.label() == label)
    }

    /// Offer one value per chapter label. Unknown labels are ignored.
    ///
    /// Returns the number of chapters that took a sample.
    pub fn record<'a, I>(&mut self, tick: u64, values: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let config = self.config;
        values
            .into_iter()
            .filter_map(|(label, value)| {
                self.chapter_mut(label)
                    .map(|chapter| chapter.record(tick, value, &config))
            })
            .filter(|recorded| *recorded)
            .count()
    }

    /// Largest full-window maximum over the shown chapters, for chart scaling.
    pub fn max_shown(&self, period: Period) -> i64 {
        self.chapters
            .iter()
            .filter(|c| c.is_shown())
            .map(|c| c.max(period, CAPACITY))
            .max()
            .unwrap_or(NO_SAMPLE)
    }
}
