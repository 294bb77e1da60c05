//! Threshold trigger: decides whether a job's target is currently unmet.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::StockCounter;

/// Upper bound for user-entered targets unless configured otherwise.
pub const DEFAULT_MAX_UPPER: u32 = 3_000;

/// Rejected threshold edits. The previous value is kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("target {value} is out of range (max {max})")]
    OutOfRange { value: u32, max: u32 },

    #[error("stock filter must name at least one def")]
    EmptyFilter,
}

/// Which stock counts toward the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountScope {
    /// Only resources stored in stockpiles.
    #[default]
    Stockpiles,
    /// Everything on the map, including loose items.
    WholeMap,
}

/// Set of resource def names counted as stock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockFilter {
    defs: BTreeSet<String>,
}

impl StockFilter {
    pub fn new<I, S>(defs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            defs: defs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, def: &str) -> bool {
        self.defs.contains(def)
    }

    pub fn defs(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Result of feeding new counts into a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stock plus pending dropped below target.
    Activated,
    /// Stock plus pending reached the target.
    Satisfied,
    Unchanged,
}

/// Hysteresis controller over `(current, pending, target)`.
///
/// `active = current + pending < target`. Counting pending yield (what
/// outstanding designations will deliver) keeps the job from ordering the
/// same deficit again before earlier orders are fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTrigger {
    target: u32,
    max_upper: u32,
    filter: StockFilter,
    #[serde(default)]
    scope: CountScope,
    #[serde(skip)]
    last_active: Option<bool>,
}

impl ThresholdTrigger {
    /// The target is clamped to [`DEFAULT_MAX_UPPER`].
    pub fn new(target: u32, filter: StockFilter) -> Self {
        Self {
            target: target.min(DEFAULT_MAX_UPPER),
            max_upper: DEFAULT_MAX_UPPER,
            filter,
            scope: CountScope::default(),
            last_active: None,
        }
    }

    pub fn with_scope(mut self, scope: CountScope) -> Self {
        self.scope = scope;
        self
    }

    /// Raises or lowers the input bound; the target is clamped to it.
    pub fn with_max_upper(mut self, max_upper: u32) -> Self {
        self.max_upper = max_upper;
        self.target = self.target.min(max_upper);
        self
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn max_upper(&self) -> u32 {
        self.max_upper
    }

    pub fn filter(&self) -> &StockFilter {
        &self.filter
    }

    pub fn scope(&self) -> CountScope {
        self.scope
    }

    pub fn set_target(&mut self, value: u32) -> Result<(), TriggerError> {
        if value > self.max_upper {
            return Err(TriggerError::OutOfRange {
                value,
                max: self.max_upper,
            });
        }
        self.target = value;
        Ok(())
    }

    /// Set the target, clamped to `max_upper`. Returns the applied value.
    pub fn set_target_clamped(&mut self, value: u32) -> u32 {
        self.target = value.min(self.max_upper);
        self.target
    }

    pub fn set_filter(&mut self, filter: StockFilter) -> Result<(), TriggerError> {
        if filter.is_empty() {
            return Err(TriggerError::EmptyFilter);
        }
        self.filter = filter;
        Ok(())
    }

    pub fn set_scope(&mut self, scope: CountScope) {
        self.scope = scope;
    }

    /// Current stock according to the filter and scope.
    pub fn count(&self, stock: &dyn StockCounter) -> u32 {
        stock.count_of(&self.filter, self.scope)
    }

    /// Pure evaluation; does not touch the remembered state.
    pub fn is_active(&self, current: i64, pending: i64) -> bool {
        current + pending < i64::from(self.target)
    }

    /// Evaluate and remember the result.
    ///
    /// The first evaluation after construction or load always reports a
    /// transition.
    pub fn update(&mut self, current: i64, pending: i64) -> Transition {
        let active = self.is_active(current, pending);
        let previous = self.last_active.replace(active);
        match (previous, active) {
            (Some(prev), now) if prev == now => Transition::Unchanged,
            (_, true) => Transition::Activated,
            (_, false) => Transition::Satisfied,
        }
    }

    /// Result of the last [`update`](Self::update), if any.
    pub fn last_active(&self) -> Option<bool> {
        self.last_active
    }
}
