//! Tick-stamped value cache.

use crate::Tick;

/// A value reused while `now - set_at <= update_interval`.
///
/// Recomputation is synchronous: [`get_or_update`](Self::get_or_update) runs
/// the closure inline when the value is missing or stale.
#[derive(Debug, Clone)]
pub struct TimedValue<T> {
    value: Option<T>,
    set_at: Tick,
    update_interval: Tick,
}

impl<T> TimedValue<T> {
    pub fn new(update_interval: Tick) -> Self {
        Self {
            value: None,
            set_at: 0,
            update_interval,
        }
    }

    /// A value stamped in the future (e.g. after loading an older save) is stale.
    pub fn is_fresh(&self, now: Tick) -> bool {
        self.value.is_some()
            && now
                .checked_sub(self.set_at)
                .is_some_and(|age| age <= self.update_interval)
    }

    /// The last value regardless of age.
    pub fn last(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn set(&mut self, now: Tick, value: T) {
        self.value = Some(value);
        self.set_at = now;
    }

    pub fn invalidate(&mut self) {
        self.value = None;
    }

    pub fn get_or_update<F>(&mut self, now: Tick, update: F) -> &T
    where
        F: FnOnce() -> T,
    {
        let fresh = self.is_fresh(now);
        let value = match self.value.take() {
            Some(value) if fresh => value,
            _ => {
                self.set_at = now;
                update()
            }
        };
        self.value.insert(value)
    }
}
