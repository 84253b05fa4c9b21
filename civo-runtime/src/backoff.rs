//! Per object requeue backoff
use std::{collections::HashMap, time::Duration};

use backon::{BackoffBuilder, ExponentialBuilder};
use parking_lot::Mutex;
use tokio::time::Instant;

type Backoff = <ExponentialBuilder as BackoffBuilder>::Backoff;

#[derive(Debug)]
struct Entry {
    backoff: Backoff,
    last_used: Instant,
}

/// Exponential backoff tracked separately for each object key
///
/// A key's backoff restarts from the minimum delay after [`Self::reset`];
/// the sequence is rebuilt lazily rather than rewound. A failing object is
/// requeued within `max_delay`, so keys idle for twice that long belong to
/// objects that went away and are dropped.
#[derive(Debug)]
pub struct ObjectBackoff {
    builder: ExponentialBuilder,
    max_delay: Duration,
    current: Mutex<HashMap<String, Entry>>,
}

impl ObjectBackoff {
    /// Delays start at `min_delay`, double, and are capped at `max_delay`
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let builder = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(max_delay)
            .with_factor(2.0)
            .with_max_times(usize::MAX);
        Self {
            builder,
            max_delay,
            current: Mutex::new(HashMap::new()),
        }
    }

    /// The next delay for `key`
    pub fn next(&self, key: &str) -> Duration {
        let now = Instant::now();
        let idle_limit = self.max_delay.saturating_mul(2);
        let mut current = self.current.lock();
        current.retain(|_, entry| now.saturating_duration_since(entry.last_used) <= idle_limit);
        let entry = current.entry(key.to_string()).or_insert_with(|| Entry {
            backoff: self.builder.build(),
            last_used: now,
        });
        entry.last_used = now;
        entry.backoff.next().unwrap_or(self.max_delay)
    }

    /// Restart the backoff of `key`
    pub fn reset(&self, key: &str) {
        self.current.lock().remove(key);
    }

    /// Number of keys currently backing off
    pub fn len(&self) -> usize {
        self.current.lock().len()
    }

    /// Whether no key is backing off
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
