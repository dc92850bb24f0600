use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock: Send {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Pending one-shot reverts keyed by `K`, at most one per key.
pub struct RevertScheduler<K> {
    clock: Box<dyn Clock>,
    pending: HashMap<K, Duration>,
}

impl<K: Copy + Eq + Hash> RevertScheduler<K> {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            pending: HashMap::new(),
        }
    }

    /// Replaces any revert already pending for `key`.
    pub fn schedule(&mut self, key: K, after: Duration) {
        let deadline = self.clock.now() + after;
        self.pending.insert(key, deadline);
    }

    pub fn cancel(&mut self, key: K) -> bool {
        self.pending.remove(&key).is_some()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }

    /// Removes and returns every key whose deadline has passed, earliest first.
    pub fn take_due(&mut self) -> Vec<K> {
        let now = self.clock.now();
        let mut due: Vec<(K, Duration)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(k, d)| (*k, *d))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);
        for (key, _) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(key, _)| key).collect()
    }

    /// Time until the earliest pending revert, zero if one is already due.
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.pending
            .values()
            .min()
            .map(|deadline| deadline.saturating_sub(now))
    }
}
