//! Time-boxed read-through cache for market-data responses
//!
//! The clock is injected so expiry can be tested deterministically and so
//! nothing outside the market-data client ever depends on wall-clock time.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

/// Cache of responses keyed by request string, each valid for `ttl`
#[derive(Debug)]
pub struct ResponseCache<T, C: Clock = SystemClock> {
    clock: C,
    ttl: Duration,
    entries: HashMap<String, CacheEntry<T>>,

    /// Statistics
    pub hits: u64,
    pub misses: u64,
}

impl<T: Clone> ResponseCache<T, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<T: Clone, C: Clock> ResponseCache<T, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            clock,
            ttl,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        match (now - entry.stored_at).to_std() {
            Ok(age) => age < self.ttl,
            // Stored "in the future" after a clock step back; still fresh
            Err(_) => true,
        }
    }

    /// Cached value for `key` if it is younger than the TTL
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let fresh = self
            .entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone());

        match fresh {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store `value` under `key`, stamped with the current instant.
    /// Expired entries are dropped first so distinct keys cannot pile up.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.purge_expired();
        let stored_at = self.clock.now();
        self.entries.insert(key.into(), CacheEntry { value, stored_at });
    }

    /// Drop all expired entries, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| match (now - entry.stored_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
