use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Monotonic event counters, split per namespace. Increase between resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsCounters {
    pub gets: u64,
    pub gets_temp: u64,
    pub stores: u64,
    pub stores_temp: u64,
    pub deletes: u64,
    pub deletes_temp: u64,
    pub errors: u64,
}

struct StatsInner {
    counters: StatsCounters,
    since: i64,
}

/// Operational counters for store activity.
///
/// Explicitly constructed and injected — one instance per store, shared with
/// background flush tasks via `Arc`. Tests can instantiate independent
/// collectors. Mutations are serialized under a lock.
pub struct StatsCollector {
    inner: Mutex<StatsInner>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatsInner {
                counters: StatsCounters::default(),
                since: Utc::now().timestamp(),
            }),
        }
    }

    // Counters are plain integers; a poisoned lock cannot leave them in an
    // inconsistent state, so it is recovered rather than propagated.
    fn inner(&self) -> std::sync::MutexGuard<'_, StatsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_get(&self, temporary: bool) {
        let mut inner = self.inner();
        if temporary {
            inner.counters.gets_temp += 1;
        } else {
            inner.counters.gets += 1;
        }
    }

    pub fn record_store(&self, temporary: bool) {
        let mut inner = self.inner();
        if temporary {
            inner.counters.stores_temp += 1;
        } else {
            inner.counters.stores += 1;
        }
    }

    pub fn record_delete(&self, temporary: bool) {
        let mut inner = self.inner();
        if temporary {
            inner.counters.deletes_temp += 1;
        } else {
            inner.counters.deletes += 1;
        }
    }

    pub fn record_error(&self) {
        self.inner().counters.errors += 1;
    }

    /// Cheap copy of the current counters.
    pub fn counters(&self) -> StatsCounters {
        self.inner().counters
    }

    /// Epoch seconds of the last reset (or of construction).
    pub fn since(&self) -> i64 {
        self.inner().since
    }

    /// Zero all event counters and restart the reset timestamp.
    pub fn reset(&self) {
        let mut inner = self.inner();
        inner.counters = StatsCounters::default();
        inner.since = Utc::now().timestamp();
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time statistics: event counters plus live per-namespace record
/// counts. The live counts are queried from the backend at snapshot time and
/// are unaffected by counter resets.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub counters: StatsCounters,
    pub assets: usize,
    pub assets_temp: usize,
    pub since: i64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let since = DateTime::<Utc>::from_timestamp(self.since, 0)
            .map(|ts| ts.to_string())
            .unwrap_or_else(|| self.since.to_string());

        writeln!(
            f,
            "Statistics since {} with {} errors.",
            since, self.counters.errors
        )?;
        writeln!(
            f,
            "=> Asset hits: {}, saved: {}, deleted: {}, count: {}",
            self.counters.gets, self.counters.stores, self.counters.deletes, self.assets
        )?;
        write!(
            f,
            "=> Temp asset hits: {}, saved: {}, deleted: {}, count: {}",
            self.counters.gets_temp,
            self.counters.stores_temp,
            self.counters.deletes_temp,
            self.assets_temp
        )
    }
}
