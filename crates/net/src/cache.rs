//! Response cache and the clock it expires against.

use std::cell::Cell;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<SystemTime>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub expires: SystemTime,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Exact-URL cache. Entries are never evicted; stale ones are just ignored.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, CachedResponse>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `url` if it has not expired at `now`.
    pub fn get(&self, url: &str, now: SystemTime) -> Option<&CachedResponse> {
        self.entries.get(url).filter(|e| e.expires > now)
    }

    pub fn insert(&mut self, url: &str, entry: CachedResponse) {
        self.entries.insert(url.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How long a response may be cached given its `Cache-Control` header.
/// `None` when the header is absent, says `no-store`, or has no `max-age`.
pub fn cache_lifetime(cache_control: Option<&str>) -> Option<Duration> {
    let value = cache_control?.to_ascii_lowercase();
    let directives: Vec<&str> = value.split(',').map(str::trim).collect();
    if directives.contains(&"no-store") {
        return None;
    }
    directives
        .iter()
        .find_map(|d| d.strip_prefix("max-age="))
        .and_then(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
