// ABOUTME: Lookaside cache for flattened records: the Cache capability and an in-memory moka store.
// ABOUTME: Entries expire individually; a missing or zero TTL means the 31 day default.

use std::time::{Duration, Instant};

use moka::sync::Cache as MokaCache;
use moka::Expiry;
use serde_json::Value;

/// Time a cached record stays valid unless the caller says otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(31 * 24 * 60 * 60);

/// Key/value store for plain record mappings.
pub trait Cache: Send + Sync {
    fn has(&self, key: &str) -> bool;

    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` for `ttl` (default [`DEFAULT_TTL`]). Returns whether
    /// the value was stored.
    fn add(&self, key: &str, value: Value, ttl: Option<Duration>) -> bool;

    /// Removes the entry. Returns whether one existed.
    fn delete(&self, key: &str) -> bool;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process [`Cache`] backed by moka.
#[derive(Clone)]
pub struct MemoryCache {
    entries: MokaCache<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for MemoryCache {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value)
    }

    fn add(&self, key: &str, value: Value, ttl: Option<Duration>) -> bool {
        let ttl = ttl.filter(|ttl| !ttl.is_zero()).unwrap_or(DEFAULT_TTL);
        self.entries.insert(key.to_string(), Entry { value, ttl });
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}
