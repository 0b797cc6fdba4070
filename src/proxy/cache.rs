//! In-memory lyrics cache with lazy expiry.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct CacheEntry {
    payload: Value,
    stored_at: Instant,
    last_used: u64,
}

struct Entries {
    map: HashMap<String, CacheEntry>,
    tick: u64,
}

/// Payloads keyed by lower-cased query. An entry is servable while it is
/// younger than the TTL. Stale entries are never deleted, only overwritten
/// by the next successful fetch for the same key.
///
/// With `max_entries` set, inserting into a full cache evicts the least
/// recently used entry.
pub struct LyricsCache {
    entries: Mutex<Entries>,
    ttl: Duration,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl LyricsCache {
    pub fn new(ttl: Duration, max_entries: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                tick: 0,
            }),
            ttl,
            max_entries: max_entries.filter(|&max| max > 0),
            clock,
        }
    }

    pub fn key(query: &str) -> String {
        query.to_lowercase()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, query: &str) -> Option<Value> {
        let key = Self::key(query);
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.tick += 1;
        let tick = entries.tick;

        let entry = entries.map.get_mut(&key)?;
        if now.saturating_duration_since(entry.stored_at) >= self.ttl {
            debug!("Cache entry for '{}' expired", key);
            return None;
        }
        entry.last_used = tick;
        Some(entry.payload.clone())
    }

    /// Stores `payload`, replacing any previous entry for the same key.
    pub fn insert(&self, query: &str, payload: Value) {
        let key = Self::key(query);
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.tick += 1;
        let tick = entries.tick;

        if let Some(max) = self.max_entries {
            if !entries.map.contains_key(&key) && entries.map.len() >= max {
                let oldest = entries
                    .map
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    debug!("Evicting '{}' from lyrics cache", oldest);
                    entries.map.remove(&oldest);
                }
            }
        }

        entries.map.insert(
            key,
            CacheEntry {
                payload,
                stored_at: now,
                last_used: tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LyricsCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, None, Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache(max_entries: Option<usize>) -> (LyricsCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (
            LyricsCache::new(DEFAULT_TTL, max_entries, clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let (cache, _) = cache(None);
        cache.insert("Hello World", json!({ "lyrics": "la" }));
        assert_eq!(cache.get("hello world"), Some(json!({ "lyrics": "la" })));
        assert_eq!(cache.get("HELLO WORLD"), Some(json!({ "lyrics": "la" })));
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let (cache, clock) = cache(None);
        cache.insert("song", json!(1));
        clock.advance(DEFAULT_TTL - Duration::from_secs(1));
        assert_eq!(cache.get("song"), Some(json!(1)));
        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("song"), None);
    }

    #[test]
    fn test_stale_entry_kept_until_overwritten() {
        let (cache, clock) = cache(None);
        cache.insert("song", json!(1));
        clock.advance(DEFAULT_TTL * 2);
        assert_eq!(cache.get("song"), None);
        assert_eq!(cache.len(), 1);

        cache.insert("Song", json!(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("song"), Some(json!(2)));
    }

    #[test]
    fn test_insert_overwrites_and_refreshes() {
        let (cache, clock) = cache(None);
        cache.insert("song", json!(1));
        clock.advance(DEFAULT_TTL - Duration::from_secs(10));
        cache.insert("SONG", json!(2));
        clock.advance(Duration::from_secs(20));
        assert_eq!(cache.get("song"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_bound_evicts_least_recently_used() {
        let (cache, _) = cache(Some(2));
        cache.insert("a", json!("a"));
        cache.insert("b", json!("b"));
        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c", json!("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_unbounded_by_default() {
        let cache = LyricsCache::default();
        for i in 0..100 {
            cache.insert(&format!("q{}", i), json!(i));
        }
        assert_eq!(cache.len(), 100);
    }
}
