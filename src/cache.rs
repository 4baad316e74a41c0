//! Short-TTL cache of resolutions keyed by normalized query.

use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tracing::debug;

/// Concurrent TTL cache. Expired entries are never returned.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// A zero TTL disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }

        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                Some((expires_at, value)) if *expires_at > now => return Some(value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict unless another writer refreshed it meanwhile
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.get(key).is_some_and(|(expires_at, _)| *expires_at <= now) {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.is_enabled() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, (expires_at, value));
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, (expires_at, _)| *expires_at > now);
        let purged = before - entries.len();
        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
        }
        purged
    }

    /// Number of live entries; expired ones awaiting a purge are not counted.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|(expires_at, _)| *expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
