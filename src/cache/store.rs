//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, LruHandle, LruTracker};

#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    handle: LruHandle,
}

// == Cache Store ==
/// Fixed-capacity cache with lazy and swept TTL expiry and LRU eviction.
///
/// Every key in `entries` owns exactly one position in `lru` and vice versa.
/// The store itself is not synchronized; the coordinator wraps it in a lock.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, Slot>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Set ==
    /// Stores a key-value pair that expires `ttl` from now.
    ///
    /// An existing entry for `key` is replaced and moved to the
    /// most-recently-used position. When the store is full, expired entries
    /// are purged first and only then is the least recently used live entry
    /// evicted.
    pub fn set(&mut self, key: String, value: String, ttl: Duration) {
        if self.capacity == 0 {
            return;
        }

        if let Some(old) = self.entries.remove(&key) {
            self.lru.remove(old.handle);
        }

        if self.entries.len() >= self.capacity {
            self.purge_expired();
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        let handle = self.lru.push_front(key.clone());
        let entry = CacheEntry::new(value, ttl);
        self.entries.insert(key, Slot { entry, handle });

        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key, promoting it to most recently used.
    ///
    /// Expired entries are removed on observation and reported as absent,
    /// even if the background sweep has not reached them yet.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let Some(slot) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if slot.entry.is_expired() {
            self.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let value = slot.entry.value.clone();
        self.lru.touch(slot.handle);
        self.stats.record_hit();
        Some(value)
    }

    // == Remove ==
    /// Drops an entry regardless of its state. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(slot) => {
                self.lru.remove(slot.handle);
                self.stats.set_total_entries(self.entries.len());
                true
            }
            None => false,
        }
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, slot)| slot.entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(slot) = self.entries.remove(key) {
                self.lru.remove(slot.handle);
            }
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.iter().map(str::to_owned).collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Length ==
    /// Returns the number of held entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
