//! Compiled pattern caching for the pointcut strategies.
//!
//! Compiling a glob or regular expression costs far more than matching one,
//! and the same handful of patterns is evaluated for every join point. Each
//! strategy therefore keeps a [`PatternCache`] from pattern key to compiled
//! form.
//!
//! # Thread Safety
//! Entries live in a sharded [`DashMap`], so lookups from many request threads
//! do not contend on a single lock. Compilation runs outside any shard lock.
//! When two threads compile the same key at once, the first insert wins and
//! the other compiled value is dropped; both are equivalent.
//!
//! # Memory Management
//! The cache holds at most `max_size` entries. Inserting into a full cache
//! first evicts the least used `eviction_fraction` of entries.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of compiled patterns per cache
    pub max_size: usize,

    /// Share of `max_size` evicted when the cache is full
    pub eviction_fraction: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            eviction_fraction: 0.1,
        }
    }
}

/// Cache performance statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total cache lookups
    pub total_lookups: usize,

    /// Cache hits
    pub hits: usize,

    /// Cache misses
    pub misses: usize,

    /// Pattern compilations
    pub compilations: usize,

    /// Evictions performed
    pub evictions: usize,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        if self.total_lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total_lookups as f64
    }
}

#[derive(Debug, Default)]
struct Counters {
    total_lookups: AtomicUsize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    compilations: AtomicUsize,
    evictions: AtomicUsize,
}

#[derive(Debug)]
struct CachedEntry<V> {
    value: V,
    access_count: AtomicUsize,
}

/// Bounded concurrent map from pattern key to compiled pattern.
#[derive(Debug)]
pub struct PatternCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CachedEntry<V>>,
    config: CacheConfig,
    counters: Counters,
}

impl<K, V> PatternCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            counters: Counters::default(),
        }
    }

    /// Return the cached value for `key`, compiling it with `compute` on a miss.
    pub fn get_or_insert_with<Q, F>(&self, key: &Q, compute: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.lookup(key) {
            return value;
        }
        let value = compute();
        self.insert_if_absent(key.to_owned(), value)
    }

    /// Fallible variant of [`get_or_insert_with`](Self::get_or_insert_with).
    /// A failed compile caches nothing.
    pub fn get_or_try_insert_with<Q, F, E>(&self, key: &Q, compute: F) -> Result<V, E>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.insert_if_absent(key.to_owned(), value))
    }

    fn lookup<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counters.total_lookups.fetch_add(1, Ordering::Relaxed);
        match self.entries.get(key) {
            Some(entry) => {
                entry.access_count.fetch_add(1, Ordering::Relaxed);
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn insert_if_absent(&self, key: K, value: V) -> V {
        self.counters.compilations.fetch_add(1, Ordering::Relaxed);
        if self.entries.len() >= self.config.max_size {
            self.evict_least_used();
        }
        match self.entries.entry(key) {
            Entry::Occupied(existing) => {
                trace!("pattern compiled concurrently, keeping the cached entry");
                existing.get().value.clone()
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CachedEntry {
                    value: value.clone(),
                    access_count: AtomicUsize::new(1),
                });
                value
            }
        }
    }

    /// Evict the least used entries.
    fn evict_least_used(&self) {
        let mut candidates: Vec<(K, usize)> = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    entry.value().access_count.load(Ordering::Relaxed),
                )
            })
            .collect();

        // Sort by access count (ascending) to evict least used first
        candidates.sort_by_key(|(_, count)| *count);

        let evict_count =
            ((self.config.max_size as f64 * self.config.eviction_fraction).ceil() as usize).max(1);

        let mut evicted = 0;
        for (key, _) in candidates.into_iter().take(evict_count) {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }
        self.counters.evictions.fetch_add(evicted, Ordering::Relaxed);
        debug!(
            evicted,
            max_size = self.config.max_size,
            "pattern cache full, evicted least used entries"
        );
    }

    /// Get cache statistics for monitoring.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_lookups: self.counters.total_lookups.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            compilations: self.counters.compilations.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    /// Drop every compiled pattern. Matches already holding a compiled value
    /// finish with it; later lookups recompile.
    pub fn clear(&self) {
        self.entries.clear();
        self.counters.total_lookups.store(0, Ordering::Relaxed);
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
        self.counters.compilations.store(0, Ordering::Relaxed);
        self.counters.evictions.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl<K, V> Default for PatternCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
