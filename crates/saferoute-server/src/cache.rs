//! Process-scoped lighting score cache.
//!
//! Created with the pipeline and shared between concurrent enrichments.
//! DashMap shards are locked only for one read or one write, never across
//! an external call. Concurrent misses on one fingerprint may both fetch;
//! the last write wins, which is harmless because results are idempotent.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::Instant;

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
}

/// Evict the oldest entries until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    if cache.len() <= max_entries {
        return;
    }

    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
        .collect();
    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

#[derive(Debug, Clone, Copy)]
struct LightingCacheEntry {
    fetched_at: Instant,
    score: u8,
}

impl CacheEntry for LightingCacheEntry {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

#[derive(Debug)]
pub struct LightingCache {
    entries: DashMap<String, LightingCacheEntry>,
    max_entries: usize,
}

impl LightingCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, fingerprint: &str) -> Option<u8> {
        self.entries.get(fingerprint).map(|entry| entry.score)
    }

    pub fn insert(&self, fingerprint: String, score: u8) {
        self.entries.insert(
            fingerprint,
            LightingCacheEntry {
                fetched_at: Instant::now(),
                score,
            },
        );
        prune_cache(&self.entries, self.max_entries);
    }

    /// Drop every entry, e.g. between independent search sessions.
    pub fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
