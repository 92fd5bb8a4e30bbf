//! Content-addressed measurement cache with LRU eviction.

use std::collections::HashMap;

pub(crate) const DEFAULT_MAX_ENTRIES: usize = 500;

/// Fraction of the cache dropped in one eviction sweep.
const EVICT_FRACTION: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    height: f32,
    content_hash: u64,
    #[allow(dead_code)]
    measured_at: u64,
    last_accessed_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub hit_rate: f32,
}

/// Height cache keyed by block position.
///
/// A probe hits only when the stored content hash matches; a mismatch evicts
/// the stale entry so the caller re-measures and re-inserts. Access times
/// are a monotonic logical tick, which keeps eviction order deterministic.
#[derive(Debug)]
pub(crate) struct MeasureCache {
    entries: HashMap<usize, CacheEntry>,
    max_entries: usize,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl MeasureCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    pub fn probe(&mut self, pos: usize, content_hash: u64) -> Option<f32> {
        let tick = self.next_tick();
        match self.entries.get_mut(&pos) {
            Some(entry) if entry.content_hash == content_hash => {
                entry.last_accessed_at = tick;
                self.hits += 1;
                Some(entry.height)
            }
            Some(_) => {
                self.entries.remove(&pos);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, pos: usize, content_hash: u64, height: f32) {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&pos) {
            self.evict_oldest();
        }
        let tick = self.next_tick();
        self.entries.insert(
            pos,
            CacheEntry {
                height,
                content_hash,
                measured_at: tick,
                last_accessed_at: tick,
            },
        );
    }

    /// Drop the oldest tenth of the cache by last access.
    fn evict_oldest(&mut self) {
        let count = ((self.max_entries as f32 * EVICT_FRACTION).ceil() as usize).max(1);
        let mut by_age: Vec<(usize, u64)> = self
            .entries
            .iter()
            .map(|(&pos, entry)| (pos, entry.last_accessed_at))
            .collect();
        by_age.sort_by_key(|&(_, accessed)| accessed);
        for (pos, _) in by_age.into_iter().take(count) {
            self.entries.remove(&pos);
        }
    }

    pub fn invalidate_range(&mut self, from: usize, to: usize) {
        self.entries.retain(|&pos, _| pos < from || pos > to);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            hit_rate: if total == 0 {
                0.0
            } else {
                self.hits as f32 / total as f32
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_hits_only_on_matching_hash() {
        let mut cache = MeasureCache::new(10);
        cache.insert(1, 42, 100.0);

        assert_eq!(cache.probe(1, 42), Some(100.0));
        // Hash mismatch evicts the entry entirely.
        assert_eq!(cache.probe(1, 43), None);
        assert_eq!(cache.probe(1, 42), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn replaced_entry_returns_the_new_height() {
        let mut cache = MeasureCache::new(10);
        cache.insert(1, 42, 100.0);
        cache.insert(1, 99, 250.0);
        assert_eq!(cache.probe(1, 99), Some(250.0));
    }

    #[test]
    fn eviction_drops_the_least_recently_used_tenth() {
        let mut cache = MeasureCache::new(20);
        for pos in 0..20 {
            cache.insert(pos, pos as u64, 10.0);
        }
        // Touch the two oldest so they survive the sweep.
        cache.probe(0, 0);
        cache.probe(1, 1);

        cache.insert(100, 100, 10.0);
        // ceil(20 * 0.1) = 2 evicted: positions 2 and 3.
        assert_eq!(cache.stats().size, 19);
        assert_eq!(cache.probe(2, 2), None);
        assert_eq!(cache.probe(3, 3), None);
        assert_eq!(cache.probe(0, 0), Some(10.0));
    }

    #[test]
    fn invalidate_range_is_inclusive() {
        let mut cache = MeasureCache::new(10);
        for pos in 1..=5 {
            cache.insert(pos, 0, 1.0);
        }
        cache.invalidate_range(2, 4);
        assert_eq!(cache.probe(1, 0), Some(1.0));
        assert_eq!(cache.probe(2, 0), None);
        assert_eq!(cache.probe(4, 0), None);
        assert_eq!(cache.probe(5, 0), Some(1.0));
    }

    #[test]
    fn hit_rate_tracks_probe_outcomes() {
        let mut cache = MeasureCache::new(10);
        cache.insert(1, 7, 5.0);
        cache.probe(1, 7);
        cache.probe(1, 7);
        cache.probe(2, 0);
        let stats = cache.stats();
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-6);
    }
}
