// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded LRU cache of open statements
//!
//! Entries live in a dense arena (`Vec<Entry>`) and are chained from oldest
//! to newest through index links, so promotion and eviction are pure index
//! updates. A map from key to arena index gives O(1) lookup. Removing an
//! entry swaps the last arena entry into the hole and patches its links.
//!
//! # Example
//!
//! ```
//! use stmtcache::cache::{BoundedLruCache, StatementHandle};
//! use stmtcache::core::Result;
//!
//! struct Stmt(u32);
//!
//! impl StatementHandle for Stmt {
//!     fn close(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut cache = BoundedLruCache::new(2).unwrap();
//! cache.insert("a", Stmt(1)).unwrap();
//! cache.insert("b", Stmt(2)).unwrap();
//!
//! // "a" becomes most recently used, so "b" is the next victim
//! assert!(cache.get(&"a").is_some());
//! cache.insert("c", Stmt(3)).unwrap();
//! assert!(cache.get(&"b").is_none());
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use super::handle::{release, StatementHandle};
use super::key::StatementKey;
use super::stats::CacheStats;
use crate::core::{Error, Result};

/// One cached statement plus its position in the recency chain
struct Entry<K, H> {
    key: K,
    handle: H,
    /// Next entry towards the oldest end
    older: Option<usize>,
    /// Next entry towards the newest end
    newer: Option<usize>,
}

/// Fixed-capacity cache that evicts and releases the least recently used
/// statement when full
///
/// Not thread-safe; the owning connection serializes access.
pub struct BoundedLruCache<K, H: StatementHandle> {
    /// Key -> arena index
    map: FxHashMap<K, usize>,
    /// Entry arena, densely packed
    entries: Vec<Entry<K, H>>,
    /// Least recently used entry
    oldest: Option<usize>,
    /// Most recently used entry
    newest: Option<usize>,
    capacity: usize,
    stats: CacheStats,
}

/// Statement cache keyed by creation signature
pub type StatementCache<H> = BoundedLruCache<StatementKey, H>;

impl<K, H: StatementHandle> BoundedLruCache<K, H> {
    /// Create a cache holding at most `capacity` statements
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            entries: Vec::with_capacity(capacity),
            oldest: None,
            newest: None,
            capacity,
            stats: CacheStats::default(),
        })
    }

    /// Maximum number of cached statements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached statements
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot of the cache counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Keys from least to most recently used
    pub fn keys_oldest_first(&self) -> impl Iterator<Item = &K> + '_ {
        std::iter::successors(self.oldest, move |&idx| self.entries[idx].newer)
            .map(move |idx| &self.entries[idx].key)
    }

    /// Release every cached statement and empty the cache
    ///
    /// The cache stays usable afterwards.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        for entry in self.entries.drain(..) {
            release(entry.handle);
        }
        self.map.clear();
        self.oldest = None;
        self.newest = None;
        self.stats.releases += count as u64;

        if count > 0 {
            debug!(count, "cleared statement cache");
        }
    }

    /// Detach `idx` from the recency chain, fixing its neighbors and the ends
    fn unlink(&mut self, idx: usize) {
        let older = self.entries[idx].older.take();
        let newer = self.entries[idx].newer.take();

        match older {
            Some(o) => self.entries[o].newer = newer,
            None => self.oldest = newer,
        }
        match newer {
            Some(n) => self.entries[n].older = older,
            None => self.newest = older,
        }
    }

    /// Attach a detached `idx` as the newest entry
    fn link_newest(&mut self, idx: usize) {
        self.entries[idx].older = self.newest;
        self.entries[idx].newer = None;

        match self.newest {
            Some(n) => self.entries[n].newer = Some(idx),
            None => self.oldest = Some(idx),
        }
        self.newest = Some(idx);
    }

    /// Move `idx` to the newest end; no-op if it is already there
    fn promote(&mut self, idx: usize) {
        if self.newest == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.link_newest(idx);
    }
}

impl<K, H> BoundedLruCache<K, H>
where
    K: Hash + Eq + Clone + fmt::Display,
    H: StatementHandle,
{
    /// Look up a statement, promoting it to most recently used
    pub fn get(&mut self, key: &K) -> Option<&H> {
        let idx = self.lookup(key)?;
        Some(&self.entries[idx].handle)
    }

    /// Like [`get`](Self::get) but lends the handle mutably
    pub fn get_mut(&mut self, key: &K) -> Option<&mut H> {
        let idx = self.lookup(key)?;
        Some(&mut self.entries[idx].handle)
    }

    /// Whether `key` is cached, without touching recency or counters
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Store a statement under a key that is not yet cached
    ///
    /// When the cache is full the least recently used statement is evicted
    /// and released first. Inserting a key that is already cached fails
    /// with [`Error::DuplicateKey`]: the cached statement is kept and the
    /// rejected `handle` is released.
    pub fn insert(&mut self, key: K, handle: H) -> Result<()> {
        if self.map.contains_key(&key) {
            warn!(key = %key, "statement already cached, releasing duplicate");
            self.stats.rejected += 1;
            self.stats.releases += 1;
            release(handle);
            return Err(Error::DuplicateKey(key.to_string()));
        }

        self.push(key, handle);
        Ok(())
    }

    /// Return the cached statement for `key`, creating and caching it on miss
    ///
    /// If `create` fails nothing is cached and the error is returned.
    pub fn get_or_try_insert_with<F>(&mut self, key: K, create: F) -> Result<&mut H>
    where
        F: FnOnce(&K) -> Result<H>,
    {
        let idx = match self.lookup(&key) {
            Some(idx) => idx,
            None => {
                let handle = create(&key)?;
                self.push(key, handle)
            }
        };
        Ok(&mut self.entries[idx].handle)
    }

    fn lookup(&mut self, key: &K) -> Option<usize> {
        match self.map.get(key).copied() {
            Some(idx) => {
                self.stats.hits += 1;
                trace!(key = %key, "statement cache hit");
                self.promote(idx);
                Some(idx)
            }
            None => {
                self.stats.misses += 1;
                trace!(key = %key, "statement cache miss");
                None
            }
        }
    }

    /// Append an absent key as newest, evicting first if full
    fn push(&mut self, key: K, handle: H) -> usize {
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let idx = self.entries.len();
        trace!(key = %key, "caching statement");
        self.entries.push(Entry {
            key: key.clone(),
            handle,
            older: None,
            newer: None,
        });
        self.map.insert(key, idx);
        self.link_newest(idx);
        self.stats.insertions += 1;
        idx
    }

    fn evict_oldest(&mut self) {
        let Some(idx) = self.oldest else {
            return;
        };
        let entry = self.remove_at(idx);
        debug!(key = %entry.key, "evicting least recently used statement");
        self.stats.evictions += 1;
        self.stats.releases += 1;
        release(entry.handle);
    }

    /// Remove the entry at `idx` from chain, map and arena
    fn remove_at(&mut self, idx: usize) -> Entry<K, H> {
        self.unlink(idx);
        self.map.remove(&self.entries[idx].key);
        let entry = self.entries.swap_remove(idx);

        // The former last entry now lives at `idx`; repoint everything at it
        if idx < self.entries.len() {
            let older = self.entries[idx].older;
            let newer = self.entries[idx].newer;
            match older {
                Some(o) => self.entries[o].newer = Some(idx),
                None => self.oldest = Some(idx),
            }
            match newer {
                Some(n) => self.entries[n].older = Some(idx),
                None => self.newest = Some(idx),
            }
            if let Some(slot) = self.map.get_mut(&self.entries[idx].key) {
                *slot = idx;
            }
        }

        entry
    }
}

impl<K, H: StatementHandle> Drop for BoundedLruCache<K, H> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, H: StatementHandle> fmt::Debug for BoundedLruCache<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedLruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type ReleaseLog = Rc<RefCell<Vec<u32>>>;

    #[derive(Debug)]
    struct TestStmt {
        id: u32,
        log: ReleaseLog,
        fail_close: bool,
    }

    impl StatementHandle for TestStmt {
        fn close(&mut self) -> Result<()> {
            self.log.borrow_mut().push(self.id);
            if self.fail_close {
                return Err(Error::statement_close("already closed"));
            }
            Ok(())
        }
    }

    fn stmt(id: u32, log: &ReleaseLog) -> TestStmt {
        TestStmt {
            id,
            log: log.clone(),
            fail_close: false,
        }
    }

    /// Walk the chain both ways and compare it with the map
    fn check_invariants<K, H>(cache: &BoundedLruCache<K, H>)
    where
        K: Hash + Eq + Clone + fmt::Display,
        H: StatementHandle,
    {
        assert!(cache.len() <= cache.capacity());
        assert_eq!(cache.map.len(), cache.entries.len());

        match cache.len() {
            0 => {
                assert!(cache.oldest.is_none());
                assert!(cache.newest.is_none());
            }
            1 => {
                assert!(cache.oldest.is_some());
                assert_eq!(cache.oldest, cache.newest);
            }
            _ => {
                assert!(cache.oldest.is_some());
                assert_ne!(cache.oldest, cache.newest);
            }
        }

        let forward: Vec<usize> =
            std::iter::successors(cache.oldest, |&i| cache.entries[i].newer).collect();
        let mut backward: Vec<usize> =
            std::iter::successors(cache.newest, |&i| cache.entries[i].older).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), cache.map.len());

        for idx in forward {
            assert_eq!(cache.map.get(&cache.entries[idx].key), Some(&idx));
        }
    }

    fn order(cache: &BoundedLruCache<u32, TestStmt>) -> Vec<u32> {
        cache.keys_oldest_first().copied().collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BoundedLruCache::<u32, TestStmt>::new(0);
        assert_eq!(result.err(), Some(Error::InvalidCapacity(0)));
    }

    #[test]
    fn test_insert_and_get() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(4).unwrap();

        for id in 1..=3 {
            cache.insert(id, stmt(id * 10, &log)).unwrap();
        }
        check_invariants(&cache);
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.get(&2).map(|s| s.id), Some(20));
        assert_eq!(cache.get(&1).map(|s| s.id), Some(10));
        assert_eq!(cache.get(&3).map(|s| s.id), Some(30));
        assert!(cache.get(&4).is_none());
        assert!(log.borrow().is_empty());
        check_invariants(&cache);
    }

    #[test]
    fn test_get_promotes() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(4).unwrap();
        for id in 1..=4 {
            cache.insert(id, stmt(id, &log)).unwrap();
        }
        assert_eq!(order(&cache), vec![1, 2, 3, 4]);

        // Oldest moves to the end
        cache.get(&1);
        assert_eq!(order(&cache), vec![2, 3, 4, 1]);
        check_invariants(&cache);

        // Middle entry moves to the end
        cache.get(&3);
        assert_eq!(order(&cache), vec![2, 4, 1, 3]);
        check_invariants(&cache);

        // Newest stays put
        cache.get(&3);
        assert_eq!(order(&cache), vec![2, 4, 1, 3]);
        check_invariants(&cache);
    }

    #[test]
    fn test_single_entry_get_keeps_links() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(3).unwrap();
        cache.insert(7, stmt(7, &log)).unwrap();

        let before = (cache.oldest, cache.newest);
        for _ in 0..3 {
            assert!(cache.get(&7).is_some());
        }
        assert_eq!((cache.oldest, cache.newest), before);
        assert!(cache.entries[0].older.is_none());
        assert!(cache.entries[0].newer.is_none());
        check_invariants(&cache);
    }

    #[test]
    fn test_eviction_releases_oldest() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(3).unwrap();
        for id in 1..=4 {
            cache.insert(id, stmt(id, &log)).unwrap();
            check_invariants(&cache);
        }

        assert_eq!(*log.borrow(), vec![1]);
        assert!(!cache.contains_key(&1));
        assert_eq!(order(&cache), vec![2, 3, 4]);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_respects_access_order() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(2).unwrap();
        cache.insert(1, stmt(1, &log)).unwrap();
        cache.insert(2, stmt(2, &log)).unwrap();
        cache.get(&1);
        cache.insert(3, stmt(3, &log)).unwrap();

        assert_eq!(*log.borrow(), vec![2]);
        assert_eq!(order(&cache), vec![1, 3]);
        check_invariants(&cache);
    }

    #[test]
    fn test_capacity_one() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(1).unwrap();
        cache.insert(1, stmt(1, &log)).unwrap();
        cache.insert(2, stmt(2, &log)).unwrap();

        assert_eq!(*log.borrow(), vec![1]);
        assert!(cache.get(&1).is_none());
        assert_eq!(cache.get(&2).map(|s| s.id), Some(2));
        check_invariants(&cache);
    }

    #[test]
    fn test_swap_remove_relinks_moved_entry() {
        // Evicting from the middle of the arena moves the last entry into
        // the hole; links and map must follow it.
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(3).unwrap();
        for id in 1..=3 {
            cache.insert(id, stmt(id, &log)).unwrap();
        }
        cache.get(&2);
        cache.get(&1);
        // Order is now 3, 2, 1
        cache.insert(4, stmt(4, &log)).unwrap();
        check_invariants(&cache);
        assert_eq!(order(&cache), vec![2, 1, 4]);

        // 2 sits in slot 1, 4 in the last slot
        cache.insert(5, stmt(5, &log)).unwrap();
        check_invariants(&cache);
        assert_eq!(order(&cache), vec![1, 4, 5]);
        assert_eq!(*log.borrow(), vec![3, 2]);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(2).unwrap();
        cache.insert(1, stmt(10, &log)).unwrap();
        cache.insert(2, stmt(20, &log)).unwrap();

        let err = cache.insert(1, stmt(11, &log)).unwrap_err();
        assert_eq!(err, Error::DuplicateKey("1".to_string()));

        // Rejected handle released, cached one untouched, order unchanged
        assert_eq!(*log.borrow(), vec![11]);
        assert_eq!(cache.get(&1).map(|s| s.id), Some(10));
        assert_eq!(cache.stats().rejected, 1);
        assert_eq!(cache.len(), 2);
        check_invariants(&cache);
    }

    #[test]
    fn test_failed_close_does_not_break_eviction() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(2).unwrap();
        for id in 1..=5 {
            let mut s = stmt(id, &log);
            s.fail_close = id % 2 == 1;
            cache.insert(id, s).unwrap();
            check_invariants(&cache);
        }
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert_eq!(order(&cache), vec![4, 5]);
    }

    #[test]
    fn test_clear_releases_everything() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(4).unwrap();
        for id in 1..=3 {
            cache.insert(id, stmt(id, &log)).unwrap();
        }

        cache.clear();
        check_invariants(&cache);
        assert!(cache.is_empty());
        let mut released = log.borrow().clone();
        released.sort_unstable();
        assert_eq!(released, vec![1, 2, 3]);

        // Clearing an empty cache is a no-op
        cache.clear();
        assert_eq!(log.borrow().len(), 3);

        // Reusable afterwards
        cache.insert(9, stmt(9, &log)).unwrap();
        assert_eq!(cache.get(&9).map(|s| s.id), Some(9));
        check_invariants(&cache);
    }

    #[test]
    fn test_drop_releases_remaining() {
        let log = ReleaseLog::default();
        {
            let mut cache = BoundedLruCache::new(2).unwrap();
            cache.insert(1, stmt(1, &log)).unwrap();
            cache.insert(2, stmt(2, &log)).unwrap();
        }
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_get_or_try_insert_with() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(2).unwrap();
        let mut created = 0;

        for _ in 0..3 {
            let handle = cache
                .get_or_try_insert_with(1, |_| {
                    created += 1;
                    Ok(stmt(1, &log))
                })
                .unwrap();
            assert_eq!(handle.id, 1);
        }
        assert_eq!(created, 1);

        let err = cache
            .get_or_try_insert_with(2, |_| Err(Error::prepare("bad sql")))
            .unwrap_err();
        assert_eq!(err, Error::prepare("bad sql"));
        assert_eq!(cache.len(), 1);
        check_invariants(&cache);
    }

    #[test]
    fn test_stats() {
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(1).unwrap();
        cache.insert(1, stmt(1, &log)).unwrap();
        cache.get(&1);
        cache.get(&2);
        cache.insert(2, stmt(2, &log)).unwrap();
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.insertions, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.releases, 2);

        cache.reset_stats();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_randomized_against_model() {
        // Deterministic pseudo-random workload checked against a Vec model
        let log = ReleaseLog::default();
        let mut cache = BoundedLruCache::new(5).unwrap();
        let mut model: Vec<u32> = Vec::new();
        let mut seed: u32 = 0x2545_f491;

        for step in 0..2000u32 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let key = seed % 12;

            if seed & 1 == 0 {
                let hit = cache.get(&key).is_some();
                assert_eq!(hit, model.contains(&key));
                if hit {
                    model.retain(|&k| k != key);
                    model.push(key);
                }
            } else if !model.contains(&key) {
                cache.insert(key, stmt(step, &log)).unwrap();
                model.push(key);
                if model.len() > 5 {
                    model.remove(0);
                }
            }

            check_invariants(&cache);
            assert_eq!(order(&cache), model);
        }
    }
}
