//! # LRU-K Cache
//!
//! Two recency queues: a **history** tier that admits every new entry, and a
//! protected **cache** tier. An entry is promoted from history to cache on its
//! K-th touch. One-off accesses churn through the history tier without
//! displacing entries that have proven themselves.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────────┐
//!   │                           LrukCache<K, V>                              │
//!   │                                                                        │
//!   │   index: FxHashMap<K, Residency>                                       │
//!   │     key ──► History(handle) | Cache(handle)                            │
//!   │                                                                        │
//!   │   history: EvictionQueue<HistoryNode>     cache: EvictionQueue<...>    │
//!   │   ┌───────────────────────────────┐       ┌─────────────────────────┐  │
//!   │   │ [n hits=1] ◄─► [m hits=0] ... │       │ [p] ◄─► [q] ...         │  │
//!   │   │  MRU                     LRU  │       │ MRU                LRU  │  │
//!   │   └───────────────┬───────────────┘       └────────────▲────────────┘  │
//!   │                   │      hits reaches K: transfer      │               │
//!   │                   └────────────────────────────────────┘               │
//!   └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Access flow
//!
//! ```text
//!   insert(k, v)
//!     k resident?  remove it from whichever tier holds it
//!     push HistoryNode { hits: 0 } to history front (may evict history LRU)
//!
//!   get(k)
//!     in cache    ─► touch in cache, return value
//!     in history  ─► hits += 1
//!                    hits >= K ? transfer to cache front (may evict cache LRU)
//!                              : touch in history
//! ```
//!
//! Re-inserting a resident key always lands in the history tier with a fresh
//! hit count, even if it was in the cache tier. Entries never move from cache
//! back to history.
//!
//! ## Edge cases
//!
//! - `k` below 1 is clamped to 1 by [`LrukCache::new`] and rejected by
//!   [`LrukCache::try_new`]. With `k = 1`, the first `get` promotes.
//! - A zero-capacity history tier drops every insert.
//! - A zero-capacity cache tier drops entries at promotion; that `get` returns
//!   `None`.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru_k::{LrukCache, Tier};
//! use evictkit::traits::{CoreCache, LrukCacheTrait};
//!
//! let mut cache = LrukCache::new(2, 4, 4);
//! cache.insert("page", 7);
//!
//! assert_eq!(cache.get(&"page"), Some(&7));
//! assert_eq!(cache.tier_of(&"page"), Some(Tier::History));
//!
//! assert_eq!(cache.get(&"page"), Some(&7));
//! assert_eq!(cache.tier_of(&"page"), Some(Tier::Cache));
//! ```

use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ds::{EvictionQueue, QueueEvent, QueueHandle, QueueId, QueueObserver, RemovalCause};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LrukMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LrukMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LrukMetricsRecorder, MetricsSnapshotProvider};
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, LrukCacheTrait, MutableCache, Purge};

/// Which queue an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    History,
    Cache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Residency {
    History(QueueHandle),
    Cache(QueueHandle),
}

impl Residency {
    fn handle(self) -> QueueHandle {
        match self {
            Residency::History(handle) | Residency::Cache(handle) => handle,
        }
    }

    fn tier(self) -> Tier {
        match self {
            Residency::History(_) => Tier::History,
            Residency::Cache(_) => Tier::Cache,
        }
    }
}

/// Element stored in either tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryNode<K, V> {
    key: K,
    value: V,
    hits: usize,
}

impl<K, V> HistoryNode<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Touches counted while in the history tier.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Drops index entries for deleted nodes and tallies evictions per tier.
struct ResidencyHook<'a, K> {
    index: &'a mut FxHashMap<K, Residency>,
    history: QueueId,
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    history_evicted: u64,
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    cache_evicted: u64,
}

impl<'a, K> ResidencyHook<'a, K> {
    fn new(index: &'a mut FxHashMap<K, Residency>, history: QueueId) -> Self {
        Self {
            index,
            history,
            history_evicted: 0,
            cache_evicted: 0,
        }
    }
}

impl<K, V> QueueObserver<HistoryNode<K, V>> for ResidencyHook<'_, K>
where
    K: Eq + Hash,
{
    fn on_event(&mut self, event: QueueEvent<'_, HistoryNode<K, V>>) {
        let QueueEvent::Deleted {
            handle,
            value,
            cause,
        } = event
        else {
            return;
        };
        if self
            .index
            .get(&value.key)
            .is_some_and(|residency| residency.handle() == handle)
        {
            self.index.remove(&value.key);
        }
        if cause == RemovalCause::Evicted {
            if handle.queue_id() == self.history {
                self.history_evicted += 1;
            } else {
                self.cache_evicted += 1;
            }
        }
    }
}

/// Single-threaded LRU-K cache.
pub struct LrukCache<K, V> {
    k: usize,
    history: EvictionQueue<HistoryNode<K, V>>,
    cache: EvictionQueue<HistoryNode<K, V>>,
    index: FxHashMap<K, Residency>,
    #[cfg(feature = "metrics")]
    metrics: LrukMetrics,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache. `k` below 1 is treated as 1.
    ///
    /// ```
    /// use evictkit::policy::lru_k::LrukCache;
    /// use evictkit::traits::{CoreCache, LrukCacheTrait};
    ///
    /// let cache: LrukCache<u64, String> = LrukCache::new(2, 100, 50);
    /// assert_eq!(cache.k_value(), 2);
    /// assert_eq!(cache.capacity(), 150);
    /// ```
    pub fn new(k: usize, history_capacity: usize, cache_capacity: usize) -> Self {
        let k = k.max(1);
        Self {
            k,
            history: EvictionQueue::new(history_capacity),
            cache: EvictionQueue::new(cache_capacity),
            index: FxHashMap::with_capacity_and_hasher(
                history_capacity.saturating_add(cache_capacity),
                Default::default(),
            ),
            #[cfg(feature = "metrics")]
            metrics: LrukMetrics::default(),
        }
    }

    /// Like [`new`](Self::new), but rejects `k == 0`.
    ///
    /// ```
    /// use evictkit::policy::lru_k::LrukCache;
    ///
    /// assert!(LrukCache::<u32, u32>::try_new(0, 8, 8).is_err());
    /// assert!(LrukCache::<u32, u32>::try_new(3, 8, 8).is_ok());
    /// ```
    pub fn try_new(
        k: usize,
        history_capacity: usize,
        cache_capacity: usize,
    ) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::new("k must be at least 1"));
        }
        Ok(Self::new(k, history_capacity, cache_capacity))
    }

    /// Registers an observer on the history queue.
    pub fn add_history_observer<O>(&mut self, observer: O)
    where
        O: QueueObserver<HistoryNode<K, V>> + Send + 'static,
    {
        self.history.add_observer(observer);
    }

    /// Registers an observer on the cache queue.
    pub fn add_cache_observer<O>(&mut self, observer: O)
    where
        O: QueueObserver<HistoryNode<K, V>> + Send + 'static,
    {
        self.cache.add_observer(observer);
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Returns the value without recording a touch.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.node(*self.index.get(key)?).map(HistoryNode::value)
    }

    /// Keys of one tier, most recently used first.
    pub fn keys_in(&self, tier: Tier) -> impl Iterator<Item = &K> + '_ {
        let queue = match tier {
            Tier::History => &self.history,
            Tier::Cache => &self.cache,
        };
        queue.iter().map(|(_, node)| &node.key)
    }

    /// Verifies index, tiers and hit counts against each other.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.history.check_invariants()?;
        self.cache.check_invariants()?;

        let resident = self.history.len() + self.cache.len();
        if self.index.len() != resident {
            return Err(InvariantError::new(format!(
                "index holds {} keys, tiers hold {resident} entries",
                self.index.len()
            )));
        }
        for (handle, node) in self.history.iter() {
            if self.index.get(&node.key) != Some(&Residency::History(handle)) {
                return Err(InvariantError::new(
                    "history node is not indexed under its own handle",
                ));
            }
            if node.hits >= self.k {
                return Err(InvariantError::new(format!(
                    "history node has {} hits with k = {}",
                    node.hits, self.k
                )));
            }
        }
        for (handle, node) in self.cache.iter() {
            if self.index.get(&node.key) != Some(&Residency::Cache(handle)) {
                return Err(InvariantError::new(
                    "cache node is not indexed under its own handle",
                ));
            }
        }
        Ok(())
    }

    fn node(&self, residency: Residency) -> Option<&HistoryNode<K, V>> {
        match residency {
            Residency::History(handle) => self.history.get(handle),
            Residency::Cache(handle) => self.cache.get(handle),
        }
    }

    fn assert_live(&self, op: &str) {
        assert!(
            !self.history.is_purged(),
            "LrukCache::{op} called after purge"
        );
    }

    /// Unlinks `key` from whichever tier holds it.
    fn detach(&mut self, key: &K) -> Option<V> {
        let residency = *self.index.get(key)?;
        let mut hook = ResidencyHook::new(&mut self.index, self.history.id());
        let node = match residency {
            Residency::History(handle) => self.history.remove_with(handle, &mut hook),
            Residency::Cache(handle) => self.cache.remove_with(handle, &mut hook),
        };
        Some(node.value)
    }

    /// Moves a history node that reached K hits into the cache tier.
    fn promote(&mut self, key: &K, handle: QueueHandle, hits: usize) -> Option<&V> {
        // Unindex first so the history-side delete leaves the new entry alone.
        let (key, _) = self.index.remove_entry(key)?;
        let mut hook = ResidencyHook::new(&mut self.index, self.history.id());
        let promoted = self
            .history
            .transfer_with(handle, &mut self.cache, &mut hook);
        #[cfg(feature = "metrics")]
        {
            let cache_evicted = hook.cache_evicted;
            self.metrics.record_promotion();
            self.metrics.record_cache_evictions(cache_evicted);
        }
        debug!(hits, k = self.k, "promoted entry to cache tier");

        // A zero-capacity cache tier drops the entry on arrival.
        if !self.cache.contains(promoted) {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        }
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_get_hit();
            self.metrics.record_history_hit();
        }
        self.index.insert(key, Residency::Cache(promoted));
        self.cache.get(promoted).map(HistoryNode::value)
    }
}

impl<K, V> CoreCache<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.assert_live("insert");
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let previous = self.detach(&key);
        #[cfg(feature = "metrics")]
        if previous.is_some() {
            self.metrics.record_insert_update();
        } else {
            self.metrics.record_insert_new();
        }

        let node = HistoryNode {
            key: key.clone(),
            value,
            hits: 0,
        };
        let mut hook = ResidencyHook::new(&mut self.index, self.history.id());
        let handle = self.history.insert_with(node, &mut hook);
        #[cfg(feature = "metrics")]
        {
            let history_evicted = hook.history_evicted;
            self.metrics.record_history_evictions(history_evicted);
        }

        if self.history.contains(handle) {
            self.index.insert(key, Residency::History(handle));
        }
        previous
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.assert_live("get");
        let Some(&residency) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        match residency {
            Residency::Cache(handle) => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_get_hit();
                    self.metrics.record_cache_hit();
                }
                self.cache.touch(handle);
                self.cache.get(handle).map(HistoryNode::value)
            },
            Residency::History(handle) => {
                let hits = {
                    let node = self.history.get_mut(handle)?;
                    node.hits += 1;
                    node.hits
                };
                if hits >= self.k {
                    return self.promote(key, handle, hits);
                }
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_get_hit();
                    self.metrics.record_history_hit();
                }
                self.history.touch(handle);
                self.history.get(handle).map(HistoryNode::value)
            },
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    /// Both tiers together.
    fn capacity(&self) -> usize {
        self.history
            .capacity()
            .saturating_add(self.cache.capacity())
    }

    fn clear(&mut self) {
        self.assert_live("clear");
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        let mut hook = ResidencyHook::new(&mut self.index, self.history.id());
        self.history.clear_with(&mut hook);
        self.cache.clear_with(&mut hook);
        self.index.clear();
    }
}

impl<K, V> MutableCache<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        self.assert_live("remove");
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let removed = self.detach(key);
        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_remove_found();
        }
        removed
    }
}

impl<K, V> LrukCacheTrait<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn k_value(&self) -> usize {
        self.k
    }

    fn hit_count(&self, key: &K) -> Option<usize> {
        self.node(*self.index.get(key)?).map(HistoryNode::hits)
    }

    fn tier_of(&self, key: &K) -> Option<Tier> {
        self.index.get(key).map(|residency| residency.tier())
    }

    fn touch(&mut self, key: &K) -> bool {
        if !self.index.contains_key(key) {
            self.assert_live("touch");
            return false;
        }
        self.get(key);
        true
    }
}

impl<K, V> Purge for LrukCache<K, V> {
    fn purge(&mut self) {
        if self.history.is_purged() {
            return;
        }
        let released = self.index.len();
        self.history.purge();
        self.cache.purge();
        self.index = FxHashMap::default();
        debug!(released, "purged lru-k cache");
    }

    fn is_purged(&self) -> bool {
        self.history.is_purged()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LrukCache<K, V> {
    pub fn metrics_snapshot(&self) -> LrukMetricsSnapshot {
        LrukMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evicted_entries: self.metrics.evicted_entries,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            clear_calls: self.metrics.clear_calls,
            history_hits: self.metrics.history_hits,
            cache_hits: self.metrics.cache_hits,
            promotions: self.metrics.promotions,
            history_evictions: self.metrics.history_evictions,
            cache_evictions: self.metrics.cache_evictions,
            history_len: self.history.len(),
            cache_len: self.cache.len(),
            history_capacity: self.history.capacity(),
            cache_capacity: self.cache.capacity(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LrukMetricsSnapshot> for LrukCache<K, V> {
    fn snapshot(&self) -> LrukMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LrukCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LrukCache")
            .field("k", &self.k)
            .field("history_len", &self.history.len())
            .field("history_capacity", &self.history.capacity())
            .field("cache_len", &self.cache.len())
            .field("cache_capacity", &self.cache.capacity())
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU-K cache; a `parking_lot::Mutex` around an [`LrukCache`]
/// holding `Arc<V>`.
#[cfg(feature = "concurrency")]
pub struct ConcurrentLrukCache<K, V> {
    inner: Arc<Mutex<LrukCache<K, Arc<V>>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentLrukCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLrukCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLrukCache")
            .field("k", &cache.k)
            .field("len", &cache.index.len())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLrukCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
    pub fn new(k: usize, history_capacity: usize, cache_capacity: usize) -> Self {
        Self::from_cache(LrukCache::new(k, history_capacity, cache_capacity))
    }

    pub fn try_new(
        k: usize,
        history_capacity: usize,
        cache_capacity: usize,
    ) -> Result<Self, ConfigError> {
        LrukCache::try_new(k, history_capacity, cache_capacity).map(Self::from_cache)
    }

    fn from_cache(cache: LrukCache<K, Arc<V>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let value = Arc::new(value);
        self.inner.lock().insert(key, value)
    }

    pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        self.inner.lock().insert(key, value)
    }

    /// Records a touch and returns the value; may promote the entry.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().get(key).map(Arc::clone)
    }

    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().peek(key).map(Arc::clone)
    }

    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.inner.lock().remove(key)
    }

    pub fn touch(&self, key: &K) -> bool {
        self.inner.lock().touch(key)
    }

    pub fn tier_of(&self, key: &K) -> Option<Tier> {
        self.inner.lock().tier_of(key)
    }

    pub fn hit_count(&self, key: &K) -> Option<usize> {
        self.inner.lock().hit_count(key)
    }

    pub fn k_value(&self) -> usize {
        self.inner.lock().k_value()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn purge(&self) {
        self.inner.lock().purge()
    }

    pub fn is_purged(&self) -> bool {
        self.inner.lock().is_purged()
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for ConcurrentLrukCache<K, V>
where
    K: Send,
    V: Send + Sync,
{
}

#[cfg(all(feature = "metrics", feature = "concurrency"))]
impl<K, V> MetricsSnapshotProvider<LrukMetricsSnapshot> for ConcurrentLrukCache<K, V> {
    fn snapshot(&self) -> LrukMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::EventCounter;

    fn keys_in<V>(cache: &LrukCache<&'static str, V>, tier: Tier) -> Vec<&'static str> {
        cache.keys_in(tier).copied().collect()
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn test_new_entries_start_in_history() {
            let mut cache = LrukCache::new(2, 3, 3);
            assert_eq!(cache.insert("a", 1), None);
            assert_eq!(cache.tier_of(&"a"), Some(Tier::History));
            assert_eq!(cache.hit_count(&"a"), Some(0));
            assert_eq!(cache.history_len(), 1);
            assert_eq!(cache.cache_len(), 0);
        }

        #[test]
        fn test_promotion_on_kth_get() {
            let mut cache = LrukCache::new(2, 3, 3);
            cache.insert("a", 1);
            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.tier_of(&"a"), Some(Tier::History));
            assert_eq!(cache.hit_count(&"a"), Some(1));

            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.tier_of(&"a"), Some(Tier::Cache));
            assert_eq!(cache.history_len(), 0);
            assert_eq!(cache.cache_len(), 1);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_k_three_needs_three_gets() {
            let mut cache = LrukCache::new(3, 4, 4);
            cache.insert(1, "x");
            cache.get(&1);
            cache.get(&1);
            assert_eq!(cache.tier_of(&1), Some(Tier::History));
            cache.get(&1);
            assert_eq!(cache.tier_of(&1), Some(Tier::Cache));
        }

        #[test]
        fn test_cache_hits_stay_in_cache() {
            let mut cache = LrukCache::new(1, 2, 2);
            cache.insert("a", 1);
            cache.get(&"a");
            for _ in 0..5 {
                assert_eq!(cache.get(&"a"), Some(&1));
                assert_eq!(cache.tier_of(&"a"), Some(Tier::Cache));
            }
            assert_eq!(cache.hit_count(&"a"), Some(1));
        }

        #[test]
        fn test_get_missing_key() {
            let mut cache: LrukCache<i32, i32> = LrukCache::new(2, 2, 2);
            assert_eq!(cache.get(&9), None);
            assert!(!cache.touch(&9));
        }

        #[test]
        fn test_remove_from_either_tier() {
            let mut cache = LrukCache::new(1, 2, 2);
            cache.insert("h", 1);
            cache.insert("c", 2);
            cache.get(&"c");
            assert_eq!(cache.remove(&"h"), Some(1));
            assert_eq!(cache.remove(&"c"), Some(2));
            assert_eq!(cache.remove(&"c"), None);
            assert!(cache.is_empty());
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_peek_does_not_count_hits() {
            let mut cache = LrukCache::new(2, 2, 2);
            cache.insert("a", 1);
            assert_eq!(cache.peek(&"a"), Some(&1));
            assert_eq!(cache.peek(&"a"), Some(&1));
            assert_eq!(cache.hit_count(&"a"), Some(0));
            assert_eq!(cache.tier_of(&"a"), Some(Tier::History));
        }
    }

    mod reinsertion {
        use super::*;

        #[test]
        fn test_reinsert_in_history_resets_hits() {
            let mut cache = LrukCache::new(3, 3, 3);
            cache.insert("a", 1);
            cache.get(&"a");
            cache.get(&"a");
            assert_eq!(cache.insert("a", 2), Some(1));
            assert_eq!(cache.hit_count(&"a"), Some(0));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_reinsert_of_cached_key_returns_to_history() {
            let mut cache = LrukCache::new(1, 3, 3);
            cache.insert("a", 1);
            cache.get(&"a");
            assert_eq!(cache.tier_of(&"a"), Some(Tier::Cache));

            assert_eq!(cache.insert("a", 2), Some(1));
            assert_eq!(cache.tier_of(&"a"), Some(Tier::History));
            assert_eq!(cache.cache_len(), 0);
            assert_eq!(cache.peek(&"a"), Some(&2));
            assert!(cache.check_invariants().is_ok());
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn test_history_evicts_its_own_lru() {
            let mut cache = LrukCache::new(2, 2, 2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);
            assert!(!cache.contains(&"a"));
            assert_eq!(keys_in(&cache, Tier::History), vec!["c", "b"]);
        }

        #[test]
        fn test_history_touch_protects_entry() {
            let mut cache = LrukCache::new(3, 2, 2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"a");
            cache.insert("c", 3);
            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"b"));
        }

        #[test]
        fn test_scan_does_not_disturb_cache_tier() {
            let mut cache = LrukCache::new(2, 2, 2);
            for key in ["hot1", "hot2"] {
                cache.insert(key, 0);
                cache.get(&key);
                cache.get(&key);
            }
            for key in ["s1", "s2", "s3", "s4", "s5"] {
                cache.insert(key, 1);
            }
            assert_eq!(keys_in(&cache, Tier::Cache), vec!["hot2", "hot1"]);
            assert_eq!(keys_in(&cache, Tier::History), vec!["s5", "s4"]);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_single_get_leaves_entry_evictable() {
            let mut cache = LrukCache::new(2, 3, 3);
            cache.insert(1, "one");
            assert_eq!(cache.get(&1), Some(&"one"));
            assert_eq!(cache.tier_of(&1), Some(Tier::History));

            for key in 100..103 {
                cache.insert(key, "scan");
            }

            assert!(!cache.contains(&1));
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.cache_len(), 0);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_promoted_entry_survives_history_scan() {
            let mut cache = LrukCache::new(2, 3, 3);
            cache.insert(1, "one");
            cache.get(&1);
            cache.get(&1);
            assert_eq!(cache.tier_of(&1), Some(Tier::Cache));

            for key in 100..104 {
                cache.insert(key, "scan");
            }

            assert!(cache.contains(&1));
            assert_eq!(cache.get(&1), Some(&"one"));
            assert_eq!(cache.history_len(), 3);
            assert!(!cache.contains(&100));
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_promotion_evicts_cache_lru() {
            let mut cache = LrukCache::new(1, 4, 2);
            for key in ["a", "b", "c"] {
                cache.insert(key, 0);
                cache.get(&key);
            }
            assert_eq!(keys_in(&cache, Tier::Cache), vec!["c", "b"]);
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.len(), 2);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_tier_observers_see_their_own_evictions() {
            let history = EventCounter::new();
            let protected = EventCounter::new();
            let mut cache = LrukCache::new(1, 1, 1);
            cache.add_history_observer(history.clone());
            cache.add_cache_observer(protected.clone());

            cache.insert(1, ());
            cache.insert(2, ());
            cache.get(&2);
            cache.insert(3, ());
            cache.get(&3);

            assert_eq!(history.evicted(), 1);
            assert_eq!(history.deleted(), 3);
            assert_eq!(protected.inserted(), 2);
            assert_eq!(protected.evicted(), 1);
        }
    }

    mod edge_cases {
        use super::*;

        #[test]
        fn test_k_zero_is_clamped() {
            let mut cache = LrukCache::new(0, 2, 2);
            assert_eq!(cache.k_value(), 1);
            cache.insert("a", 1);
            cache.get(&"a");
            assert_eq!(cache.tier_of(&"a"), Some(Tier::Cache));
        }

        #[test]
        fn test_try_new_rejects_k_zero() {
            let err = LrukCache::<u8, u8>::try_new(0, 2, 2).unwrap_err();
            assert!(err.to_string().contains('k'));
        }

        #[test]
        fn test_zero_history_capacity_drops_inserts() {
            let mut cache = LrukCache::new(2, 0, 4);
            assert_eq!(cache.insert("a", 1), None);
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.get(&"a"), None);
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_zero_cache_capacity_drops_at_promotion() {
            let mut cache = LrukCache::new(2, 4, 0);
            cache.insert("a", 1);
            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.get(&"a"), None);
            assert!(!cache.contains(&"a"));
            assert!(cache.is_empty());
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_clear_empties_both_tiers() {
            let mut cache = LrukCache::new(1, 2, 2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"b");
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.history_len(), 0);
            assert_eq!(cache.cache_len(), 0);
            cache.insert("c", 3);
            assert!(cache.contains(&"c"));
        }

        #[test]
        fn test_purge_is_terminal_and_idempotent() {
            let mut cache = LrukCache::new(2, 2, 2);
            cache.insert("a", 1);
            cache.purge();
            cache.purge();
            assert!(cache.is_purged());
            assert_eq!(cache.len(), 0);
            assert_eq!(cache.capacity(), 4);
            assert!(!cache.contains(&"a"));
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        #[should_panic(expected = "after purge")]
        fn test_insert_after_purge_panics() {
            let mut cache = LrukCache::new(2, 2, 2);
            cache.purge();
            cache.insert("a", 1);
        }

        #[test]
        #[should_panic(expected = "after purge")]
        fn test_touch_after_purge_panics() {
            let mut cache: LrukCache<u8, u8> = LrukCache::new(2, 2, 2);
            cache.purge();
            cache.touch(&1);
        }

        #[test]
        fn test_debug_output() {
            let cache: LrukCache<u8, u8> = LrukCache::new(2, 3, 4);
            let rendered = format!("{cache:?}");
            assert!(rendered.contains("k: 2"));
            assert!(rendered.contains("cache_capacity: 4"));
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn test_concurrent_promotion() {
            let cache: ConcurrentLrukCache<u32, String> = ConcurrentLrukCache::new(2, 4, 4);
            cache.insert(1, "one".to_string());
            assert!(cache.get(&1).is_some());
            assert!(cache.touch(&1));
            assert_eq!(cache.tier_of(&1), Some(Tier::Cache));
            assert_eq!(cache.hit_count(&1), Some(2));
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_concurrent_try_new() {
            assert!(ConcurrentLrukCache::<u32, u32>::try_new(0, 1, 1).is_err());
            let cache = ConcurrentLrukCache::<u32, u32>::try_new(2, 1, 1).unwrap();
            assert_eq!(cache.k_value(), 2);
            assert_eq!(cache.capacity(), 2);
        }

        #[test]
        fn test_concurrent_cache_is_marked_concurrent() {
            fn assert_concurrent<C: ConcurrentCache>() {}
            assert_concurrent::<ConcurrentLrukCache<u64, Vec<u8>>>();
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn test_snapshot_tracks_promotions_and_tier_evictions() {
            let mut cache = LrukCache::new(1, 1, 1);
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.get(&2);
            cache.insert(3, 3);
            cache.get(&3);
            cache.get(&3);
            cache.get(&4);

            let snapshot = cache.snapshot();
            assert_eq!(snapshot.promotions, 2);
            assert_eq!(snapshot.history_evictions, 1);
            assert_eq!(snapshot.cache_evictions, 1);
            assert_eq!(snapshot.evicted_entries, 2);
            assert_eq!(snapshot.history_hits, 2);
            assert_eq!(snapshot.cache_hits, 1);
            assert_eq!(snapshot.get_misses, 1);
            assert_eq!(snapshot.cache_len, 1);
        }

        #[test]
        fn test_promotion_into_zero_cache_counts_as_miss() {
            let mut cache = LrukCache::new(1, 4, 0);
            cache.insert(1, 1);
            assert_eq!(cache.get(&1), None);

            let snapshot = cache.snapshot();
            assert_eq!(snapshot.get_hits, 0);
            assert_eq!(snapshot.get_misses, 1);
            assert_eq!(snapshot.history_hits, 0);
            assert_eq!(snapshot.promotions, 1);
            assert_eq!(snapshot.cache_len, 0);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, u16),
            Get(u8),
            Remove(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                2 => (0u8..24, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
                3 => (0u8..24).prop_map(Op::Get),
                1 => (0u8..24).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn prop_tiers_stay_bounded_and_consistent(
                k in 1usize..4,
                history_capacity in 0usize..6,
                cache_capacity in 0usize..6,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut cache = LrukCache::new(k, history_capacity, cache_capacity);
                for op in ops {
                    match op {
                        Op::Insert(key, value) => { cache.insert(key, value); },
                        Op::Get(key) => { cache.get(&key); },
                        Op::Remove(key) => { cache.remove(&key); },
                    }
                    prop_assert!(cache.history_len() <= history_capacity);
                    prop_assert!(cache.cache_len() <= cache_capacity);
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }

            #[test]
            fn prop_k_gets_promote(k in 1usize..5) {
                let mut cache = LrukCache::new(k, 4, 4);
                cache.insert(0u8, 0u8);
                for _ in 1..k {
                    cache.get(&0);
                    prop_assert_eq!(cache.tier_of(&0), Some(Tier::History));
                }
                cache.get(&0);
                prop_assert_eq!(cache.tier_of(&0), Some(Tier::Cache));
            }
        }
    }
}
