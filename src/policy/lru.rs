//! # Least Recently Used (LRU) Cache
//!
//! A fixed-capacity map whose entries are ordered by recency and evicted from
//! the least recently used end. Recency lives in an [`EvictionQueue`]; a hash
//! index maps keys to queue handles.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          SimpleLru<K, V>                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────┐                                   │
//!   │   │ FxHashMap<K, QueueHandle>    │                                   │
//!   │   │   key_a ──────────────────┐  │                                   │
//!   │   │   key_b ────────────┐     │  │                                   │
//!   │   │   key_c ──────┐     │     │  │                                   │
//!   │   └───────────────┼─────┼─────┼──┘                                   │
//!   │                   ▼     ▼     ▼                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │ EvictionQueue<LruEntry<K, V>>                                │   │
//!   │   │   front ──► [c] ◄──► [b] ◄──► [a] ◄── back                   │   │
//!   │   │             MRU                LRU                           │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Keeping the index in step
//!
//! Queue operations are issued with an index hook. When the queue reports that
//! an entry was deleted, the hook drops the key from the index, but only if the
//! index still points at that exact handle. Eviction during `insert` therefore
//! needs no special casing in the cache itself.
//!
//! ## Operations
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `new(capacity)`  | O(1)       | Create cache with given capacity          |
//! | `insert(k, v)`   | O(1)*      | Insert or update, may evict LRU           |
//! | `get(&k)`        | O(1)       | Get value, moves to MRU position          |
//! | `peek(&k)`       | O(1)       | Get value without affecting order         |
//! | `remove(&k)`     | O(1)       | Remove entry by key                       |
//! | `pop_lru()`      | O(1)       | Remove and return least recently used     |
//! | `peek_lru()`     | O(1)       | Look at the LRU entry                     |
//! | `touch(&k)`      | O(1)       | Move to MRU without returning value       |
//! | `recency_rank()` | O(n)       | Position in recency order (0 = MRU)       |
//! | `clear()`        | O(n)       | Remove all entries                        |
//! | `purge()`        | O(n)       | Release everything; the cache is retired  |
//!
//! ## Capacity zero
//!
//! `insert` on a zero-capacity cache is accepted and immediately evicted, so
//! the cache stays empty and `get` always misses.
//!
//! ## Thread Safety
//!
//! - `SimpleLru`: single-threaded; `Send` when `K` and `V` are.
//! - `ConcurrentLruCache`: `parking_lot::Mutex` around a `SimpleLru` holding
//!   `Arc<V>`, so values can outlive the lock guard.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::SimpleLru;
//! use evictkit::traits::{CoreCache, LruCacheTrait};
//!
//! let mut cache = SimpleLru::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.peek_lru(), Some((&"a", &1)));
//! ```

use std::fmt;
use std::hash::Hash;
#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ds::{EvictionQueue, QueueEvent, QueueHandle, QueueObserver, RemovalCause};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, LruMetricsRecorder, MetricsSnapshotProvider};
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache, Purge};

/// Element stored in the recency queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LruEntry<K, V> {
    key: K,
    value: V,
}

impl<K, V> LruEntry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Drops index entries for deleted queue elements.
struct IndexHook<'a, K> {
    index: &'a mut FxHashMap<K, QueueHandle>,
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    evicted: u64,
}

impl<'a, K> IndexHook<'a, K> {
    fn new(index: &'a mut FxHashMap<K, QueueHandle>) -> Self {
        Self { index, evicted: 0 }
    }
}

impl<K, V> QueueObserver<LruEntry<K, V>> for IndexHook<'_, K>
where
    K: Eq + Hash,
{
    fn on_event(&mut self, event: QueueEvent<'_, LruEntry<K, V>>) {
        if let QueueEvent::Deleted {
            handle,
            value,
            cause,
        } = event
        {
            if self.index.get(&value.key) == Some(&handle) {
                self.index.remove(&value.key);
            }
            if cause == RemovalCause::Evicted {
                self.evicted += 1;
            }
        }
    }
}

/// Single-threaded LRU cache.
pub struct SimpleLru<K, V> {
    queue: EvictionQueue<LruEntry<K, V>>,
    index: FxHashMap<K, QueueHandle>,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> SimpleLru<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// ```
    /// use evictkit::policy::lru::SimpleLru;
    /// use evictkit::traits::CoreCache;
    ///
    /// let cache: SimpleLru<u32, String> = SimpleLru::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: EvictionQueue::new(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Registers an observer on the underlying recency queue.
    ///
    /// The observer sees entries as they are inserted, touched and deleted,
    /// after the cache has updated its own index.
    pub fn add_observer<O>(&mut self, observer: O)
    where
        O: QueueObserver<LruEntry<K, V>> + Send + 'static,
    {
        self.queue.add_observer(observer);
    }

    /// Returns the value without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let handle = *self.index.get(key)?;
        self.queue.get(handle).map(LruEntry::value)
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.queue.iter().map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Verifies that the index and the queue describe the same entries.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.queue.check_invariants()?;
        if self.index.len() != self.queue.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys, queue holds {} entries",
                self.index.len(),
                self.queue.len()
            )));
        }
        for (handle, entry) in self.queue.iter() {
            if self.index.get(&entry.key) != Some(&handle) {
                return Err(InvariantError::new(
                    "queue entry is not indexed under its own handle",
                ));
            }
        }
        Ok(())
    }

    fn assert_live(&self, op: &str) {
        assert!(!self.queue.is_purged(), "SimpleLru::{op} called after purge");
    }
}

impl<K, V> CoreCache<K, V> for SimpleLru<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.assert_live("insert");
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.queue.get_mut(handle) {
                let old = std::mem::replace(&mut entry.value, value);
                self.queue.touch(handle);
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();
                return Some(old);
            }
        }

        let mut hook = IndexHook::new(&mut self.index);
        let handle = self.queue.insert_with(
            LruEntry {
                key: key.clone(),
                value,
            },
            &mut hook,
        );
        #[cfg(feature = "metrics")]
        {
            let evicted = hook.evicted;
            self.metrics.record_insert_new();
            self.metrics.record_evicted_entries(evicted);
        }

        if self.queue.contains(handle) {
            self.index.insert(key, handle);
        }
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.assert_live("get");
        let Some(&handle) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        self.queue.touch(handle);
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        self.queue.get(handle).map(LruEntry::value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    fn clear(&mut self) {
        self.assert_live("clear");
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        let mut hook = IndexHook::new(&mut self.index);
        self.queue.clear_with(&mut hook);
        self.index.clear();
    }
}

impl<K, V> MutableCache<K, V> for SimpleLru<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        self.assert_live("remove");
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let handle = *self.index.get(key)?;
        let mut hook = IndexHook::new(&mut self.index);
        let entry = self.queue.remove_with(handle, &mut hook);
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();
        Some(entry.value)
    }
}

impl<K, V> LruCacheTrait<K, V> for SimpleLru<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        self.assert_live("pop_lru");
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_call();
        let (handle, _) = self.queue.back()?;
        let mut hook = IndexHook::new(&mut self.index);
        let entry = self.queue.remove_with(handle, &mut hook);
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru_found();
        Some((entry.key, entry.value))
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        self.queue
            .back()
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    fn touch(&mut self, key: &K) -> bool {
        self.assert_live("touch");
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();
        let Some(&handle) = self.index.get(key) else {
            return false;
        };
        self.queue.touch(handle);
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();
        true
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        let handle = *self.index.get(key)?;
        self.queue.iter().position(|(h, _)| h == handle)
    }
}

impl<K, V> Purge for SimpleLru<K, V> {
    fn purge(&mut self) {
        if self.queue.is_purged() {
            return;
        }
        let released = self.index.len();
        self.queue.purge();
        self.index = FxHashMap::default();
        debug!(released, "purged lru cache");
    }

    fn is_purged(&self) -> bool {
        self.queue.is_purged()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> SimpleLru<K, V> {
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
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
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            cache_len: self.index.len(),
            capacity: self.queue.capacity(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for SimpleLru<K, V> {
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for SimpleLru<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleLru")
            .field("len", &self.index.len())
            .field("capacity", &self.queue.capacity())
            .field("purged", &self.queue.is_purged())
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for SimpleLru<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LRU cache.
///
/// Every operation, `get` included, reorders the queue, so a plain mutex is
/// used rather than a read/write lock.
///
/// ```
/// use evictkit::policy::lru::ConcurrentLruCache;
///
/// let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(100);
/// cache.insert(1, "value".to_string());
/// assert_eq!(cache.get(&1).as_deref(), Some(&"value".to_string()));
/// assert!(cache.get(&2).is_none());
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentLruCache<K, V> {
    inner: Arc<Mutex<SimpleLru<K, Arc<V>>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for ConcurrentLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.index.len())
            .field("capacity", &cache.queue.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimpleLru::new(capacity))),
        }
    }

    /// Inserts a value, wrapping it in `Arc<V>`. Returns the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let value = Arc::new(value);
        self.inner.lock().insert(key, value)
    }

    pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        self.inner.lock().insert(key, value)
    }

    /// Gets a value by key, moving it to MRU position.
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

    pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
        self.inner.lock().pop_lru()
    }

    pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
        self.inner
            .lock()
            .peek_lru()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
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
impl<K, V> ConcurrentCache for ConcurrentLruCache<K, V>
where
    K: Send,
    V: Send + Sync,
{
}

#[cfg(all(feature = "metrics", feature = "concurrency"))]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for ConcurrentLruCache<K, V> {
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}
