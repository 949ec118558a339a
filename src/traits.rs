//! # Cache Trait Hierarchy
//!
//! Uniform interfaces over the caches in [`crate::policy`].
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │            CoreCache<K, V>              │
//!                 │                                         │
//!                 │  insert(&mut, K, V) → Option<V>         │
//!                 │  get(&mut, &K) → Option<&V>             │
//!                 │  contains(&, &K) → bool                 │
//!                 │  len(&) → usize                         │
//!                 │  is_empty(&) → bool                     │
//!                 │  capacity(&) → usize                    │
//!                 │  clear(&mut)                            │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!                                    ▼
//!                 ┌─────────────────────────────────────────┐
//!                 │         MutableCache<K, V>              │
//!                 │  remove(&K) → Option<V>                 │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!               ┌────────────────────┴─────────────────────┐
//!               ▼                                          ▼
//!   ┌────────────────────────────┐           ┌────────────────────────────┐
//!   │   LruCacheTrait<K, V>      │           │   LrukCacheTrait<K, V>     │
//!   │                            │           │                            │
//!   │  pop_lru() → (K, V)        │           │  k_value() → usize         │
//!   │  peek_lru() → (&K, &V)     │           │  hit_count(&K) → usize     │
//!   │  touch(&K) → bool          │           │  tier_of(&K) → Tier        │
//!   │  recency_rank(&K) → usize  │           │  touch(&K) → bool          │
//!   └────────────────────────────┘           └────────────────────────────┘
//!
//!   Purge             release everything, make the cache unusable
//!   ConcurrentCache   marker for Send + Sync wrappers
//! ```
//!
//! ## Trait Summary
//!
//! | Trait             | Extends        | Purpose                                 |
//! |-------------------|----------------|-----------------------------------------|
//! | `CoreCache`       | -              | Universal cache operations              |
//! | `MutableCache`    | `CoreCache`    | Adds arbitrary key removal              |
//! | `LruCacheTrait`   | `MutableCache` | Recency inspection and LRU eviction     |
//! | `LrukCacheTrait`  | `MutableCache` | K-touch promotion inspection            |
//! | `Purge`           | -              | Terminal release of all resources       |
//! | `ConcurrentCache` | `Send + Sync`  | Marker for thread-safe caches           |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::SimpleLru;
//! use evictkit::policy::lru_k::LrukCache;
//! use evictkit::traits::{CoreCache, MutableCache};
//!
//! fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
//!     for (key, value) in data {
//!         cache.insert(*key, value.to_string());
//!     }
//! }
//!
//! fn invalidate<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
//!     for key in keys {
//!         cache.remove(key);
//!     }
//! }
//!
//! let mut lru = SimpleLru::new(8);
//! let mut lru_k = LrukCache::new(2, 8, 8);
//! warm(&mut lru, &[(1, "a"), (2, "b")]);
//! warm(&mut lru_k, &[(1, "a"), (2, "b")]);
//! invalidate(&mut lru, &[1]);
//! invalidate(&mut lru_k, &[1]);
//! assert_eq!(lru.len(), 1);
//! assert_eq!(lru_k.len(), 1);
//! ```

use crate::policy::lru_k::Tier;

/// Operations every cache supports.
///
/// `get` takes `&mut self` because a lookup updates recency.
pub trait CoreCache<K, V> {
    /// Inserts or replaces the value for `key`, returning the previous value.
    ///
    /// May evict another entry to stay within capacity.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up `key` and records the access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns `true` if `key` is resident. Does not record an access.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Drops every entry. The cache stays usable.
    fn clear(&mut self);
}

/// Caches that allow removal by key.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes each key in turn, returning the removed values in order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }
}

/// Recency-ordered caches.
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Least recently used entry, without touching it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks `key` as most recently used. Returns `false` if absent.
    fn touch(&mut self, key: &K) -> bool;

    /// Position in recency order, 0 being most recent. O(n).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Caches that admit entries to a protected tier after K touches.
pub trait LrukCacheTrait<K, V>: MutableCache<K, V> {
    /// Number of touches in the history tier that earns promotion.
    fn k_value(&self) -> usize;

    /// Touches counted since the entry was last inserted.
    fn hit_count(&self, key: &K) -> Option<usize>;

    /// Tier the entry currently lives in.
    fn tier_of(&self, key: &K) -> Option<Tier>;

    /// Records an access without returning the value. Returns `false` if absent.
    fn touch(&mut self, key: &K) -> bool;
}

/// Terminal teardown.
///
/// After `purge`, mutating operations panic. `len`, `capacity`, `contains`
/// and `is_purged` keep working and report an empty cache.
pub trait Purge {
    /// Releases all entries and observers. Idempotent.
    fn purge(&mut self);

    fn is_purged(&self) -> bool;
}

/// Marker for caches that are safe to share across threads.
///
/// ```
/// use evictkit::traits::ConcurrentCache;
///
/// fn share<C: ConcurrentCache + Clone + 'static>(cache: &C) {
///     let cache = cache.clone();
///     std::thread::spawn(move || drop(cache)).join().unwrap();
/// }
/// # #[cfg(feature = "concurrency")]
/// # share(&evictkit::policy::lru::ConcurrentLruCache::<u32, u32>::new(4));
/// ```
pub trait ConcurrentCache: Send + Sync {}
