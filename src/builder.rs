//! Unified cache builder for the available eviction policies.
//!
//! Lets callers pick a policy at runtime and work through one `Cache` type.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru);
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, InvariantError};
use crate::policy::lru::SimpleLru;
use crate::policy::lru_k::LrukCache;
use crate::traits::{CoreCache, MutableCache, Purge};

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    Lru,
    /// LRU-K: entries are admitted to a history tier of `history_capacity`
    /// and promoted to the main tier after `k` touches.
    LruK { k: usize, history_capacity: usize },
}

/// Cache wrapper with the same API regardless of policy.
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Lru(SimpleLru<K, V>),
    LruK(LrukCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Lru(_) => CachePolicy::Lru,
            CacheInner::LruK(lru_k) => CachePolicy::LruK {
                k: crate::traits::LrukCacheTrait::k_value(lru_k),
                history_capacity: lru_k.history_capacity(),
            },
        }
    }

    /// Insert a key-value pair. Returns the previous value if the key existed.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.insert(key, value),
            CacheInner::LruK(lru_k) => lru_k.insert(key, value),
        }
    }

    /// Get a value, recording the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.get(key),
            CacheInner::LruK(lru_k) => lru_k.get(key),
        }
    }

    /// Get a value without recording the access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.peek(key),
            CacheInner::LruK(lru_k) => lru_k.peek(key),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.remove(key),
            CacheInner::LruK(lru_k) => lru_k.remove(key),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.contains(key),
            CacheInner::LruK(lru_k) => lru_k.contains(key),
        }
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::LruK(lru_k) => lru_k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries; both tiers for LRU-K.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.capacity(),
            CacheInner::LruK(lru_k) => lru_k.capacity(),
        }
    }

    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::LruK(lru_k) => lru_k.clear(),
        }
    }

    /// Releases everything. The cache cannot be used afterwards.
    pub fn purge(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.purge(),
            CacheInner::LruK(lru_k) => lru_k.purge(),
        }
    }

    pub fn is_purged(&self) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.is_purged(),
            CacheInner::LruK(lru_k) => lru_k.is_purged(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.check_invariants(),
            CacheInner::LruK(lru_k) => lru_k.check_invariants(),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            CacheInner::Lru(lru) => f.debug_tuple("Cache").field(lru).finish(),
            CacheInner::LruK(lru_k) => f.debug_tuple("Cache").field(lru_k).finish(),
        }
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// `capacity` bounds the main tier: the whole cache for LRU, the
    /// protected tier for LRU-K.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Build a cache with the specified policy. An LRU-K `k` of 0 is treated as 1.
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let lru = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru);
    /// let lru_k = CacheBuilder::new(100).build::<u64, String>(CachePolicy::LruK {
    ///     k: 2,
    ///     history_capacity: 400,
    /// });
    /// assert_eq!(lru.capacity(), 100);
    /// assert_eq!(lru_k.capacity(), 500);
    /// ```
    pub fn build<K, V>(self, policy: CachePolicy) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(SimpleLru::new(self.capacity)),
            CachePolicy::LruK {
                k,
                history_capacity,
            } => CacheInner::LruK(LrukCache::new(k, history_capacity, self.capacity)),
        };
        Cache { inner }
    }

    /// Like [`build`](Self::build), but rejects an LRU-K `k` of 0.
    pub fn try_build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(SimpleLru::new(self.capacity)),
            CachePolicy::LruK {
                k,
                history_capacity,
            } => CacheInner::LruK(LrukCache::try_new(k, history_capacity, self.capacity)?),
        };
        Ok(Cache { inner })
    }
}
