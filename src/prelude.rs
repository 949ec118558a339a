pub use crate::builder::{Cache, CacheBuilder, CachePolicy};
pub use crate::ds::{
    BoxedObserver, EventCounter, EvictionQueue, FnObserver, IntrusiveList, NoopObserver,
    QueueEvent, QueueHandle, QueueId, QueueObserver, RemovalCause, SlotArena, SlotId,
};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lru::{LruEntry, SimpleLru};
pub use crate::policy::lru_k::{HistoryNode, LrukCache, Tier};
pub use crate::traits::{
    ConcurrentCache, CoreCache, LruCacheTrait, LrukCacheTrait, MutableCache, Purge,
};

#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru_k::ConcurrentLrukCache;

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{LruMetricsSnapshot, LrukMetricsSnapshot};
