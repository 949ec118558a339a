//! # Metrics Trait Hierarchy
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!                 │     CoreMetricsRecorder     │
//!                 │  get_hit/get_miss/insert    │
//!                 │  evict/remove/clear         │
//!                 └──────────────┬──────────────┘
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!          ┌──────────────┐             ┌──────────────┐
//!          │     Lru      │             │     Lruk     │
//!          │   Recorder   │             │   Recorder   │
//!          └──────────────┘             └──────────────┘
//!
//!   Consumption:
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Recorders only write counters. Providers hand out `Copy` snapshots.
//! Exporters only publish.

/// Counters shared by every policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entries(&mut self, count: u64);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
    fn record_clear(&mut self);
}

/// Recency-specific counters.
pub trait LruMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lru_call(&mut self);
    fn record_pop_lru_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
}

/// Two-tier counters: history hits, promotions and per-tier evictions.
pub trait LrukMetricsRecorder: CoreMetricsRecorder {
    fn record_history_hit(&mut self);
    fn record_cache_hit(&mut self);
    fn record_promotion(&mut self);
    fn record_history_evictions(&mut self, count: u64);
    fn record_cache_evictions(&mut self, count: u64);
}

/// Produces a point-in-time copy of a cache's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Publishes snapshots to a monitoring backend.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
