#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evicted_entries: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub clear_calls: u64,

    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,

    pub cache_len: usize,
    pub capacity: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LrukMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evicted_entries: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub clear_calls: u64,

    pub history_hits: u64,
    pub cache_hits: u64,
    pub promotions: u64,
    pub history_evictions: u64,
    pub cache_evictions: u64,

    pub history_len: usize,
    pub cache_len: usize,
    pub history_capacity: usize,
    pub cache_capacity: usize,
}

fn ratio(hits: u64, calls: u64) -> f64 {
    if calls == 0 {
        0.0
    } else {
        hits as f64 / calls as f64
    }
}

impl LruMetricsSnapshot {
    /// Fraction of `get` calls that hit; 0.0 before the first call.
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.get_hits, self.get_calls)
    }
}

impl LrukMetricsSnapshot {
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.get_hits, self.get_calls)
    }

    /// Fraction of history-tier hits that earned promotion.
    pub fn promotion_ratio(&self) -> f64 {
        ratio(self.promotions, self.history_hits)
    }
}
