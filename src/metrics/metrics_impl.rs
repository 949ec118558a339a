use crate::metrics::traits::{CoreMetricsRecorder, LrukMetricsRecorder, LruMetricsRecorder};

#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
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
}

#[derive(Debug, Default, Clone)]
pub struct LrukMetrics {
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
}

macro_rules! impl_core_recorder {
    ($ty:ty) => {
        impl CoreMetricsRecorder for $ty {
            fn record_get_hit(&mut self) {
                self.get_calls += 1;
                self.get_hits += 1;
            }

            fn record_get_miss(&mut self) {
                self.get_calls += 1;
                self.get_misses += 1;
            }

            fn record_insert_call(&mut self) {
                self.insert_calls += 1;
            }

            fn record_insert_new(&mut self) {
                self.insert_new += 1;
            }

            fn record_insert_update(&mut self) {
                self.insert_updates += 1;
            }

            fn record_evicted_entries(&mut self, count: u64) {
                self.evicted_entries += count;
            }

            fn record_remove_call(&mut self) {
                self.remove_calls += 1;
            }

            fn record_remove_found(&mut self) {
                self.remove_found += 1;
            }

            fn record_clear(&mut self) {
                self.clear_calls += 1;
            }
        }
    };
}

impl_core_recorder!(LruMetrics);
impl_core_recorder!(LrukMetrics);

impl LruMetricsRecorder for LruMetrics {
    fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }

    fn record_pop_lru_found(&mut self) {
        self.pop_lru_found += 1;
    }

    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }
}

impl LrukMetricsRecorder for LrukMetrics {
    fn record_history_hit(&mut self) {
        self.history_hits += 1;
    }

    fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    fn record_history_evictions(&mut self, count: u64) {
        self.history_evictions += count;
        self.evicted_entries += count;
    }

    fn record_cache_evictions(&mut self, count: u64) {
        self.cache_evictions += count;
        self.evicted_entries += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_outcomes_split_calls() {
        let mut metrics = LruMetrics::default();
        metrics.record_get_hit();
        metrics.record_get_hit();
        metrics.record_get_miss();
        assert_eq!(metrics.get_calls, 3);
        assert_eq!(metrics.get_hits, 2);
        assert_eq!(metrics.get_misses, 1);
    }

    #[test]
    fn tier_evictions_roll_up() {
        let mut metrics = LrukMetrics::default();
        metrics.record_history_evictions(2);
        metrics.record_cache_evictions(1);
        assert_eq!(metrics.history_evictions, 2);
        assert_eq!(metrics.cache_evictions, 1);
        assert_eq!(metrics.evicted_entries, 3);
    }
}
