use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::metrics::snapshot::{LruMetricsSnapshot, LrukMetricsSnapshot};
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for cache metrics snapshots.
///
/// Writes the Prometheus text exposition format, so the output can be scraped
/// directly or forwarded to a collector.
///
/// ```
/// use evictkit::metrics::exporter::PrometheusTextExporter;
/// use evictkit::metrics::snapshot::LruMetricsSnapshot;
/// use evictkit::metrics::traits::MetricsExporter;
///
/// let exporter = PrometheusTextExporter::new("evictkit", Vec::new());
/// exporter.export(&LruMetricsSnapshot::default());
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("evictkit_get_calls_total 0"));
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "# TYPE {name} {kind}");
        let _ = writeln!(writer, "{name} {value}");
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: usize) {
        self.write_metric("gauge", suffix, value as u64);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }

    fn write_core(
        &self,
        get: (u64, u64, u64),
        insert: (u64, u64, u64),
        evicted_entries: u64,
        remove: (u64, u64),
        clear_calls: u64,
    ) {
        self.write_counter("get_calls_total", get.0);
        self.write_counter("get_hits_total", get.1);
        self.write_counter("get_misses_total", get.2);
        self.write_counter("insert_calls_total", insert.0);
        self.write_counter("insert_updates_total", insert.1);
        self.write_counter("insert_new_total", insert.2);
        self.write_counter("evicted_entries_total", evicted_entries);
        self.write_counter("remove_calls_total", remove.0);
        self.write_counter("remove_found_total", remove.1);
        self.write_counter("clear_calls_total", clear_calls);
    }
}

impl<W: Write + Send> MetricsExporter<LruMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &LruMetricsSnapshot) {
        self.write_core(
            (snapshot.get_calls, snapshot.get_hits, snapshot.get_misses),
            (
                snapshot.insert_calls,
                snapshot.insert_updates,
                snapshot.insert_new,
            ),
            snapshot.evicted_entries,
            (snapshot.remove_calls, snapshot.remove_found),
            snapshot.clear_calls,
        );
        self.write_counter("pop_lru_calls_total", snapshot.pop_lru_calls);
        self.write_counter("pop_lru_found_total", snapshot.pop_lru_found);
        self.write_counter("touch_calls_total", snapshot.touch_calls);
        self.write_counter("touch_found_total", snapshot.touch_found);
        self.write_gauge("cache_len", snapshot.cache_len);
        self.write_gauge("capacity", snapshot.capacity);
    }
}

impl<W: Write + Send> MetricsExporter<LrukMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &LrukMetricsSnapshot) {
        self.write_core(
            (snapshot.get_calls, snapshot.get_hits, snapshot.get_misses),
            (
                snapshot.insert_calls,
                snapshot.insert_updates,
                snapshot.insert_new,
            ),
            snapshot.evicted_entries,
            (snapshot.remove_calls, snapshot.remove_found),
            snapshot.clear_calls,
        );
        self.write_counter("history_hits_total", snapshot.history_hits);
        self.write_counter("cache_hits_total", snapshot.cache_hits);
        self.write_counter("promotions_total", snapshot.promotions);
        self.write_counter("history_evictions_total", snapshot.history_evictions);
        self.write_counter("cache_evictions_total", snapshot.cache_evictions);
        self.write_gauge("history_len", snapshot.history_len);
        self.write_gauge("cache_len", snapshot.cache_len);
        self.write_gauge("history_capacity", snapshot.history_capacity);
        self.write_gauge("cache_capacity", snapshot.cache_capacity);
    }
}
