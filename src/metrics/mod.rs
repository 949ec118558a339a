//! Operation counters for the cache policies, enabled by the `metrics` feature.
//!
//! Recording, snapshotting and export are kept apart: policies write through
//! the recorder traits, callers read copies through
//! [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider), and
//! [`PrometheusTextExporter`](exporter::PrometheusTextExporter) publishes them.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
