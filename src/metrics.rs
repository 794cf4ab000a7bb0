//! Metrics layer
//!
//! Latest-value gauges per target, written by the schedulers and rendered
//! for scrapes.
//!
//! - [`MetricsStore`]: Concurrent `(metric, target) → value` map
//! - [`MetricsSnapshot`]: Copy of the store taken under a read lock
//! - [`render`]: Prometheus text exposition of a snapshot

mod exporter;
mod store;

pub use exporter::{CONTENT_TYPE, TARGET_LABEL, escape_label_value, render};
pub use store::{MetricName, MetricsSnapshot, MetricsStore};
