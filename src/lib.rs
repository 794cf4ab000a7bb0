//! synthmon - Synthetic Reachability Monitoring
//!
//! Periodically pings a configured set of targets, reduces every round of
//! echo replies into loss and round-trip statistics, and serves the latest
//! values as Prometheus gauges for an external scraper.
//!
//! # Architecture
//!
//! - **Config**: YAML targets and probe settings
//! - **Probe**: ICMP transport and per-round reduction
//! - **Scheduler**: One cancellable Tokio task per target
//! - **Metrics**: Concurrent latest-value store and text exposition
//! - **Server**: Axum scrape endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use synthmon::{AppConfig, IcmpPinger, MetricsStore, ProbeRunner, SchedulerRegistry, TargetScheduler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("synthetic_monitoring_config.yaml")?;
//!     let store = MetricsStore::new();
//!     let runner = ProbeRunner::from_config(Arc::new(IcmpPinger::new()?), &config.monitoring_config);
//!
//!     let mut registry = SchedulerRegistry::new();
//!     for target in config.targets() {
//!         registry.spawn(TargetScheduler::new(
//!             target,
//!             runner.clone(),
//!             store.clone(),
//!             config.monitoring_config.interval(),
//!         ));
//!     }
//!
//!     tokio::signal::ctrl_c().await?;
//!     registry.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod metrics;
pub mod probe;
pub mod scheduler;
pub mod server;
pub mod target;

pub use config::{AppConfig, ConfigError};
pub use metrics::{MetricName, MetricsSnapshot, MetricsStore};
pub use probe::{IcmpPinger, Pinger, ProbeError, ProbeOutcome, ProbeRunner, RoundSummary};
pub use scheduler::{SchedulerError, SchedulerRegistry, TargetScheduler};
pub use target::Target;
