//! Configuration module for synthmon.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Monitored targets (`monitoring_targets.servers`)
//! - Probe settings (interval, probe count, packet count, timeout)
//! - Metrics endpoint settings (bind address, port, path)

mod app;
mod validation;

pub use app::{AppConfig, MonitoringConfig, MonitoringTargets, ServerConfig, ServerEntry};
pub use validation::{ConfigError, expand_env_vars};

// Re-export constants
pub use app::{
    DEFAULT_CONFIG_PATH, DEFAULT_METRICS_PATH, DEFAULT_PACKET_COUNT, DEFAULT_PORT, DEFAULT_PROBES,
    DEFAULT_TIME_INTERVAL_SECS, DEFAULT_TIMEOUT, MAX_PACKETS_PER_ROUND,
};
