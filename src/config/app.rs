//! Application configuration structures.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::target::Target;

use super::validation::{ConfigError, expand_env_vars};

// =============================================================================
// Constants
// =============================================================================

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "synthetic_monitoring_config.yaml";

/// Default seconds between probe rounds.
pub const DEFAULT_TIME_INTERVAL_SECS: u64 = 10;

/// Default number of probes per round.
pub const DEFAULT_PROBES: u32 = 3;

/// Default number of packets per probe.
pub const DEFAULT_PACKET_COUNT: u32 = 4;

/// Upper bound on `probes × packet_count` for one round.
///
/// Keeps every packet of a round on a distinct ICMP sequence number.
pub const MAX_PACKETS_PER_ROUND: u64 = 10_000;

/// Default per-packet reply timeout (2 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default metrics endpoint port.
pub const DEFAULT_PORT: u16 = 8989;

/// Default metrics endpoint path.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

fn default_time_interval() -> u64 {
    DEFAULT_TIME_INTERVAL_SECS
}

fn default_probes() -> u32 {
    DEFAULT_PROBES
}

fn default_packet_count() -> u32 {
    DEFAULT_PACKET_COUNT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Metrics endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: "0.0.0.0").
    pub bind: String,

    /// Listen port (default: 8989).
    pub port: u16,

    /// Scrape path (default: "/metrics").
    pub metrics_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

// =============================================================================
// Monitoring Configuration
// =============================================================================

/// One configured target entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Metrics label for the target.
    pub name: String,

    /// IP address or hostname to probe.
    pub ip: String,
}

/// The `monitoring_targets` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringTargets {
    /// Targets in configuration order.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

/// The `monitoring_config` section. Applies uniformly to every target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Seconds between rounds (default: 10).
    #[serde(default = "default_time_interval")]
    pub time_interval: u64,

    /// Probes per round (default: 3).
    #[serde(default = "default_probes")]
    pub probes: u32,

    /// Packets per probe (default: 4).
    #[serde(default = "default_packet_count")]
    pub packet_count: u32,

    /// Per-packet reply timeout (default: "2s").
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            time_interval: DEFAULT_TIME_INTERVAL_SECS,
            probes: DEFAULT_PROBES,
            packet_count: DEFAULT_PACKET_COUNT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MonitoringConfig {
    /// Interval between rounds as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.time_interval)
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Targets to monitor.
    #[serde(default)]
    pub monitoring_targets: MonitoringTargets,

    /// Probe settings.
    #[serde(default)]
    pub monitoring_config: MonitoringConfig,

    /// Metrics endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// `${VAR}` and `${VAR:-default}` references are expanded before parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(&expand_env_vars(content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        if !self.server.metrics_path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "server metrics_path must start with '/': '{}'",
                self.server.metrics_path
            )));
        }

        let monitoring = &self.monitoring_config;
        if monitoring.time_interval == 0 {
            return Err(ConfigError::ValidationError(
                "monitoring_config.time_interval must be at least 1 second".to_string(),
            ));
        }
        if monitoring.probes == 0 {
            return Err(ConfigError::ValidationError(
                "monitoring_config.probes must be positive".to_string(),
            ));
        }
        if monitoring.packet_count == 0 {
            return Err(ConfigError::ValidationError(
                "monitoring_config.packet_count must be positive".to_string(),
            ));
        }
        let packets_per_round =
            u64::from(monitoring.probes) * u64::from(monitoring.packet_count);
        if packets_per_round > MAX_PACKETS_PER_ROUND {
            return Err(ConfigError::ValidationError(format!(
                "monitoring_config.probes × packet_count must not exceed {MAX_PACKETS_PER_ROUND} (got {packets_per_round})"
            )));
        }
        if monitoring.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "monitoring_config.timeout must be non-zero".to_string(),
            ));
        }

        if self.monitoring_targets.servers.is_empty() {
            return Err(ConfigError::ValidationError(
                "monitoring_targets.servers must list at least one target".to_string(),
            ));
        }

        let mut seen_names = HashSet::new();
        for server in &self.monitoring_targets.servers {
            if server.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "target name cannot be empty".to_string(),
                ));
            }
            if server.ip.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "target '{}': ip cannot be empty",
                    server.name
                )));
            }
            if !seen_names.insert(server.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate target name: '{}'",
                    server.name
                )));
            }
        }

        Ok(())
    }

    /// Build the immutable target list, in configuration order.
    pub fn targets(&self) -> Vec<Target> {
        self.monitoring_targets
            .servers
            .iter()
            .map(|s| Target::new(s.name.trim(), s.ip.trim()))
            .collect()
    }
}
