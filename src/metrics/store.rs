//! Concurrent latest-value gauge store.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::probe::{RoundSummary, as_millis_f64};

/// Exported gauge names.
///
/// Declaration order is the exposition order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum MetricName {
    PacketTransmit,
    PacketReceive,
    PacketLossRate,
    RttMin,
    RttAvg,
    RttMax,
    RttMdev,
    PingSuccessRate,
}

impl MetricName {
    /// Every metric, in exposition order.
    pub const ALL: [MetricName; 8] = [
        MetricName::PacketTransmit,
        MetricName::PacketReceive,
        MetricName::PacketLossRate,
        MetricName::RttMin,
        MetricName::RttAvg,
        MetricName::RttMax,
        MetricName::RttMdev,
        MetricName::PingSuccessRate,
    ];

    /// `# HELP` text.
    pub fn help(&self) -> &'static str {
        match self {
            Self::PacketTransmit => "Packets sent in the latest round",
            Self::PacketReceive => "Packets received in the latest round",
            Self::PacketLossRate => "Packet loss percentage in the latest round",
            Self::RttMin => "Minimum round-trip time in milliseconds",
            Self::RttAvg => "Average round-trip time in milliseconds",
            Self::RttMax => "Maximum round-trip time in milliseconds",
            Self::RttMdev => "Round-trip time standard deviation in milliseconds",
            Self::PingSuccessRate => "Percentage of all packets answered since startup",
        }
    }
}

type Entries = BTreeMap<(MetricName, String), f64>;

/// Latest value per `(metric, target)`.
///
/// Cloning the store shares the underlying map. Each scheduler writes only
/// its own target's keys; the exporter reads across all of them.
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    entries: Arc<RwLock<Entries>>,
}

impl MetricsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single gauge. Rounds go through [`MetricsStore::publish_round`].
    #[cfg(test)]
    pub(crate) fn set(&self, metric: MetricName, target: &str, value: f64) {
        self.entries.write().insert((metric, target.to_string()), value);
    }

    /// Publish every gauge of a round for `target` in one write.
    ///
    /// RTT gauges are reported as `0` when no packet was answered.
    pub fn publish_round(&self, target: &str, summary: &RoundSummary, success_rate: f64) {
        let (min, avg, max, mdev) = summary.rtt.map_or((0.0, 0.0, 0.0, 0.0), |rtt| {
            (
                as_millis_f64(rtt.min),
                as_millis_f64(rtt.avg),
                as_millis_f64(rtt.max),
                as_millis_f64(rtt.mdev),
            )
        });

        let values = [
            (MetricName::PacketTransmit, f64::from(summary.packets_sent)),
            (MetricName::PacketReceive, f64::from(summary.packets_received)),
            (MetricName::PacketLossRate, summary.loss_rate()),
            (MetricName::RttMin, min),
            (MetricName::RttAvg, avg),
            (MetricName::RttMax, max),
            (MetricName::RttMdev, mdev),
            (MetricName::PingSuccessRate, success_rate),
        ];

        let mut entries = self.entries.write();
        for (metric, value) in values {
            entries.insert((metric, target.to_string()), value);
        }
    }

    /// Latest value of one gauge.
    pub fn get(&self, metric: MetricName, target: &str) -> Option<f64> {
        self.entries
            .read()
            .get(&(metric, target.to_string()))
            .copied()
    }

    /// Copy the current contents.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries: self.entries.read().clone(),
        }
    }
}

/// Point-in-time copy of the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    entries: Entries,
}

impl MetricsSnapshot {
    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Value of one gauge.
    pub fn get(&self, metric: MetricName, target: &str) -> Option<f64> {
        self.entries.get(&(metric, target.to_string())).copied()
    }

    /// Entries of one metric, ordered by target name.
    pub fn metric(&self, metric: MetricName) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .range((metric, String::new())..)
            .take_while(move |((m, _), _)| *m == metric)
            .map(|((_, target), value)| (target.as_str(), *value))
    }
}
