//! Reduction of per-packet outcomes into round statistics.

use std::time::Duration;

use super::pinger::ProbeOutcome;

/// Round-trip statistics over the successful packets of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RttStats {
    pub min: Duration,
    pub avg: Duration,
    pub max: Duration,
    /// Population standard deviation, as reported by `ping`.
    pub mdev: Duration,
}

impl RttStats {
    /// Compute statistics over `samples`. Returns `None` when empty.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let min = *samples.iter().min()?;
        let max = *samples.iter().max()?;

        let n = samples.len() as f64;
        let secs: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();
        let mean = secs.iter().sum::<f64>() / n;
        let variance = secs.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            avg: Duration::from_secs_f64(mean),
            max,
            mdev: Duration::from_secs_f64(variance.sqrt()),
        })
    }
}

/// Summary of one round of probes against one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundSummary {
    pub packets_sent: u32,
    pub packets_received: u32,
    /// `None` when no packet succeeded.
    pub rtt: Option<RttStats>,
}

impl RoundSummary {
    /// Reduce raw outcomes into a summary.
    pub fn from_outcomes(outcomes: &[ProbeOutcome]) -> Self {
        let samples: Vec<Duration> = outcomes
            .iter()
            .filter_map(ProbeOutcome::round_trip_time)
            .collect();

        Self {
            packets_sent: outcomes.len() as u32,
            packets_received: samples.len() as u32,
            rtt: RttStats::from_samples(&samples),
        }
    }

    /// Percentage of packets without a reply, in `[0, 100]`.
    ///
    /// A round with nothing sent or nothing received counts as full loss.
    pub fn loss_rate(&self) -> f64 {
        if self.packets_sent == 0 || self.packets_received == 0 {
            return 100.0;
        }
        100.0 * (1.0 - f64::from(self.packets_received) / f64::from(self.packets_sent))
    }

    /// Whether every packet of the round was lost.
    pub fn is_total_loss(&self) -> bool {
        self.packets_received == 0
    }
}

/// Duration in fractional milliseconds.
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
