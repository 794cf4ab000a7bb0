//! One round of probes against one target.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{MAX_PACKETS_PER_ROUND, MonitoringConfig};
use crate::target::Target;

use super::pinger::{Pinger, ProbeError, ProbeOutcome};
use super::summary::RoundSummary;

/// Sends `probe_count` probes of `packets_per_probe` packets each and
/// reduces the outcomes into a [`RoundSummary`].
///
/// The runner keeps no state between rounds. Probe-level errors never
/// abort a round: the affected packets are counted as lost.
#[derive(Clone)]
pub struct ProbeRunner {
    pinger: Arc<dyn Pinger>,
    probe_count: u32,
    packets_per_probe: u32,
    timeout: Duration,
}

impl ProbeRunner {
    /// Create a new runner.
    pub fn new(
        pinger: Arc<dyn Pinger>,
        probe_count: u32,
        packets_per_probe: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            pinger,
            probe_count,
            packets_per_probe,
            timeout,
        }
    }

    /// Create a runner using the `monitoring_config` probe settings.
    pub fn from_config(pinger: Arc<dyn Pinger>, config: &MonitoringConfig) -> Self {
        Self::new(pinger, config.probes, config.packet_count, config.timeout)
    }

    /// Total echo requests sent per round, saturating at `u32::MAX`.
    pub fn packets_per_round(&self) -> u32 {
        self.probe_count.saturating_mul(self.packets_per_probe)
    }

    /// Probe `target` and summarize the round.
    pub async fn run_round(&self, target: &Target) -> RoundSummary {
        let per_probe = self.packets_per_probe as usize;
        let capacity = u64::from(self.packets_per_round()).min(MAX_PACKETS_PER_ROUND);
        let mut outcomes = Vec::with_capacity(capacity as usize);
        let mut failed_probes = 0u32;
        let mut first_error: Option<ProbeError> = None;

        for _ in 0..self.probe_count {
            match self
                .pinger
                .probe(target.address(), self.packets_per_probe, self.timeout)
                .await
            {
                Ok(mut batch) => {
                    batch.resize(per_probe, ProbeOutcome::failure());
                    outcomes.extend(batch);
                }
                Err(e) => {
                    failed_probes += 1;
                    first_error.get_or_insert(e);
                    outcomes.extend(std::iter::repeat_n(ProbeOutcome::failure(), per_probe));
                }
            }
        }

        let summary = RoundSummary::from_outcomes(&outcomes);

        // A fully lost round is reported once by the scheduler.
        if let Some(e) = first_error {
            if summary.is_total_loss() {
                tracing::debug!(
                    name = %target.name(),
                    address = %target.address(),
                    failed_probes,
                    error = %e,
                    "Probe failed"
                );
            } else {
                tracing::warn!(
                    name = %target.name(),
                    address = %target.address(),
                    failed_probes,
                    error = %e,
                    "Probe failed"
                );
            }
        }

        summary
    }
}

impl std::fmt::Debug for ProbeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeRunner")
            .field("probe_count", &self.probe_count)
            .field("packets_per_probe", &self.packets_per_probe)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
