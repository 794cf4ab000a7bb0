//! Per-target probing loop.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::metrics::MetricsStore;
use crate::probe::{ProbeRunner, RoundSummary, as_millis_f64};
use crate::target::Target;

/// Running totals of every packet sent to one target since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuccessCounter {
    pub total_sent: u64,
    pub total_received: u64,
}

impl SuccessCounter {
    /// Fold a round into the totals.
    pub fn record(&mut self, summary: &RoundSummary) {
        self.total_sent += u64::from(summary.packets_sent);
        self.total_received += u64::from(summary.packets_received);
    }

    /// Percentage of all packets answered, `0` before anything was sent.
    pub fn success_rate(&self) -> f64 {
        if self.total_sent == 0 {
            return 0.0;
        }
        100.0 * self.total_received as f64 / self.total_sent as f64
    }
}

/// Probes one target on a fixed interval and publishes each round.
///
/// Rounds run back to back with `interval` of sleep in between; the first
/// round starts immediately. The loop only ends on cancellation.
#[derive(Debug)]
pub struct TargetScheduler {
    target: Target,
    runner: ProbeRunner,
    store: MetricsStore,
    interval: Duration,
    counter: SuccessCounter,
}

impl TargetScheduler {
    /// Create a scheduler for `target`.
    pub fn new(target: Target, runner: ProbeRunner, store: MetricsStore, interval: Duration) -> Self {
        Self {
            target,
            runner,
            store,
            interval,
            counter: SuccessCounter::default(),
        }
    }

    /// The probed target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Cumulative totals so far.
    pub fn counter(&self) -> SuccessCounter {
        self.counter
    }

    /// Run one round and publish it.
    pub async fn run_once(&mut self) -> RoundSummary {
        let summary = self.runner.run_round(&self.target).await;
        self.publish(&summary);
        summary
    }

    /// Probe until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            name = %self.target.name(),
            address = %self.target.address(),
            interval = %humantime::format_duration(self.interval),
            "Target scheduler started"
        );

        loop {
            let summary = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                summary = self.runner.run_round(&self.target) => summary,
            };
            self.publish(&summary);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(name = %self.target.name(), "Target scheduler stopped");
    }

    fn publish(&mut self, summary: &RoundSummary) {
        self.counter.record(summary);
        let success_rate = self.counter.success_rate();
        self.store
            .publish_round(self.target.name(), summary, success_rate);

        if summary.is_total_loss() {
            tracing::warn!(
                name = %self.target.name(),
                address = %self.target.address(),
                packets_sent = summary.packets_sent,
                "Target unreachable, all packets lost"
            );
        } else {
            tracing::debug!(
                name = %self.target.name(),
                packets_sent = summary.packets_sent,
                packets_received = summary.packets_received,
                loss_rate = summary.loss_rate(),
                rtt_avg_ms = summary.rtt.map(|r| as_millis_f64(r.avg)),
                success_rate,
                "Round complete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metrics::MetricName;
    use crate::probe::testing::{Reply, ScriptedPinger, WarnCounter};

    fn scheduler(pinger: ScriptedPinger, store: &MetricsStore) -> TargetScheduler {
        let runner = ProbeRunner::new(Arc::new(pinger), 1, 2, Duration::from_secs(1));
        TargetScheduler::new(
            Target::new("edge", "203.0.113.5"),
            runner,
            store.clone(),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_success_counter() {
        let mut counter = SuccessCounter::default();
        assert_eq!(counter.success_rate(), 0.0);

        counter.record(&RoundSummary {
            packets_sent: 4,
            packets_received: 3,
            rtt: None,
        });
        counter.record(&RoundSummary {
            packets_sent: 4,
            packets_received: 0,
            rtt: None,
        });

        assert_eq!(counter.total_sent, 8);
        assert_eq!(counter.total_received, 3);
        assert_eq!(counter.success_rate(), 37.5);
    }

    #[tokio::test]
    async fn test_run_once_accumulates_success_rate() {
        let store = MetricsStore::new();
        let pinger = ScriptedPinger::new().script(
            "203.0.113.5",
            vec![
                Reply::Packets(vec![Some(10), None]),
                Reply::Packets(vec![None, None]),
                Reply::Packets(vec![Some(10), Some(12)]),
            ],
        );
        let mut scheduler = scheduler(pinger, &store);

        scheduler.run_once().await;
        assert_eq!(store.get(MetricName::PingSuccessRate, "edge"), Some(50.0));
        assert_eq!(store.get(MetricName::PacketLossRate, "edge"), Some(50.0));

        scheduler.run_once().await;
        assert_eq!(store.get(MetricName::PingSuccessRate, "edge"), Some(25.0));
        assert_eq!(store.get(MetricName::PacketLossRate, "edge"), Some(100.0));
        assert_eq!(store.get(MetricName::RttAvg, "edge"), Some(0.0));

        scheduler.run_once().await;
        assert_eq!(store.get(MetricName::PingSuccessRate, "edge"), Some(50.0));
        assert_eq!(store.get(MetricName::PacketLossRate, "edge"), Some(0.0));
        assert_eq!(
            scheduler.counter(),
            SuccessCounter {
                total_sent: 6,
                total_received: 3
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_round_logs_one_warning() {
        let warnings = WarnCounter::default();
        let _guard = warnings.install();
        let store = MetricsStore::new();
        let pinger = ScriptedPinger::new().script(
            "gone.invalid",
            vec![Reply::Unresolvable, Reply::Unresolvable, Reply::Unresolvable],
        );
        let runner = ProbeRunner::new(Arc::new(pinger), 3, 2, Duration::from_secs(1));
        let mut scheduler = TargetScheduler::new(
            Target::new("gone", "gone.invalid"),
            runner,
            store.clone(),
            Duration::from_secs(10),
        );

        let summary = scheduler.run_once().await;

        assert!(summary.is_total_loss());
        assert_eq!(store.get(MetricName::PacketLossRate, "gone"), Some(100.0));
        assert_eq!(warnings.count(), 1);
    }

    #[tokio::test]
    async fn test_partially_failed_round_logs_one_warning() {
        let warnings = WarnCounter::default();
        let _guard = warnings.install();
        let store = MetricsStore::new();
        let pinger = ScriptedPinger::new().script(
            "flaky.invalid",
            vec![Reply::Unresolvable, Reply::Packets(vec![Some(3), Some(4)])],
        );
        let runner = ProbeRunner::new(Arc::new(pinger), 2, 2, Duration::from_secs(1));
        let mut scheduler = TargetScheduler::new(
            Target::new("flaky", "flaky.invalid"),
            runner,
            store,
            Duration::from_secs(10),
        );

        scheduler.run_once().await;

        assert_eq!(warnings.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_repeats_on_interval_until_cancelled() {
        let store = MetricsStore::new();
        let pinger = Arc::new(ScriptedPinger::new());
        let runner = ProbeRunner::new(pinger.clone(), 1, 2, Duration::from_secs(1));
        let scheduler = TargetScheduler::new(
            Target::new("edge", "203.0.113.5"),
            runner,
            store.clone(),
            Duration::from_secs(10),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(scheduler.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(pinger.calls(), 1);
        assert_eq!(store.get(MetricName::PacketTransmit, "edge"), Some(2.0));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(pinger.calls(), 2);

        cancel.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(pinger.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_in_flight_round() {
        let store = MetricsStore::new();
        let pinger = ScriptedPinger::new().script(
            "203.0.113.5",
            vec![Reply::Delayed(Duration::from_secs(3600))],
        );
        let scheduler = scheduler(pinger, &store);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(scheduler.run(cancel.clone()));
        tokio::time::sleep(Duration::from_millis(1)).await;

        cancel.cancel();
        handle.await.unwrap();

        assert!(store.snapshot().is_empty());
    }
}
