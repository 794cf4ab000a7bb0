//! ICMP echo transport.
//!
//! Sends real echo requests through `surge-ping` raw/datagram sockets.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tokio::time::timeout;

use super::pinger::{Pinger, ProbeError, ProbeOutcome};

/// Echo payload size, same as the `ping` default.
const PAYLOAD: [u8; 56] = [0; 56];

/// Echo sequence numbers shared by every probe on one pinger.
///
/// Unprivileged ICMP sockets match replies by `(host, seq)` only, so two
/// probes in flight against the same host must never draw the same number.
#[derive(Debug, Default)]
pub(crate) struct SequenceCounter(AtomicU16);

impl SequenceCounter {
    /// Next sequence number, wrapping at `u16::MAX`.
    pub(crate) fn next(&self) -> PingSequence {
        PingSequence(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// ICMP pinger sharing one socket per address family.
pub struct IcmpPinger {
    v4: Client,
    v6: Option<Client>,
    sequence: SequenceCounter,
}

impl IcmpPinger {
    /// Open the ICMP sockets.
    ///
    /// # Errors
    /// Returns `ProbeError::Socket` if the IPv4 socket cannot be opened
    /// (usually missing `CAP_NET_RAW` or `net.ipv4.ping_group_range`).
    /// A missing IPv6 socket is logged and only fails IPv6 targets.
    pub fn new() -> Result<Self, ProbeError> {
        let v4 = Client::new(&Config::default())?;
        let v6 = match Client::new(&Config::builder().kind(ICMP::V6).build()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "IPv6 ICMP socket unavailable, IPv6 targets will report full loss");
                None
            }
        };
        Ok(Self {
            v4,
            v6,
            sequence: SequenceCounter::default(),
        })
    }

    fn client_for(&self, ip: IpAddr) -> Result<&Client, ProbeError> {
        match ip {
            IpAddr::V4(_) => Ok(&self.v4),
            IpAddr::V6(_) => self.v6.as_ref().ok_or(ProbeError::Unsupported("IPv6")),
        }
    }
}

impl std::fmt::Debug for IcmpPinger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcmpPinger")
            .field("ipv6", &self.v6.is_some())
            .finish_non_exhaustive()
    }
}

/// Resolve hostname to IP address.
pub(crate) async fn resolve_host(host: &str) -> Result<IpAddr, ProbeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host(format!("{host}:0"))
        .await
        .map_err(|source| ProbeError::Resolve {
            address: host.to_string(),
            source,
        })?;
    addrs
        .into_iter()
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| ProbeError::NoAddress(host.to_string()))
}

#[async_trait::async_trait]
impl Pinger for IcmpPinger {
    async fn probe(
        &self,
        address: &str,
        packets: u32,
        probe_timeout: Duration,
    ) -> Result<Vec<ProbeOutcome>, ProbeError> {
        let ip = resolve_host(address).await?;
        let client = self.client_for(ip)?;

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(probe_timeout);

        let mut outcomes = Vec::with_capacity(packets as usize);
        for _ in 0..packets {
            let seq = self.sequence.next();
            let result = timeout(probe_timeout, pinger.ping(seq, &PAYLOAD)).await;
            let seq = seq.0;

            let outcome = match result {
                Ok(Ok((_, rtt))) => {
                    tracing::trace!(%ip, seq, rtt_ms = rtt.as_secs_f64() * 1000.0, "Echo reply");
                    ProbeOutcome::success(rtt)
                }
                Ok(Err(e)) => {
                    tracing::trace!(%ip, seq, error = %e, "Echo failed");
                    ProbeOutcome::failure()
                }
                Err(_) => {
                    tracing::trace!(%ip, seq, "Echo timed out");
                    ProbeOutcome::failure()
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::probe::ProbeRunner;
    use crate::target::Target;

    #[test]
    fn test_sequence_counter_never_repeats_across_threads() {
        let counter = Arc::new(SequenceCounter::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..4096).map(|_| counter.next().0).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for seq in handle.join().unwrap() {
                assert!(seen.insert(seq), "sequence {seq} drawn twice");
            }
        }
        assert_eq!(seen.len(), 8 * 4096);
    }

    #[test]
    fn test_sequence_counter_wraps() {
        let counter = SequenceCounter(AtomicU16::new(u16::MAX));
        assert_eq!(counter.next().0, u16::MAX);
        assert_eq!(counter.next().0, 0);
    }

    /// Needs ICMP sockets (`CAP_NET_RAW` or `net.ipv4.ping_group_range`);
    /// returns early where they are unavailable.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_rounds_to_same_address_do_not_collide() {
        let pinger = match IcmpPinger::new() {
            Ok(pinger) => Arc::new(pinger),
            Err(e) => {
                eprintln!("skipping: {e}");
                return;
            }
        };
        let runner = ProbeRunner::new(pinger, 3, 4, Duration::from_millis(500));
        let a = Target::new("loopback-a", "127.0.0.1");
        let b = Target::new("loopback-b", "127.0.0.1");

        for _ in 0..5 {
            let (first, second) = tokio::join!(runner.run_round(&a), runner.run_round(&b));
            assert_eq!(first.packets_received, first.packets_sent);
            assert_eq!(second.packets_received, second.packets_sent);
        }
    }

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)));
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, IpAddr::V6(std::net::Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_host_invalid() {
        let result = resolve_host("definitely-not-a-host.invalid").await;
        assert!(result.is_err());
    }
}
