//! Echo transport abstraction and per-packet outcomes.

use std::time::Duration;

use thiserror::Error;

/// Errors that fail a whole probe rather than a single packet.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Hostname lookup failed.
    #[error("failed to resolve '{address}': {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Hostname lookup returned nothing.
    #[error("no addresses found for '{0}'")]
    NoAddress(String),

    /// ICMP socket could not be opened.
    #[error("ICMP socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// No socket is available for the resolved address family.
    #[error("{0} ICMP socket unavailable")]
    Unsupported(&'static str),
}

/// Result of a single echo packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    rtt: Option<Duration>,
}

impl ProbeOutcome {
    /// A reply arrived after `rtt`.
    pub fn success(rtt: Duration) -> Self {
        Self { rtt: Some(rtt) }
    }

    /// No reply (timeout, unreachable, send error).
    pub fn failure() -> Self {
        Self { rtt: None }
    }

    /// Whether a reply arrived.
    pub fn succeeded(&self) -> bool {
        self.rtt.is_some()
    }

    /// Round-trip time, present only on success.
    pub fn round_trip_time(&self) -> Option<Duration> {
        self.rtt
    }
}

/// Sends echo requests to an address.
///
/// One call is one probe: resolve `address` once, then send `packets`
/// echo requests, each bounded by `timeout`. Packet-level failures are
/// reported as [`ProbeOutcome::failure`] entries; an `Err` means none of
/// the packets could be sent.
#[async_trait::async_trait]
pub trait Pinger: Send + Sync + 'static {
    /// Run one probe against `address`.
    async fn probe(
        &self,
        address: &str,
        packets: u32,
        timeout: Duration,
    ) -> Result<Vec<ProbeOutcome>, ProbeError>;
}
