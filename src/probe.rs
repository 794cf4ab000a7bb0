//! Probe layer
//!
//! Sends echo requests to a target and reduces the replies into one
//! [`RoundSummary`] per round.
//!
//! # Architecture
//!
//! - [`Pinger`]: Echo transport trait; one call is one probe of N packets
//! - [`IcmpPinger`]: Production transport on ICMP sockets (`surge-ping`)
//! - [`ProbeRunner`]: Runs `probes × packet_count` packets and summarizes them
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use synthmon::probe::{IcmpPinger, ProbeRunner};
//! use synthmon::Target;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = ProbeRunner::new(Arc::new(IcmpPinger::new()?), 2, 2, Duration::from_secs(2));
//! let summary = runner.run_round(&Target::new("edge", "203.0.113.5")).await;
//! println!("loss: {:.1}%", summary.loss_rate());
//! # Ok(())
//! # }
//! ```

mod icmp;
mod pinger;
mod runner;
mod summary;

pub use icmp::IcmpPinger;
pub use pinger::{Pinger, ProbeError, ProbeOutcome};
pub use runner::ProbeRunner;
pub use summary::{RoundSummary, RttStats, as_millis_f64};

#[cfg(test)]
pub(crate) use runner::testing;
