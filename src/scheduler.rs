//! Scheduler layer
//!
//! One Tokio task per target, each probing on its own fixed interval and
//! publishing into the shared [`MetricsStore`](crate::metrics::MetricsStore).
//!
//! - [`TargetScheduler`]: Probe → publish → sleep loop for one target
//! - [`SuccessCounter`]: Cumulative sent/received totals behind `ping_success_rate`
//! - [`SchedulerRegistry`]: Spawns the tasks and cancels/joins them at shutdown

mod registry;
mod task;

pub use registry::{DEFAULT_SHUTDOWN_TIMEOUT, SchedulerError, SchedulerRegistry};
pub use task::{SuccessCounter, TargetScheduler};
