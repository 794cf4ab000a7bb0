//! Scheduler registry for managing per-target task lifecycle.

use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::task::TargetScheduler;

/// Default timeout for graceful shutdown (5 seconds).
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced while stopping scheduler tasks.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A scheduler task panicked.
    #[error("scheduler task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Owns one scheduler task per target.
///
/// All tasks share one cancellation token; shutdown cancels it and joins
/// every task, aborting whatever is still running after the timeout.
pub struct SchedulerRegistry {
    tasks: JoinSet<()>,
    cancel: CancellationToken,
    targets: Vec<String>,
}

impl SchedulerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel: CancellationToken::new(),
            targets: Vec::new(),
        }
    }
}

impl Default for SchedulerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchedulerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerRegistry")
            .field("targets", &self.targets)
            .field("running", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl SchedulerRegistry {
    /// Spawn a scheduler task. Must be called within a Tokio runtime.
    pub fn spawn(&mut self, scheduler: TargetScheduler) {
        let name = scheduler.target().name().to_string();
        self.tasks.spawn(scheduler.run(self.cancel.child_token()));
        tracing::info!(name = %name, "Target scheduler registered");
        self.targets.push(name);
    }

    /// Names of registered targets, in spawn order.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Number of registered schedulers.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no scheduler was registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Gracefully shutdown all schedulers with default timeout.
    pub async fn shutdown(self) -> Result<(), SchedulerError> {
        self.shutdown_with_timeout(DEFAULT_SHUTDOWN_TIMEOUT).await
    }

    /// Shutdown with custom timeout.
    pub async fn shutdown_with_timeout(mut self, timeout: Duration) -> Result<(), SchedulerError> {
        let task_count = self.tasks.len();
        self.cancel.cancel();

        let tasks = &mut self.tasks;
        let joined = tokio::time::timeout(timeout, async {
            let mut first_error = None;
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Target scheduler task failed");
                    first_error.get_or_insert(e);
                }
            }
            first_error
        })
        .await;

        match joined {
            Ok(None) => {
                tracing::info!(task_count, "Target schedulers shutdown complete");
                Ok(())
            }
            Ok(Some(e)) => Err(SchedulerError::Join(e)),
            Err(_) => {
                tracing::warn!(
                    task_count,
                    remaining = self.tasks.len(),
                    "Target scheduler shutdown timed out, aborting"
                );
                self.tasks.shutdown().await;
                Ok(())
            }
        }
    }
}
