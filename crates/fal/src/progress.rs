//! Progress side-channel for long-running generation jobs.
//!
//! While a job runs, the client pushes [`ProgressUpdate`]s into an
//! injected [`ProgressSink`]. Updates are observability only; nothing
//! downstream depends on them.

use std::sync::Arc;

/// One observation of a queued or running job.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Raw status token from the service (`IN_QUEUE`, `IN_PROGRESS`, ...).
    pub status: String,
    /// Position in the queue, when the service reports one.
    pub queue_position: Option<u32>,
    /// Log lines emitted by the job since the last poll.
    pub logs: Vec<String>,
}

/// Injected callback receiving progress updates during the blocking wait.
pub type ProgressSink = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Default sink: forward job log lines and queue movement to `tracing`.
pub fn tracing_sink() -> ProgressSink {
    Arc::new(|update: ProgressUpdate| {
        for line in &update.logs {
            tracing::info!(status = %update.status, "{line}");
        }
        if update.logs.is_empty() {
            tracing::debug!(
                status = %update.status,
                queue_position = ?update.queue_position,
                "Job progress"
            );
        }
    })
}
