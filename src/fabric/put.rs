use tokio::task::JoinHandle;

use crate::error::{HalfcastError, Result};

/// Completion handle for an in-flight one-sided write and its chained
/// confirmation-flag write.
///
/// The write runs on a spawned delivery task. Check `is_finished()` to poll
/// without blocking, or `wait()` to suspend until both stages have landed.
///
/// Dropping the handle detaches the write: it still completes in the
/// background (the target memory is owned by the fabric, not the caller),
/// but there is no longer any way to observe its completion.
pub struct PutHandle {
    task: JoinHandle<()>,
}

impl PutHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Check if both stages of the write have landed (non-blocking).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the write and its chained flag write to fully commit.
    pub async fn wait(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| HalfcastError::fabric(format!("delivery task panicked: {e}")))
    }
}
