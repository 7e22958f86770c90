//! Callback-style front end for the queue.

use fieldup_transfer::UploadFile;
use tracing::debug;

use crate::error::UploadError;
use crate::queue::UploadQueue;
use crate::types::UploadOutcome;

impl UploadQueue {
    /// Enqueues `file` and reports through callbacks instead of a handle.
    ///
    /// `on_progress` runs for every progress value; exactly one of
    /// `on_success` or `on_error` runs afterwards. If the file cannot be
    /// enqueued, `on_error` runs before this returns and `None` is returned.
    pub fn enqueue_with_callbacks<P, S, E>(
        &self,
        file: UploadFile,
        mut on_progress: P,
        on_success: S,
        on_error: E,
    ) -> Option<String>
    where
        P: FnMut(u8) + Send + 'static,
        S: FnOnce(UploadOutcome) + Send + 'static,
        E: FnOnce(UploadError) + Send + 'static,
    {
        let mut handle = match self.enqueue(file) {
            Ok(handle) => handle,
            Err(e) => {
                on_error(e);
                return None;
            }
        };
        let task_id = handle.task_id().to_string();

        tokio::spawn(async move {
            while let Some(percent) = handle.progress().await {
                on_progress(percent);
            }
            let task_id = handle.task_id().to_string();
            match handle.wait().await {
                Ok(outcome) => on_success(outcome),
                Err(e) => on_error(e),
            }
            debug!(task_id, "upload callbacks delivered");
        });

        Some(task_id)
    }
}
