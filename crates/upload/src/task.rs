//! Upload task record and the caller-side handle.

use fieldup_transfer::{ChunkPlan, UploadFile};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::error::UploadError;
use crate::types::UploadOutcome;

/// Terminal result of one upload.
pub type UploadResult = Result<UploadOutcome, UploadError>;

/// Worker-side record of one enqueued file.
///
/// Dropped as soon as its result is sent.
pub(crate) struct UploadTask {
    pub(crate) id: String,
    pub(crate) file: UploadFile,
    pub(crate) plan: ChunkPlan,
    pub(crate) progress_tx: mpsc::UnboundedSender<u8>,
    pub(crate) result_tx: oneshot::Sender<UploadResult>,
}

impl UploadTask {
    /// Creates a task with a fresh id and its matching handle.
    pub(crate) fn new(
        file: UploadFile,
        chunk_size: u64,
    ) -> Result<(Self, UploadHandle), UploadError> {
        let plan = ChunkPlan::new(file.size(), chunk_size)?;
        let id = Uuid::new_v4().to_string();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();

        let handle = UploadHandle {
            task_id: id.clone(),
            total_chunks: plan.total_chunks(),
            progress: progress_rx,
            result: result_rx,
        };
        let task = Self {
            id,
            file,
            plan,
            progress_tx,
            result_tx,
        };
        Ok((task, handle))
    }

    /// Delivers the terminal result, consuming the task.
    pub(crate) fn resolve(self, result: UploadResult) {
        // The caller may have dropped its handle; the upload still happened.
        let _ = self.result_tx.send(result);
    }
}

/// Caller-side view of an enqueued upload.
///
/// Progress values arrive on [`progress`](Self::progress) until the task
/// reaches a terminal state; [`wait`](Self::wait) yields the single terminal
/// result.
pub struct UploadHandle {
    pub(crate) task_id: String,
    pub(crate) total_chunks: u32,
    pub(crate) progress: mpsc::UnboundedReceiver<u8>,
    pub(crate) result: oneshot::Receiver<UploadResult>,
}

impl UploadHandle {
    /// Identifier sent with every chunk of this upload.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Number of chunks the file was split into.
    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    /// Next progress percentage, or `None` once the task has finished.
    pub async fn progress(&mut self) -> Option<u8> {
        self.progress.recv().await
    }

    /// Waits for the terminal result.
    pub async fn wait(self) -> UploadResult {
        self.result.await.unwrap_or(Err(UploadError::QueueClosed))
    }
}

impl std::fmt::Debug for UploadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadHandle")
            .field("task_id", &self.task_id)
            .field("total_chunks", &self.total_chunks)
            .finish()
    }
}
