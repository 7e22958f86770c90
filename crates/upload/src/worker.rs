//! The single upload worker.
//!
//! Owns the receiving end of the queue. Tasks are taken from the head one
//! at a time and driven to a terminal state before the next is touched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use fieldup_protocol::ChunkFields;
use fieldup_transfer::{ChunkPlan, ChunkReader, ProgressReporter, UploadFile};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::task::{UploadResult, UploadTask};
use crate::transmitter::ChunkTransmitter;
use crate::transport::ChunkRequest;
use crate::types::{QueueEvent, TaskState, UploadOutcome};

/// Counters shared between the queue handle and its worker.
#[derive(Debug, Default)]
pub(crate) struct QueueState {
    pub(crate) pending: AtomicUsize,
    pub(crate) active: AtomicBool,
}

pub(crate) struct Worker {
    pub(crate) rx: mpsc::UnboundedReceiver<UploadTask>,
    pub(crate) transmitter: ChunkTransmitter,
    pub(crate) state: Arc<QueueState>,
    pub(crate) events: broadcast::Sender<QueueEvent>,
    pub(crate) cancel: CancellationToken,
    /// Cancelled when `run` returns or unwinds.
    pub(crate) stopped: CancellationToken,
}

impl Worker {
    /// Drains the queue until shutdown or until every queue handle is gone.
    pub(crate) async fn run(mut self) {
        let _stopped = self.stopped.clone().drop_guard();
        debug!("upload worker started");

        loop {
            let task = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(task) => task,
                    None => {
                        debug!("all queue handles dropped, upload worker exiting");
                        return;
                    }
                },
            };

            self.state.pending.fetch_sub(1, Ordering::SeqCst);
            self.state.active.store(true, Ordering::SeqCst);
            self.run_task(task).await;
            self.state.active.store(false, Ordering::SeqCst);
        }

        // Shutdown: nothing new gets in, everything still queued is resolved.
        self.rx.close();
        while let Some(task) = self.rx.recv().await {
            self.state.pending.fetch_sub(1, Ordering::SeqCst);
            let err = UploadError::QueueShutdown;
            self.set_state(&task.id, TaskState::Failed {
                reason: err.to_string(),
            });
            task.resolve(Err(err));
        }

        info!("upload worker stopped");
    }

    async fn run_task(&self, task: UploadTask) {
        info!(
            task_id = %task.id,
            file = %task.file.name(),
            bytes = task.file.size(),
            chunks = task.plan.total_chunks(),
            "starting upload"
        );

        let result = self
            .transfer(&task.id, &task.file, &task.plan, task.progress_tx.clone())
            .await;

        match &result {
            Ok(outcome) => {
                info!(task_id = %task.id, url = ?outcome.url(), "upload succeeded");
                self.set_state(&task.id, TaskState::Succeeded);
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "upload failed");
                self.set_state(&task.id, TaskState::Failed {
                    reason: e.to_string(),
                });
            }
        }

        task.resolve(result);
    }

    /// Sends every chunk of `plan` in order and decides the outcome.
    async fn transfer(
        &self,
        task_id: &str,
        file: &UploadFile,
        plan: &ChunkPlan,
        progress_tx: mpsc::UnboundedSender<u8>,
    ) -> UploadResult {
        if plan.is_empty() {
            info!(task_id, file = %file.name(), "zero-byte file, nothing to send");
            return Ok(UploadOutcome::Skipped);
        }

        let mut reader = ChunkReader::open(file).await?;
        let mut reporter = ProgressReporter::new(plan.total_chunks(), {
            let events = self.events.clone();
            let task_id = task_id.to_string();
            Box::new(move |percent| {
                let _ = progress_tx.send(percent);
                let _ = events.send(QueueEvent::Progress {
                    task_id: task_id.clone(),
                    percent,
                });
            })
        });

        for range in plan.iter() {
            let chunk = range.index;
            let request = ChunkRequest {
                fields: ChunkFields {
                    task_id: task_id.to_string(),
                    original_name: file.name().to_string(),
                    file_type: file.file_type(),
                    chunk_index: chunk,
                    total_chunks: plan.total_chunks(),
                },
                data: reader.read(range).await?,
            };

            let delivered = self
                .transmitter
                .transmit(
                    &request,
                    |_| self.set_state(task_id, TaskState::Sending { chunk }),
                    |attempt, _| self.set_state(task_id, TaskState::Retrying { chunk, attempt }),
                )
                .await;
            reporter.chunk_concluded(chunk);

            let response = delivered.map_err(|failure| UploadError::ChunkFailed {
                index: chunk,
                attempts: failure.attempts,
                source: failure.error,
            })?;

            if plan.is_last(chunk) {
                return match response.artifact_url() {
                    Some(url) => Ok(UploadOutcome::Assembled {
                        url: url.to_string(),
                    }),
                    None => Err(UploadError::MissingArtifactUrl),
                };
            }

            if let Some(url) = response.artifact_url() {
                warn!(task_id, chunk, url, "ignoring artifact url on intermediate chunk");
            }
            debug!(
                task_id,
                chunk,
                total = plan.total_chunks(),
                "chunk accepted, waiting for final merge"
            );
        }

        // A non-empty plan always ends on its last chunk above.
        Err(UploadError::MissingArtifactUrl)
    }

    fn set_state(&self, task_id: &str, state: TaskState) {
        // No subscribers is fine.
        let _ = self.events.send(QueueEvent::StateChanged {
            task_id: task_id.to_string(),
            state,
        });
    }
}
