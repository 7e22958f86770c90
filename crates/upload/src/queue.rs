//! FIFO upload queue with a single worker.
//!
//! An `UploadQueue` is created by the application's composition root and
//! shared (it is cheap to clone) with whatever needs to enqueue files. Each
//! instance owns exactly one worker, so at most one chunk of one file is in
//! flight per queue. Independent queues do not share state.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};

use fieldup_transfer::UploadFile;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::QueueConfig;
use crate::error::UploadError;
use crate::task::{UploadHandle, UploadTask};
use crate::transmitter::ChunkTransmitter;
use crate::transport::ChunkTransport;
use crate::types::{QueueEvent, TaskState};
use crate::worker::{QueueState, Worker};

/// Capacity of the observer event channel; slow observers skip events.
const EVENT_CAPACITY: usize = 256;

/// Handle to an upload queue and its worker.
#[derive(Clone)]
pub struct UploadQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    tx: mpsc::UnboundedSender<UploadTask>,
    state: Arc<QueueState>,
    events: broadcast::Sender<QueueEvent>,
    cancel: CancellationToken,
    stopped: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    chunk_size: u64,
}

impl UploadQueue {
    /// Creates a queue and spawns its worker on the current tokio runtime.
    ///
    /// When every clone of the queue is dropped the worker finishes the
    /// tasks already queued and exits.
    pub fn new(transport: Arc<dyn ChunkTransport>, config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = Arc::new(QueueState::default());
        let cancel = CancellationToken::new();
        let stopped = CancellationToken::new();

        let worker = Worker {
            rx,
            transmitter: ChunkTransmitter::new(transport, config.retry),
            state: Arc::clone(&state),
            events: events.clone(),
            cancel: cancel.clone(),
            stopped: stopped.clone(),
        };
        let handle = tokio::spawn(worker.run());

        Self {
            inner: Arc::new(QueueInner {
                tx,
                state,
                events,
                cancel,
                stopped,
                worker: Mutex::new(Some(handle)),
                chunk_size: config.chunk_size,
            }),
        }
    }

    /// Appends `file` to the tail of the queue and returns immediately.
    ///
    /// Fails only if the file cannot be split with the configured chunk
    /// size or the queue has been shut down.
    pub fn enqueue(&self, file: UploadFile) -> Result<UploadHandle, UploadError> {
        if self.inner.cancel.is_cancelled() {
            return Err(UploadError::QueueClosed);
        }

        let (task, handle) = UploadTask::new(file, self.inner.chunk_size)?;
        let task_id = task.id.clone();

        // Announced before the worker can see the task, so observers never
        // receive Queued after a later state.
        let _ = self.inner.events.send(QueueEvent::StateChanged {
            task_id: task_id.clone(),
            state: TaskState::Queued,
        });

        self.inner.state.pending.fetch_add(1, Ordering::SeqCst);
        if self.inner.tx.send(task).is_err() {
            self.inner.state.pending.fetch_sub(1, Ordering::SeqCst);
            let err = UploadError::QueueClosed;
            let _ = self.inner.events.send(QueueEvent::StateChanged {
                task_id,
                state: TaskState::Failed {
                    reason: err.to_string(),
                },
            });
            return Err(err);
        }

        debug!(task_id = %task_id, chunks = handle.total_chunks(), "upload queued");
        Ok(handle)
    }

    /// Subscribes to state and progress events of every task.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events.subscribe()
    }

    /// Tasks waiting behind the one in flight.
    pub fn pending(&self) -> usize {
        self.inner.state.pending.load(Ordering::SeqCst)
    }

    /// Returns `true` while the worker is driving a task.
    pub fn is_active(&self) -> bool {
        self.inner.state.active.load(Ordering::SeqCst)
    }

    /// Stops the worker and waits until it has exited.
    ///
    /// The task in flight runs to its terminal state; tasks still queued
    /// resolve with [`UploadError::QueueShutdown`]. Later `enqueue` calls
    /// fail with [`UploadError::QueueClosed`]. Any number of callers may
    /// shut down concurrently; each returns only once the worker is gone.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handle = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(error = %e, "upload worker terminated abnormally");
        }

        // Only one caller owns the join handle; the rest wait here.
        self.inner.stopped.cancelled().await;
    }
}
