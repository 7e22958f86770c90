//! Public types for the upload queue.

/// Lifecycle of an upload task.
///
/// `Queued → Sending(i) → {Sending(i+1) | Retrying(i, n) | Failed | Succeeded}`
/// and `Retrying(i, n) → Sending(i)`. A task never returns to `Queued` and
/// is dropped once terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting behind earlier tasks.
    Queued,
    /// An attempt of chunk `chunk` is in flight.
    Sending { chunk: u32 },
    /// Waiting out the delay before attempt `attempt` (2-based) of `chunk`.
    Retrying { chunk: u32, attempt: u32 },
    /// Final chunk acknowledged with an artifact url, or nothing to send.
    Succeeded,
    /// The task was abandoned.
    Failed { reason: String },
}

impl TaskState {
    /// Returns `true` for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed { .. })
    }
}

/// Successful resolution of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The assembly service produced the artifact at `url`.
    Assembled { url: String },
    /// Zero-byte file: nothing was sent.
    Skipped,
}

impl UploadOutcome {
    /// Artifact address, if one was produced.
    pub fn url(&self) -> Option<&str> {
        match self {
            UploadOutcome::Assembled { url } => Some(url),
            UploadOutcome::Skipped => None,
        }
    }
}

/// Events broadcast by the queue for observers (status bars, logs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// A task changed state.
    StateChanged { task_id: String, state: TaskState },
    /// A task's progress advanced.
    Progress { task_id: String, percent: u8 },
}

impl QueueEvent {
    pub fn task_id(&self) -> &str {
        match self {
            QueueEvent::StateChanged { task_id, .. } | QueueEvent::Progress { task_id, .. } => {
                task_id
            }
        }
    }
}
