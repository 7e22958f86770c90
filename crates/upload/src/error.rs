//! Upload error types.

use fieldup_transfer::TransferError;

/// Failure of a single chunk attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransmitError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

impl TransmitError {
    /// Whether another attempt of the same chunk could succeed.
    ///
    /// Network failures, timeouts, 5xx, 408 and 429 are retried. Other
    /// client errors (bad request, expired credential, payload too large)
    /// fail the chunk without spending the remaining attempts.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransmitError::Http(e) => !e.is_builder(),
            TransmitError::Status { status, .. } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            TransmitError::Timeout | TransmitError::Transport(_) => true,
        }
    }

    /// Returns `true` for an HTTP 401 response.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransmitError::Status { status: 401, .. })
    }
}

/// Terminal failure of an upload task.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("chunk {index} failed after {attempts} attempt(s): {source}")]
    ChunkFailed {
        index: u32,
        attempts: u32,
        #[source]
        source: TransmitError,
    },

    #[error("final chunk acknowledged without an artifact url")]
    MissingArtifactUrl,

    #[error("upload queue is closed")]
    QueueClosed,

    #[error("upload queue shut down before the task started")]
    QueueShutdown,
}
