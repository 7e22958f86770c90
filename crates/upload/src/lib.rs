//! Resumable chunked-upload queue.
//!
//! Files are enqueued on an [`UploadQueue`] owned by the application. A
//! single long-lived worker drains the queue in FIFO order, sending each
//! file's chunks strictly in sequence through a [`ChunkTransport`] with a
//! bounded, fixed-delay retry. Callers observe a task through its
//! [`UploadHandle`]: a progress stream plus one terminal result.
//!
//! # Pipeline
//!
//! 1. **Enqueue**: assign a task id, split the file into a chunk plan
//! 2. **Send**: read one range, post it, retry up to the attempt cap
//! 3. **Report**: one progress value per concluded chunk
//! 4. **Resolve**: the final chunk's reply carries the artifact url

mod callbacks;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod queue;
mod task;
pub mod transmitter;
pub mod transport;
pub mod types;
mod worker;

#[cfg(test)]
mod testing;

// Re-export primary types for convenience.
pub use config::{HttpTransportConfig, QueueConfig, RetryPolicy};
pub use credential::{
    CredentialSource, EnvCredential, FileCredential, SharedCredential, StaticCredential,
};
pub use error::{TransmitError, UploadError};
pub use http::HttpTransport;
pub use queue::UploadQueue;
pub use task::{UploadHandle, UploadResult};
pub use transmitter::{ChunkFailure, ChunkTransmitter};
pub use transport::{ChunkRequest, ChunkTransport};
pub use types::{QueueEvent, TaskState, UploadOutcome};

pub use fieldup_transfer::{DEFAULT_CHUNK_SIZE, UploadFile};
