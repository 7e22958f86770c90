//! Queue and transport configuration.

use std::time::Duration;

use fieldup_transfer::DEFAULT_CHUNK_SIZE;

/// Default attempts per chunk, counting the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts of the same chunk.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Default timeout for a single chunk request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixed-delay retry policy for chunk attempts.
///
/// The delay is constant between attempts; there is no backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per chunk. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Configuration for an [`UploadQueue`](crate::UploadQueue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Chunk size in bytes.
    pub chunk_size: u64,
    pub retry: RetryPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Configuration for the HTTP chunk transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// API base URL, e.g. `https://api.example.com/api`.
    pub base_url: String,
    pub request_timeout: Duration,
    /// Send only `video`/`image` as the file type, for assembly services
    /// that predate the audio and document categories.
    pub legacy_file_types: bool,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            legacy_file_types: false,
        }
    }
}
