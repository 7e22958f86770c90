//! Bounded fixed-delay retry around a [`ChunkTransport`].

use std::sync::Arc;

use fieldup_protocol::ChunkResponse;
use tracing::{debug, info, warn};

use crate::config::RetryPolicy;
use crate::error::TransmitError;
use crate::transport::{ChunkRequest, ChunkTransport};

/// Last error of a chunk that could not be delivered.
#[derive(Debug)]
pub struct ChunkFailure {
    /// Attempts made, including the first.
    pub attempts: u32,
    pub error: TransmitError,
}

/// Sends one chunk, retrying the same chunk on retryable failures.
pub struct ChunkTransmitter {
    transport: Arc<dyn ChunkTransport>,
    retry: RetryPolicy,
}

impl ChunkTransmitter {
    pub fn new(transport: Arc<dyn ChunkTransport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Delivers `request`, making at most `max_attempts` attempts spaced by
    /// the policy's fixed delay.
    ///
    /// `on_attempt` is called with the attempt number (1, 2, ...) right
    /// before each attempt is sent. `on_retry` is called with the number of
    /// the attempt about to be made (2, 3, ...) before the delay.
    pub async fn transmit<A, R>(
        &self,
        request: &ChunkRequest,
        mut on_attempt: A,
        mut on_retry: R,
    ) -> Result<ChunkResponse, ChunkFailure>
    where
        A: FnMut(u32),
        R: FnMut(u32, &TransmitError),
    {
        let max_attempts = self.retry.max_attempts.max(1);
        let task_id = request.fields.task_id.as_str();
        let chunk = request.fields.chunk_index;
        let mut attempt = 1;

        loop {
            on_attempt(attempt);
            debug!(task_id, chunk, attempt, bytes = request.data.len(), "sending chunk");

            match self.transport.send_chunk(request).await {
                Ok(response) => {
                    if attempt > 1 {
                        info!(task_id, chunk, attempt, "chunk delivered after retry");
                    }
                    return Ok(response);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        warn!(task_id, chunk, attempt, error = %error, "chunk rejected, not retrying");
                        return Err(ChunkFailure {
                            attempts: attempt,
                            error,
                        });
                    }
                    if attempt >= max_attempts {
                        warn!(task_id, chunk, attempts = attempt, error = %error, "chunk retries exhausted");
                        return Err(ChunkFailure {
                            attempts: attempt,
                            error,
                        });
                    }

                    warn!(
                        task_id,
                        chunk,
                        attempt,
                        delay_secs = self.retry.delay.as_secs_f64(),
                        error = %error,
                        "chunk attempt failed, retrying"
                    );
                    attempt += 1;
                    on_retry(attempt, &error);
                    tokio::time::sleep(self.retry.delay).await;
                }
            }
        }
    }
}
