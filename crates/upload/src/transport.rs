//! Chunk transport trait.
//!
//! `ChunkTransport` is implemented by [`HttpTransport`](crate::HttpTransport)
//! for the real endpoint. Keeping it a trait lets the queue be driven by
//! scripted transports in tests.

use std::future::Future;
use std::pin::Pin;

use fieldup_protocol::{ChunkFields, ChunkResponse};

use crate::error::TransmitError;

/// One chunk ready to send: its form fields and its bytes.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub fields: ChunkFields,
    pub data: Vec<u8>,
}

impl ChunkRequest {
    pub fn is_final(&self) -> bool {
        self.fields.is_final()
    }
}

/// Sends a single chunk attempt.
pub trait ChunkTransport: Send + Sync {
    /// Performs one attempt. Retrying is the caller's job.
    fn send_chunk<'a>(
        &'a self,
        request: &'a ChunkRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkResponse, TransmitError>> + Send + 'a>>;
}
