//! Scripted in-memory transport for queue and transmitter tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use fieldup_protocol::ChunkResponse;
use tokio::time::Instant;

use crate::error::TransmitError;
use crate::transport::{ChunkRequest, ChunkTransport};

/// One recorded attempt.
#[derive(Debug, Clone)]
pub(crate) struct SentChunk {
    pub(crate) name: String,
    pub(crate) task_id: String,
    pub(crate) index: u32,
    pub(crate) total: u32,
    pub(crate) data: Vec<u8>,
    pub(crate) at: Instant,
}

impl SentChunk {
    pub(crate) fn label(&self) -> String {
        format!("{}#{}", self.name, self.index)
    }
}

/// Acknowledges every chunk and answers final chunks with
/// `https://assets.example.com/<name>` unless scripted otherwise.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    sent: Mutex<Vec<SentChunk>>,
    failures: Mutex<HashMap<(String, u32), (u32, u16)>>,
    early_urls: Mutex<HashSet<(String, u32)>>,
    no_final_url: Mutex<HashSet<String>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every attempt takes `latency` of (tokio) time before it is answered.
    pub(crate) fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// The next `times` attempts of chunk `index` of `name` fail with `status`.
    pub(crate) fn fail_times(&self, name: &str, index: u32, times: u32, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .insert((name.to_string(), index), (times, status));
    }

    /// Chunk `index` of `name` is acknowledged with a url although it is not final.
    pub(crate) fn url_on_intermediate(&self, name: &str, index: u32) {
        self.early_urls
            .lock()
            .unwrap()
            .insert((name.to_string(), index));
    }

    /// The final chunk of `name` is acknowledged without a url.
    pub(crate) fn omit_final_url(&self, name: &str) {
        self.no_final_url.lock().unwrap().insert(name.to_string());
    }

    pub(crate) fn sent(&self) -> Vec<SentChunk> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        self.sent().iter().map(SentChunk::label).collect()
    }

    fn respond(&self, request: &ChunkRequest) -> Result<ChunkResponse, TransmitError> {
        let name = request.fields.original_name.clone();
        let index = request.fields.chunk_index;

        self.sent.lock().unwrap().push(SentChunk {
            name: name.clone(),
            task_id: request.fields.task_id.clone(),
            index,
            total: request.fields.total_chunks,
            data: request.data.clone(),
            at: Instant::now(),
        });

        if let Some((remaining, status)) =
            self.failures.lock().unwrap().get_mut(&(name.clone(), index))
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(TransmitError::Status {
                status: *status,
                body: "scripted failure".into(),
            });
        }

        let url = format!("https://assets.example.com/{name}");
        let carries_url = if request.is_final() {
            !self.no_final_url.lock().unwrap().contains(&name)
        } else {
            self.early_urls.lock().unwrap().contains(&(name.clone(), index))
        };

        Ok(ChunkResponse {
            url: carries_url.then_some(url),
            message: None,
        })
    }
}

impl ChunkTransport for ScriptedTransport {
    fn send_chunk<'a>(
        &'a self,
        request: &'a ChunkRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkResponse, TransmitError>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.respond(request)
        })
    }
}
