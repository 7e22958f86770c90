//! Multipart HTTP chunk transport.
//!
//! Async HTTP client using `reqwest`; each attempt reads the bearer
//! credential from its [`CredentialSource`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use fieldup_protocol::ChunkResponse;
use fieldup_protocol::constants::{CHUNK_CONTENT_TYPE, CHUNK_UPLOAD_PATH, FIELD_CHUNK};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::HttpTransportConfig;
use crate::credential::CredentialSource;
use crate::error::TransmitError;
use crate::transport::{ChunkRequest, ChunkTransport};

/// Longest error body kept in [`TransmitError::Status`].
const MAX_ERROR_BODY: usize = 1024;

/// Posts chunks to `{base_url}/uploads/chunk`.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    credentials: Arc<dyn CredentialSource>,
    legacy_file_types: bool,
}

impl HttpTransport {
    /// Creates a transport for the given API base URL.
    pub fn new(
        config: &HttpTransportConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, TransmitError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let endpoint = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            CHUNK_UPLOAD_PATH
        );

        Ok(Self {
            http,
            endpoint,
            credentials,
            legacy_file_types: config.legacy_file_types,
        })
    }

    /// Full URL chunks are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, request: &ChunkRequest) -> Result<Form, TransmitError> {
        let mut fields = request.fields.clone();
        if self.legacy_file_types {
            fields.file_type = fields.file_type.legacy();
        }

        let mut form = Form::new();
        for (name, value) in fields.text_fields() {
            form = form.text(name, value);
        }
        let part = Part::bytes(request.data.clone())
            .file_name(request.fields.original_name.clone())
            .mime_str(CHUNK_CONTENT_TYPE)?;
        Ok(form.part(FIELD_CHUNK, part))
    }

    async fn post_chunk(&self, request: &ChunkRequest) -> Result<ChunkResponse, TransmitError> {
        let form = self.build_form(request)?;
        let mut builder = self.http.post(&self.endpoint).multipart(form);

        let token = self.credentials.current();
        match &token {
            Some(token) => builder = builder.bearer_auth(token),
            None => warn!(
                task_id = %request.fields.task_id,
                chunk = request.fields.chunk_index,
                "no credential available, sending chunk unauthenticated"
            ),
        }

        let resp = builder.send().await.map_err(classify)?;
        let status = resp.status();

        if !status.is_success() {
            let body = error_excerpt(resp).await;
            if status == StatusCode::UNAUTHORIZED
                && let Some(token) = &token
            {
                self.credentials.invalidate(token);
            }
            return Err(TransmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await.map_err(classify)?;
        match ChunkResponse::parse(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                // A 2xx the server did not bother to encode as JSON is still an ack.
                debug!(
                    task_id = %request.fields.task_id,
                    chunk = request.fields.chunk_index,
                    error = %e,
                    "non-JSON acknowledgment"
                );
                Ok(ChunkResponse::default())
            }
        }
    }
}

impl ChunkTransport for HttpTransport {
    fn send_chunk<'a>(
        &'a self,
        request: &'a ChunkRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ChunkResponse, TransmitError>> + Send + 'a>> {
        Box::pin(self.post_chunk(request))
    }
}

/// Reads at most [`MAX_ERROR_BODY`] bytes of an error response.
async fn error_excerpt(mut resp: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY {
        match resp.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    body.truncate(MAX_ERROR_BODY);
    String::from_utf8_lossy(&body).into_owned()
}

fn classify(e: reqwest::Error) -> TransmitError {
    if e.is_timeout() {
        TransmitError::Timeout
    } else {
        TransmitError::Http(e)
    }
}
