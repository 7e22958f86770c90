use serde::{Deserialize, Serialize};

use crate::ProtocolError;
use crate::constants::{
    FIELD_CHUNK_INDEX, FIELD_FILE_TYPE, FIELD_ORIGINAL_NAME, FIELD_TASK_ID, FIELD_TOTAL_CHUNKS,
};
use crate::types::FileType;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Text fields sent alongside every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFields {
    pub task_id: String,
    pub original_name: String,
    pub file_type: FileType,
    pub chunk_index: u32,
    pub total_chunks: u32,
}

impl ChunkFields {
    /// Returns `true` if this is the last chunk of the file.
    pub fn is_final(&self) -> bool {
        self.total_chunks > 0 && self.chunk_index + 1 == self.total_chunks
    }

    /// Multipart text fields in the order the endpoint documents them.
    pub fn text_fields(&self) -> [(&'static str, String); 5] {
        [
            (FIELD_TASK_ID, self.task_id.clone()),
            (FIELD_ORIGINAL_NAME, self.original_name.clone()),
            (FIELD_FILE_TYPE, self.file_type.as_str().to_string()),
            (FIELD_CHUNK_INDEX, self.chunk_index.to_string()),
            (FIELD_TOTAL_CHUNKS, self.total_chunks.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// JSON body returned for each chunk.
///
/// Intermediate chunks are plain acknowledgments. The reply to the final
/// chunk carries the address of the assembled artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChunkResponse {
    /// Parses a response body. An empty body is a bare acknowledgment.
    pub fn parse(body: &[u8]) -> Result<Self, ProtocolError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// The artifact address, if present and non-blank.
    pub fn artifact_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
