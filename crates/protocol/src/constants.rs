//! Endpoint paths and multipart field names.

/// Path of the chunk upload endpoint, relative to the API base URL.
pub const CHUNK_UPLOAD_PATH: &str = "/uploads/chunk";

/// Multipart field carrying the opaque task identifier.
pub const FIELD_TASK_ID: &str = "taskId";

/// Multipart field carrying the file's original name.
pub const FIELD_ORIGINAL_NAME: &str = "originalName";

/// Multipart field carrying the coarse file category.
pub const FIELD_FILE_TYPE: &str = "fileType";

/// Multipart field carrying the zero-based chunk index.
pub const FIELD_CHUNK_INDEX: &str = "chunkIndex";

/// Multipart field carrying the total chunk count.
pub const FIELD_TOTAL_CHUNKS: &str = "totalChunks";

/// Multipart part carrying the chunk bytes.
pub const FIELD_CHUNK: &str = "chunk";

/// MIME type attached to the binary chunk part.
pub const CHUNK_CONTENT_TYPE: &str = "application/octet-stream";
