//! Wire types for the chunk upload endpoint.
//!
//! Every chunk of a file travels as one multipart request whose text fields
//! are described by [`messages::ChunkFields`] and whose JSON reply is a
//! [`messages::ChunkResponse`].

pub mod constants;
pub mod messages;
pub mod types;

pub use messages::{ChunkFields, ChunkResponse};
pub use types::FileType;

/// Errors produced while decoding wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown file type: {0}")]
    UnknownFileType(String),
}
