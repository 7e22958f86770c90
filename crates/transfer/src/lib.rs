//! Chunk planning and source reads for chunked uploads.
//!
//! A file is described once by an [`UploadFile`], split into a
//! [`ChunkPlan`] of contiguous byte ranges, and read back one range at a
//! time through a [`ChunkReader`] while the upload worker walks the plan.

mod chunked;
mod progress;
mod types;
mod validation;

pub use chunked::{ChunkPlan, ChunkRange, ChunkReader};
pub use progress::{ProgressCallback, ProgressReporter, chunk_percent};
pub use types::{FileSource, UploadFile};
pub use validation::validate_source_path;

/// Default chunk size: 500 KiB.
///
/// Small enough that a retry over a weak mobile link resends little data.
pub const DEFAULT_CHUNK_SIZE: u64 = 500 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("file has {0} chunks, more than the wire format allows")]
    TooManyChunks(u64),

    #[error("range {start}..{end} is outside the {size}-byte source")]
    OutOfRange { start: u64, end: u64, size: u64 },
}
