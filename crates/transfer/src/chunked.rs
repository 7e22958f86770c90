use std::io::SeekFrom;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::TransferError;
use crate::types::{FileSource, UploadFile};

// ---------------------------------------------------------------------------
// ChunkRange / ChunkPlan
// ---------------------------------------------------------------------------

/// A half-open byte range `[start, end)` of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Zero-based position of the chunk in its plan.
    pub index: u32,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    /// Length in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Fixed-size split of a file into contiguous ranges.
///
/// Ranges are `[0,C), [C,2C), ...`; only the last one may be shorter than
/// the chunk size. A zero-byte file has no ranges at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
    total_chunks: u32,
}

impl ChunkPlan {
    /// Splits `file_size` bytes into chunks of `chunk_size` bytes.
    pub fn new(file_size: u64, chunk_size: u64) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::ZeroChunkSize);
        }
        let count = file_size.div_ceil(chunk_size);
        let total_chunks = u32::try_from(count).map_err(|_| TransferError::TooManyChunks(count))?;
        Ok(Self {
            file_size,
            chunk_size,
            total_chunks,
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    /// Returns `true` for a zero-byte file.
    pub fn is_empty(&self) -> bool {
        self.total_chunks == 0
    }

    /// Returns `true` if `index` is the last chunk of the plan.
    pub fn is_last(&self, index: u32) -> bool {
        self.total_chunks > 0 && index + 1 == self.total_chunks
    }

    /// Returns the range at `index`, or `None` past the end.
    pub fn range(&self, index: u32) -> Option<ChunkRange> {
        if index >= self.total_chunks {
            return None;
        }
        let start = u64::from(index) * self.chunk_size;
        let end = std::cmp::min(start + self.chunk_size, self.file_size);
        Some(ChunkRange { index, start, end })
    }

    /// Iterates ranges in index order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (0..self.total_chunks).filter_map(|index| self.range(index))
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads chunk ranges from an [`UploadFile`].
///
/// Disk sources are opened once per task and read with a seek per range,
/// so only one chunk is held in memory at a time.
pub struct ChunkReader {
    inner: ReaderInner,
    size: u64,
}

enum ReaderInner {
    Disk(tokio::fs::File),
    Memory(Arc<[u8]>),
}

impl ChunkReader {
    /// Opens the source of `file`.
    ///
    /// Fails if a disk source no longer has the size recorded when the file
    /// was described, since the chunk plan would no longer cover it.
    pub async fn open(file: &UploadFile) -> Result<Self, TransferError> {
        let inner = match file.source() {
            FileSource::Disk(path) => {
                let handle = tokio::fs::File::open(path).await?;
                let actual = handle.metadata().await?.len();
                if actual != file.size() {
                    return Err(TransferError::InvalidSource(format!(
                        "{} changed size from {} to {actual} bytes",
                        path.display(),
                        file.size()
                    )));
                }
                ReaderInner::Disk(handle)
            }
            FileSource::Memory(data) => ReaderInner::Memory(Arc::clone(data)),
        };
        Ok(Self {
            inner,
            size: file.size(),
        })
    }

    /// Reads exactly the bytes of `range`.
    pub async fn read(&mut self, range: ChunkRange) -> Result<Vec<u8>, TransferError> {
        if range.end < range.start || range.end > self.size {
            return Err(TransferError::OutOfRange {
                start: range.start,
                end: range.end,
                size: self.size,
            });
        }

        match &mut self.inner {
            ReaderInner::Disk(file) => {
                file.seek(SeekFrom::Start(range.start)).await?;
                let mut buf = vec![0u8; range.len() as usize];
                file.read_exact(&mut buf).await?;
                debug!(chunk = range.index, bytes = buf.len(), "read chunk from disk");
                Ok(buf)
            }
            ReaderInner::Memory(data) => {
                Ok(data[range.start as usize..range.end as usize].to_vec())
            }
        }
    }

    /// Size of the source in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}
