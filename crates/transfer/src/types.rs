use std::path::{Path, PathBuf};
use std::sync::Arc;

use fieldup_protocol::FileType;

use crate::TransferError;
use crate::validation::validate_source_path;

/// Where the bytes of an upload come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on disk, read range by range while uploading.
    Disk(PathBuf),
    /// Bytes already in memory (camera buffers, generated reports).
    Memory(Arc<[u8]>),
}

/// Description of one file to upload.
///
/// The size is captured when the file is described; the chunk plan is
/// derived from it and a disk source that changes size afterwards fails to
/// open for reading.
#[derive(Debug, Clone)]
pub struct UploadFile {
    name: String,
    mime: String,
    size: u64,
    source: FileSource,
}

impl UploadFile {
    /// Describes a file on disk. The MIME type is guessed from its extension.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let name = validate_source_path(path)?;

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(TransferError::InvalidSource(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        Ok(Self {
            mime: guess_mime(&name),
            name,
            size: metadata.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// Describes an in-memory buffer. The MIME type is guessed from `name`.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let data = data.into();
        Self {
            mime: guess_mime(&name),
            size: data.len() as u64,
            name,
            source: FileSource::Memory(data),
        }
    }

    /// Overrides the guessed MIME type (e.g. the type reported by a capture API).
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    /// Original file name sent to the assembly service.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Coarse category derived from the MIME type.
    pub fn file_type(&self) -> FileType {
        FileType::from_mime(&self.mime)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_describes_disk_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pump-room.mp4");
        std::fs::write(&path, vec![7u8; 1500]).unwrap();

        let file = UploadFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "pump-room.mp4");
        assert_eq!(file.size(), 1500);
        assert_eq!(file.mime(), "video/mp4");
        assert_eq!(file.file_type(), FileType::Video);
        assert!(matches!(file.source(), FileSource::Disk(p) if p == &path));
    }

    #[tokio::test]
    async fn open_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("photos");
        std::fs::create_dir(&sub).unwrap();

        let result = UploadFile::open(&sub).await;
        assert!(matches!(result, Err(TransferError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn open_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = UploadFile::open(dir.path().join("missing.jpg")).await;
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[test]
    fn from_bytes_guesses_mime_from_name() {
        let file = UploadFile::from_bytes("gauge.jpg", vec![1u8, 2, 3]);
        assert_eq!(file.mime(), "image/jpeg");
        assert_eq!(file.file_type(), FileType::Image);
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn unknown_extension_is_document() {
        let file = UploadFile::from_bytes("readings.xyz123", Vec::<u8>::new());
        assert_eq!(file.mime(), "application/octet-stream");
        assert_eq!(file.file_type(), FileType::Document);
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn with_mime_overrides_guess() {
        let file = UploadFile::from_bytes("capture", vec![0u8; 8]).with_mime("audio/webm");
        assert_eq!(file.file_type(), FileType::Audio);
    }
}
