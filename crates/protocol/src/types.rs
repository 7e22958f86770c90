use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Coarse category of an uploaded file.
///
/// The assembly service uses it to pick a storage bucket and
/// post-processing pipeline. Deployed services that only know `video` and
/// `image` must be sent [`legacy`](Self::legacy) categories; `audio` and
/// `document` need a service that accepts all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Audio,
    Document,
}

impl FileType {
    /// Classifies a MIME type string (`video/mp4`, `image/jpeg`, ...).
    ///
    /// Anything that is not image, video or audio is a document.
    pub fn from_mime(mime: &str) -> Self {
        let top = mime
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match top.as_str() {
            "image" => FileType::Image,
            "video" => FileType::Video,
            "audio" => FileType::Audio,
            _ => FileType::Document,
        }
    }

    /// Two-category form: `video` stays `video`, everything else is `image`.
    pub fn legacy(self) -> Self {
        match self {
            FileType::Video => FileType::Video,
            FileType::Image | FileType::Audio | FileType::Document => FileType::Image,
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Document => "document",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "video" => Ok(FileType::Video),
            "audio" => Ok(FileType::Audio),
            "document" => Ok(FileType::Document),
            other => Err(ProtocolError::UnknownFileType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_top_level_type() {
        assert_eq!(FileType::from_mime("video/mp4"), FileType::Video);
        assert_eq!(FileType::from_mime("image/jpeg"), FileType::Image);
        assert_eq!(FileType::from_mime("audio/ogg"), FileType::Audio);
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Document);
    }

    #[test]
    fn legacy_collapses_to_video_or_image() {
        assert_eq!(FileType::Video.legacy(), FileType::Video);
        assert_eq!(FileType::Image.legacy(), FileType::Image);
        assert_eq!(FileType::Audio.legacy(), FileType::Image);
        assert_eq!(FileType::Document.legacy(), FileType::Image);
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(FileType::from_mime("VIDEO/QuickTime"), FileType::Video);
    }

    #[test]
    fn empty_mime_is_document() {
        assert_eq!(FileType::from_mime(""), FileType::Document);
    }

    #[test]
    fn wire_names_parse_back() {
        for ty in [
            FileType::Image,
            FileType::Video,
            FileType::Audio,
            FileType::Document,
        ] {
            assert_eq!(ty.as_str().parse::<FileType>().unwrap(), ty);
        }
        assert!("spreadsheet".parse::<FileType>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&FileType::Video).unwrap();
        assert_eq!(json, r#""video""#);
    }
}
