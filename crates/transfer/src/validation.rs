use std::path::{Component, Path};

use crate::TransferError;

/// Validates a source path and returns the file name to report upstream.
///
/// Rejects:
/// - Empty paths
/// - Paths ending in `..` or a root/prefix with no file name
/// - File names that are not valid UTF-8 (the name is sent as a form field)
pub fn validate_source_path(path: &Path) -> Result<String, TransferError> {
    if path.as_os_str().is_empty() {
        return Err(TransferError::InvalidSource("empty path".into()));
    }

    match path.components().next_back() {
        Some(Component::Normal(_)) => {}
        _ => {
            return Err(TransferError::InvalidSource(format!(
                "path has no file name: {}",
                path.display()
            )));
        }
    }

    let name = path.file_name().ok_or_else(|| {
        TransferError::InvalidSource(format!("path has no file name: {}", path.display()))
    })?;

    let name = name.to_str().ok_or_else(|| {
        TransferError::InvalidSource(format!(
            "file name is not valid UTF-8: {}",
            path.display()
        ))
    })?;

    if name.trim().is_empty() {
        return Err(TransferError::InvalidSource("blank file name".into()));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_path() {
        assert!(validate_source_path(Path::new("")).is_err());
    }

    #[test]
    fn rejects_parent_dir_tail() {
        assert!(validate_source_path(Path::new("photos/..")).is_err());
    }

    #[test]
    fn rejects_root() {
        assert!(validate_source_path(Path::new("/")).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(validate_source_path(Path::new("inspections/  ")).is_err());
    }

    #[test]
    fn returns_file_name() {
        let name = validate_source_path(Path::new("/data/jobs/42/boiler.jpg")).unwrap();
        assert_eq!(name, "boiler.jpg");
    }

    #[test]
    fn accepts_relative_name() {
        let name = validate_source_path(Path::new("./site visit.mov")).unwrap();
        assert_eq!(name, "site visit.mov");
    }

    #[cfg(unix)]
    #[test]
    fn rejects_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"clip\xff.mp4");
        assert!(validate_source_path(Path::new(raw)).is_err());
    }
}
