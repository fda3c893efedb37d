use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use crate::error::{CompressionError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// One supported image found under a scan root.
///
/// `relative_path` is the key used to mirror the tree into an output root, so
/// it never contains `..` or a root component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub file_name: String,
    /// Lowercase, without the leading dot
    pub extension: String,
    pub size_bytes: u64,
    pub modified: SystemTime,
    pub accessed: SystemTime,
    /// Not every filesystem records a birth time
    pub created: Option<SystemTime>,
}

impl FileRecord {
    /// Builds a record for `path`, which must live under `root`.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;

        let relative_path = path
            .strip_prefix(root)
            .map_err(|_| CompressionError::PathOutsideRoot(path.to_path_buf()))?
            .to_path_buf();
        let contained = relative_path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || relative_path.as_os_str().is_empty() {
            return Err(CompressionError::PathOutsideRoot(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            absolute_path: path.to_path_buf(),
            relative_path,
            file_name,
            extension,
            size_bytes: metadata.len(),
            modified: metadata.modified()?,
            accessed: metadata.accessed()?,
            created: metadata.created().ok(),
        })
    }
}

/// Walks `root` depth-first and returns every supported image below it.
///
/// Entries are visited in file-name order, so repeated scans of an unchanged
/// tree return the same sequence. Any unreadable directory aborts the scan.
pub fn scan(root: &Path) -> Result<Vec<FileRecord>> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CompressionError::FileNotFound(root.to_path_buf()),
        _ => CompressionError::Io(e),
    })?;
    if !metadata.is_dir() {
        return Err(CompressionError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            files.push(FileRecord::from_path(root, entry.path())?);
        }
    }

    tracing::debug!("Scanned {:?}: {} image files", root, files.len());
    Ok(files)
}

/// Sum of `size_bytes` over `files`.
pub fn total_size(files: &[FileRecord]) -> u64 {
    files.iter().map(|file| file.size_bytes).sum()
}

/// Check if a file path carries a supported image extension (case-insensitive)
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(path: &Path, bytes: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap().write_all(bytes).unwrap();
    }

    #[test]
    fn test_is_image_file() {
        for name in [
            "test.jpg", "test.jpeg", "test.png", "test.webp", "test.tiff", "test.tif",
            "test.gif", "test.avif",
        ] {
            assert!(is_image_file(Path::new(name)), "{name}");
        }

        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("test.bmp")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_is_image_file_case_insensitive() {
        assert!(is_image_file(Path::new("photo.JPG")));
        assert!(is_image_file(Path::new("test.PnG")));
        assert!(is_image_file(Path::new("scan.TIF")));
    }

    #[test]
    fn test_scan_filters_and_recurses() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(&root.join("photo.JPG"), b"aaaa");
        write_file(&root.join("notes.txt"), b"not an image");
        write_file(&root.join("album/2023/beach.png"), b"bbbbbb");
        write_file(&root.join("album/cover.webp"), b"cc");

        let files = scan(root).unwrap();
        let relative: Vec<_> = files.iter().map(|f| f.relative_path.clone()).collect();

        assert_eq!(files.len(), 3);
        assert!(relative.contains(&PathBuf::from("photo.JPG")));
        assert!(relative.contains(&Path::new("album").join("2023").join("beach.png")));
        assert!(relative.contains(&Path::new("album").join("cover.webp")));
        assert!(!relative.iter().any(|p| p.ends_with("notes.txt")));
    }

    #[test]
    fn test_scan_record_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("Photo.JPEG");
        write_file(&path, b"0123456789");

        let files = scan(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 1);

        let record = &files[0];
        assert_eq!(record.absolute_path, path);
        assert_eq!(record.relative_path, Path::new("sub").join("Photo.JPEG"));
        assert_eq!(record.file_name, "Photo.JPEG");
        assert_eq!(record.extension, "jpeg");
        assert_eq!(record.size_bytes, 10);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.jpg", "a.png", "b/d.gif", "b/a.tif"] {
            write_file(&temp_dir.path().join(name), b"x");
        }

        let first = scan(temp_dir.path()).unwrap();
        let second = scan(temp_dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_size_matches_sum() {
        let temp_dir = TempDir::new().unwrap();
        write_file(&temp_dir.path().join("a.jpg"), &[0u8; 100]);
        write_file(&temp_dir.path().join("b/b.png"), &[0u8; 250]);
        write_file(&temp_dir.path().join("c.txt"), &[0u8; 999]);

        let files = scan(temp_dir.path()).unwrap();
        let sum: u64 = files.iter().map(|f| f.size_bytes).sum();
        assert_eq!(total_size(&files), sum);
        assert_eq!(total_size(&files), 350);
        assert_eq!(total_size(&[]), 0);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let result = scan(Path::new("/nonexistent/img-squeeze/root"));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_scan_file_root_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("single.jpg");
        write_file(&file, b"x");

        assert!(matches!(scan(&file), Err(CompressionError::NotADirectory(_))));
    }

    #[test]
    fn test_from_path_outside_root() {
        let temp_dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let file = other.path().join("x.jpg");
        write_file(&file, b"x");

        let result = FileRecord::from_path(temp_dir.path(), &file);
        assert!(matches!(result, Err(CompressionError::PathOutsideRoot(_))));
    }
}
