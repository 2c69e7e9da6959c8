//! Media types and directory scanning
//!
//! A media type determines which file extensions count as members of a
//! directory's file list. Matching is exact and case-sensitive: `photo.JPG`
//! is not an image as far as the scanner is concerned.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions recognized for [`MediaType::Image`]
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff"];

/// Extensions recognized for [`MediaType::Audio`]
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "m4a"];

/// Kind of media being labeled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Image,
    Audio,
}

impl MediaType {
    /// All selectable media types, in menu order
    pub const ALL: [MediaType; 2] = [MediaType::Image, MediaType::Audio];

    /// Extension set associated with this media type
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaType::Image => IMAGE_EXTENSIONS,
            MediaType::Audio => AUDIO_EXTENSIONS,
        }
    }

    /// Returns true if `path` has an extension belonging to this media type.
    /// The comparison is case-sensitive.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => write!(f, "Image"),
            MediaType::Audio => write!(f, "Audio"),
        }
    }
}

/// Lists the immediate regular files in `dir` whose extension belongs to
/// `media_type`. Subdirectories are not descended into and the result keeps
/// filesystem iteration order.
///
/// Fails when the directory cannot be iterated (deleted mid-scan, permission
/// revoked). Callers decide whether to retry or surface the error.
pub fn scan_media_files(dir: &Path, media_type: MediaType) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && media_type.matches(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_scan_filters_by_extension_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "b.txt");
        touch(dir.path(), "c.JPG");

        let files = scan_media_files(dir.path(), MediaType::Image).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png"]);
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();
        touch(dir.path(), "song.mp3");

        let files = scan_media_files(dir.path(), MediaType::Audio).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("song.mp3"));
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("missing");
        assert!(scan_media_files(&gone, MediaType::Image).is_err());
    }

    #[test]
    fn test_audio_extensions_do_not_match_image_type() {
        assert!(!MediaType::Image.matches(Path::new("/tmp/x.mp3")));
        assert!(MediaType::Audio.matches(Path::new("/tmp/x.mp3")));
        assert!(!MediaType::Audio.matches(Path::new("/tmp/noext")));
    }
}
