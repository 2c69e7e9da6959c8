//! Directory configuration and validation
//!
//! A configuration names the three working directories, the media type and
//! the CSV output path. It is validated before use: downstream file moves are
//! irreversible and must never be attempted against inaccessible or aliased
//! locations. Once accepted, a configuration is immutable until it is
//! replaced or cleared.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::media::MediaType;

/// User-chosen directories and output path for a labeling session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub source_dir: PathBuf,
    pub class_a_dir: PathBuf,
    pub class_b_dir: PathBuf,
    pub media_type: MediaType,
    pub output_file: PathBuf,
}

/// Why a configuration was rejected. The Display text is shown inline in the
/// configure dialog, so every variant names the directory and the condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("home directory could not be resolved")]
    NoHome,
    #[error("{0} directory is not set")]
    Empty(&'static str),
    #[error("{label} directory must lie under the home directory: {path}")]
    OutsideHome { label: &'static str, path: PathBuf },
    #[error("{label} directory does not exist: {path}")]
    Missing { label: &'static str, path: PathBuf },
    #[error("{label} path is not a directory: {path}")]
    NotADirectory { label: &'static str, path: PathBuf },
    #[error("{label} directory is not readable, writable and executable: {path}")]
    NotAccessible { label: &'static str, path: PathBuf },
    #[error("{first} and {second} directories resolve to the same location")]
    NotDistinct {
        first: &'static str,
        second: &'static str,
    },
    #[error("output file path has no parent directory: {path}")]
    NoOutputParent { path: PathBuf },
}

impl DirectoryConfig {
    /// Validates against the current user's home directory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let home = dirs::home_dir().ok_or(ValidationError::NoHome)?;
        self.validate_with_home(&home)
    }

    /// Validates every directory of the configuration, short-circuiting on
    /// the first failure:
    ///
    /// 1. source, class A and class B (in that order): non-empty, under the
    ///    home prefix, existing, a directory, owner read+write+execute;
    /// 2. the three directories pairwise distinct after symlink resolution;
    /// 3. the parent of the output file path passes the same directory checks.
    pub fn validate_with_home(&self, home: &Path) -> Result<(), ValidationError> {
        let home = fs::canonicalize(home).unwrap_or_else(|_| home.to_path_buf());

        let labeled = [
            ("Source", &self.source_dir),
            ("Class A", &self.class_a_dir),
            ("Class B", &self.class_b_dir),
        ];
        for (label, dir) in labeled {
            check_directory(label, dir, &home)?;
        }

        // Distinctness goes through canonicalization so two different
        // spellings of the same inode (symlink aliases) are caught.
        let resolved: Vec<PathBuf> = labeled
            .iter()
            .map(|(_, dir)| fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()))
            .collect();
        for i in 0..labeled.len() {
            for j in (i + 1)..labeled.len() {
                if resolved[i] == resolved[j] {
                    return Err(ValidationError::NotDistinct {
                        first: labeled[i].0,
                        second: labeled[j].0,
                    });
                }
            }
        }

        let parent = self
            .output_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ValidationError::NoOutputParent {
                path: self.output_file.clone(),
            })?;
        check_directory("Output", parent, &home)
    }
}

fn check_directory(label: &'static str, dir: &Path, home: &Path) -> Result<(), ValidationError> {
    if dir.as_os_str().is_empty() {
        return Err(ValidationError::Empty(label));
    }

    let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    if !canonical.starts_with(home) {
        return Err(ValidationError::OutsideHome {
            label,
            path: dir.to_path_buf(),
        });
    }

    if !dir.exists() {
        return Err(ValidationError::Missing {
            label,
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(ValidationError::NotADirectory {
            label,
            path: dir.to_path_buf(),
        });
    }

    let accessible = fs::metadata(dir)
        .map(|meta| meta.permissions().mode() & 0o700 == 0o700)
        .unwrap_or(false);
    if !accessible {
        return Err(ValidationError::NotAccessible {
            label,
            path: dir.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Home layout with source/a/b directories and an output path inside it.
    fn fixture(home: &Path) -> DirectoryConfig {
        for name in ["source", "a", "b", "out"] {
            fs::create_dir_all(home.join(name)).unwrap();
        }
        DirectoryConfig {
            source_dir: home.join("source"),
            class_a_dir: home.join("a"),
            class_b_dir: home.join("b"),
            media_type: MediaType::Image,
            output_file: home.join("out/biases.csv"),
        }
    }

    #[test]
    fn test_valid_configuration_passes() {
        let home = tempfile::tempdir().unwrap();
        let config = fixture(home.path());
        assert_eq!(config.validate_with_home(home.path()), Ok(()));
    }

    #[test]
    fn test_empty_directory_is_named_in_the_error() {
        let home = tempfile::tempdir().unwrap();
        let mut config = fixture(home.path());
        config.class_a_dir = PathBuf::new();
        assert_eq!(
            config.validate_with_home(home.path()),
            Err(ValidationError::Empty("Class A"))
        );
    }

    #[test]
    fn test_directory_outside_home_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let mut config = fixture(home.path());
        config.source_dir = elsewhere.path().to_path_buf();

        let err = config.validate_with_home(home.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutsideHome { label: "Source", .. }
        ));
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let mut config = fixture(home.path());
        config.class_b_dir = home.path().join("not-there");

        let err = config.validate_with_home(home.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Missing { label: "Class B", .. }
        ));
    }

    #[test]
    fn test_regular_file_is_not_a_directory() {
        let home = tempfile::tempdir().unwrap();
        let mut config = fixture(home.path());
        let file = home.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        config.class_a_dir = file;

        let err = config.validate_with_home(home.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotADirectory { label: "Class A", .. }
        ));
    }

    #[test]
    fn test_inaccessible_directory_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let config = fixture(home.path());
        let perms = fs::Permissions::from_mode(0o500);
        fs::set_permissions(&config.class_b_dir, perms).unwrap();

        let err = config.validate_with_home(home.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotAccessible { label: "Class B", .. }
        ));

        // restore so the tempdir can be cleaned up
        fs::set_permissions(&config.class_b_dir, fs::Permissions::from_mode(0o700)).unwrap();
    }

    #[test]
    fn test_symlink_alias_of_class_directory_is_rejected() {
        let home = tempfile::tempdir().unwrap();
        let mut config = fixture(home.path());
        let alias = home.path().join("a-alias");
        std::os::unix::fs::symlink(&config.class_a_dir, &alias).unwrap();
        config.class_b_dir = alias;

        assert_eq!(
            config.validate_with_home(home.path()),
            Err(ValidationError::NotDistinct {
                first: "Class A",
                second: "Class B",
            })
        );
    }

    #[test]
    fn test_output_parent_gets_the_same_checks() {
        let home = tempfile::tempdir().unwrap();
        let mut config = fixture(home.path());
        config.output_file = home.path().join("nowhere/biases.csv");

        let err = config.validate_with_home(home.path()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Missing { label: "Output", .. }
        ));
    }
}
