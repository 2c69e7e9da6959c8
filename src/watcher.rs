//! Directory change watching
//!
//! Wraps the `notify` backend. The backend owns its own thread; its callback
//! never touches application state directly — it only forwards a typed event
//! into a channel the UI thread drains once per frame. No debouncing is
//! performed; every relevant event makes the receiver rescan the directory.

use std::path::Path;
use std::sync::mpsc::Sender;

use anyhow::{Context as _, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tracing::warn;

/// Which configured directory a watch event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListRole {
    Source,
    ClassA,
    ClassB,
}

/// Notification that the directory behind `role` changed and its file list
/// should be rescanned.
#[derive(Debug, Clone, Copy)]
pub struct WatchEvent {
    pub role: ListRole,
}

/// Live subscription to filesystem change events for one directory.
///
/// Dropping the handle stops the watch and releases the OS notification
/// resources (inotify descriptors on Linux).
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
}

impl DirectoryWatcher {
    /// Starts watching `dir` and forwards change events over `events`.
    ///
    /// Fails when the directory cannot be watched (nonexistent, inaccessible,
    /// watcher subsystem failure); callers log this and proceed without a
    /// live watch.
    pub fn spawn(
        dir: &Path,
        recursive: bool,
        role: ListRole,
        events: Sender<WatchEvent>,
    ) -> Result<Self> {
        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if is_relevant(&event.kind) {
                        // The receiver may already be gone during shutdown.
                        let _ = events.send(WatchEvent { role });
                    }
                }
                Err(err) => warn!(error = ?err, ?role, "filesystem watch backend error"),
            })
            .context("couldn't create filesystem watcher")?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(dir, mode)
            .with_context(|| format!("couldn't watch directory: {}", dir.display()))?;

        Ok(Self { _watcher: watcher })
    }
}

/// Creation, removal, renames and content/metadata modification all warrant a
/// rescan; pure access events do not.
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_watch_of_missing_directory_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel();
        let result = DirectoryWatcher::spawn(&dir.path().join("gone"), false, ListRole::Source, tx);
        assert!(result.is_err());
    }

    #[test]
    fn test_file_creation_is_forwarded_to_the_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let _watcher = DirectoryWatcher::spawn(dir.path(), false, ListRole::ClassA, tx).unwrap();

        std::fs::write(dir.path().join("fresh.png"), b"x").unwrap();

        let event = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("watch event should arrive");
        assert_eq!(event.role, ListRole::ClassA);
    }
}
