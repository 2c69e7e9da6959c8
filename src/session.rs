//! Labeling session state and the label/move workflow
//!
//! The session owns the active directory configuration, the three media file
//! lists, the watch handles and the preview/bias state. All mutation happens
//! on the UI thread; the watcher backend only feeds events into a channel
//! that [`LabelSession::handle_watch_events`] drains once per frame.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::config::DirectoryConfig;
use crate::constants::bias;
use crate::ledger;
use crate::media;
use crate::watcher::{DirectoryWatcher, ListRole, WatchEvent};

/// File list for one directory role; `None` while no configuration is active.
pub type SharedFileList = Arc<Mutex<Option<Vec<PathBuf>>>>;

pub struct LabelSession {
    config: Option<DirectoryConfig>,
    source: SharedFileList,
    class_a: SharedFileList,
    class_b: SharedFileList,
    watchers: Vec<DirectoryWatcher>,
    watch_tx: Sender<WatchEvent>,
    watch_rx: Receiver<WatchEvent>,
    preview: Option<PathBuf>,
    bias_value: f32,
    /// User-facing failures, drained by the GUI into a modal dialog
    pending_errors: Vec<String>,
}

impl LabelSession {
    pub fn new() -> Self {
        let (watch_tx, watch_rx) = mpsc::channel();
        Self {
            config: None,
            source: Arc::new(Mutex::new(None)),
            class_a: Arc::new(Mutex::new(None)),
            class_b: Arc::new(Mutex::new(None)),
            watchers: Vec::new(),
            watch_tx,
            watch_rx,
            preview: None,
            bias_value: bias::DEFAULT,
            pending_errors: Vec::new(),
        }
    }

    pub fn config(&self) -> Option<&DirectoryConfig> {
        self.config.as_ref()
    }

    pub fn preview(&self) -> Option<&Path> {
        self.preview.as_deref()
    }

    /// Loads `path` as the current preview. Selecting a list entry routes
    /// through here.
    pub fn set_preview(&mut self, path: PathBuf) {
        info!(file = %path.display(), "previewing file");
        self.preview = Some(path);
    }

    /// Clears only the preview; a no-op while no configuration is active.
    pub fn close_preview(&mut self) {
        if self.config.is_some() {
            self.preview = None;
        }
    }

    pub fn bias_mut(&mut self) -> &mut f32 {
        &mut self.bias_value
    }

    pub fn bias(&self) -> f32 {
        self.bias_value
    }

    pub fn reset_bias(&mut self) {
        self.bias_value = bias::DEFAULT;
    }

    /// Snapshot of one list for iteration by the UI. Cloning under the lock
    /// keeps the lock hold time to the duration of the copy.
    pub fn list_snapshot(&self, role: ListRole) -> Option<Vec<PathBuf>> {
        self.list(role).lock().ok().and_then(|guard| guard.clone())
    }

    fn list(&self, role: ListRole) -> &SharedFileList {
        match role {
            ListRole::Source => &self.source,
            ListRole::ClassA => &self.class_a,
            ListRole::ClassB => &self.class_b,
        }
    }

    /// Installs a validated configuration: scans the three directories on
    /// concurrent background threads (joined before the preview is
    /// populated), then sets up the watches. Watch setup failure degrades to
    /// "no live watch" with a warning; a scan failure rejects the whole
    /// activation and leaves the session unchanged.
    ///
    /// Validation is the configure dialog's responsibility and is not
    /// re-run here.
    pub fn activate(&mut self, config: DirectoryConfig) -> Result<()> {
        let media_type = config.media_type;
        let (source_files, class_a_files, class_b_files) = std::thread::scope(|scope| {
            let source = scope.spawn(|| media::scan_media_files(&config.source_dir, media_type));
            let class_a = scope.spawn(|| media::scan_media_files(&config.class_a_dir, media_type));
            let class_b = scope.spawn(|| media::scan_media_files(&config.class_b_dir, media_type));
            (source.join(), class_a.join(), class_b.join())
        });

        let source_files = source_files
            .map_err(|_| anyhow!("source scan thread panicked"))?
            .with_context(|| format!("couldn't scan {}", config.source_dir.display()))?;
        let class_a_files = class_a_files
            .map_err(|_| anyhow!("class A scan thread panicked"))?
            .with_context(|| format!("couldn't scan {}", config.class_a_dir.display()))?;
        let class_b_files = class_b_files
            .map_err(|_| anyhow!("class B scan thread panicked"))?
            .with_context(|| format!("couldn't scan {}", config.class_b_dir.display()))?;

        info!(
            source = source_files.len(),
            class_a = class_a_files.len(),
            class_b = class_b_files.len(),
            "directory configuration activated"
        );

        self.replace_list(ListRole::Source, Some(source_files));
        self.replace_list(ListRole::ClassA, Some(class_a_files));
        self.replace_list(ListRole::ClassB, Some(class_b_files));

        self.preview = self
            .source
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|files| files.first().cloned()));

        self.watchers.clear();
        for (role, dir) in [
            (ListRole::Source, &config.source_dir),
            (ListRole::ClassA, &config.class_a_dir),
            (ListRole::ClassB, &config.class_b_dir),
        ] {
            match DirectoryWatcher::spawn(dir, false, role, self.watch_tx.clone()) {
                Ok(watcher) => self.watchers.push(watcher),
                // Degrades to no live watch: manual changes won't auto-refresh.
                Err(err) => warn!(error = ?err, ?role, "couldn't watch directory"),
            }
        }

        self.config = Some(config);
        Ok(())
    }

    /// Clears the configuration, all three lists, the preview and the watch
    /// handles.
    pub fn close_directories(&mut self) {
        self.replace_list(ListRole::Source, None);
        self.replace_list(ListRole::ClassA, None);
        self.replace_list(ListRole::ClassB, None);
        self.config = None;
        self.preview = None;
        self.watchers.clear();
        info!("directory configuration closed");
    }

    /// Drains pending watch events; each event triggers a full rescan of the
    /// affected directory (no debouncing or coalescing).
    pub fn handle_watch_events(&mut self) {
        while let Ok(event) = self.watch_rx.try_recv() {
            self.rescan(event.role);
        }
    }

    fn rescan(&mut self, role: ListRole) {
        let Some(config) = &self.config else { return };
        let dir = match role {
            ListRole::Source => &config.source_dir,
            ListRole::ClassA => &config.class_a_dir,
            ListRole::ClassB => &config.class_b_dir,
        };
        match media::scan_media_files(dir, config.media_type) {
            Ok(files) => {
                if let Ok(mut guard) = self.list(role).lock() {
                    *guard = Some(files);
                }
            }
            // Keep the previous list; the next event will retry the rescan.
            Err(err) => warn!(error = ?err, ?role, "rescan after watch event failed"),
        }
    }

    /// Labels the current preview file with the current bias value.
    ///
    /// Destination is class A iff bias > 0.5 (a tie at exactly 0.5 goes to
    /// class B). The move is best-effort: a failure is surfaced through the
    /// error queue, and the ledger update and list advancement run
    /// regardless. The move and the ledger rewrite are not transactional; a
    /// crash in between leaves the ledger stale.
    pub fn apply_label(&mut self) {
        let Some(config) = self.config.clone() else {
            return;
        };
        let Some(current) = self.preview.clone() else {
            return;
        };
        let Some(file_name) = current
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
        else {
            return;
        };

        let destination = if self.bias_value > 0.5 {
            &config.class_a_dir
        } else {
            &config.class_b_dir
        };

        let target = destination.join(&file_name);
        let move_result = if target.exists() {
            Err(anyhow!(
                "{} already contains a file named {file_name}",
                destination.display()
            ))
        } else {
            std::fs::rename(&current, &target).with_context(|| {
                format!(
                    "couldn't move {} to {}",
                    current.display(),
                    destination.display()
                )
            })
        };
        match move_result {
            Ok(()) => info!(
                file = %file_name,
                bias = self.bias_value,
                destination = %destination.display(),
                "labeled file"
            ),
            Err(err) => {
                warn!(error = ?err, file = %file_name, "labeling move failed");
                self.pending_errors.push(format!("{err:#}"));
            }
        }

        if let Err(err) = ledger::record_bias(&config.output_file, &file_name, self.bias_value) {
            warn!(error = ?err, file = %file_name, "bias ledger update failed");
            self.pending_errors.push(format!("{err:#}"));
        }

        if let Ok(mut guard) = self.source.lock() {
            if let Some(files) = guard.as_mut() {
                if let Some(position) = files.iter().position(|path| path == &current) {
                    files.remove(position);
                }
            }
        }

        self.preview = self
            .source
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|files| files.first().cloned()));
    }

    /// Takes the accumulated user-facing error messages, leaving none behind.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_errors)
    }

    fn replace_list(&self, role: ListRole, files: Option<Vec<PathBuf>>) {
        if let Ok(mut guard) = self.list(role).lock() {
            *guard = files;
        }
    }
}

impl Default for LabelSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaType;
    use std::fs;
    use std::time::{Duration, Instant};

    struct Fixture {
        _root: tempfile::TempDir,
        config: DirectoryConfig,
    }

    /// Source directory seeded with `files`, empty class directories, and a
    /// ledger path inside the root.
    fn fixture(files: &[&str]) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let config = DirectoryConfig {
            source_dir: root.path().join("source"),
            class_a_dir: root.path().join("a"),
            class_b_dir: root.path().join("b"),
            media_type: MediaType::Image,
            output_file: root.path().join("biases.csv"),
        };
        for dir in [&config.source_dir, &config.class_a_dir, &config.class_b_dir] {
            fs::create_dir_all(dir).unwrap();
        }
        for name in files {
            fs::write(config.source_dir.join(name), b"x").unwrap();
        }
        Fixture { _root: root, config }
    }

    fn names(list: &Option<Vec<PathBuf>>) -> Vec<String> {
        let mut names: Vec<String> = list
            .as_ref()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_activation_populates_lists_and_preview() {
        let fx = fixture(&["f1.png", "f2.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        let source = session.list_snapshot(ListRole::Source);
        assert_eq!(names(&source), vec!["f1.png", "f2.png"]);
        assert!(session.preview().is_some());
        assert_eq!(session.list_snapshot(ListRole::ClassA).unwrap().len(), 0);
    }

    #[test]
    fn test_activation_fails_when_a_directory_is_missing() {
        let fx = fixture(&[]);
        fs::remove_dir(&fx.config.class_b_dir).unwrap();
        let mut session = LabelSession::new();

        assert!(session.activate(fx.config.clone()).is_err());
        assert!(session.config().is_none());
        assert!(session.list_snapshot(ListRole::Source).is_none());
    }

    #[test]
    fn test_high_bias_moves_to_class_a() {
        let fx = fixture(&["f1.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        *session.bias_mut() = 0.9;
        session.apply_label();

        assert!(fx.config.class_a_dir.join("f1.png").is_file());
        assert!(!fx.config.source_dir.join("f1.png").exists());
        assert!(session.take_errors().is_empty());
    }

    #[test]
    fn test_tie_bias_moves_to_class_b() {
        let fx = fixture(&["f1.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        *session.bias_mut() = 0.5;
        session.apply_label();

        assert!(fx.config.class_b_dir.join("f1.png").is_file());
        assert!(!fx.config.class_a_dir.join("f1.png").exists());
    }

    #[test]
    fn test_labeling_advances_preview_and_shrinks_source_list() {
        let fx = fixture(&["f1.png", "f2.png", "f3.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        // Pin a known order: preview the entry the list starts with.
        let first = session.list_snapshot(ListRole::Source).unwrap()[0].clone();
        session.set_preview(first.clone());
        *session.bias_mut() = 0.9;
        session.apply_label();

        let source = session.list_snapshot(ListRole::Source).unwrap();
        assert_eq!(source.len(), 2);
        assert!(!source.contains(&first));
        assert_eq!(session.preview(), Some(source[0].as_path()));
    }

    #[test]
    fn test_labeling_the_last_file_clears_the_preview() {
        let fx = fixture(&["only.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        session.apply_label();

        assert_eq!(session.list_snapshot(ListRole::Source).unwrap().len(), 0);
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_failed_move_still_updates_ledger_and_advances() {
        let fx = fixture(&["f1.png", "f2.png"]);
        // Same-named file already sits in the destination.
        fs::write(fx.config.class_b_dir.join("f1.png"), b"occupied").unwrap();
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        session.set_preview(fx.config.source_dir.join("f1.png"));
        *session.bias_mut() = 0.2;
        session.apply_label();

        let errors = session.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("f1.png"));

        // The file was not moved, but the ledger row exists and the list
        // advanced anyway.
        assert!(fx.config.source_dir.join("f1.png").is_file());
        let rows = crate::ledger::read_rows(&fx.config.output_file).unwrap();
        assert_eq!(rows, vec![("f1.png".to_string(), "0.2".to_string())]);
        let source = session.list_snapshot(ListRole::Source).unwrap();
        assert!(!source.contains(&fx.config.source_dir.join("f1.png")));
    }

    #[test]
    fn test_close_directories_clears_everything() {
        let fx = fixture(&["f1.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        session.close_directories();

        assert!(session.config().is_none());
        assert!(session.preview().is_none());
        assert!(session.list_snapshot(ListRole::Source).is_none());
        assert!(session.list_snapshot(ListRole::ClassA).is_none());
        assert!(session.list_snapshot(ListRole::ClassB).is_none());
    }

    #[test]
    fn test_close_preview_without_configuration_is_a_noop() {
        let mut session = LabelSession::new();
        session.close_preview();
        assert!(session.preview().is_none());
        assert!(session.config().is_none());
    }

    #[test]
    fn test_external_file_creation_refreshes_the_source_list() {
        let fx = fixture(&["f1.png"]);
        let mut session = LabelSession::new();
        session.activate(fx.config.clone()).unwrap();

        fs::write(fx.config.source_dir.join("f2.png"), b"x").unwrap();

        // The event arrives asynchronously; drain the channel the way the
        // frame loop does until the list catches up.
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            session.handle_watch_events();
            let source = session.list_snapshot(ListRole::Source).unwrap();
            if source.len() == 2 {
                break;
            }
            assert!(Instant::now() < deadline, "watch-driven rescan never happened");
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}
