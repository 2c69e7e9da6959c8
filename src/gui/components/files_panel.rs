//! Side panel listing the source and class file lists
//!
//! One collapsible section per directory role. Rows are selectable; the
//! clicked path is returned to the caller, which loads it as the preview.

use std::path::PathBuf;

use eframe::egui;

use crate::media::MediaType;
use crate::session::LabelSession;
use crate::watcher::ListRole;

const SECTIONS: [(ListRole, &str); 3] = [
    (ListRole::Source, "Source"),
    (ListRole::ClassA, "Class A"),
    (ListRole::ClassB, "Class B"),
];

/// Renders the three file lists; returns the path clicked this frame, if any.
pub fn ui(ui: &mut egui::Ui, session: &LabelSession) -> Option<PathBuf> {
    let mut clicked = None;
    let media_type = session.config().map(|config| config.media_type);

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (role, title) in SECTIONS {
            egui::CollapsingHeader::new(title)
                .default_open(role == ListRole::Source)
                .show(ui, |ui| {
                    let Some(files) = session.list_snapshot(role) else {
                        ui.weak("No directories configured.");
                        return;
                    };
                    if files.is_empty() {
                        ui.weak("Empty");
                        return;
                    }
                    for path in &files {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| path.to_string_lossy().to_string());
                        let entry = format!("{} {name}", file_icon(media_type));
                        let selected = session.preview() == Some(path.as_path());
                        if ui.selectable_label(selected, entry).clicked() {
                            clicked = Some(path.clone());
                        }
                    }
                });
        }
    });

    clicked
}

fn file_icon(media_type: Option<MediaType>) -> &'static str {
    match media_type {
        Some(MediaType::Image) => "\u{1F5BC}",
        Some(MediaType::Audio) => "\u{1F3B5}",
        None => "\u{1F5CB}",
    }
}
