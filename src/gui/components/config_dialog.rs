//! Configure-directories dialog
//!
//! The dialog edits a string draft of the configuration so partially typed
//! paths survive across frames; validation runs on submit and failures are
//! shown inline. The draft persists after the dialog closes, so reopening it
//! brings the previous input back.
//!
//! Native pickers run on their own thread and hand the chosen path back over
//! a channel the dialog polls each frame, so the frame loop never blocks on
//! the OS dialog.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use eframe::egui;
use tracing::warn;

use super::super::constants::{CONFIG_DIALOG_WIDTH, ERROR_TEXT, ITEM_SPACING};
use crate::config::DirectoryConfig;
use crate::media::MediaType;

/// Which draft field a running picker fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickTarget {
    Source,
    ClassA,
    ClassB,
    Output,
}

/// Text-field draft of a [`DirectoryConfig`]
#[derive(Default)]
pub struct ConfigDraft {
    pub source_dir: String,
    pub class_a_dir: String,
    pub class_b_dir: String,
    pub media_type: MediaType,
    pub output_file: String,
    /// Inline validation failure from the last submit attempt
    pub error: Option<String>,
    /// Picker currently running on its own thread, if any
    pending_pick: Option<(PickTarget, Receiver<Option<String>>)>,
}

impl ConfigDraft {
    fn to_config(&self) -> DirectoryConfig {
        DirectoryConfig {
            source_dir: PathBuf::from(self.source_dir.trim()),
            class_a_dir: PathBuf::from(self.class_a_dir.trim()),
            class_b_dir: PathBuf::from(self.class_b_dir.trim()),
            media_type: self.media_type,
            output_file: PathBuf::from(self.output_file.trim()),
        }
    }

    fn field_mut(&mut self, target: PickTarget) -> &mut String {
        match target {
            PickTarget::Source => &mut self.source_dir,
            PickTarget::ClassA => &mut self.class_a_dir,
            PickTarget::ClassB => &mut self.class_b_dir,
            PickTarget::Output => &mut self.output_file,
        }
    }

    /// Applies the result of a finished picker, or re-arms the pending slot
    /// while it is still running.
    fn poll_picker(&mut self) {
        if let Some((target, rx)) = self.pending_pick.take() {
            match rx.try_recv() {
                Ok(Some(path)) => *self.field_mut(target) = path,
                Ok(None) => {} // dismissed
                Err(TryRecvError::Empty) => self.pending_pick = Some((target, rx)),
                Err(TryRecvError::Disconnected) => {
                    warn!(?target, "file picker thread ended without a result");
                }
            }
        }
    }

    fn start_picker(&mut self, target: PickTarget) {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let picked = match target {
                PickTarget::Output => rfd::FileDialog::new()
                    .add_filter("CSV", &["csv"])
                    .save_file(),
                _ => rfd::FileDialog::new().pick_folder(),
            };
            let _ = tx.send(picked.map(|path| path.to_string_lossy().to_string()));
        });
        self.pending_pick = Some((target, rx));
    }
}

/// Outcome of one frame of the dialog
pub enum DialogAction {
    Submitted(DirectoryConfig),
    Cancelled,
}

/// Renders the dialog. Returns an action when the user closed it this frame.
pub fn ui(ctx: &egui::Context, draft: &mut ConfigDraft) -> Option<DialogAction> {
    draft.poll_picker();

    let mut action = None;
    let picker_busy = draft.pending_pick.is_some();

    egui::Window::new("Configure Directories")
        .collapsible(false)
        .resizable(false)
        .pivot(egui::Align2::CENTER_CENTER)
        .default_pos(ctx.screen_rect().center())
        .default_width(CONFIG_DIALOG_WIDTH)
        .show(ctx, |ui| {
            let mut pick_requested = None;

            egui::Grid::new("configure_directories_grid")
                .num_columns(3)
                .spacing([ITEM_SPACING, 6.0])
                .show(ui, |ui| {
                    for (label, target) in [
                        ("Source", PickTarget::Source),
                        ("Class A", PickTarget::ClassA),
                        ("Class B", PickTarget::ClassB),
                    ] {
                        ui.label(label);
                        ui.add(
                            egui::TextEdit::singleline(draft.field_mut(target))
                                .desired_width(f32::INFINITY)
                                .hint_text("~/"),
                        );
                        if ui
                            .add_enabled(!picker_busy, egui::Button::new("Select"))
                            .clicked()
                        {
                            pick_requested = Some(target);
                        }
                        ui.end_row();
                    }

                    ui.label("Media Type");
                    egui::ComboBox::from_id_salt("media_type_combo")
                        .selected_text(draft.media_type.to_string())
                        .show_ui(ui, |ui| {
                            for media_type in MediaType::ALL {
                                ui.selectable_value(
                                    &mut draft.media_type,
                                    media_type,
                                    media_type.to_string(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Output");
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.output_file)
                            .desired_width(f32::INFINITY)
                            .hint_text("biases.csv"),
                    );
                    if ui
                        .add_enabled(!picker_busy, egui::Button::new("Select"))
                        .clicked()
                    {
                        pick_requested = Some(PickTarget::Output);
                    }
                    ui.end_row();
                });

            if let Some(target) = pick_requested {
                draft.start_picker(target);
            }

            if let Some(error) = &draft.error {
                ui.add_space(ITEM_SPACING);
                ui.colored_label(ERROR_TEXT, error);
            }

            ui.add_space(ITEM_SPACING);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Apply").clicked() {
                    let config = draft.to_config();
                    match config.validate() {
                        Ok(()) => {
                            draft.error = None;
                            action = Some(DialogAction::Submitted(config));
                        }
                        Err(err) => draft.error = Some(err.to_string()),
                    }
                }
                if ui.button("Cancel").clicked() {
                    action = Some(DialogAction::Cancelled);
                }
            });
        });

    action
}
