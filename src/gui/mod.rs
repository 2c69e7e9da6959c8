//! Application window: frame loop, menu bar, panels and dialogs
//!
//! The layout mirrors a docked workspace: file lists on the left, the media
//! preview in the center, the editor strip along the bottom, plus a floating
//! configure dialog and a modal error dialog.

mod components;
mod constants;

use std::time::Duration;

use anyhow::{anyhow, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tracing::{error, info};

use crate::constants::{app, theme as theme_constants};
use crate::session::LabelSession;
use crate::theme::{self, ColorStack, Theme};
use components::config_dialog::{self, ConfigDraft, DialogAction};
use components::preview_panel::PreviewState;
use components::{editor_panel, files_panel, preview_panel};
use constants::*;

#[derive(Default)]
struct UiFlags {
    configure_directories: bool,
}

struct LabelerApp {
    session: LabelSession,
    theme: Theme,
    colors: ColorStack,
    preview: PreviewState,
    draft: ConfigDraft,
    ui_flags: UiFlags,
    /// Messages currently shown in the error modal
    errors: Vec<String>,
}

impl LabelerApp {
    fn new(cc: &CreationContext<'_>, theme: Theme) -> Self {
        info!("initializing application window");
        theme.apply(&cc.egui_ctx, theme_constants::ALPHA_THRESHOLD);

        Self {
            session: LabelSession::new(),
            theme,
            colors: ColorStack::new(),
            preview: PreviewState::new(),
            draft: ConfigDraft::default(),
            ui_flags: UiFlags::default(),
            errors: Vec::new(),
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Close Directories").clicked() {
                    self.session.close_directories();
                }
                if ui.button("Close Preview").clicked() {
                    self.session.close_preview();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("Configure", |ui| {
                if ui.button("Directories").clicked() {
                    self.ui_flags.configure_directories = true;
                }
            });
            ui.menu_button("Help", |ui| {
                ui.label(format!(
                    "{} — sort media into two classes with a bias score.",
                    app::NAME
                ));
            });
        });
    }

    fn configure_dialog(&mut self, ctx: &egui::Context) {
        let Some(action) = config_dialog::ui(ctx, &mut self.draft) else {
            return;
        };
        self.ui_flags.configure_directories = false;
        match action {
            DialogAction::Submitted(config) => {
                if let Err(err) = self.session.activate(config) {
                    error!(error = ?err, "couldn't activate directory configuration");
                    self.errors.push(format!("{err:#}"));
                }
            }
            DialogAction::Cancelled => {}
        }
    }

    fn error_modal(&mut self, ctx: &egui::Context) {
        let backdrop = theme::to_color32(self.theme.modal_window_dim_bg);
        egui::Modal::new(egui::Id::new("error_modal"))
            .backdrop_color(backdrop)
            .show(ctx, |ui| {
                ui.heading("Error");
                ui.add_space(ITEM_SPACING);
                for message in &self.errors {
                    ui.label(message);
                }
                ui.add_space(ITEM_SPACING);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("OK").clicked() {
                        self.errors.clear();
                    }
                });
            });
    }
}

impl eframe::App for LabelerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Watcher events first, so the lists drawn below are current.
        self.session.handle_watch_events();
        self.errors.extend(self.session.take_errors());

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        egui::SidePanel::left("files_panel")
            .resizable(true)
            .default_width(FILES_PANEL_WIDTH)
            .show(ctx, |ui| {
                if let Some(path) = files_panel::ui(ui, &self.session) {
                    self.session.set_preview(path);
                }
            });

        egui::TopBottomPanel::bottom("editor_panel").show(ctx, |ui| {
            ui.add_space(ITEM_SPACING);
            if editor_panel::ui(ui, &mut self.session) {
                self.session.apply_label();
            }
            ui.add_space(ITEM_SPACING);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            preview_panel::ui(
                ui,
                ctx,
                &mut self.preview,
                &self.session,
                &self.theme,
                &mut self.colors,
            );
        });

        if self.ui_flags.configure_directories {
            self.configure_dialog(ctx);
        }

        if !self.errors.is_empty() {
            self.error_modal(ctx);
        }

        // Watch events arrive outside egui's own input stream; keep the loop
        // ticking so they are drained without user interaction.
        ctx.request_repaint_after(Duration::from_millis(WATCH_REPAINT_INTERVAL_MS));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.colors.verify_balanced() {
            error!(error = ?err, "theme color stack imbalance at shutdown");
        }
        info!("exiting");
    }
}

/// Launches the application window and blocks until it closes.
pub fn run(theme: Theme) -> Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title(app::NAME),
        ..Default::default()
    };

    eframe::run_native(
        app::NAME,
        options,
        Box::new(move |cc| Ok(Box::new(LabelerApp::new(cc, theme)))),
    )
    .map_err(|err| anyhow!("couldn't launch application window: {err}"))
}
