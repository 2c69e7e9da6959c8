//! Media preview panel
//!
//! Images are decoded once per preview change and uploaded as an egui
//! texture, then drawn scaled to fit while preserving aspect ratio. Audio
//! files get an info card instead of playback. A filename caption is drawn
//! over the preview with a contrast-picked text color so it stays legible on
//! any background.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use eframe::egui;
use tracing::warn;

use super::super::constants::{CAPTION_HEIGHT, ERROR_TEXT, SECTION_SPACING};
use crate::media::MediaType;
use crate::session::LabelSession;
use crate::theme::{self, ColorStack, Theme};

/// Per-preview GPU and metadata state, reloaded when the previewed path
/// changes.
#[derive(Default)]
pub struct PreviewState {
    path: Option<PathBuf>,
    texture: Option<egui::TextureHandle>,
    original_size: Option<[usize; 2]>,
    file_size: Option<u64>,
    load_error: Option<String>,
}

impl PreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads the texture/metadata when the session's preview changed.
    fn sync(&mut self, ctx: &egui::Context, session: &LabelSession) {
        let current = session.preview().map(Path::to_path_buf);
        if current == self.path {
            return;
        }
        self.path = current;
        self.texture = None;
        self.original_size = None;
        self.file_size = None;
        self.load_error = None;

        let Some(path) = self.path.clone() else {
            return;
        };
        self.file_size = std::fs::metadata(&path).ok().map(|meta| meta.len());

        let media_type = session.config().map(|config| config.media_type);
        if media_type == Some(MediaType::Image) {
            match load_texture(ctx, &path) {
                Ok((texture, size)) => {
                    self.texture = Some(texture);
                    self.original_size = Some(size);
                }
                Err(err) => {
                    warn!(error = ?err, file = %path.display(), "couldn't load preview image");
                    self.load_error = Some(format!("{err:#}"));
                }
            }
        }
    }
}

/// Renders the preview area for the current frame.
pub fn ui(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    state: &mut PreviewState,
    session: &LabelSession,
    theme: &Theme,
    colors: &mut ColorStack,
) {
    state.sync(ctx, session);

    let Some(path) = state.path.clone() else {
        ui.centered_and_justified(|ui| {
            ui.weak("No preview. Configure directories to begin labeling.");
        });
        return;
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    match session.config().map(|config| config.media_type) {
        Some(MediaType::Image) => {
            if let Some(texture) = state.texture.clone() {
                let original = state.original_size.unwrap_or([1, 1]);
                let available = ui.available_size() - egui::vec2(0.0, CAPTION_HEIGHT);
                let size = fit_size(original, available);
                let response = ui.add(egui::Image::new(&texture).fit_to_exact_size(size));
                draw_caption(ui, ctx, colors, theme, response.rect, &name);
            } else if let Some(error) = &state.load_error {
                ui.colored_label(ERROR_TEXT, error);
            }
        }
        Some(MediaType::Audio) => {
            ui.add_space(SECTION_SPACING);
            ui.group(|ui| {
                ui.label(egui::RichText::new(format!("\u{1F3B5} {name}")).strong());
                if let Some(bytes) = state.file_size {
                    ui.label(format_size(bytes));
                }
                ui.weak("Audio file — listen with an external player before labeling.");
            });
        }
        None => {}
    }
}

/// Draws the filename strip along the bottom edge of the preview. The text
/// color override is pushed through the color stack so it is scoped to this
/// widget only.
fn draw_caption(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    colors: &mut ColorStack,
    theme: &Theme,
    image_rect: egui::Rect,
    name: &str,
) {
    let strip = egui::Rect::from_min_max(
        egui::pos2(image_rect.left(), image_rect.bottom() - CAPTION_HEIGHT),
        image_rect.right_bottom(),
    );
    let background = theme.menu_bar_bg;
    ui.painter()
        .rect_filled(strip, egui::CornerRadius::ZERO, theme::to_color32(background));

    let text = theme::contrasting_text_color(background);
    let scope = colors.scoped(ctx, |visuals| {
        visuals.override_text_color = Some(theme::to_color32(text));
    });
    ui.put(strip, egui::Label::new(name).truncate());
    drop(scope);
}

fn load_texture(ctx: &egui::Context, path: &Path) -> Result<(egui::TextureHandle, [usize; 2])> {
    let decoded = image::ImageReader::open(path)
        .with_context(|| format!("couldn't open image: {}", path.display()))?
        .decode()
        .with_context(|| format!("couldn't decode image: {}", path.display()))?;
    let size = [decoded.width() as usize, decoded.height() as usize];
    let rgba = decoded.to_rgba8();
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    let texture = ctx.load_texture(
        path.to_string_lossy(),
        color_image,
        egui::TextureOptions::LINEAR,
    );
    Ok((texture, size))
}

/// Largest size with the original aspect ratio that fits into `available`.
fn fit_size(original: [usize; 2], available: egui::Vec2) -> egui::Vec2 {
    let (width, height) = (original[0].max(1) as f32, original[1].max(1) as f32);
    let aspect = width / height;
    let mut fitted = egui::vec2(available.x.max(1.0), available.y.max(1.0));
    if fitted.x / fitted.y > aspect {
        fitted.x = fitted.y * aspect;
    } else {
        fitted.y = fitted.x / aspect;
    }
    fitted
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
