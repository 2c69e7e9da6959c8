//! Theme palette loading and application
//!
//! A theme is a flat JSON document mapping 56 named color slots to RGBA
//! values with components in [0, 1]. The palette is loaded once at startup
//! and installed into the egui style; afterwards it is read-only except for
//! transient push/pop scoping through [`ColorStack`].

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One color slot: `[r, g, b, a]`, each component in [0, 1]
pub type Rgba = [f32; 4];

/// Slots that are multiplied by the alpha threshold unconditionally.
/// These are the surfaces whose see-through amount is user-tunable.
const FORCED_RESCALE_SLOTS: &[&str] = &["COLOR_WINDOW_BG", "COLOR_FRAME_BG", "COLOR_CHILD_BG"];

/// Slots that are translucency effects themselves and keep their authored
/// opacity no matter what the threshold is.
const DIM_OVERLAY_SLOTS: &[&str] = &["COLOR_NAV_WINDOWING_DIM_BG", "COLOR_MODAL_WINDOW_DIM_BG"];

/// Complete color palette for the application UI.
///
/// Every slot is required; a theme file missing any key (or carrying an
/// unknown one) fails to parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Theme {
    #[serde(rename = "COLOR_TEXT")]
    pub text: Rgba,
    #[serde(rename = "COLOR_TEXT_DISABLED")]
    pub text_disabled: Rgba,
    #[serde(rename = "COLOR_WINDOW_BG")]
    pub window_bg: Rgba,
    #[serde(rename = "COLOR_CHILD_BG")]
    pub child_bg: Rgba,
    #[serde(rename = "COLOR_POPUP_BG")]
    pub popup_bg: Rgba,
    #[serde(rename = "COLOR_BORDER")]
    pub border: Rgba,
    #[serde(rename = "COLOR_BORDER_SHADOW")]
    pub border_shadow: Rgba,
    #[serde(rename = "COLOR_FRAME_BG")]
    pub frame_bg: Rgba,
    #[serde(rename = "COLOR_FRAME_BG_HOVERED")]
    pub frame_bg_hovered: Rgba,
    #[serde(rename = "COLOR_FRAME_BG_ACTIVE")]
    pub frame_bg_active: Rgba,
    #[serde(rename = "COLOR_TITLE_BG")]
    pub title_bg: Rgba,
    #[serde(rename = "COLOR_TITLE_BG_ACTIVE")]
    pub title_bg_active: Rgba,
    #[serde(rename = "COLOR_TITLE_BG_COLLAPSED")]
    pub title_bg_collapsed: Rgba,
    #[serde(rename = "COLOR_MENU_BAR_BG")]
    pub menu_bar_bg: Rgba,
    #[serde(rename = "COLOR_SCROLLBAR_BG")]
    pub scrollbar_bg: Rgba,
    #[serde(rename = "COLOR_SCROLLBAR_GRAB")]
    pub scrollbar_grab: Rgba,
    #[serde(rename = "COLOR_SCROLLBAR_GRAB_HOVERED")]
    pub scrollbar_grab_hovered: Rgba,
    #[serde(rename = "COLOR_SCROLLBAR_GRAB_ACTIVE")]
    pub scrollbar_grab_active: Rgba,
    #[serde(rename = "COLOR_CHECK_MARK")]
    pub check_mark: Rgba,
    #[serde(rename = "COLOR_SLIDER_GRAB")]
    pub slider_grab: Rgba,
    #[serde(rename = "COLOR_SLIDER_GRAB_ACTIVE")]
    pub slider_grab_active: Rgba,
    #[serde(rename = "COLOR_BUTTON")]
    pub button: Rgba,
    #[serde(rename = "COLOR_BUTTON_HOVERED")]
    pub button_hovered: Rgba,
    #[serde(rename = "COLOR_BUTTON_ACTIVE")]
    pub button_active: Rgba,
    #[serde(rename = "COLOR_HEADER")]
    pub header: Rgba,
    #[serde(rename = "COLOR_HEADER_HOVERED")]
    pub header_hovered: Rgba,
    #[serde(rename = "COLOR_HEADER_ACTIVE")]
    pub header_active: Rgba,
    #[serde(rename = "COLOR_SEPARATOR")]
    pub separator: Rgba,
    #[serde(rename = "COLOR_SEPARATOR_HOVERED")]
    pub separator_hovered: Rgba,
    #[serde(rename = "COLOR_SEPARATOR_ACTIVE")]
    pub separator_active: Rgba,
    #[serde(rename = "COLOR_RESIZE_GRIP")]
    pub resize_grip: Rgba,
    #[serde(rename = "COLOR_RESIZE_GRIP_HOVERED")]
    pub resize_grip_hovered: Rgba,
    #[serde(rename = "COLOR_RESIZE_GRIP_ACTIVE")]
    pub resize_grip_active: Rgba,
    #[serde(rename = "COLOR_TAB")]
    pub tab: Rgba,
    #[serde(rename = "COLOR_TAB_HOVERED")]
    pub tab_hovered: Rgba,
    #[serde(rename = "COLOR_TAB_SELECTED")]
    pub tab_selected: Rgba,
    #[serde(rename = "COLOR_TAB_SELECTED_OVERLINE")]
    pub tab_selected_overline: Rgba,
    #[serde(rename = "COLOR_TAB_DIMMED")]
    pub tab_dimmed: Rgba,
    #[serde(rename = "COLOR_TAB_DIMMED_SELECTED")]
    pub tab_dimmed_selected: Rgba,
    #[serde(rename = "COLOR_TAB_DIMMED_SELECTED_OVERLINE")]
    pub tab_dimmed_selected_overline: Rgba,
    #[serde(rename = "COLOR_PLOT_LINES")]
    pub plot_lines: Rgba,
    #[serde(rename = "COLOR_PLOT_LINES_HOVERED")]
    pub plot_lines_hovered: Rgba,
    #[serde(rename = "COLOR_PLOT_HISTOGRAM")]
    pub plot_histogram: Rgba,
    #[serde(rename = "COLOR_PLOT_HISTOGRAM_HOVERED")]
    pub plot_histogram_hovered: Rgba,
    #[serde(rename = "COLOR_TABLE_HEADER_BG")]
    pub table_header_bg: Rgba,
    #[serde(rename = "COLOR_TABLE_BORDER_STRONG")]
    pub table_border_strong: Rgba,
    #[serde(rename = "COLOR_TABLE_BORDER_LIGHT")]
    pub table_border_light: Rgba,
    #[serde(rename = "COLOR_TABLE_ROW_BG")]
    pub table_row_bg: Rgba,
    #[serde(rename = "COLOR_TABLE_ROW_BG_ALT")]
    pub table_row_bg_alt: Rgba,
    #[serde(rename = "COLOR_TEXT_LINK")]
    pub text_link: Rgba,
    #[serde(rename = "COLOR_TEXT_SELECTED_BG")]
    pub text_selected_bg: Rgba,
    #[serde(rename = "COLOR_DRAG_DROP_TARGET")]
    pub drag_drop_target: Rgba,
    #[serde(rename = "COLOR_NAV_HIGHLIGHT")]
    pub nav_highlight: Rgba,
    #[serde(rename = "COLOR_NAV_WINDOWING_HIGHLIGHT")]
    pub nav_windowing_highlight: Rgba,
    #[serde(rename = "COLOR_NAV_WINDOWING_DIM_BG")]
    pub nav_windowing_dim_bg: Rgba,
    #[serde(rename = "COLOR_MODAL_WINDOW_DIM_BG")]
    pub modal_window_dim_bg: Rgba,
}

impl Theme {
    /// Loads a palette from a JSON theme file.
    ///
    /// The file must exist, be a regular file and contain exactly the
    /// required slot keys, each a 4-element array of floats in [0, 1].
    pub fn load(path: &Path) -> Result<Theme> {
        if !path.is_file() {
            bail!("invalid theme file path: {}", path.display());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("couldn't read theme file: {}", path.display()))?;
        let theme: Theme = serde_json::from_str(&raw)
            .with_context(|| format!("couldn't parse theme file: {}", path.display()))?;
        Ok(theme)
    }

    /// Every slot of the palette, paired with its document key.
    fn slots_mut(&mut self) -> Vec<(&'static str, &mut Rgba)> {
        vec![
            ("COLOR_TEXT", &mut self.text),
            ("COLOR_TEXT_DISABLED", &mut self.text_disabled),
            ("COLOR_WINDOW_BG", &mut self.window_bg),
            ("COLOR_CHILD_BG", &mut self.child_bg),
            ("COLOR_POPUP_BG", &mut self.popup_bg),
            ("COLOR_BORDER", &mut self.border),
            ("COLOR_BORDER_SHADOW", &mut self.border_shadow),
            ("COLOR_FRAME_BG", &mut self.frame_bg),
            ("COLOR_FRAME_BG_HOVERED", &mut self.frame_bg_hovered),
            ("COLOR_FRAME_BG_ACTIVE", &mut self.frame_bg_active),
            ("COLOR_TITLE_BG", &mut self.title_bg),
            ("COLOR_TITLE_BG_ACTIVE", &mut self.title_bg_active),
            ("COLOR_TITLE_BG_COLLAPSED", &mut self.title_bg_collapsed),
            ("COLOR_MENU_BAR_BG", &mut self.menu_bar_bg),
            ("COLOR_SCROLLBAR_BG", &mut self.scrollbar_bg),
            ("COLOR_SCROLLBAR_GRAB", &mut self.scrollbar_grab),
            ("COLOR_SCROLLBAR_GRAB_HOVERED", &mut self.scrollbar_grab_hovered),
            ("COLOR_SCROLLBAR_GRAB_ACTIVE", &mut self.scrollbar_grab_active),
            ("COLOR_CHECK_MARK", &mut self.check_mark),
            ("COLOR_SLIDER_GRAB", &mut self.slider_grab),
            ("COLOR_SLIDER_GRAB_ACTIVE", &mut self.slider_grab_active),
            ("COLOR_BUTTON", &mut self.button),
            ("COLOR_BUTTON_HOVERED", &mut self.button_hovered),
            ("COLOR_BUTTON_ACTIVE", &mut self.button_active),
            ("COLOR_HEADER", &mut self.header),
            ("COLOR_HEADER_HOVERED", &mut self.header_hovered),
            ("COLOR_HEADER_ACTIVE", &mut self.header_active),
            ("COLOR_SEPARATOR", &mut self.separator),
            ("COLOR_SEPARATOR_HOVERED", &mut self.separator_hovered),
            ("COLOR_SEPARATOR_ACTIVE", &mut self.separator_active),
            ("COLOR_RESIZE_GRIP", &mut self.resize_grip),
            ("COLOR_RESIZE_GRIP_HOVERED", &mut self.resize_grip_hovered),
            ("COLOR_RESIZE_GRIP_ACTIVE", &mut self.resize_grip_active),
            ("COLOR_TAB", &mut self.tab),
            ("COLOR_TAB_HOVERED", &mut self.tab_hovered),
            ("COLOR_TAB_SELECTED", &mut self.tab_selected),
            ("COLOR_TAB_SELECTED_OVERLINE", &mut self.tab_selected_overline),
            ("COLOR_TAB_DIMMED", &mut self.tab_dimmed),
            ("COLOR_TAB_DIMMED_SELECTED", &mut self.tab_dimmed_selected),
            (
                "COLOR_TAB_DIMMED_SELECTED_OVERLINE",
                &mut self.tab_dimmed_selected_overline,
            ),
            ("COLOR_PLOT_LINES", &mut self.plot_lines),
            ("COLOR_PLOT_LINES_HOVERED", &mut self.plot_lines_hovered),
            ("COLOR_PLOT_HISTOGRAM", &mut self.plot_histogram),
            ("COLOR_PLOT_HISTOGRAM_HOVERED", &mut self.plot_histogram_hovered),
            ("COLOR_TABLE_HEADER_BG", &mut self.table_header_bg),
            ("COLOR_TABLE_BORDER_STRONG", &mut self.table_border_strong),
            ("COLOR_TABLE_BORDER_LIGHT", &mut self.table_border_light),
            ("COLOR_TABLE_ROW_BG", &mut self.table_row_bg),
            ("COLOR_TABLE_ROW_BG_ALT", &mut self.table_row_bg_alt),
            ("COLOR_TEXT_LINK", &mut self.text_link),
            ("COLOR_TEXT_SELECTED_BG", &mut self.text_selected_bg),
            ("COLOR_DRAG_DROP_TARGET", &mut self.drag_drop_target),
            ("COLOR_NAV_HIGHLIGHT", &mut self.nav_highlight),
            ("COLOR_NAV_WINDOWING_HIGHLIGHT", &mut self.nav_windowing_highlight),
            ("COLOR_NAV_WINDOWING_DIM_BG", &mut self.nav_windowing_dim_bg),
            ("COLOR_MODAL_WINDOW_DIM_BG", &mut self.modal_window_dim_bg),
        ]
    }

    /// Returns a copy of the palette with the alpha threshold applied.
    ///
    /// Slots whose alpha is already below 1, plus the window/frame/child
    /// background slots unconditionally, are multiplied by `alpha_threshold`.
    /// The two dimming-overlay slots keep their authored opacity.
    pub fn rescaled(&self, alpha_threshold: f32) -> Theme {
        let mut theme = self.clone();
        for (name, color) in theme.slots_mut() {
            if DIM_OVERLAY_SLOTS.contains(&name) {
                continue;
            }
            if color[3] < 1.0 || FORCED_RESCALE_SLOTS.contains(&name) {
                color[3] *= alpha_threshold;
            }
        }
        theme
    }

    /// Installs the palette into the egui style of `ctx`, rescaling alpha
    /// channels first (see [`Theme::rescaled`]).
    pub fn apply(&self, ctx: &egui::Context, alpha_threshold: f32) {
        let t = self.rescaled(alpha_threshold);
        let mut visuals = egui::Visuals::dark();

        visuals.override_text_color = Some(to_color32(t.text));
        visuals.window_fill = to_color32(t.window_bg);
        visuals.panel_fill = to_color32(t.window_bg);
        visuals.extreme_bg_color = to_color32(t.frame_bg);
        visuals.code_bg_color = to_color32(t.frame_bg);
        visuals.faint_bg_color = to_color32(t.table_row_bg_alt);
        visuals.hyperlink_color = to_color32(t.text_link);
        visuals.window_stroke = egui::Stroke::new(1.0, to_color32(t.border));
        visuals.selection.bg_fill = to_color32(t.text_selected_bg);
        visuals.selection.stroke = egui::Stroke::new(1.0, to_color32(t.nav_highlight));
        visuals.window_corner_radius = egui::CornerRadius::same(10);
        visuals.menu_corner_radius = egui::CornerRadius::same(3);

        let widgets = &mut visuals.widgets;
        widgets.noninteractive.bg_fill = to_color32(t.child_bg);
        widgets.noninteractive.weak_bg_fill = to_color32(t.child_bg);
        widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, to_color32(t.border));
        widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, to_color32(t.text));

        widgets.inactive.bg_fill = to_color32(t.frame_bg);
        widgets.inactive.weak_bg_fill = to_color32(t.button);
        widgets.inactive.fg_stroke = egui::Stroke::new(1.0, to_color32(t.text));

        widgets.hovered.bg_fill = to_color32(t.frame_bg_hovered);
        widgets.hovered.weak_bg_fill = to_color32(t.button_hovered);
        widgets.hovered.bg_stroke = egui::Stroke::new(1.0, to_color32(t.separator_hovered));
        widgets.hovered.fg_stroke = egui::Stroke::new(1.5, to_color32(t.text));

        widgets.active.bg_fill = to_color32(t.frame_bg_active);
        widgets.active.weak_bg_fill = to_color32(t.button_active);
        widgets.active.bg_stroke = egui::Stroke::new(1.0, to_color32(t.separator_active));
        widgets.active.fg_stroke = egui::Stroke::new(1.5, to_color32(t.text));

        widgets.open.bg_fill = to_color32(t.popup_bg);
        widgets.open.weak_bg_fill = to_color32(t.header_active);
        widgets.open.fg_stroke = egui::Stroke::new(1.0, to_color32(t.text));

        for w in [
            &mut widgets.noninteractive,
            &mut widgets.inactive,
            &mut widgets.hovered,
            &mut widgets.active,
            &mut widgets.open,
        ] {
            w.corner_radius = egui::CornerRadius::same(3);
        }

        ctx.set_visuals(visuals);
    }
}

/// Converts a palette slot to an egui color.
pub fn to_color32(rgba: Rgba) -> egui::Color32 {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(c(rgba[0]), c(rgba[1]), c(rgba[2]), c(rgba[3]))
}

/// Picks black or white text for legibility against `background`.
///
/// Relative luminance of the background is computed with the sRGB
/// linearization; backgrounds brighter than 0.5 get black text, everything
/// else gets white.
pub fn contrasting_text_color(background: Rgba) -> Rgba {
    fn channel_luminance(channel: f32) -> f32 {
        if channel <= 0.03928 {
            channel / 12.92
        } else {
            ((channel + 0.055) / 1.055).powf(2.4)
        }
    }

    let luminance = 0.2126 * channel_luminance(background[0])
        + 0.7152 * channel_luminance(background[1])
        + 0.0722 * channel_luminance(background[2]);

    if luminance > 0.5 {
        [0.0, 0.0, 0.0, 1.0]
    } else {
        [1.0, 1.0, 1.0, 1.0]
    }
}

/// Stack-scoped color overrides for the active egui style.
///
/// A scope saves the current visuals, applies an override and restores the
/// saved visuals when the guard drops, so push/pop balance is enforced by
/// construction. [`ColorStack::verify_balanced`] is called at shutdown to
/// catch scopes that were leaked anyway (e.g. via `mem::forget`).
#[derive(Default)]
pub struct ColorStack {
    saved: Vec<egui::Visuals>,
}

impl ColorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a scoped override onto the stack. The returned guard restores
    /// the previous visuals when dropped.
    pub fn scoped<'a>(
        &'a mut self,
        ctx: &'a egui::Context,
        override_fn: impl FnOnce(&mut egui::Visuals),
    ) -> ColorScope<'a> {
        let current = (*ctx.style()).visuals.clone();
        self.saved.push(current.clone());
        let mut modified = current;
        override_fn(&mut modified);
        ctx.set_visuals(modified);
        ColorScope { stack: self, ctx }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Shutdown check: any outstanding scope is a configuration error.
    pub fn verify_balanced(&self) -> Result<()> {
        if self.saved.is_empty() {
            Ok(())
        } else {
            bail!(
                "mismatched number of color stack pushes and pops: {} outstanding",
                self.saved.len()
            )
        }
    }
}

/// Guard returned by [`ColorStack::scoped`]; restores the saved visuals on drop.
pub struct ColorScope<'a> {
    stack: &'a mut ColorStack,
    ctx: &'a egui::Context,
}

impl Drop for ColorScope<'_> {
    fn drop(&mut self) {
        if let Some(visuals) = self.stack.saved.pop() {
            self.ctx.set_visuals(visuals);
        }
    }
}
