//! GUI-specific constants for layout, spacing and intervals

/// Main window dimensions
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 720.0;
pub const WINDOW_MIN_WIDTH: f32 = 960.0;
pub const WINDOW_MIN_HEIGHT: f32 = 540.0;

/// Default width of the files side panel (roughly a third of the window,
/// mirroring the docked layout split)
pub const FILES_PANEL_WIDTH: f32 = 420.0;

/// Layout spacing
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;

/// Configure dialog width
pub const CONFIG_DIALOG_WIDTH: f32 = 600.0;

/// Height of the filename caption strip drawn over the preview
pub const CAPTION_HEIGHT: f32 = 24.0;

/// Idle repaint interval so watcher events are drained promptly even when no
/// input arrives
pub const WATCH_REPAINT_INTERVAL_MS: u64 = 250;

/// Inline validation failure text
pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(220, 70, 70);
