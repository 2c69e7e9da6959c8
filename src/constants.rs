//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

use std::path::PathBuf;

/// Application identity and resource locations
pub mod app {
    use super::*;

    /// Application name, used for the window title and log messages
    pub const NAME: &str = "Media Labeler";

    /// Per-user resource directory, relative to the home directory
    pub const RESOURCE_DIR: &str = ".media-labeler";

    /// Theme file location relative to the resource directory
    pub const THEME_FILE: &str = "themes/dark.json";

    /// Resolves the default theme file path under the user's home directory.
    /// Returns None when the home directory cannot be determined.
    pub fn default_theme_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(RESOURCE_DIR).join(THEME_FILE))
    }
}

/// Bias score editing
pub mod bias {
    /// Value the reset button restores
    pub const DEFAULT: f32 = 0.5;

    /// Drag sensitivity per logical point of pointer movement
    pub const STEP: f64 = 0.1;

    /// Inclusive range of valid bias values
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 1.0;
}

/// Theme application
pub mod theme {
    /// Multiplier applied to the alpha channel of translucent and background
    /// color slots when the palette is installed (see `Theme::rescaled`)
    pub const ALPHA_THRESHOLD: f32 = 0.95;
}
