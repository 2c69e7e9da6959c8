pub mod config_dialog;
pub mod editor_panel;
pub mod files_panel;
pub mod preview_panel;
