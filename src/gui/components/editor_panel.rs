//! Editor strip: the bias control and the label action
//!
//! The bias is a drag-value clamped to [0, 1] with a reset button next to it.
//! A change is logged once interaction ends rather than on every drag frame.

use eframe::egui;
use tracing::info;

use super::super::constants::ITEM_SPACING;
use crate::constants::bias;
use crate::session::LabelSession;

/// Renders the editor strip; returns true when "Apply Label" was clicked.
pub fn ui(ui: &mut egui::Ui, session: &mut LabelSession) -> bool {
    let mut apply = false;
    let has_preview = session.preview().is_some();

    ui.horizontal(|ui| {
        ui.label("Bias");
        ui.add_space(ITEM_SPACING);

        let response = ui.add(
            egui::DragValue::new(session.bias_mut())
                .speed(bias::STEP)
                .range(bias::MIN..=bias::MAX)
                .fixed_decimals(2),
        );
        if response.drag_stopped() {
            info!(bias = session.bias(), "bias adjusted");
        }

        if ui
            .button("\u{1F504}")
            .on_hover_text("Reset bias")
            .clicked()
        {
            session.reset_bias();
        }

        ui.add_space(ITEM_SPACING);
        ui.separator();
        ui.add_space(ITEM_SPACING);

        let destination = if session.bias() > 0.5 { "Class A" } else { "Class B" };
        ui.weak(format!("Destination: {destination}"));

        ui.add_space(ITEM_SPACING);
        if ui
            .add_enabled(has_preview, egui::Button::new("Apply Label"))
            .clicked()
        {
            apply = true;
        }
    });

    apply
}
