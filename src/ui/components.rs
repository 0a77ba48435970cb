//! Reusable UI components
//!
//! This module contains standalone UI components that can be used
//! throughout the application.

use crate::theme;
use eframe::egui;

/// Labeled read-only output field. Empty values render as an empty field.
pub fn output_field(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.add(
        egui::Label::new(
            egui::RichText::new(label)
                .size(11.0)
                .color(theme::TEXT_DIM),
        )
        .selectable(false),
    );
    theme::input_frame().show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.set_min_height(18.0);
        if !value.is_empty() {
            // Selectable so the user can copy the address out
            ui.add(
                egui::Label::new(
                    egui::RichText::new(value)
                        .size(14.0)
                        .color(theme::TEXT_SECONDARY),
                )
                .selectable(true)
                .truncate(),
            );
        }
    });
}

/// Red message banner with a warning icon
pub fn message_banner(ui: &mut egui::Ui, text: &str) {
    egui::Frame::new()
        .fill(theme::ERROR_BG)
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::same(10))
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::ERROR_BORDER))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            let text = format!("{}  {}", egui_phosphor::regular::WARNING, text);
            ui.add(
                egui::Label::new(egui::RichText::new(text).color(theme::ERROR_TEXT)).wrap(),
            );
        });
}

/// Spinner row shown while a lookup is in flight
pub fn loading_row(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.add(
            egui::Label::new(
                egui::RichText::new("Buscando endereço...").color(theme::TEXT_MUTED),
            )
            .selectable(false),
        );
    });
}
