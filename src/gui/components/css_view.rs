// src/gui/components/css_view.rs
use eframe::egui;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let mut css = app.css().unwrap_or_else(|| s!("/* nothing hidden */"));
    ui.horizontal(|ui| {
        ui.label(format!("<style id=\"{}\">", app.state.options.engine.style_id));
        if ui.small_button("Copy").clicked() {
            ui.ctx().copy_text(css.clone());
            app.status("Copied CSS");
        }
    });
    egui::ScrollArea::vertical()
        .id_salt("css_view")
        .max_height(80.0)
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(&mut css)
                    .font(egui::TextStyle::Monospace)
                    .desired_width(f32::INFINITY)
                    .interactive(false),
            );
        });
}
