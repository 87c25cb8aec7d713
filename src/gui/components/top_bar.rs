// src/gui/components/top_bar.rs
//
// Document path + page URL, Load / Save, and the status line.

use eframe::egui;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        ui.label("Page:");
        let resp = ui.add(
            egui::TextEdit::singleline(&mut app.state.gui.doc_path_text)
                .hint_text("page.html")
                .font(egui::TextStyle::Monospace)
                .desired_width(320.0),
        );
        let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Load").clicked() || enter {
            logd!("UI: Load clicked → {}", app.state.gui.doc_path_text);
            app.load_document();
        }
        if ui.add_enabled(app.doc.is_some(), egui::Button::new("Save")).clicked() {
            app.save_document();
        }
    });

    ui.horizontal(|ui| {
        ui.label("URL:");
        if ui
            .add(
                egui::TextEdit::singleline(&mut app.state.gui.page_url_text)
                    .hint_text("http://127.0.0.1:8001/db/table?_hide=notes")
                    .font(egui::TextStyle::Monospace)
                    .desired_width(480.0),
            )
            .changed()
        {
            // URL rules count as a rule edit
            app.rules_edited();
        }
    });

    let msg = app.status.lock().unwrap().clone();
    ui.label(egui::RichText::new(msg).weak());
}
