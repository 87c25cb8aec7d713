// src/gui/components/rules_panel.rs
//
// Allow / deny / pin editors and the auto-hide controls. Every edit goes
// through `App::rules_edited`, so typing only recomputes once it settles.

use eframe::egui;
use crate::engine::AutoPass;
use crate::gui::app::App;

fn list_editor(ui: &mut egui::Ui, label: &str, hint: &str, text: &mut String) -> bool {
    ui.label(label);
    ui.add(
        egui::TextEdit::multiline(text)
            .hint_text(hint)
            .desired_rows(2)
            .desired_width(200.0),
    )
    .changed()
}

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Rules");
    ui.add_space(4.0);

    let g = &mut app.state.gui;
    let mut changed = false;
    changed |= list_editor(ui, "Show only (allow):", "id, name", &mut g.allow_text);
    changed |= list_editor(ui, "Hide (deny):", "notes", &mut g.deny_text);
    changed |= list_editor(ui, "Never auto-hide (pin):", "id", &mut g.pin_text);

    ui.separator();
    let engine = &mut app.state.options.engine;
    if ui.checkbox(&mut engine.auto_hide_empty, "Hide empty columns").changed() {
        logf!("UI: auto_hide_empty → {}", engine.auto_hide_empty);
        changed = true;
    }
    ui.horizontal(|ui| {
        ui.label("Max cells:");
        if ui
            .add(egui::DragValue::new(&mut engine.max_cells).range(0..=10_000_000).speed(100))
            .changed()
        {
            changed = true;
        }
    });

    ui.separator();
    ui.checkbox(&mut app.state.gui.show_hidden, "Show hidden columns greyed");
    ui.checkbox(&mut app.state.gui.show_css, "Show CSS");

    if changed {
        app.rules_edited();
    }

    ui.separator();
    let auto = match app.auto {
        Some(AutoPass::Ran) => s!("Auto-hide: ran"),
        Some(AutoPass::Disabled) => s!("Auto-hide: off"),
        Some(AutoPass::NoRows) => s!("Auto-hide: no rows"),
        Some(AutoPass::TooLarge { cells, max }) => format!("Auto-hide: skipped ({cells} > {max} cells)"),
        None => s!("Auto-hide: no table"),
    };
    ui.label(auto);
    ui.label(format!("Hidden: {}", app.hidden.len()));
    if app.edits.is_pending() {
        ui.label(egui::RichText::new("…").weak());
    }
}
