// src/gui/components/data_table.rs
//
// Preview of the snapshot. Hidden columns are either dropped (as the page
// would render them) or drawn greyed when "show hidden" is on.

use eframe::egui::{self, Color32, RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder};

use crate::engine::{Cell, CellNode, cell_is_visibly_empty};
use crate::gui::app::App;

fn cell_label(cell: &Cell) -> String {
    if cell_is_visibly_empty(cell) {
        return s!();
    }
    let text = crate::core::sanitize::clean_text(&cell.text);
    if !text.is_empty() {
        return text;
    }
    // Non-text content: name the first element so the cell is not mistaken for empty.
    cell.nodes
        .iter()
        .find_map(|n| match n {
            CellNode::Interactive(t) | CellNode::Element(t) => Some(format!("<{t}>")),
            CellNode::Comment => Some(s!("<!-- -->")),
            _ => None,
        })
        .unwrap_or_default()
}

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let Some(snap) = app.snapshot.as_ref() else {
        ui.centered_and_justified(|ui| {
            ui.label(RichText::new("No data table loaded").weak());
        });
        return;
    };

    let show_hidden = app.state.gui.show_hidden;
    let cols: Vec<usize> = snap
        .headers()
        .iter()
        .map(|h| h.position)
        .filter(|&p| show_hidden || !app.hidden.contains(p))
        .collect();
    if cols.is_empty() {
        ui.label(RichText::new("Every column is hidden").weak());
        return;
    }

    let grey = ui.visuals().weak_text_color().gamma_multiply(0.6);
    let style = |text: String, hidden: bool| -> RichText {
        let t = RichText::new(text);
        if hidden { t.color(grey).strikethrough() } else { t }
    };

    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
    }

    if !app.hidden.is_empty() && !show_hidden {
        ui.label(RichText::new(format!("{} column(s) hidden", app.hidden.len())).color(Color32::GRAY));
    }

    let avail_h = ui.available_height();
    egui::ScrollArea::horizontal()
        .id_salt("preview_hscroll")
        .max_height(avail_h)
        .show(ui, |ui| {
            let mut table = TableBuilder::new(ui)
                .striped(true)
                .min_scrolled_height(0.0)
                .id_salt(("preview", show_hidden, cols.len()));
            for _ in &cols {
                table = table.column(Column::initial(110.0).resizable(true).clip(true).at_least(24.0));
            }
            table
                .header(24.0, |mut header| {
                    for &pos in &cols {
                        let hidden = app.hidden.contains(pos);
                        let name = snap.header_name(pos).unwrap_or("");
                        header.col(|ui| {
                            ui.style_mut().wrap_mode = Some(TextWrapMode::Truncate);
                            ui.label(style(s!(name), hidden).strong())
                                .on_hover_text(format!("column {pos}"));
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, snap.row_count(), |mut row| {
                        let r = row.index();
                        for &pos in &cols {
                            let hidden = app.hidden.contains(pos);
                            let text = snap.cell(r, pos).map(cell_label).unwrap_or_default();
                            row.col(|ui| {
                                ui.style_mut().wrap_mode = Some(TextWrapMode::Truncate);
                                ui.label(style(text, hidden));
                            });
                        }
                    });
                });
        });
}
