// src/gui/app.rs
use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use eframe::egui;
use url::Url;

use crate::{
    config::{consts::{CONFIG_FILE, LOG_FILE}, file, state::AppState},
    core::sanitize::{normalize_name, split_csv},
    config::options::AppOptions,
    engine::{
        AutoPass, ColumnVisibilityEngine, Debounce, HiddenColumns, StyleSheet, StyleSink, TableSnapshot,
        VisibilityRules,
    },
    page::Document,
    runner,
};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    crate::log::init(Path::new(LOG_FILE), log::LevelFilter::Debug);
    let mut state = AppState::default();
    match file::load(Path::new(CONFIG_FILE)) {
        Ok(o) => state.options = o,
        Err(e) => loge!("Config: {} ({}), using defaults", CONFIG_FILE, e),
    }
    eframe::run_native(
        "Column visibility",
        options,
        Box::new(|_cc| Ok(Box::new(App::new(state)))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,

    // loaded page + its current snapshot
    pub doc: Option<Document>,
    pub snapshot: Option<TableSnapshot>,

    // result of the latest evaluation
    pub hidden: HiddenColumns,
    pub auto: Option<AutoPass>,
    pub preview: StyleSheet,

    // rule edits settle here before recomputing
    pub edits: Debounce,

    pub status: Arc<Mutex<String>>,
}

impl App {
    pub fn new(mut state: AppState) -> Self {
        let list = |set: &std::collections::BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        state.gui.allow_text = list(&state.options.rules.allow);
        state.gui.deny_text = list(&state.options.rules.deny);
        state.gui.pin_text = list(&state.options.rules.pinned);

        let delay = state.options.host.debounce();
        logf!("Init: debounce={} ms, max_cells={}", delay.as_millis(), state.options.engine.max_cells);
        Self {
            state,
            doc: None,
            snapshot: None,
            hidden: HiddenColumns::new(),
            auto: None,
            preview: StyleSheet::new(),
            edits: Debounce::new(delay),
            status: Arc::new(Mutex::new(s!("Idle"))),
        }
    }

    /* ---------- tiny helpers ---------- */

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        *self.status.lock().unwrap() = msg.into();
    }

    pub fn page_url(&self) -> Option<Url> {
        let t = self.state.gui.page_url_text.trim();
        if t.is_empty() { return None; }
        match Url::parse(t) {
            Ok(u) => Some(u),
            Err(e) => {
                self.status(format!("Bad URL: {e}"));
                None
            }
        }
    }

    /// Options with the rule editors' contents as the static rules.
    pub fn edited_options(&self) -> AppOptions {
        let g = &self.state.gui;
        let names = |t: &str| split_csv(t).map(normalize_name).collect();
        let mut opts = self.state.options.clone();
        opts.rules.allow = names(&g.allow_text);
        opts.rules.deny = names(&g.deny_text);
        opts.rules.pinned = names(&g.pin_text);
        opts
    }

    /// Rules as currently typed, layered under the page URL's rules.
    pub fn current_rules(&self) -> VisibilityRules {
        runner::page_rules(&self.edited_options(), self.page_url().as_ref())
    }

    /// A rule editor changed: restart the quiet period.
    pub fn rules_edited(&mut self) {
        self.edits.notify(Instant::now());
    }

    pub fn load_document(&mut self) {
        let path = PathBuf::from(self.state.gui.doc_path_text.trim());
        match Document::load(&path) {
            Ok(doc) => {
                self.snapshot = doc.snapshot(&self.state.options.engine.table_class);
                match &self.snapshot {
                    Some(s) => self.status(format!("Loaded {} ({} rows × {} columns)", path.display(), s.row_count(), s.column_count())),
                    None => self.status(format!("Loaded {} (no data table)", path.display())),
                }
                logf!("UI: loaded {}", path.display());
                self.doc = Some(doc);
                self.recompute();
            }
            Err(e) => {
                loge!("UI: load {} failed: {}", path.display(), e);
                self.status(format!("Load failed: {e}"));
            }
        }
    }

    /// Re-evaluate against the cached snapshot into the in-memory stylesheet.
    pub fn recompute(&mut self) {
        let engine = ColumnVisibilityEngine::new(self.state.options.engine.clone());
        let rules = self.current_rules();
        match engine.refresh(self.snapshot.as_ref(), &rules, &mut self.preview) {
            Some((eval, applied)) => {
                logd!("UI: recompute → hidden={:?} auto={:?} ({:?})", eval.hidden.to_vec(), eval.auto, applied);
                self.hidden = eval.hidden;
                self.auto = Some(eval.auto);
            }
            None => {
                // no table: the sheet is left as it was
                self.hidden = HiddenColumns::new();
                self.auto = None;
            }
        }
    }

    pub fn css(&self) -> Option<String> {
        self.preview.style(&self.state.options.engine.style_id)
    }

    /// Run the full refresh on the document and write it out.
    pub fn save_document(&mut self) {
        let opts = self.edited_options();
        let url = self.page_url();
        let target = opts
            .host
            .out_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.state.gui.doc_path_text.trim()));
        let Some(doc) = self.doc.as_mut() else {
            self.status("Nothing loaded");
            return;
        };
        let report = runner::refresh(doc, url.as_ref(), &opts, None);
        match doc.save(&target) {
            Ok(()) => {
                logf!("UI: saved {}", target.display());
                self.status(format!("Saved {}: {}", target.display(), report.line()));
            }
            Err(e) => {
                loge!("UI: save {} failed: {}", target.display(), e);
                self.status(format!("Save failed: {e}"));
            }
        }
    }

    /// Remaining quiet time, for scheduling the next repaint.
    fn pending(&self) -> Option<Duration> {
        self.edits.remaining(Instant::now())
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.edits.poll(Instant::now()) {
            self.recompute();
        }
        if let Some(left) = self.pending() {
            ctx.request_repaint_after(left);
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            crate::gui::components::top_bar::draw(ui, self);
        });

        egui::SidePanel::left("rules")
            .resizable(false)
            .show(ctx, |ui| {
                crate::gui::components::rules_panel::draw(ui, self);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.gui.show_css {
                crate::gui::components::css_view::draw(ui, self);
                ui.separator();
            }
            crate::gui::components::data_table::draw(ui, self);
        });
    }
}
