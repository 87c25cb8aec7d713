// src/config/options.rs
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::engine::VisibilityRules;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppOptions {
    pub engine: EngineOptions,
    pub host: HostOptions,
    pub labels: LabelOptions,
    pub form: FormOptions,
    /// Static rules layered under whatever the page URL asks for.
    /// Their auto-hide flag is unused; `engine.auto_hide_empty` is the default.
    pub rules: VisibilityRules,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Skip the empty-column pass when rows × columns exceeds this.
    pub max_cells: usize,
    /// Stable id of the one `<style>` element we own.
    pub style_id: String,
    /// Class marking the main data table.
    pub table_class: String,
    /// Auto-hide policy when the page URL does not override it.
    pub auto_hide_empty: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_cells: MAX_CELLS,
            style_id: s!(STYLE_ID),
            table_class: s!(TABLE_CLASS),
            auto_hide_empty: AUTO_HIDE_EMPTY,
        }
    }
}

impl EngineOptions {
    /// CSS selector for the table, e.g. `table.rows-and-columns`.
    pub fn table_selector(&self) -> String {
        join!("table.", &self.table_class)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostOptions {
    pub debounce_ms: u64,
    pub summary_debounce_ms: u64,
    pub poll_ms: u64,
    /// Where rewritten documents go; `None` → rewrite in place.
    pub out_path: Option<PathBuf>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            summary_debounce_ms: SUMMARY_DEBOUNCE_MS,
            poll_ms: POLL_MS,
            out_path: None,
        }
    }
}

impl HostOptions {
    pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms) }
    pub fn poll(&self) -> Duration { Duration::from_millis(self.poll_ms) }

    /// Window used by the watcher: wide enough for both the table and summary passes.
    pub fn watch_debounce(&self, labels: bool) -> Duration {
        if labels {
            Duration::from_millis(self.debounce_ms.max(self.summary_debounce_ms))
        } else {
            self.debounce()
        }
    }
}

/// Target of a foreign-key query parameter: `/{db}/{table}/{id}.json` → `label_col`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    pub db: String,
    pub table: String,
    pub label_col: String,
}

impl ForeignKey {
    pub fn new(db: &str, table: &str, label_col: &str) -> Self {
        Self { db: s!(db), table: s!(table), label_col: s!(label_col) }
    }

    /// Parse `db/table/label_col`.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.trim().split('/').map(str::trim);
        let (db, table, col) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || db.is_empty() || table.is_empty() || col.is_empty() {
            return None;
        }
        Some(Self::new(db, table, col))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelOptions {
    /// Rewrite the "N rows where …" summary.
    pub enabled: bool,
    /// Root of the JSON record endpoints.
    pub base_url: String,
    /// Query parameter (lower-case, ending in `_id`) → lookup target.
    pub foreign_keys: BTreeMap<String, ForeignKey>,
    /// Query parameter → human name shown left of `=`.
    pub aliases: BTreeMap<String, String>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: s!(DEFAULT_BASE_URL),
            foreign_keys: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormOptions {
    pub form_id: String,
    /// Element whose text receives status messages.
    pub status_id: String,
    pub fallback_db: String,
    /// Appended to `/{db}/` when the server gives no redirect target.
    pub fallback_table_path: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            form_id: s!("sessoForm"),
            status_id: s!("msg"),
            fallback_db: s!(FALLBACK_DB),
            fallback_table_path: s!(FALLBACK_TABLE_PATH),
        }
    }
}
