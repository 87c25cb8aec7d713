// src/runner.rs
// One refresh cycle over a document: rules → snapshot → evaluate → apply,
// then (optionally) the summary rewrite. Shared by the CLI, the watcher and the GUI.

use std::fs;
use std::path::Path;

use url::Url;

use crate::config::options::AppOptions;
use crate::engine::{Applied, AutoPass, ColumnVisibilityEngine, VisibilityRules};
use crate::error::Result;
use crate::page::Document;
use crate::page::summary::{self, LabelSource};

/// What one refresh did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshReport {
    /// No table (or no header row): nothing was touched.
    pub abstained: bool,
    /// 1-based hidden positions, ascending.
    pub hidden: Vec<usize>,
    /// Header text of each hidden position.
    pub hidden_names: Vec<String>,
    pub auto: Option<AutoPass>,
    pub applied: Option<Applied>,
    pub summary_rewritten: bool,
    /// The document differs from what came in.
    pub changed: bool,
}

impl RefreshReport {
    fn abstain() -> Self {
        Self {
            abstained: true,
            hidden: vec![],
            hidden_names: vec![],
            auto: None,
            applied: None,
            summary_rewritten: false,
            changed: false,
        }
    }

    /// One line for logs and the CLI.
    pub fn line(&self) -> String {
        if self.abstained {
            return s!("no table: nothing to do");
        }
        let auto = match self.auto {
            Some(AutoPass::Ran) => s!("auto-hide ran"),
            Some(AutoPass::Disabled) | None => s!("auto-hide off"),
            Some(AutoPass::NoRows) => s!("auto-hide skipped (no rows)"),
            Some(AutoPass::TooLarge { cells, max }) => format!("auto-hide skipped ({cells} cells > {max})"),
        };
        let hidden = if self.hidden_names.is_empty() {
            s!("none")
        } else {
            self.hidden_names.join(", ")
        };
        format!(
            "hidden {}: {}; {}{}{}",
            self.hidden.len(),
            hidden,
            auto,
            if self.summary_rewritten { "; summary rewritten" } else { "" },
            if self.changed { "" } else { "; unchanged" },
        )
    }
}

/// Rules for a page: the query string's rules layered over the static ones.
/// The auto-hide flag comes from the engine options unless the page URL sets it.
pub fn page_rules(opts: &AppOptions, url: Option<&Url>) -> VisibilityRules {
    let auto_default = opts.engine.auto_hide_empty;
    let mut base = opts.rules.clone();
    base.auto_hide_empty = auto_default;
    match url {
        Some(u) => {
            let from_page = VisibilityRules::from_url(u, auto_default);
            let auto = from_page.auto_hide_empty;
            let mut merged = base.merge(&from_page);
            merged.auto_hide_empty = auto;
            merged
        }
        None => base,
    }
}

/// Run one cycle on `doc` in place.
pub fn refresh(
    doc: &mut Document,
    url: Option<&Url>,
    opts: &AppOptions,
    labels: Option<&dyn LabelSource>,
) -> RefreshReport {
    let before = s!(doc.html());
    let rules = page_rules(opts, url);
    let engine = ColumnVisibilityEngine::new(opts.engine.clone());

    let snap = doc.snapshot(&opts.engine.table_class);
    let mut report = match engine.refresh(snap.as_ref(), &rules, doc) {
        Some((eval, applied)) => {
            let hidden = eval.hidden.to_vec();
            let hidden_names = snap
                .as_ref()
                .map(|s| eval.hidden.names(s).into_iter().map(String::from).collect())
                .unwrap_or_default();
            RefreshReport {
                abstained: false,
                hidden,
                hidden_names,
                auto: Some(eval.auto),
                applied: Some(applied),
                summary_rewritten: false,
                changed: false,
            }
        }
        None => RefreshReport::abstain(),
    };

    if let (Some(source), Some(u)) = (labels, url) {
        if opts.labels.enabled {
            report.summary_rewritten =
                summary::rewrite_document(doc, u.query().unwrap_or(""), &opts.labels, source);
        }
    }

    report.changed = doc.html() != before;
    logd!("Refresh: {}", report.line());
    report
}

/// Load `input`, refresh, and write to `output` (or back to `input`) only when something changed.
pub fn refresh_file(
    input: &Path,
    output: Option<&Path>,
    url: Option<&Url>,
    opts: &AppOptions,
    labels: Option<&dyn LabelSource>,
) -> Result<RefreshReport> {
    let mut doc = Document::load(input)?;
    let report = refresh(&mut doc, url, opts, labels);
    let target = output.unwrap_or(input);

    let current = fs::read_to_string(target).ok();
    if current.as_deref() != Some(doc.html()) {
        doc.save(target)?;
        logf!("Refresh: wrote {}", target.display());
    }
    Ok(report)
}
