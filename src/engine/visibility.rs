// src/engine/visibility.rs
//! Column visibility evaluation.
//!
//! `evaluate` is a pure function of (snapshot, rules): build a name → position
//! index, apply the allow-list, the deny-list, then (optionally) the
//! empty-column pass, and union the three. Applying the result to a document
//! is `directive::apply`, kept separate so evaluation stays side-effect free.

use std::collections::HashMap;

use crate::config::options::EngineOptions;
use crate::core::sanitize::{clean_text, normalize_name};

use super::directive::{self, Applied, StyleSink};
use super::rules::VisibilityRules;
use super::types::{Cell, CellNode, HiddenColumns, TableSnapshot};

/// Elements that make a cell count as having visible content regardless of text.
pub const INTERACTIVE_TAGS: &[&str] = &[
    "a", "svg", "img", "input", "button", "select", "textarea",
    "video", "audio", "iframe", "object", "embed", "picture", "canvas",
];

pub fn is_interactive_tag(name: &str) -> bool {
    INTERACTIVE_TAGS.contains(&name)
}

/// Normalized header name → 1-based position. Duplicate names resolve to the last occurrence.
pub fn header_index(snap: &TableSnapshot) -> HashMap<String, usize> {
    snap.headers()
        .iter()
        .map(|h| (normalize_name(&h.name), h.position))
        .collect()
}

/// A cell with nothing a reader would notice: no interactive element, no text,
/// and no markup beyond line breaks, `<em>` annotations and whitespace.
pub fn cell_is_visibly_empty(cell: &Cell) -> bool {
    if cell.has_interactive() {
        return false;
    }
    if !clean_text(&cell.text).is_empty() {
        return false;
    }
    cell.nodes.iter().all(|n| match n {
        CellNode::LineBreak | CellNode::Annotation => true,
        CellNode::Text(t) => clean_text(t).is_empty(),
        CellNode::Interactive(_) | CellNode::Element(_) | CellNode::Comment => false,
    })
}

/// Positions (not in `skip`) whose cells are visibly empty in every row.
/// Abstains (empty result) on zero rows. Missing cells in short rows count as empty.
pub fn empty_columns(snap: &TableSnapshot, skip: impl Fn(usize) -> bool) -> Vec<usize> {
    if snap.row_count() == 0 {
        return Vec::new();
    }
    (1..=snap.column_count())
        .filter(|&pos| !skip(pos))
        .filter(|&pos| {
            (0..snap.row_count()).all(|r| snap.cell(r, pos).is_none_or(cell_is_visibly_empty))
        })
        .collect()
}

/// Why the empty-column pass did or did not run. Reported alongside results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoPass {
    Disabled,
    NoRows,
    /// `rows × columns` above the configured bound.
    TooLarge { cells: usize, max: usize },
    Ran,
}

/// Outcome of one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub hidden: HiddenColumns,
    pub auto: AutoPass,
}

#[derive(Clone, Debug, Default)]
pub struct ColumnVisibilityEngine {
    options: EngineOptions,
}

impl ColumnVisibilityEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compute the hidden set. `None` when the snapshot has no header row (abstain).
    pub fn evaluate(&self, snap: &TableSnapshot, rules: &VisibilityRules) -> Option<Evaluation> {
        if snap.column_count() == 0 {
            return None;
        }
        let index = header_index(snap);
        let mut hidden = HiddenColumns::new();

        if !rules.allow.is_empty() {
            hidden.extend(
                snap.headers()
                    .iter()
                    .filter(|h| !rules.allow.contains(&normalize_name(&h.name)))
                    .map(|h| h.position),
            );
        }

        hidden.extend(rules.deny.iter().filter_map(|name| index.get(name).copied()));

        let auto = if !rules.auto_hide_empty {
            AutoPass::Disabled
        } else if snap.row_count() == 0 {
            AutoPass::NoRows
        } else if snap.cell_count() > self.options.max_cells {
            logd!(
                "Engine: skipping empty-column pass ({} cells > {})",
                snap.cell_count(), self.options.max_cells
            );
            AutoPass::TooLarge { cells: snap.cell_count(), max: self.options.max_cells }
        } else {
            let pinned = |pos: usize| {
                snap.header_name(pos)
                    .map(|n| rules.pinned.contains(&normalize_name(n)))
                    .unwrap_or(false)
            };
            let empty = empty_columns(snap, |pos| hidden.contains(pos) || pinned(pos));
            hidden.extend(empty);
            AutoPass::Ran
        };

        Some(Evaluation { hidden, auto })
    }

    /// Evaluate and push the resulting directive into `sink`.
    /// An absent table (or one without headers) leaves the sink untouched.
    pub fn refresh(
        &self,
        snap: Option<&TableSnapshot>,
        rules: &VisibilityRules,
        sink: &mut dyn StyleSink,
    ) -> Option<(Evaluation, Applied)> {
        let eval = self.evaluate(snap?, rules)?;
        let css = directive::build(&self.options.table_selector(), &eval.hidden);
        let applied = directive::apply(sink, &self.options.style_id, css.as_deref());
        Some((eval, applied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> Cell {
        Cell::empty().with(CellNode::Interactive(s!("a"))).with(CellNode::Text(s!("go")))
    }

    #[test]
    fn nbsp_and_br_are_empty() {
        let c = Cell::empty()
            .with(CellNode::Text(s!("\u{a0} \n")))
            .with(CellNode::LineBreak)
            .with(CellNode::Annotation);
        assert!(cell_is_visibly_empty(&c));
    }

    #[test]
    fn text_link_or_stray_markup_is_not_empty() {
        assert!(!cell_is_visibly_empty(&Cell::text("0")));
        assert!(!cell_is_visibly_empty(&link()));
        assert!(!cell_is_visibly_empty(&Cell::empty().with(CellNode::Element(s!("span")))));
        assert!(!cell_is_visibly_empty(&Cell::empty().with(CellNode::Interactive(s!("img")))));
        assert!(!cell_is_visibly_empty(&Cell::empty().with(CellNode::Comment)));
    }

    #[test]
    fn duplicate_headers_last_wins() {
        let snap = TableSnapshot::new(["a", "B", "b"], vec![]);
        assert_eq!(header_index(&snap).get("b"), Some(&3));
    }

    #[test]
    fn short_rows_count_as_empty() {
        let snap = TableSnapshot::new(["id", "x"], vec![vec![Cell::text("1")]]);
        assert_eq!(empty_columns(&snap, |_| false), vec![2]);
    }

    #[test]
    fn pinned_columns_survive_auto_pass() {
        let snap = TableSnapshot::new(["id", "x"], vec![vec![Cell::empty(), Cell::empty()]]);
        let rules = VisibilityRules::new().auto_hide_empty(true).pin(["ID"]);
        let eval = ColumnVisibilityEngine::default().evaluate(&snap, &rules).unwrap();
        assert_eq!(eval.hidden.to_vec(), vec![2]);
    }

    #[test]
    fn no_headers_abstains() {
        let snap = TableSnapshot::new(Vec::<String>::new(), vec![vec![Cell::empty()]]);
        let rules = VisibilityRules::new().deny(["x"]);
        assert!(ColumnVisibilityEngine::default().evaluate(&snap, &rules).is_none());
    }
}
