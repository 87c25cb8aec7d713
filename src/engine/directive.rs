// src/engine/directive.rs
//! The style directive: one CSS rule hiding a set of column positions, kept
//! under a stable id in whatever stylesheet the host exposes.

use super::types::HiddenColumns;

/// Where directives live. Implemented by `page::Document` (a `<style>` in `<head>`)
/// and by the in-memory `StyleSheet`.
pub trait StyleSink {
    /// Remove every style element carrying `id`. Returns whether anything was removed.
    fn remove_style(&mut self, id: &str) -> bool;

    /// Insert a new style element with `id` and `css`. Callers remove first.
    fn insert_style(&mut self, id: &str, css: &str);

    /// Current CSS under `id`, if any.
    fn style(&self, id: &str) -> Option<String>;
}

/// What `apply` ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// A directive is now active (old one, if any, replaced).
    Replaced,
    /// The set was empty and a stale directive was removed.
    Cleared,
    /// Sink already matched; nothing touched.
    Unchanged,
}

/// Selector pair for one position: header and data cell.
pub fn selector_for(scope: &str, position: usize) -> String {
    format!("{scope} th:nth-child({position}), {scope} td:nth-child({position})")
}

/// Full CSS for the hidden set, or `None` when nothing should be hidden.
/// `scope` is the table selector, e.g. `table.rows-and-columns`.
pub fn build(scope: &str, hidden: &HiddenColumns) -> Option<String> {
    if hidden.is_empty() {
        return None;
    }
    let sel = hidden
        .iter()
        .map(|p| selector_for(scope, p))
        .collect::<Vec<_>>()
        .join(", ");
    Some(join!(&sel, "{display:none!important}"))
}

/// Make `sink` hold exactly `css` under `id`: remove-then-insert, or just remove when `css` is `None`.
/// Re-applying the same CSS is a no-op, so repeated refreshes never churn the document.
pub fn apply(sink: &mut dyn StyleSink, id: &str, css: Option<&str>) -> Applied {
    let current = sink.style(id);
    match css {
        Some(css) if current.as_deref() == Some(css) => Applied::Unchanged,
        Some(css) => {
            sink.remove_style(id);
            sink.insert_style(id, css);
            Applied::Replaced
        }
        None if sink.remove_style(id) => Applied::Cleared,
        None => Applied::Unchanged,
    }
}

/// In-memory stylesheet: ordered `(id, css)` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSheet {
    entries: Vec<(String, String)>,
}

impl StyleSheet {
    pub fn new() -> Self { Self::default() }

    /// How many entries carry `id` (should never exceed 1).
    pub fn count(&self, id: &str) -> usize {
        self.entries.iter().filter(|(i, _)| i == id).count()
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl StyleSink for StyleSheet {
    fn remove_style(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| i != id);
        self.entries.len() != before
    }

    fn insert_style(&mut self, id: &str, css: &str) {
        self.entries.push((s!(id), s!(css)));
    }

    fn style(&self, id: &str) -> Option<String> {
        self.entries.iter().find(|(i, _)| i == id).map(|(_, c)| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_lists_th_and_td_for_each_position() {
        let hidden: HiddenColumns = [3, 1].into_iter().collect();
        let css = build("table.t", &hidden).unwrap();
        assert_eq!(
            css,
            "table.t th:nth-child(1), table.t td:nth-child(1), \
             table.t th:nth-child(3), table.t td:nth-child(3){display:none!important}"
        );
    }

    #[test]
    fn empty_set_builds_nothing() {
        assert_eq!(build("table.t", &HiddenColumns::new()), None);
    }

    #[test]
    fn apply_replaces_then_clears() {
        let mut sheet = StyleSheet::new();
        assert_eq!(apply(&mut sheet, "x", Some("a{}")), Applied::Replaced);
        assert_eq!(apply(&mut sheet, "x", Some("b{}")), Applied::Replaced);
        assert_eq!(sheet.count("x"), 1);
        assert_eq!(sheet.style("x").as_deref(), Some("b{}"));
        assert_eq!(apply(&mut sheet, "x", None), Applied::Cleared);
        assert_eq!(apply(&mut sheet, "x", None), Applied::Unchanged);
        assert!(sheet.is_empty());
    }
}
