// src/page/document.rs
//
// A rendered page held as an HTML string. This is the host side of the engine:
// it snapshots the table, owns the `<style>` insertion point in `<head>`, and
// patches the summary line, the status element and form inputs in place.

use std::{fs, path::Path};

use chrono::NaiveDateTime;

use crate::core::html::{self, Block, attr, to_lower};
use crate::core::sanitize::{escape_attr, escape_text};
use crate::engine::{StyleSink, TableSnapshot};
use crate::error::Result;

use super::{form, snapshot, summary};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    html: String,
}

/// Every `<name>` block, nested ones included, in document order.
fn all_blocks(s: &str, lc: &str, name: &str) -> Vec<Block> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(b) = html::next_block_in(s, lc, name, pos) {
        pos = b.start + 1;
        out.push(b);
    }
    out
}

impl Document {
    pub fn new<S: Into<String>>(html: S) -> Self {
        Self { html: html.into() }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, &self.html)?;
        Ok(())
    }

    pub fn html(&self) -> &str { &self.html }
    pub fn into_html(self) -> String { self.html }

    /// Fresh snapshot of the data table; `None` if it is not (yet) rendered.
    pub fn snapshot(&self, table_class: &str) -> Option<TableSnapshot> {
        snapshot::parse_table(&self.html, table_class)
    }

    fn style_blocks(&self, id: &str) -> Vec<Block> {
        html::blocks_ci(&self.html, "style")
            .into_iter()
            .filter(|b| attr(b.open_tag(&self.html), "id").as_deref() == Some(id))
            .collect()
    }

    /// Offset where new `<style>` elements go: just before `</head>`.
    /// Without a head, one is created after `<html …>` (or at the very start).
    fn head_insert_point(&mut self) -> usize {
        let lc = to_lower(&self.html);
        if let Some(i) = html::find_close_ci(&lc, "head", 0) {
            return i;
        }
        let at = match html::find_open_ci(&lc, "html", 0).and_then(|s| html::tag_end(&self.html, s)) {
            Some(end) => end,
            None => 0,
        };
        self.html.insert_str(at, "<head></head>");
        at + "<head>".len()
    }

    // ---------- summary line ----------

    /// Element to hold the "N rows where …" summary, scoped to `.content` when present.
    pub fn find_summary(&self) -> Option<(Block, String)> {
        let lc = to_lower(&self.html);
        let (lo, hi) = all_blocks(&self.html, &lc, "div")
            .into_iter()
            .find(|b| html::has_class(b.open_tag(&self.html), "content"))
            .map(|b| (b.inner_start, b.inner_end))
            .unwrap_or((0, self.html.len()));

        let mut cands: Vec<Block> = ["p", "h2", "h3", "div"]
            .iter()
            .flat_map(|tag| all_blocks(&self.html, &lc, tag))
            .filter(|b| b.start >= lo && b.end <= hi)
            .collect();
        cands.sort_by_key(|b| b.start);

        cands.into_iter().find_map(|b| {
            let text = html::strip_tags(b.inner(&self.html));
            summary::is_summary(&text).then_some((b, text))
        })
    }

    /// Overwrite the summary line. Returns false when the page has none.
    pub fn replace_summary(&mut self, text: &str) -> bool {
        match self.find_summary() {
            Some((block, _)) => {
                self.set_inner_text(block, text);
                true
            }
            None => false,
        }
    }

    /// Replace the inner content of `block` with escaped `text`.
    pub fn set_inner_text(&mut self, block: Block, text: &str) {
        self.html.replace_range(block.inner_start..block.inner_end, &escape_text(text));
    }

    /// Set the text of the element with `id`. Returns false if there is no such element.
    pub fn set_text_by_id(&mut self, tag_candidates: &[&str], id: &str, text: &str) -> bool {
        let lc = to_lower(&self.html);
        let found = tag_candidates
            .iter()
            .flat_map(|tag| all_blocks(&self.html, &lc, tag))
            .find(|b| attr(b.open_tag(&self.html), "id").as_deref() == Some(id));
        match found {
            Some(b) => {
                self.set_inner_text(b, text);
                true
            }
            None => false,
        }
    }

    // ---------- form defaults ----------

    /// Fill empty `<input data-default-mode="expr" data-default-expr=…>` values.
    /// Returns how many inputs were filled.
    pub fn apply_input_defaults(&mut self, now: NaiveDateTime) -> usize {
        let lc = to_lower(&self.html);
        let mut edits: Vec<(usize, usize, String)> = Vec::new();
        let mut pos = 0usize;
        while let Some(start) = html::find_open_ci(&lc, "input", pos) {
            let Some(end) = html::tag_end(&self.html, start) else { break };
            pos = end;
            let tag = &self.html[start..end];
            if let Some(value) = form::default_for_input(tag, now) {
                edits.push((start, end, with_value(tag, &value)));
            }
        }
        let n = edits.len();
        // back to front so earlier offsets stay valid
        for (start, end, tag) in edits.into_iter().rev() {
            self.html.replace_range(start..end, &tag);
        }
        n
    }
}

/// Rewrite an `<input …>` tag with `value="…"` (replacing an existing empty value attribute).
fn with_value(tag: &str, value: &str) -> String {
    let mut tag = s!(tag);
    if let Some((span, _)) = html::attr_span(&tag, "value") {
        tag.replace_range(span, "");
    }
    let body = tag.trim_end_matches('>');
    let (body, close) = match body.strip_suffix('/') {
        Some(b) => (b.trim_end(), " />"),
        None => (body, ">"),
    };
    format!("{} value=\"{}\"{}", body.trim_end(), escape_attr(value), close)
}

impl StyleSink for Document {
    fn remove_style(&mut self, id: &str) -> bool {
        let blocks = self.style_blocks(id);
        for b in blocks.iter().rev() {
            self.html.replace_range(b.start..b.end, "");
        }
        !blocks.is_empty()
    }

    fn insert_style(&mut self, id: &str, css: &str) {
        let at = self.head_insert_point();
        let el = format!("<style id=\"{}\">{}</style>", escape_attr(id), css);
        self.html.insert_str(at, &el);
    }

    // Duplicates report as absent so the next apply collapses them to one.
    fn style(&self, id: &str) -> Option<String> {
        match self.style_blocks(id).as_slice() {
            [only] => Some(s!(only.inner(&self.html))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn style_goes_into_head_and_is_replaced() {
        let mut d = Document::new("<html><head><title>t</title></head><body></body></html>");
        d.insert_style("s", "a{}");
        assert!(d.html().contains("<style id=\"s\">a{}</style></head>"));
        assert_eq!(d.style("s").as_deref(), Some("a{}"));
        assert!(d.remove_style("s"));
        assert!(!d.remove_style("s"));
        assert_eq!(d.html(), "<html><head><title>t</title></head><body></body></html>");
    }

    #[test]
    fn head_is_created_when_missing() {
        let mut d = Document::new("<html lang=it><body>x</body></html>");
        d.insert_style("s", "a{}");
        assert_eq!(d.html(), "<html lang=it><head><style id=\"s\">a{}</style></head><body>x</body></html>");

        let mut bare = Document::new("<p>x</p>");
        bare.insert_style("s", "b{}");
        assert!(bare.html().starts_with("<head><style id=\"s\">b{}</style></head><p>"));
    }

    #[test]
    fn summary_is_found_inside_content() {
        let d = Document::new(
            "<h3>9 rows where nothing</h3><div class=\"content\"><h1>t</h1><h3>2&nbsp;rows where luogo_id = 4</h3></div>",
        );
        let (b, text) = d.find_summary().unwrap();
        assert_eq!(text, "2 rows where luogo_id = 4");
        assert!(b.open_tag(d.html()).starts_with("<h3"));
        assert!(b.start > 30);
    }

    #[test]
    fn status_text_by_id() {
        let mut d = Document::new("<p id=\"msg\">old</p>");
        assert!(d.set_text_by_id(&["p", "div", "span"], "msg", "Error: <bad>"));
        assert_eq!(d.html(), "<p id=\"msg\">Error: &lt;bad&gt;</p>");
        assert!(!d.set_text_by_id(&["p"], "nope", "x"));
    }

    #[test]
    fn defaults_fill_only_empty_expr_inputs() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(9, 5, 0).unwrap();
        let mut d = Document::new(concat!(
            r#"<input type="date" name="d" data-default-mode="expr" data-default-expr="today">"#,
            r#"<input type="datetime-local" name="t" value="" data-default-mode="expr" data-default-expr="now_local"/>"#,
            r#"<input type="date" name="keep" value="2020-01-01" data-default-mode="expr" data-default-expr="today">"#,
            r#"<input type="date" name="off" data-default-expr="today">"#,
        ));
        assert_eq!(d.apply_input_defaults(now), 2);
        assert!(d.html().contains(r#"data-default-expr="today" value="2024-03-07">"#));
        assert!(d.html().contains(r#"data-default-expr="now_local" value="2024-03-07T09:05" />"#));
        assert!(d.html().contains(r#"value="2020-01-01""#));
        assert!(d.html().contains(r#"name="off" data-default-expr="today">"#));
    }

    #[test]
    fn defaults_leave_other_attributes_alone() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(9, 5, 0).unwrap();
        let mut d = Document::new(concat!(
            r#"<input type="date" placeholder="pick a value here" data-default-mode="expr" data-default-expr="today">"#,
            r#"<input type="date" name="b" data-default-mode="expr" data-default-expr="today" value>"#,
        ));
        assert_eq!(d.apply_input_defaults(now), 2);
        assert!(d.html().contains(r#"placeholder="pick a value here""#));
        assert!(d.html().contains(r#"data-default-expr="today" value="2024-03-07"><input"#));
        assert!(d.html().ends_with(r#"name="b" data-default-mode="expr" data-default-expr="today" value="2024-03-07">"#));
    }

    #[test]
    fn header_element_is_not_the_head() {
        let mut d = Document::new("<body><header>nav</header><p>x</p></body>");
        d.insert_style("s", "a{}");
        assert!(d.html().starts_with("<head><style id=\"s\">a{}</style></head><body><header>nav</header>"));
    }
}
