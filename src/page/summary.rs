// src/page/summary.rs
//! Rewrites the "N rows where col_id = 4" summary so foreign-key ids read as labels.
//!
//! For each `*_id` query parameter with a configured `ForeignKey`, the record
//! endpoint `/{db}/{table}/{id}.json?_shape=objects` is asked for `label_col`.
//! A failed lookup keeps the raw id for that one value; nothing here aborts the page.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use url::{Url, form_urlencoded};

use crate::config::options::{ForeignKey, LabelOptions};
use crate::core::net;
use crate::error::{Error, Result};

use super::document::Document;

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d+)\s+rows?\s+where\s+").unwrap_or_else(|_| unreachable!()))
}

/// Does `text` (already cleaned) look like a summary line?
pub fn is_summary(text: &str) -> bool {
    summary_re().is_match(text.trim())
}

/// The leading row count of a summary line.
pub fn row_count(text: &str) -> Option<&str> {
    summary_re().captures(text.trim()).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Resolves one foreign-key id to a display label.
pub trait LabelSource {
    /// `Ok(None)` when the record exists but has no usable label.
    fn label(&self, fk: &ForeignKey, id: &str) -> Result<Option<String>>;
}

/// Label lookups over HTTP against the JSON record endpoints.
#[derive(Clone, Debug)]
pub struct HttpLabelSource {
    base: Url,
}

impl HttpLabelSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = join!(base.path(), "/");
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn record_url(&self, fk: &ForeignKey, id: &str) -> Result<Url> {
        let path = format!(
            "{}/{}/{}.json",
            urlencoding::encode(&fk.db),
            urlencoding::encode(&fk.table),
            urlencoding::encode(id)
        );
        let mut url = self.base.join(&path)?;
        url.set_query(Some("_shape=objects"));
        Ok(url)
    }
}

impl LabelSource for HttpLabelSource {
    fn label(&self, fk: &ForeignKey, id: &str) -> Result<Option<String>> {
        let url = self.record_url(fk, id)?;
        let resp = net::http_get(&url)?;
        if !resp.is_success() {
            return Err(Error::http(resp.status, url.to_string()));
        }
        let json: Value = serde_json::from_str(&resp.body)?;
        Ok(label_from_json(&json, &fk.label_col))
    }
}

/// Pull `col` out of a record body: either the object itself or `rows[0]`.
pub fn label_from_json(json: &Value, col: &str) -> Option<String> {
    let field = json
        .get(col)
        .or_else(|| json.get("rows")?.get(0)?.get(col))?;
    match field {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Left-hand side for a parameter: configured alias, else `luogo_id` → `luogo`, `_` → space.
pub fn alias_for(param: &str, opts: &LabelOptions) -> String {
    if let Some(a) = opts.aliases.get(param) {
        return a.clone();
    }
    param.strip_suffix("_id").unwrap_or(param).replace('_', " ")
}

/// Build the rewritten summary, or `None` when the query has no `*_id` parameters.
pub fn rewrite(original: &str, query: &str, opts: &LabelOptions, source: &dyn LabelSource) -> Option<String> {
    // One part per pair, in query order; repeated keys repeat the alias.
    let parts: Vec<String> = form_urlencoded::parse(query.as_bytes())
        .filter_map(|(k, v)| {
            let key = k.to_lowercase();
            if !key.ends_with("_id") || v.is_empty() {
                return None;
            }
            Some(format!("{} = {}", alias_for(&key, opts), resolve(&key, &v, opts, source)))
        })
        .collect();
    if parts.is_empty() {
        return None;
    }

    let n = row_count(original);
    let lead = match n {
        Some(n) => format!("{n} row{} where ", if n == "1" { "" } else { "s" }),
        None => s!("rows where "),
    };
    Some(join!(&lead, &parts.join(" and ")))
}

fn resolve(key: &str, id: &str, opts: &LabelOptions, source: &dyn LabelSource) -> String {
    let Some(fk) = opts.foreign_keys.get(key) else { return s!(id) };
    match source.label(fk, id) {
        Ok(Some(label)) => label,
        Ok(None) => s!(id),
        Err(e) => {
            loge!("Labels: lookup {}={} failed: {}", key, id, e);
            s!(id)
        }
    }
}

/// Find the summary element in `doc` and rewrite it. Returns whether the document changed.
pub fn rewrite_document(doc: &mut Document, query: &str, opts: &LabelOptions, source: &dyn LabelSource) -> bool {
    let Some((block, text)) = doc.find_summary() else { return false };
    match rewrite(&text, query, opts, source) {
        Some(new_text) if new_text != text => {
            logd!("Labels: '{}' → '{}'", text, new_text);
            doc.set_inner_text(block, &new_text);
            true
        }
        _ => false,
    }
}
