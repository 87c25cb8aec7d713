// src/page/form.rs
//! The data-entry form: default values, serialization and submission.
//!
//! Submission never fails outward. Whatever goes wrong ends up as a
//! `SubmitOutcome::Failed` plus an "Error: …" status line.

use chrono::NaiveDateTime;
use serde::Deserialize;
use url::{Url, form_urlencoded};

use crate::config::options::FormOptions;
use crate::core::html::{self, attr, to_lower};
use crate::core::net::{self, Response};
use crate::core::sanitize::{clean_text, normalize_entities};
use crate::error::Result;
use crate::status::StatusSink;

pub const MSG_SAVING: &str = "Saving…";
pub const MSG_OK: &str = "OK. Opening table…";
pub const MSG_SUBMIT_FAILED: &str = "submit failed";

/// Value for a default expression, if it applies to this input type.
pub fn default_value(expr: &str, input_type: &str, now: NaiveDateTime) -> Option<String> {
    match (expr, input_type) {
        ("today", "date") => Some(now.format("%Y-%m-%d").to_string()),
        ("now_local", "datetime-local") => Some(now.format("%Y-%m-%dT%H:%M").to_string()),
        _ => None,
    }
}

/// Default for one `<input …>` open tag: only `data-default-mode="expr"` inputs
/// with no value yet.
pub fn default_for_input(tag: &str, now: NaiveDateTime) -> Option<String> {
    let mode = attr(tag, "data-default-mode")?;
    if mode.trim() != "expr" {
        return None;
    }
    let expr = attr(tag, "data-default-expr")?;
    if attr(tag, "value").is_some_and(|v| !v.is_empty()) {
        return None;
    }
    let ty = attr(tag, "type").unwrap_or_else(|| s!("text")).to_ascii_lowercase();
    default_value(expr.trim(), &ty, now)
}

/// A form as the browser would submit it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub id: String,
    pub action: String,
    pub method: String,
    /// Successful controls in document order.
    pub fields: Vec<(String, String)>,
}

impl Form {
    /// Find `<form id=form_id>` in `doc` and collect its fields.
    pub fn parse(doc: &str, form_id: &str) -> Option<Self> {
        let block = html::blocks_ci(doc, "form")
            .into_iter()
            .find(|b| attr(b.open_tag(doc), "id").as_deref() == Some(form_id))?;
        let open = block.open_tag(doc);
        let inner = block.inner(doc);
        let lc = to_lower(inner);

        let mut found: Vec<(usize, String, String)> = Vec::new();

        let mut pos = 0usize;
        while let Some(start) = html::find_open_ci(&lc, "input", pos) {
            let Some(end) = html::tag_end(inner, start) else { break };
            pos = end;
            if let Some((k, v)) = input_field(&inner[start..end]) {
                found.push((start, k, v));
            }
        }
        for b in html::blocks_ci(inner, "select") {
            let Some(name) = attr(b.open_tag(inner), "name") else { continue };
            if let Some(v) = select_value(b.inner(inner)) {
                found.push((b.start, name, v));
            }
        }
        for b in html::blocks_ci(inner, "textarea") {
            let Some(name) = attr(b.open_tag(inner), "name") else { continue };
            found.push((b.start, name, normalize_entities(b.inner(inner))));
        }
        found.sort_by_key(|(at, _, _)| *at);

        Some(Self {
            id: s!(form_id),
            action: attr(open, "action").unwrap_or_default(),
            method: attr(open, "method").unwrap_or_else(|| s!("get")).to_ascii_lowercase(),
            fields: found.into_iter().map(|(_, k, v)| (k, v)).collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(s!())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

fn input_field(tag: &str) -> Option<(String, String)> {
    let name = attr(tag, "name").filter(|n| !n.is_empty())?;
    if attr(tag, "disabled").is_some() {
        return None;
    }
    let ty = attr(tag, "type").unwrap_or_else(|| s!("text")).to_ascii_lowercase();
    match ty.as_str() {
        "submit" | "button" | "reset" | "image" | "file" => None,
        "checkbox" | "radio" => {
            attr(tag, "checked")?;
            Some((name, attr(tag, "value").unwrap_or_else(|| s!("on"))))
        }
        _ => Some((name, attr(tag, "value").unwrap_or_default())),
    }
}

fn select_value(inner: &str) -> Option<String> {
    let options = html::blocks_ci(inner, "option");
    let chosen = options
        .iter()
        .find(|o| attr(o.open_tag(inner), "selected").is_some())
        .or_else(|| options.first())?;
    Some(attr(chosen.open_tag(inner), "value").unwrap_or_else(|| clean_text(&html::strip_tags(chosen.inner(inner)))))
}

/// Body of the endpoint's JSON answer.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SubmitResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub table_url: Option<String>,
    #[serde(default)]
    pub db_name: Option<String>,
}

/// How a urlencoded body reaches the server.
pub trait FormTransport {
    fn post(&self, url: &Url, body: &str) -> Result<Response>;
}

/// Plain HTTP via `core::net`.
pub struct HttpTransport;
impl FormTransport for HttpTransport {
    fn post(&self, url: &Url, body: &str) -> Result<Response> {
        net::http_post_form(url, body)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Where the browser should go next.
    Redirect(String),
    /// User-facing error text (without the "Error: " prefix).
    Failed(String),
}

/// Fallback target when the server does not name one.
pub fn fallback_redirect(db_name: Option<&str>, opts: &FormOptions) -> String {
    let db = db_name.filter(|d| !d.is_empty()).unwrap_or(&opts.fallback_db);
    format!("/{}/{}", db, opts.fallback_table_path)
}

/// POST `form` to its action (resolved against `base`) and interpret the answer.
pub fn submit(
    form: &Form,
    base: &Url,
    transport: &dyn FormTransport,
    opts: &FormOptions,
    status: &mut dyn StatusSink,
) -> SubmitOutcome {
    status.status(MSG_SAVING);

    let url = match base.join(&form.action) {
        Ok(u) => u,
        Err(e) => return fail(&form.id, status, e.to_string()),
    };
    let body = form.encode();
    logd!("Form {}: POST {} ({} fields)", form.id, url, form.fields.len());

    let resp = match transport.post(&url, &body) {
        Ok(r) => r,
        Err(e) => return fail(&form.id, status, e.to_string()),
    };
    // A body that is not JSON counts the same as a missing error message.
    let data: Option<SubmitResponse> = serde_json::from_str(&resp.body).ok();

    match data {
        Some(d) if resp.is_success() && d.ok => {
            status.status(MSG_OK);
            let target = d
                .table_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| fallback_redirect(d.db_name.as_deref(), opts));
            logf!("Form {}: saved, redirect to {}", form.id, target);
            SubmitOutcome::Redirect(target)
        }
        other => {
            let msg = other
                .and_then(|d| d.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| s!(MSG_SUBMIT_FAILED));
            fail(&form.id, status, msg)
        }
    }
}

fn fail(form_id: &str, status: &mut dyn StatusSink, msg: String) -> SubmitOutcome {
    loge!("Form {}: {}", form_id, msg);
    status.status(&join!("Error: ", &msg));
    SubmitOutcome::Failed(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::status::NullStatus;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    struct Canned {
        reply: Result<Response>,
        seen: RefCell<Vec<(String, String)>>,
    }

    impl Canned {
        fn ok(status: u16, body: &str) -> Self {
            Self { reply: Ok(Response { status, body: s!(body) }), seen: RefCell::new(vec![]) }
        }
    }

    impl FormTransport for Canned {
        fn post(&self, url: &Url, body: &str) -> Result<Response> {
            self.seen.borrow_mut().push((url.to_string(), s!(body)));
            match &self.reply {
                Ok(r) => Ok(r.clone()),
                Err(_) => Err(Error::Unsupported(s!("offline"))),
            }
        }
    }

    const FORM: &str = r#"
<form id="sessoForm" action="/-/sesso/insert" method="POST">
  <input type="text" name="nome" value="Ann &amp; Bob">
  <input type="date" name="giorno" value="2024-03-07">
  <input type="checkbox" name="flag" checked>
  <input type="checkbox" name="unset" value="x">
  <select name="luogo_id"><option value="1">A</option><option value="2" selected>B</option></select>
  <select name="tipo"><option>Prima</option><option>Seconda</option></select>
  <textarea name="note">riga</textarea>
  <input type="submit" name="go" value="Save">
</form>"#;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:8001/output/sesso").unwrap()
    }

    #[test]
    fn defaults_by_type() {
        let now = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap().and_hms_opt(23, 59, 30).unwrap();
        assert_eq!(default_value("today", "date", now).as_deref(), Some("2025-12-01"));
        assert_eq!(default_value("now_local", "datetime-local", now).as_deref(), Some("2025-12-01T23:59"));
        assert_eq!(default_value("today", "datetime-local", now), None);
        assert_eq!(default_value("tomorrow", "date", now), None);
    }

    #[test]
    fn parses_successful_controls_in_order() {
        let f = Form::parse(FORM, "sessoForm").unwrap();
        assert_eq!(f.action, "/-/sesso/insert");
        assert_eq!(f.method, "post");
        let names: Vec<_> = f.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["nome", "giorno", "flag", "luogo_id", "tipo", "note"]);
        assert_eq!(f.get("nome"), Some("Ann & Bob"));
        assert_eq!(f.get("flag"), Some("on"));
        assert_eq!(f.get("luogo_id"), Some("2"));
        assert_eq!(f.get("tipo"), Some("Prima"));
        assert!(f.encode().starts_with("nome=Ann+%26+Bob&giorno=2024-03-07"));
        assert!(Form::parse(FORM, "other").is_none());
    }

    #[test]
    fn success_redirects_to_table_url_or_fallback() {
        let f = Form::parse(FORM, "sessoForm").unwrap();
        let opts = FormOptions::default();

        let t = Canned::ok(200, r#"{"ok":true,"table_url":"/output/sesso?_sort_desc=id"}"#);
        let mut msgs: Vec<String> = vec![];
        let out = submit(&f, &base(), &t, &opts, &mut msgs);
        assert_eq!(out, SubmitOutcome::Redirect(s!("/output/sesso?_sort_desc=id")));
        assert_eq!(msgs, vec![MSG_SAVING, MSG_OK]);
        assert_eq!(t.seen.borrow()[0].0, "http://127.0.0.1:8001/-/sesso/insert");

        let t = Canned::ok(200, r#"{"ok":true,"db_name":"cassa"}"#);
        let out = submit(&f, &base(), &t, &opts, &mut NullStatus);
        assert_eq!(out, SubmitOutcome::Redirect(s!("/cassa/sesso?_sort_desc=id")));

        let t = Canned::ok(200, r#"{"ok":true}"#);
        let out = submit(&f, &base(), &t, &opts, &mut NullStatus);
        assert_eq!(out, SubmitOutcome::Redirect(s!("/output/sesso?_sort_desc=id")));
    }

    #[test]
    fn failures_surface_as_status() {
        let f = Form::parse(FORM, "sessoForm").unwrap();
        let opts = FormOptions::default();

        let mut msgs: Vec<String> = vec![];
        let t = Canned::ok(400, r#"{"ok":false,"error":"giorno mancante"}"#);
        assert_eq!(submit(&f, &base(), &t, &opts, &mut msgs), SubmitOutcome::Failed(s!("giorno mancante")));
        assert_eq!(msgs.last().map(String::as_str), Some("Error: giorno mancante"));

        let t = Canned::ok(500, "<html>oops</html>");
        assert_eq!(submit(&f, &base(), &t, &opts, &mut NullStatus), SubmitOutcome::Failed(s!(MSG_SUBMIT_FAILED)));

        let t = Canned::ok(200, r#"{"ok":"yes"}"#);
        assert_eq!(submit(&f, &base(), &t, &opts, &mut NullStatus), SubmitOutcome::Failed(s!(MSG_SUBMIT_FAILED)));

        let t = Canned { reply: Err(Error::Unsupported(s!("x"))), seen: RefCell::new(vec![]) };
        assert!(matches!(submit(&f, &base(), &t, &opts, &mut NullStatus), SubmitOutcome::Failed(_)));
    }
}
