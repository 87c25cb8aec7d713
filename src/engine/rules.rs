// src/engine/rules.rs
//! Declarative visibility rules and their derivation from a page URL.
//!
//! Query-string convention (repeatable, comma-separated values allowed):
//! - `_hide=<name>`     → deny
//! - `_columns=<name>`  → allow (everything else hidden)
//! - `_auto_hide_empty=0|off|false|no` → disable the empty-column pass for this page

use std::collections::BTreeSet;

use url::{Url, form_urlencoded};

use crate::core::sanitize::{normalize_name, split_csv};

pub const PARAM_HIDE: &str = "_hide";
pub const PARAM_COLUMNS: &str = "_columns";
pub const PARAM_AUTO_HIDE: &str = "_auto_hide_empty";

/// Which columns to hide. All names are stored normalized (trimmed, lower-cased).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityRules {
    /// Non-empty ⇒ allow-list mode: every other column is hidden.
    pub allow: BTreeSet<String>,
    pub deny: BTreeSet<String>,
    /// Hide columns whose cells are all visibly empty.
    pub auto_hide_empty: bool,
    /// Never auto-hidden (explicit allow/deny still apply).
    pub pinned: BTreeSet<String>,
}

impl VisibilityRules {
    pub fn new() -> Self { Self::default() }

    pub fn allow<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.allow.extend(names.into_iter().map(|n| normalize_name(n.as_ref())));
        self
    }

    pub fn deny<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.deny.extend(names.into_iter().map(|n| normalize_name(n.as_ref())));
        self
    }

    pub fn pin<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.pinned.extend(names.into_iter().map(|n| normalize_name(n.as_ref())));
        self
    }

    pub fn auto_hide_empty(mut self, on: bool) -> Self {
        self.auto_hide_empty = on;
        self
    }

    /// Nothing to do at all: no allow/deny and no auto pass.
    pub fn is_noop(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty() && !self.auto_hide_empty
    }

    /// Derive rules from a raw query string (no leading `?`).
    /// `auto_default` is the auto-hide policy when the page does not say otherwise.
    pub fn from_query(query: &str, auto_default: bool) -> Self {
        let mut rules = Self::new().auto_hide_empty(auto_default);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                PARAM_HIDE => rules.deny.extend(split_csv(&value).map(normalize_name)),
                PARAM_COLUMNS => rules.allow.extend(split_csv(&value).map(normalize_name)),
                PARAM_AUTO_HIDE => {
                    let v = value.trim().to_ascii_lowercase();
                    if matches!(v.as_str(), "0" | "off" | "false" | "no") {
                        rules.auto_hide_empty = false;
                    } else if matches!(v.as_str(), "1" | "on" | "true" | "yes") {
                        rules.auto_hide_empty = true;
                    }
                }
                _ => {}
            }
        }
        rules
    }

    pub fn from_url(url: &Url, auto_default: bool) -> Self {
        Self::from_query(url.query().unwrap_or(""), auto_default)
    }

    /// Layer `other` on top: sets are unioned, `other`'s auto flag only ever switches the pass off.
    pub fn merge(mut self, other: &VisibilityRules) -> Self {
        self.allow.extend(other.allow.iter().cloned());
        self.deny.extend(other.deny.iter().cloned());
        self.pinned.extend(other.pinned.iter().cloned());
        self.auto_hide_empty &= other.auto_hide_empty;
        self
    }

    /// Render back to query pairs (for the GUI's URL field and logs).
    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(s!());
        for name in &self.allow { ser.append_pair(PARAM_COLUMNS, name); }
        for name in &self.deny { ser.append_pair(PARAM_HIDE, name); }
        if !self.auto_hide_empty { ser.append_pair(PARAM_AUTO_HIDE, "off"); }
        ser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_and_comma_separated_params() {
        let r = VisibilityRules::from_query("_hide=Notes&_hide=a,%20B&_columns=id&x=1", true);
        assert_eq!(r.deny, names!["notes", "a", "b"]);
        assert_eq!(r.allow, names!["id"]);
        assert!(r.auto_hide_empty);
    }

    #[test]
    fn auto_hide_switch() {
        for off in ["0", "off", "FALSE", "no"] {
            let r = VisibilityRules::from_query(&format!("_auto_hide_empty={off}"), true);
            assert!(!r.auto_hide_empty, "{off}");
        }
        assert!(VisibilityRules::from_query("_auto_hide_empty=on", false).auto_hide_empty);
        assert!(!VisibilityRules::from_query("_auto_hide_empty=maybe", false).auto_hide_empty);
    }

    #[test]
    fn plus_is_a_space() {
        let r = VisibilityRules::from_query("_hide=Created+At", false);
        assert!(r.deny.contains("created at"));
    }

    #[test]
    fn query_round_trips_through_url() {
        let r = VisibilityRules::new().deny(["Notes"]).allow(["id", "name"]).auto_hide_empty(false);
        let url = Url::parse(&format!("http://h/db/t?{}", r.to_query())).unwrap();
        assert_eq!(VisibilityRules::from_url(&url, true), r);
    }

    #[test]
    fn merge_unions_and_can_only_disable_auto() {
        let base = VisibilityRules::new().deny(["a"]).auto_hide_empty(true);
        let page = VisibilityRules::new().deny(["b"]).auto_hide_empty(false);
        let m = base.merge(&page);
        assert_eq!(m.deny, names!["a", "b"]);
        assert!(!m.auto_hide_empty);
    }
}
