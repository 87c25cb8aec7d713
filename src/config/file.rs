// src/config/file.rs
//
// `key=value` config file, one setting per line, `#` comments.
//
//   max_cells=40000
//   style_id=column-visibility-style
//   table_class=rows-and-columns
//   auto_hide_empty=1
//   debounce_ms=50
//   poll_ms=100
//   base_url=http://127.0.0.1:8001/
//   labels=1
//   fk.luogo_id=output/luogo/indirizzo
//   alias.luogo_id=luogo
//   pin=id,inizio,fine
//   hide=notes
//   columns=id,name
//   form_id=sessoForm
//   fallback_redirect=output/sesso?_sort_desc=id

use std::{fs, path::Path};

use super::options::{AppOptions, ForeignKey};
use crate::core::sanitize::{normalize_name, split_csv};
use crate::error::{Error, Result};

/// Load `path` over the defaults. A missing file is not an error.
pub fn load(path: &Path) -> Result<AppOptions> {
    if !path.exists() {
        logd!("Config: {} not found, using defaults", path.display());
        return Ok(AppOptions::default());
    }
    let text = fs::read_to_string(path)?;
    parse(&text, AppOptions::default())
}

fn flag(line: usize, val: &str) -> Result<bool> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(Error::config(line, format!("expected a boolean, got '{val}'"))),
    }
}

fn number<T: std::str::FromStr>(line: usize, key: &str, val: &str) -> Result<T> {
    val.parse::<T>()
        .map_err(|_| Error::config(line, format!("{key}: expected a number, got '{val}'")))
}

/// Apply every setting in `text` on top of `opts`.
pub fn parse(text: &str, mut opts: AppOptions) -> Result<AppOptions> {
    for (ix, raw) in text.lines().enumerate() {
        let n = ix + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        let Some(eq) = line.find('=') else {
            return Err(Error::config(n, format!("missing '=' in '{line}'")));
        };
        let key = line[..eq].trim();
        let val = line[eq + 1..].trim();

        if let Some(param) = key.strip_prefix("fk.") {
            let fk = ForeignKey::parse(val)
                .ok_or_else(|| Error::config(n, format!("fk.{param}: expected db/table/label_col")))?;
            opts.labels.foreign_keys.insert(param.to_ascii_lowercase(), fk);
            continue;
        }
        if let Some(param) = key.strip_prefix("alias.") {
            opts.labels.aliases.insert(param.to_ascii_lowercase(), s!(val));
            continue;
        }

        match key {
            "max_cells" => opts.engine.max_cells = number(n, key, val)?,
            "style_id" => opts.engine.style_id = s!(val),
            "table_class" => opts.engine.table_class = s!(val),
            "auto_hide_empty" => opts.engine.auto_hide_empty = flag(n, val)?,
            "debounce_ms" => opts.host.debounce_ms = number(n, key, val)?,
            "summary_debounce_ms" => opts.host.summary_debounce_ms = number(n, key, val)?,
            "poll_ms" => opts.host.poll_ms = number(n, key, val)?,
            "base_url" => opts.labels.base_url = s!(val),
            "labels" => opts.labels.enabled = flag(n, val)?,
            "pin" => opts.rules.pinned.extend(split_csv(val).map(normalize_name)),
            "hide" => opts.rules.deny.extend(split_csv(val).map(normalize_name)),
            "columns" => opts.rules.allow.extend(split_csv(val).map(normalize_name)),
            "form_id" => opts.form.form_id = s!(val),
            "status_id" => opts.form.status_id = s!(val),
            "fallback_redirect" => {
                let (db, path) = val.split_once('/').unwrap_or((val, ""));
                opts.form.fallback_db = s!(db);
                opts.form.fallback_table_path = s!(path);
            }
            _ => logd!("Config: ignoring unknown key '{}' (line {})", key, n),
        }
    }
    Ok(opts)
}

/// Serialize the file-backed subset of `opts` (round-trips through `parse`).
pub fn render(opts: &AppOptions) -> String {
    let mut s = s!();
    let b = |v: bool| if v { 1 } else { 0 };
    s.push_str(&format!("max_cells={}\n", opts.engine.max_cells));
    s.push_str(&format!("style_id={}\n", opts.engine.style_id));
    s.push_str(&format!("table_class={}\n", opts.engine.table_class));
    s.push_str(&format!("auto_hide_empty={}\n", b(opts.engine.auto_hide_empty)));
    s.push_str(&format!("debounce_ms={}\n", opts.host.debounce_ms));
    s.push_str(&format!("summary_debounce_ms={}\n", opts.host.summary_debounce_ms));
    s.push_str(&format!("poll_ms={}\n", opts.host.poll_ms));
    s.push_str(&format!("base_url={}\n", opts.labels.base_url));
    s.push_str(&format!("labels={}\n", b(opts.labels.enabled)));
    for (param, fk) in &opts.labels.foreign_keys {
        s.push_str(&format!("fk.{}={}/{}/{}\n", param, fk.db, fk.table, fk.label_col));
    }
    for (param, alias) in &opts.labels.aliases {
        s.push_str(&format!("alias.{}={}\n", param, alias));
    }
    let list = |set: &std::collections::BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(",");
    if !opts.rules.pinned.is_empty() { s.push_str(&format!("pin={}\n", list(&opts.rules.pinned))); }
    if !opts.rules.deny.is_empty() { s.push_str(&format!("hide={}\n", list(&opts.rules.deny))); }
    if !opts.rules.allow.is_empty() { s.push_str(&format!("columns={}\n", list(&opts.rules.allow))); }
    s.push_str(&format!("form_id={}\n", opts.form.form_id));
    s.push_str(&format!("status_id={}\n", opts.form.status_id));
    s.push_str(&format!(
        "fallback_redirect={}/{}\n",
        opts.form.fallback_db, opts.form.fallback_table_path
    ));
    s
}

pub fn save(path: &Path, opts: &AppOptions) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render(opts))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_section() {
        let text = "\
# comment
max_cells = 10
auto_hide_empty=off
fk.Luogo_id=output/luogo/indirizzo
alias.luogo_id=luogo
pin=id, inizio
hide=Notes
fallback_redirect=cassa/sesso?_sort_desc=id
whatever=1
";
        let o = parse(text, AppOptions::default()).unwrap();
        assert_eq!(o.engine.max_cells, 10);
        assert!(!o.engine.auto_hide_empty);
        assert_eq!(o.labels.foreign_keys["luogo_id"].label_col, "indirizzo");
        assert_eq!(o.labels.aliases["luogo_id"], "luogo");
        assert_eq!(o.rules.pinned, names!["id", "inizio"]);
        assert_eq!(o.rules.deny, names!["notes"]);
        assert_eq!(o.form.fallback_db, "cassa");
        assert_eq!(o.form.fallback_table_path, "sesso?_sort_desc=id");
    }

    #[test]
    fn bad_values_report_line() {
        let err = parse("\nmax_cells=lots", AppOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Config { line: 2, .. }));
        assert!(parse("labels=maybe", AppOptions::default()).is_err());
        assert!(parse("no equals sign", AppOptions::default()).is_err());
        assert!(parse("fk.x_id=broken", AppOptions::default()).is_err());
    }

    #[test]
    fn render_round_trips() {
        let mut o = AppOptions::default();
        o.engine.max_cells = 7;
        o.labels.enabled = true;
        o.labels.foreign_keys.insert(s!("luogo_id"), ForeignKey::new("output", "luogo", "indirizzo"));
        o.rules.pinned = names!["id"];
        let back = parse(&render(&o), AppOptions::default()).unwrap();
        assert_eq!(back, o);
    }
}
