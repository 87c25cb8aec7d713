// tests/config.rs
use std::fs;
use std::path::PathBuf;

use colvis::config::file;
use colvis::config::options::{AppOptions, ForeignKey};
use colvis::names;

fn tmp_file(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("colvis_cfg_{}_{}", std::process::id(), name));
    let _ = fs::remove_file(&p);
    p
}

#[test]
fn missing_file_gives_defaults() {
    let opts = file::load(&tmp_file("absent.conf")).unwrap();
    assert_eq!(opts, AppOptions::default());
    assert_eq!(opts.engine.max_cells, 40_000);
    assert_eq!(opts.engine.style_id, "column-visibility-style");
    assert_eq!(opts.host.debounce_ms, 50);
}

#[test]
fn save_then_load() {
    let path = tmp_file("roundtrip.conf");
    let mut opts = AppOptions::default();
    opts.engine.auto_hide_empty = false;
    opts.host.poll_ms = 250;
    opts.labels.enabled = true;
    opts.labels.base_url = "http://localhost:9000/".into();
    opts.labels.foreign_keys.insert("luogo_id".into(), ForeignKey::new("output", "luogo", "indirizzo"));
    opts.rules.deny = names!["Notes", "extra"];
    file::save(&path, &opts).unwrap();

    let back = file::load(&path).unwrap();
    assert_eq!(back, opts);
    let _ = fs::remove_file(&path);
}

#[test]
fn malformed_file_is_an_error() {
    let path = tmp_file("bad.conf");
    fs::write(&path, "max_cells=40000\ndebounce_ms=soon\n").unwrap();
    let err = file::load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Config line 2"));
    let _ = fs::remove_file(&path);
}
