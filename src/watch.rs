// src/watch.rs
// Keep an output document in sync with an input file that keeps being rewritten.
//
// The input is polled (mtime + length). Every observed change is one
// notification; bursts collapse through the `Debouncer` into a single refresh.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::SystemTime;

use url::Url;

use crate::config::options::AppOptions;
use crate::engine::Debouncer;
use crate::error::Result;
use crate::page::summary::{HttpLabelSource, LabelSource};
use crate::runner::{self, RefreshReport};

/// What we compare between polls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileSignature {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileSignature {
    /// `None` when the file cannot be stat'ed (e.g. mid-replace).
    pub fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self { modified: meta.modified().ok(), len: meta.len() })
    }
}

/// Change detector for one path.
#[derive(Debug)]
pub struct Watcher {
    path: PathBuf,
    last: Option<FileSignature>,
}

impl Watcher {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf(), last: FileSignature::of(path) }
    }

    /// True when the signature moved since the previous call.
    pub fn check(&mut self) -> bool {
        let now = FileSignature::of(&self.path);
        if now != self.last {
            self.last = now;
            true
        } else {
            false
        }
    }
}

fn label_source(opts: &AppOptions) -> Option<Box<dyn LabelSource + Send>> {
    if !opts.labels.enabled {
        return None;
    }
    match HttpLabelSource::new(&opts.labels.base_url) {
        Ok(s) => Some(Box::new(s)),
        Err(e) => {
            loge!("Watch: bad base_url '{}': {}; labels disabled", opts.labels.base_url, e);
            None
        }
    }
}

/// Refresh once, then again after every settled burst of changes to `input`,
/// until `stop` is set. `on_report` sees every refresh (errors are logged and skipped).
pub fn watch<F>(
    input: &Path,
    output: Option<&Path>,
    url: Option<&Url>,
    opts: &AppOptions,
    stop: Arc<AtomicBool>,
    on_report: F,
) -> Result<()>
where
    F: FnMut(&RefreshReport) + Send + 'static,
{
    let labels = label_source(opts);
    let first = runner::refresh_file(input, output, url, opts, labels.as_deref().map(|l| l as &dyn LabelSource))?;
    let on_report = Arc::new(Mutex::new(on_report));
    if let Ok(mut f) = on_report.lock() {
        f(&first);
    }

    // When rewriting in place our own write is a change too; the second pass is a no-op.
    let input_buf = input.to_path_buf();
    let output_buf = output.map(Path::to_path_buf);
    let url_owned = url.cloned();
    let opts_owned = opts.clone();
    let sink = Arc::clone(&on_report);

    let debouncer = Debouncer::new(opts.host.watch_debounce(opts.labels.enabled), move || {
        let res = runner::refresh_file(
            &input_buf,
            output_buf.as_deref(),
            url_owned.as_ref(),
            &opts_owned,
            labels.as_deref().map(|l| l as &dyn LabelSource),
        );
        match res {
            Ok(report) => {
                if let Ok(mut f) = sink.lock() {
                    f(&report);
                }
            }
            Err(e) => loge!("Watch: refresh failed: {}", e),
        }
    });

    let mut watcher = Watcher::new(input);
    logf!("Watch: polling {} every {} ms", input.display(), opts.host.poll_ms);
    while !stop.load(Ordering::Relaxed) {
        thread::sleep(opts.host.poll());
        if watcher.check() {
            debouncer.notify();
        }
    }
    debouncer.flush();
    drop(debouncer);
    logf!("Watch: stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watcher_sees_rewrites() {
        let path = std::env::temp_dir().join(format!("colvis_watch_sig_{}.html", std::process::id()));
        fs::write(&path, "a").unwrap();
        let mut w = Watcher::new(&path);
        assert!(!w.check());
        fs::write(&path, "abc").unwrap();
        assert!(w.check());
        assert!(!w.check());
        fs::remove_file(&path).unwrap();
        assert!(w.check(), "disappearing counts as a change");
    }
}
