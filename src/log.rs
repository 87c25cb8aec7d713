// src/log.rs
//
// Thin macros over the `log` facade plus a file logger setup.
// Nothing is written until `init` installs a logger; the macros are free otherwise.

use std::fs::{self, File};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

static START: OnceLock<Instant> = OnceLock::new();

/// Elapsed time since the logger was initialized, as `hh:mm:ss.mmm`.
pub fn elapsed() -> String {
    let ms = START.get_or_init(Instant::now).elapsed().as_millis() as u64;
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1_000;
    let ms = ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Install a file logger at `path` (parent dirs are created).
/// Returns false if the file could not be opened or a logger already exists.
pub fn init(path: &Path, level: LevelFilter) -> bool {
    START.get_or_init(Instant::now);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let file = match File::create(path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, config, file).is_ok()
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        ::log::info!("[{}] {}", $crate::log::elapsed(), format!($($arg)*))
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        ::log::debug!("[{}] {}", $crate::log::elapsed(), format!($($arg)*))
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        ::log::error!("[{}] {}", $crate::log::elapsed(), format!($($arg)*))
    };
}
