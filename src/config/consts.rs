// src/config/consts.rs

// Table markup convention
pub const TABLE_CLASS: &str = "rows-and-columns";
pub const STYLE_ID: &str = "column-visibility-style";

// Engine
pub const MAX_CELLS: usize = 40_000; // skip the empty-column pass above rows*cols
pub const AUTO_HIDE_EMPTY: bool = true;

// Change handling
pub const DEBOUNCE_MS: u64 = 50;
pub const SUMMARY_DEBOUNCE_MS: u64 = 60;
pub const POLL_MS: u64 = 100;

// Label lookup / form submit
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8001/";
pub const FALLBACK_DB: &str = "output";
pub const FALLBACK_TABLE_PATH: &str = "sesso?_sort_desc=id";

// Local files
pub const LOG_FILE: &str = ".colvis/debug.log";
pub const CONFIG_FILE: &str = "colvis.conf";
