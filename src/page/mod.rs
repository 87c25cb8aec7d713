// src/page/mod.rs
// The rendered page: table snapshotting, style host, summary line and form.
pub mod cell;
pub mod document;
pub mod form;
pub mod snapshot;
pub mod summary;

pub use document::Document;
