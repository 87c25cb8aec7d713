// src/core/mod.rs

pub mod html;
pub mod vischars;
pub mod net;
pub mod sanitize;

pub use vischars::VisChars;
