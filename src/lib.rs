// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod error;
pub mod core;
pub mod config;
pub mod engine;
pub mod page;
pub mod status;
pub mod runner;
pub mod watch;

pub mod cli;
pub mod gui;

pub use error::{Error, Result};
