// src/engine/mod.rs
//! Pure column-visibility core: snapshot types, rules, evaluation, the style
//! directive and the debounce primitive. Nothing here touches files or sockets.

pub mod types;
pub mod rules;
pub mod visibility;
pub mod directive;
pub mod debounce;

pub use types::{Cell, CellNode, Header, HiddenColumns, TableSnapshot};
pub use rules::VisibilityRules;
pub use visibility::{AutoPass, ColumnVisibilityEngine, Evaluation, cell_is_visibly_empty};
pub use directive::{Applied, StyleSheet, StyleSink};
pub use debounce::{Debounce, Debouncer};
