// src/gui/components/mod.rs
pub mod css_view;
pub mod data_table;
pub mod rules_panel;
pub mod top_bar;
