// src/config/state.rs
use super::options::AppOptions;

#[derive(Clone, Debug)]
pub struct GuiState {
    /// Document path as typed in the top bar
    pub doc_path_text: String,
    /// Page URL the document was rendered for (rules come from its query)
    pub page_url_text: String,

    /// Comma-separated rule editors
    pub allow_text: String,
    pub deny_text: String,
    pub pin_text: String,

    /// Preview: draw hidden columns greyed out instead of dropping them
    pub show_hidden: bool,
    /// Preview: show the generated CSS under the table
    pub show_css: bool,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            doc_path_text: s!(),
            page_url_text: s!(),
            allow_text: s!(),
            deny_text: s!(),
            pin_text: s!(),
            show_hidden: true,
            show_css: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}
