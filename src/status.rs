// src/status.rs
/// Short human-readable status lines from operations the user is waiting on
/// (form submission, refresh passes). Frontends decide where they show up.
pub trait StatusSink {
    fn status(&mut self, msg: &str);
}

/// Drops every message.
pub struct NullStatus;
impl StatusSink for NullStatus {
    fn status(&mut self, _msg: &str) {}
}

/// Sends messages to the debug log.
pub struct LogStatus;
impl StatusSink for LogStatus {
    fn status(&mut self, msg: &str) {
        logf!("Status: {}", msg);
    }
}

/// Collects messages (tests, CLI summaries).
impl StatusSink for Vec<String> {
    fn status(&mut self, msg: &str) {
        self.push(s!(msg));
    }
}

/// Writes the latest message into the page element with the given id.
pub struct DocumentStatus<'a> {
    pub doc: &'a mut crate::page::Document,
    pub id: &'a str,
}

impl StatusSink for DocumentStatus<'_> {
    fn status(&mut self, msg: &str) {
        if !self.doc.set_text_by_id(&["p", "div", "span"], self.id, msg) {
            logd!("Status: no element #{} for '{}'", self.id, msg);
        }
    }
}

/// Fan out to two sinks.
pub struct Tee<'a>(pub &'a mut dyn StatusSink, pub &'a mut dyn StatusSink);
impl StatusSink for Tee<'_> {
    fn status(&mut self, msg: &str) {
        self.0.status(msg);
        self.1.status(msg);
    }
}
