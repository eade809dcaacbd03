//! Structured outcome of processing one webhook request.
//!
//! The pipeline accumulates ordered, human-readable diagnostic lines and a
//! final disposition into a value that the HTTP layer renders as a plain-text
//! response. This replaces mutation of a shared text buffer from nested
//! closures with an explicit return value.

use serde::Serialize;

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

/// Final disposition of a processed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDisposition {
    /// Handled, benignly skipped, or not handled; acknowledged with a 200.
    Handled,
    /// Signature verification failed; 401, nothing processed.
    Unauthorized,
    /// A handler or the classifier hit an operational error; 500.
    Failed,
}

/// Ordered diagnostic lines plus the request's disposition.
#[derive(Debug)]
pub struct HookReport {
    lines: Vec<String>,
    disposition: HookDisposition,
}

impl HookReport {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            disposition: HookDisposition::Handled,
        }
    }

    /// Appends one diagnostic line.
    pub fn note(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends a value pretty-printed as JSON, for upstream response bodies
    /// and similar diagnostics.
    pub fn note_json<T: Serialize>(&mut self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => self.lines.push(text),
            Err(e) => self.lines.push(format!("<unserializable diagnostic: {e}>")),
        }
    }

    /// Sets the final disposition, consuming the report for chaining.
    pub fn resolve(mut self, disposition: HookDisposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn disposition(&self) -> HookDisposition {
        self.disposition
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Renders the accumulated lines as the plain-text response body.
    pub fn body(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

impl Default for HookReport {
    fn default() -> Self {
        Self::new()
    }
}
