//! Line-oriented terminal rendering of the chat log.

use std::io::Write;

use client_core::ChatView;
use shared::domain::LogEntry;
use tracing::warn;

/// Writes each log entry as one line. The input control is the line the
/// user is currently submitting, fed in through `InputChanged` events.
pub struct TerminalView<W: Write> {
    out: W,
    input: String,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            input: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input = value.to_string();
    }

    fn append_entry(&mut self, entry: &LogEntry) {
        if let Err(error) = writeln!(self.out, "{entry}") {
            warn!(%error, "failed to write chat log entry");
        }
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(error) = self.out.flush() {
            warn!(%error, "failed to flush chat log");
        }
    }
}
