//! The UI surface a chat session reads from and renders into.

use shared::domain::LogEntry;

/// The three controls the session drives: a log container, a text input and
/// (implicitly, through [`crate::SessionEvent::SendRequested`]) a send
/// trigger.
pub trait ChatView {
    fn input_value(&self) -> String;
    fn set_input_value(&mut self, value: &str);
    /// Adds a non-interactive entry at the end of the log.
    fn append_entry(&mut self, entry: &LogEntry);
    /// Moves the log's scroll position so the newest entry is visible.
    fn scroll_to_bottom(&mut self);
}

/// In-memory view that keeps every rendered line.
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    entries: Vec<String>,
    input: String,
    scroll_top: usize,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// Index of the first entry past the visible region; equals the entry
    /// count when scrolled all the way down.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top == self.entries.len()
    }
}

impl ChatView for MemoryView {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input = value.to_string();
    }

    fn append_entry(&mut self, entry: &LogEntry) {
        self.entries.push(entry.to_string());
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.entries.len();
    }
}
