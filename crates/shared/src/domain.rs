use std::fmt;

/// Fixed status lines the client writes into the chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ConnectionError,
    Disconnected,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::ConnectionError => "Error connecting to the server.",
            Notice::Disconnected => "Disconnected from the server.",
        }
    }
}

/// One rendered line of the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Received(String),
    Sent(String),
    Notice(Notice),
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Received(text) => f.write_str(text),
            LogEntry::Sent(text) => write!(f, "You: {text}"),
            LogEntry::Notice(notice) => f.write_str(notice.text()),
        }
    }
}
