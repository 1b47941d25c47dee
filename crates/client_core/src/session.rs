//! Chat session controller: turns UI and transport events into log entries
//! and outbound sends.

use shared::domain::{LogEntry, Notice};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::{transport::Transport, view::ChatView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other(String),
}

/// Whitespace as a browser's `String.prototype.trim` sees it: Unicode
/// `White_Space` plus the byte order mark, minus NEL.
fn is_input_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c != '\u{85}' && c.is_whitespace())
}

/// Everything that can happen to a session, from either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The text input now holds this value.
    InputChanged(String),
    SendRequested,
    KeyPressed(Key),
    MessageReceived(String),
    TransportError(String),
    TransportClosed,
    /// No further input will arrive; the transport is closed once pending
    /// sends are flushed.
    InputClosed,
}

pub struct ChatSession<T: Transport, V: ChatView> {
    transport: T,
    view: V,
    last_sent_message: Option<String>,
}

impl<T: Transport, V: ChatView> ChatSession<T, V> {
    pub fn new(transport: T, view: V) -> Self {
        Self {
            transport,
            view,
            last_sent_message: None,
        }
    }

    pub fn last_sent_message(&self) -> Option<&str> {
        self.last_sent_message.as_deref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_parts(self) -> (T, V) {
        (self.transport, self.view)
    }

    /// Processes events one at a time until every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("chat session event stream ended");
        self
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::InputChanged(value) => self.view.set_input_value(&value),
            SessionEvent::SendRequested => self.handle_send(),
            SessionEvent::KeyPressed(key) => self.handle_key(&key),
            SessionEvent::MessageReceived(text) => self.handle_message(&text),
            SessionEvent::TransportError(err) => self.handle_transport_error(&err),
            SessionEvent::TransportClosed => self.handle_transport_closed(),
            SessionEvent::InputClosed => self.handle_input_closed(),
        }
    }

    /// Renders an inbound message unless it is the echo of our last send.
    ///
    /// This is a plain string comparison: a different user sending the same
    /// text is suppressed too.
    pub fn handle_message(&mut self, text: &str) {
        if self.last_sent_message.as_deref() == Some(text) {
            debug!(len = text.len(), "suppressed echo of last sent message");
            return;
        }
        self.append_to_log(LogEntry::Received(text.to_string()));
    }

    pub fn handle_transport_error(&mut self, err: &str) {
        error!(error = %err, "websocket error");
        self.append_to_log(LogEntry::Notice(Notice::ConnectionError));
    }

    pub fn handle_transport_closed(&mut self) {
        self.append_to_log(LogEntry::Notice(Notice::Disconnected));
    }

    pub fn handle_send(&mut self) {
        let input = self.view.input_value();
        let message = input.trim_matches(is_input_whitespace);
        if message.is_empty() {
            return;
        }
        let message = message.to_string();

        self.last_sent_message = Some(message.clone());
        if let Err(err) = self.transport.send(&message) {
            warn!(%err, "outbound message was not delivered to the transport");
        }
        self.append_to_log(LogEntry::Sent(message));
        self.view.set_input_value("");
    }

    pub fn handle_key(&mut self, key: &Key) {
        if *key == Key::Enter {
            self.handle_send();
        }
    }

    pub fn handle_input_closed(&mut self) {
        debug!("input closed; closing transport");
        self.transport.close();
    }

    fn append_to_log(&mut self, entry: LogEntry) {
        self.view.append_entry(&entry);
        self.view.scroll_to_bottom();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
