use std::io::BufRead;

use client_core::{Key, SessionEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Turns each submitted line into "type the text, then press Enter".
///
/// Blocks on `reader`; run it on its own thread. End of input (or a read
/// failure) is reported as [`SessionEvent::InputClosed`].
pub fn forward_lines<R: BufRead>(reader: R, events: mpsc::UnboundedSender<SessionEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!(%error, "failed to read input line");
                break;
            }
        };
        let typed = events.send(SessionEvent::InputChanged(line));
        let pressed = events.send(SessionEvent::KeyPressed(Key::Enter));
        if typed.is_err() || pressed.is_err() {
            debug!("chat session gone; stopping input");
            return;
        }
    }
    debug!("input closed");
    let _ = events.send(SessionEvent::InputClosed);
}
