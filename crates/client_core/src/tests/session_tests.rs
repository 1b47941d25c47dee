use std::cell::RefCell;

use super::*;
use crate::{error::TransportError, view::MemoryView};

#[derive(Default)]
struct RecordingTransport {
    sent: RefCell<Vec<String>>,
    closed: bool,
    close_requests: RefCell<usize>,
}

impl RecordingTransport {
    fn closed() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            closed: true,
            close_requests: RefCell::new(0),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn close(&self) {
        *self.close_requests.borrow_mut() += 1;
    }
}

fn session() -> ChatSession<RecordingTransport, MemoryView> {
    ChatSession::new(RecordingTransport::default(), MemoryView::new())
}

fn type_and_click(session: &mut ChatSession<RecordingTransport, MemoryView>, text: &str) {
    session.handle_event(SessionEvent::InputChanged(text.to_string()));
    session.handle_event(SessionEvent::SendRequested);
}

#[test]
fn send_click_echoes_transmits_and_clears_input() {
    let mut session = session();
    type_and_click(&mut session, "hello");

    assert_eq!(session.view().last_entry(), Some("You: hello"));
    assert_eq!(session.transport().sent(), ["hello"]);
    assert_eq!(session.view().input_value(), "");
    assert_eq!(session.last_sent_message(), Some("hello"));
    assert!(session.view().is_scrolled_to_bottom());
}

#[test]
fn send_trims_surrounding_whitespace() {
    let mut session = session();
    type_and_click(&mut session, "  hi there \n");

    assert_eq!(session.transport().sent(), ["hi there"]);
    assert_eq!(session.view().entries(), ["You: hi there"]);
    assert_eq!(session.last_sent_message(), Some("hi there"));
}

#[test]
fn whitespace_only_input_is_a_no_op() {
    for input in [
        "",
        " ",
        "\t",
        " \n\r\t ",
        "\u{feff}",
        "\u{a0}\u{3000}\u{2028}",
        "\u{feff} \u{feff}",
    ] {
        let mut session = session();
        type_and_click(&mut session, "first");
        type_and_click(&mut session, input);

        assert_eq!(session.last_sent_message(), Some("first"), "input {input:?}");
        assert_eq!(session.transport().sent(), ["first"], "input {input:?}");
        assert_eq!(session.view().entries(), ["You: first"], "input {input:?}");
        assert_eq!(session.view().input_value(), input, "input {input:?}");
    }
}

#[test]
fn next_line_character_is_not_trimmed() {
    let mut session = session();
    type_and_click(&mut session, "\u{85}x");
    type_and_click(&mut session, "\u{feff}y\u{feff}");

    assert_eq!(session.transport().sent(), ["\u{85}x", "y"]);
    assert_eq!(session.last_sent_message(), Some("y"));
}

#[test]
fn nothing_sent_before_first_send() {
    let mut session = session();
    session.handle_event(SessionEvent::SendRequested);

    assert_eq!(session.last_sent_message(), None);
    assert!(session.transport().sent().is_empty());
    assert!(session.view().entries().is_empty());
}

#[test]
fn echo_of_last_sent_message_is_suppressed() {
    let mut session = session();
    type_and_click(&mut session, "hello");
    session.handle_event(SessionEvent::MessageReceived("hello".into()));

    assert_eq!(session.view().entries(), ["You: hello"]);
    assert_eq!(session.last_sent_message(), Some("hello"));
}

#[test]
fn other_messages_are_rendered_verbatim() {
    let mut session = session();
    type_and_click(&mut session, "hello");
    session.handle_event(SessionEvent::MessageReceived("hi there".into()));

    assert_eq!(session.view().last_entry(), Some("hi there"));
    assert!(session.view().is_scrolled_to_bottom());
}

#[test]
fn suppression_is_exact_string_equality() {
    let mut session = session();
    type_and_click(&mut session, "hello");
    session.handle_event(SessionEvent::MessageReceived("hello ".into()));
    session.handle_event(SessionEvent::MessageReceived("Hello".into()));

    assert_eq!(session.view().entries(), ["You: hello", "hello ", "Hello"]);
}

#[test]
fn suppressed_text_renders_again_after_a_different_send() {
    let mut session = session();
    type_and_click(&mut session, "m");
    session.handle_event(SessionEvent::MessageReceived("m".into()));
    type_and_click(&mut session, "other");
    session.handle_event(SessionEvent::MessageReceived("m".into()));

    assert_eq!(session.view().entries(), ["You: m", "You: other", "m"]);
}

#[test]
fn repeated_identical_inbound_messages_are_all_suppressed() {
    let mut session = session();
    type_and_click(&mut session, "same");
    session.handle_event(SessionEvent::MessageReceived("same".into()));
    session.handle_event(SessionEvent::MessageReceived("same".into()));

    assert_eq!(session.view().entries(), ["You: same"]);
}

#[test]
fn empty_inbound_message_is_rendered_before_any_send() {
    let mut session = session();
    session.handle_event(SessionEvent::MessageReceived(String::new()));

    assert_eq!(session.view().entries(), [""]);
}

#[test]
fn enter_key_matches_send_click() {
    let mut clicked = session();
    type_and_click(&mut clicked, " hello ");

    let mut pressed = session();
    pressed.handle_event(SessionEvent::InputChanged(" hello ".into()));
    pressed.handle_event(SessionEvent::KeyPressed(Key::Enter));

    assert_eq!(clicked.view().entries(), pressed.view().entries());
    assert_eq!(clicked.transport().sent(), pressed.transport().sent());
    assert_eq!(clicked.last_sent_message(), pressed.last_sent_message());
    assert_eq!(clicked.view().input_value(), pressed.view().input_value());
}

#[test]
fn other_keys_do_not_send() {
    let mut session = session();
    session.handle_event(SessionEvent::InputChanged("draft".into()));
    session.handle_event(SessionEvent::KeyPressed(Key::Other("a".into())));
    session.handle_event(SessionEvent::KeyPressed(Key::Other("Shift".into())));

    assert!(session.transport().sent().is_empty());
    assert_eq!(session.view().input_value(), "draft");
}

#[test]
fn input_closed_closes_transport_after_pending_sends() {
    let mut session = session();
    type_and_click(&mut session, "last words");
    session.handle_event(SessionEvent::InputClosed);

    assert_eq!(session.transport().sent(), ["last words"]);
    assert_eq!(*session.transport().close_requests.borrow(), 1);
    assert_eq!(session.view().entries(), ["You: last words"]);
}

#[test]
fn transport_error_appends_notice_without_touching_state() {
    let mut session = session();
    type_and_click(&mut session, "hello");
    session.handle_event(SessionEvent::TransportError("connection refused".into()));

    assert_eq!(
        session.view().last_entry(),
        Some("Error connecting to the server.")
    );
    assert_eq!(session.last_sent_message(), Some("hello"));
}

#[test]
fn each_close_signal_appends_one_notice() {
    let mut session = session();
    session.handle_event(SessionEvent::TransportClosed);
    assert_eq!(
        session.view().entries(),
        ["Disconnected from the server."]
    );

    session.handle_event(SessionEvent::TransportClosed);
    assert_eq!(session.view().entries().len(), 2);
}

#[test]
fn send_on_closed_transport_still_echoes_locally() {
    let mut session = ChatSession::new(RecordingTransport::closed(), MemoryView::new());
    type_and_click(&mut session, "late");

    assert_eq!(session.view().entries(), ["You: late"]);
    assert_eq!(session.last_sent_message(), Some("late"));
    assert_eq!(session.view().input_value(), "");
}

#[tokio::test]
async fn run_processes_events_in_order_until_senders_drop() {
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(SessionEvent::MessageReceived("welcome".into()))
        .expect("queue");
    tx.send(SessionEvent::InputChanged("hello".into()))
        .expect("queue");
    tx.send(SessionEvent::KeyPressed(Key::Enter)).expect("queue");
    tx.send(SessionEvent::MessageReceived("hello".into()))
        .expect("queue");
    tx.send(SessionEvent::TransportClosed).expect("queue");
    drop(tx);

    let session = session().run(rx).await;
    let (transport, view) = session.into_parts();

    assert_eq!(transport.sent(), ["hello"]);
    assert_eq!(
        view.entries(),
        ["welcome", "You: hello", "Disconnected from the server."]
    );
}
