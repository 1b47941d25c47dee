//! Client side of the relay chat: the session controller that wires a text
//! transport to a chat view, plus the WebSocket transport it runs on.

pub mod error;
pub mod session;
pub mod transport;
pub mod view;

pub use error::TransportError;
pub use session::{ChatSession, Key, SessionEvent};
pub use transport::{parse_endpoint, Transport, WsTransport};
pub use view::{ChatView, MemoryView};
