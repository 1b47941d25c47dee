//! Wire-level constants shared by the relay server and its clients.
//!
//! The protocol is raw WebSocket text frames: one frame carries one chat
//! message, with no envelope or framing of its own.

pub const WS_PATH: &str = "/ws";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8080/ws";
