use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid websocket endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("websocket connection is closed")]
    Closed,
}
