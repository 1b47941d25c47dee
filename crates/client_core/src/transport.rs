//! Text transport seam and its WebSocket implementation.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info};
use url::Url;

use crate::{error::TransportError, session::SessionEvent};

/// A bidirectional text channel. Sending is fire-and-forget: there is no
/// acknowledgement and no timeout.
pub trait Transport {
    fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Closes the channel once everything already sent has been written.
    fn close(&self) {}
}

enum Outbound {
    Text(String),
    Close,
}

/// Normalizes a configured server address into a WebSocket URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, TransportError> {
    let raw = raw.trim();
    let rewritten = if let Some(rest) = raw.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = raw.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        raw.to_string()
    };

    let url = Url::parse(&rewritten)
        .map_err(|err| TransportError::InvalidEndpoint(format!("{raw}: {err}")))?;
    if url.scheme() != "ws" && url.scheme() != "wss" {
        return Err(TransportError::InvalidEndpoint(format!(
            "{raw}: scheme must be ws, wss, http or https"
        )));
    }
    if url.host_str().is_none() {
        return Err(TransportError::InvalidEndpoint(format!("{raw}: missing host")));
    }
    Ok(url)
}

/// WebSocket connection driven by a background task.
///
/// Connection lifecycle is reported through the session event channel:
/// inbound text frames as [`SessionEvent::MessageReceived`], failures as
/// [`SessionEvent::TransportError`], and the end of the connection as a
/// single [`SessionEvent::TransportClosed`]. Sends issued before the
/// handshake completes are queued and flushed once connected.
pub struct WsTransport {
    endpoint: Url,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl WsTransport {
    /// Starts connecting to `endpoint`; must be called inside a tokio runtime.
    pub fn connect(endpoint: Url, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(drive_connection(endpoint.clone(), outbound_rx, events));
        Self { endpoint, outbound }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

impl Transport for WsTransport {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Text(text.to_string()))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

async fn drive_connection(
    endpoint: Url,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let ws_stream = match connect_async(endpoint.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(err) => {
            error!(%endpoint, %err, "failed to connect websocket");
            let _ = events.send(SessionEvent::TransportError(err.to_string()));
            let _ = events.send(SessionEvent::TransportClosed);
            return;
        }
    };
    info!(%endpoint, "websocket connected");
    let (mut ws_writer, mut ws_reader) = ws_stream.split();
    // Once our close frame is out, keep reading until the server answers it.
    let mut closing = false;

    loop {
        tokio::select! {
            outbound = outbound_rx.recv(), if !closing => match outbound {
                Some(Outbound::Text(text)) => {
                    if let Err(err) = ws_writer.send(Message::Text(text)).await {
                        error!(%endpoint, %err, "websocket send failed");
                        let _ = events.send(SessionEvent::TransportError(err.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    debug!(%endpoint, "closing websocket");
                    if ws_writer.send(Message::Close(None)).await.is_err() {
                        break;
                    }
                    closing = true;
                    outbound_rx.close();
                }
            },
            inbound = ws_reader.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(SessionEvent::MessageReceived(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(%endpoint, ?frame, closing, "websocket close frame received");
                    break;
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!(%endpoint, len = data.len(), "ignoring binary frame");
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    error!(%endpoint, %err, "websocket receive failed");
                    let _ = events.send(SessionEvent::TransportError(err.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    outbound_rx.close();
    info!(%endpoint, "websocket disconnected");
    let _ = events.send(SessionEvent::TransportClosed);
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
