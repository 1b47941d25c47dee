//! Fan-out of chat text between connected WebSocket clients.

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ClientId(Uuid);

impl ClientId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RelayFrame {
    pub(crate) origin: ClientId,
    pub(crate) text: String,
}

#[derive(Clone)]
pub(crate) struct Relay {
    frames: broadcast::Sender<RelayFrame>,
    clients: Arc<AtomicUsize>,
    echo_to_sender: bool,
}

impl Relay {
    pub(crate) fn new(capacity: usize, echo_to_sender: bool) -> Self {
        let (frames, _) = broadcast::channel(capacity);
        Self {
            frames,
            clients: Arc::new(AtomicUsize::new(0)),
            echo_to_sender,
        }
    }

    pub(crate) fn connected_clients(&self) -> usize {
        self.clients.load(Ordering::SeqCst)
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<RelayFrame> {
        self.frames.subscribe()
    }

    /// Returns how many connections will see the frame.
    pub(crate) fn publish(&self, origin: ClientId, text: String) -> usize {
        self.frames
            .send(RelayFrame { origin, text })
            .unwrap_or_default()
    }

    pub(crate) fn delivers_to(&self, frame: &RelayFrame, client_id: ClientId) -> bool {
        self.echo_to_sender || frame.origin != client_id
    }

    pub(crate) async fn serve_connection(self, socket: WebSocket) {
        let (sender, receiver) = socket.split();
        self.serve_split(sender, receiver).await;
    }

    /// Runs one client until either direction fails: a read error or close
    /// from the peer, or a write that can no longer be delivered.
    pub(crate) async fn serve_split<W, R, E>(self, mut sender: W, mut receiver: R)
    where
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: fmt::Display,
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        let client_id = ClientId::new();
        let mut frames_rx = self.subscribe();
        let clients = self.clients.fetch_add(1, Ordering::SeqCst) + 1;
        info!(%client_id, clients, "client connected");

        let relay = self.clone();
        let mut send_task = tokio::spawn(async move {
            loop {
                match frames_rx.recv().await {
                    Ok(frame) => {
                        if !relay.delivers_to(&frame, client_id) {
                            continue;
                        }
                        if let Err(error) = sender.send(Message::Text(frame.text)).await {
                            warn!(%client_id, %error, "error sending message; dropping client");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%client_id, skipped, "client fell behind; frames dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let read_loop = async {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let receivers = self.publish(client_id, text);
                        debug!(%client_id, receivers, "relayed text frame");
                    }
                    Ok(Message::Binary(data)) => match String::from_utf8(data) {
                        Ok(text) => {
                            self.publish(client_id, text);
                        }
                        Err(error) => {
                            warn!(%client_id, %error, "dropping non-utf8 binary frame");
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(error) => {
                        warn!(%client_id, %error, "error reading message");
                        break;
                    }
                }
            }
        };

        tokio::select! {
            _ = read_loop => {}
            _ = &mut send_task => debug!(%client_id, "send side finished; closing connection"),
        }

        send_task.abort();
        let clients = self.clients.fetch_sub(1, Ordering::SeqCst) - 1;
        info!(%client_id, clients, "client disconnected");
    }
}
