use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use uuid::Uuid;

use crate::api::client::endpoint_url;

use super::frames::OutboundFrame;

const EVENT_BUFFER: usize = 64;

/// Lifecycle of one socket: Connecting → Open → (Closed | Errored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Open,
    Closed,
    Errored,
}

impl SocketState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SocketState::Closed | SocketState::Errored)
    }

    /// Text shown next to the message input.
    pub fn feedback(self) -> &'static str {
        match self {
            SocketState::Connecting => "Connecting...",
            SocketState::Open => "Connected",
            SocketState::Closed => "Disconnected",
            SocketState::Errored => "Error with WebSocket connection",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SocketEvent {
    State(SocketState),
    Text(String),
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("WebSocket is not open")]
    NotOpen,
    #[error("WebSocket connection task has stopped")]
    Closed,
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid WebSocket URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("WebSocket base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),
}

/// `<base>/ws/chat/{room_oid}/?token=...`
pub fn room_channel_url(base: &str, room_oid: &str, token: &str) -> Result<Url, SocketError> {
    channel_url(base, &["ws", "chat", room_oid], token)
}

/// `<base>/ws/notifications/?token=...`
pub fn notification_channel_url(base: &str, token: &str) -> Result<Url, SocketError> {
    channel_url(base, &["ws", "notifications"], token)
}

fn channel_url(base: &str, segments: &[&str], token: &str) -> Result<Url, SocketError> {
    let base = Url::parse(base)?;
    let mut url =
        endpoint_url(&base, segments).ok_or_else(|| SocketError::InvalidBaseUrl(base.to_string()))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// URL safe to log: the token lives in the query string.
pub fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// Handle to one WebSocket connection.
///
/// Every handle owns its connection: there is no shared global socket. Any
/// number of listeners can `subscribe`, each gets its own receiver. The
/// connection is closed by `close()` or when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    id: Uuid,
    outbound: mpsc::UnboundedSender<String>,
    events: broadcast::Sender<SocketEvent>,
    state: watch::Receiver<SocketState>,
    close: Arc<watch::Sender<bool>>,
}

impl SocketHandle {
    /// Starts connecting in the background. The returned receiver is
    /// subscribed before the task starts, so it sees every event.
    pub fn connect(url: Url) -> (Self, broadcast::Receiver<SocketEvent>) {
        let id = Uuid::new_v4();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = broadcast::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(SocketState::Connecting);
        let (close_tx, close_rx) = watch::channel(false);

        let handle = Self {
            id,
            outbound: outbound_tx,
            events: events_tx.clone(),
            state: state_rx,
            close: Arc::new(close_tx),
        };

        let connection = Connection {
            id,
            events: events_tx,
            state: state_tx,
        };
        tokio::spawn(connection.run(url, outbound_rx, close_rx));

        (handle, events_rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Registers another independent listener.
    pub fn subscribe(&self) -> broadcast::Receiver<SocketEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SocketState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SocketState> {
        self.state.clone()
    }

    /// Writes `{"message": text}` if the socket is open. Nothing is queued
    /// otherwise.
    pub fn send_message(&self, text: &str) -> Result<(), SocketError> {
        if self.state() != SocketState::Open {
            return Err(SocketError::NotOpen);
        }
        let frame = serde_json::to_string(&OutboundFrame { message: text })?;
        self.outbound.send(frame).map_err(|_| SocketError::Closed)
    }

    /// Idempotent; safe whether or not the connection ever opened.
    pub fn close(&self) {
        if !self.close.send_replace(true) {
            log::debug!("Closing socket {}", self.id);
        }
    }

    pub fn close_requested(&self) -> bool {
        *self.close.borrow()
    }

    /// A handle with no connection behind it. The caller drives the state and
    /// reads whatever would have been written to the wire.
    #[cfg(test)]
    pub(crate) fn detached(
        state: SocketState,
    ) -> (
        Self,
        mpsc::UnboundedReceiver<String>,
        watch::Sender<SocketState>,
    ) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(state);
        let (close_tx, _) = watch::channel(false);
        let handle = Self {
            id: Uuid::new_v4(),
            outbound: outbound_tx,
            events: events_tx,
            state: state_rx,
            close: Arc::new(close_tx),
        };
        (handle, outbound_rx, state_tx)
    }
}

/// Task side of a `SocketHandle`.
struct Connection {
    id: Uuid,
    events: broadcast::Sender<SocketEvent>,
    state: watch::Sender<SocketState>,
}

impl Connection {
    fn publish(&self, state: SocketState) {
        self.state.send_replace(state);
        // Không có listener nào cũng không sao
        let _ = self.events.send(SocketEvent::State(state));
    }

    async fn run(
        self,
        url: Url,
        mut outbound: mpsc::UnboundedReceiver<String>,
        mut close: watch::Receiver<bool>,
    ) {
        let target = redacted(&url);
        log::info!("Socket {} connecting to {target}", self.id);
        self.publish(SocketState::Connecting);

        let connected = tokio::select! {
            result = connect_async(url.as_str()) => result,
            _ = close_signal(&mut close) => {
                log::info!("Socket {} closed before it opened", self.id);
                self.publish(SocketState::Closed);
                return;
            }
        };

        let stream = match connected {
            Ok((stream, _response)) => stream,
            Err(err) => {
                log::warn!("Socket {} failed to connect to {target}: {err}", self.id);
                self.publish(SocketState::Errored);
                return;
            }
        };

        log::info!("Socket {} open", self.id);
        self.publish(SocketState::Open);
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                _ = close_signal(&mut close) => {
                    if let Err(err) = write.send(Message::Close(None)).await {
                        log::debug!("Socket {} close frame not delivered: {err}", self.id);
                    }
                    self.publish(SocketState::Closed);
                    break;
                }
                frame = outbound.recv() => {
                    let Some(frame) = frame else {
                        // Every handle is gone
                        let _ = write.send(Message::Close(None)).await;
                        self.publish(SocketState::Closed);
                        break;
                    };
                    log::debug!("Socket {} sending {} bytes", self.id, frame.len());
                    if let Err(err) = write.send(Message::Text(frame.into())).await {
                        log::warn!("Socket {} write failed: {err}", self.id);
                        self.publish(SocketState::Errored);
                        break;
                    }
                }
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        log::debug!("Socket {} received frame", self.id);
                        let _ = self.events.send(SocketEvent::Text(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        log::info!("Socket {} closed by server: {frame:?}", self.id);
                        self.publish(SocketState::Closed);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        log::warn!("Socket {} read failed: {err}", self.id);
                        self.publish(SocketState::Errored);
                        break;
                    }
                    None => {
                        log::info!("Socket {} stream ended", self.id);
                        self.publish(SocketState::Closed);
                        break;
                    }
                }
            }
        }
    }
}

/// Resolves once close was requested or every handle was dropped.
async fn close_signal(close: &mut watch::Receiver<bool>) {
    let _ = close.wait_for(|requested| *requested).await;
}
