// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the signaling connection.
//!
//! A transport reports what happens on the wire as [`TransportEvent`]s
//! through an [`EventSender`]. Each sender is bound to the [`Epoch`] of the
//! connect call that created it, so the state machine can drop events from
//! connections it has already abandoned.
//!
//! Provides:
//! - [`WebSocketTransport`] for production, on tokio-tungstenite
//! - a mock transport for unit tests (see `test_helpers`)

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use rdv_core::CloseCode;

/// How long a closing socket waits for the server's close reply.
const CLOSE_REPLY_WAIT: Duration = Duration::from_millis(500);

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No live connection to write to.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Generation counter for connection attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that happened on a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Handshake complete.
    Open,
    /// The connection could not be opened.
    Fail(String),
    /// An open connection ended with the given status.
    Close(CloseCode),
    /// A text frame arrived.
    Message(String),
}

/// A transport event tagged with its connection epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub epoch: Epoch,
    pub event: TransportEvent,
}

/// Reports events for one connection attempt.
#[derive(Debug, Clone)]
pub struct EventSender {
    epoch: Epoch,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSender {
    pub fn new(epoch: Epoch, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        EventSender { epoch, tx }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn open(&self) {
        self.emit(TransportEvent::Open);
    }

    pub fn fail(&self, reason: impl Into<String>) {
        self.emit(TransportEvent::Fail(reason.into()));
    }

    pub fn close(&self, code: CloseCode) {
        self.emit(TransportEvent::Close(code));
    }

    pub fn message(&self, text: impl Into<String>) {
        self.emit(TransportEvent::Message(text.into()));
    }

    fn emit(&self, event: TransportEvent) {
        // The network loop is gone after teardown; nothing left to notify.
        let _ = self.tx.send(Envelope {
            epoch: self.epoch,
            event,
        });
    }
}

/// The wire underneath the signaling connection.
///
/// All methods are called from the network thread. `connect` must not
/// block: it starts the attempt and reports the outcome through `events`.
pub trait Transport: Send + 'static {
    /// Start connecting to `url`, replacing any previous connection.
    fn connect(&mut self, url: &str, events: EventSender);

    /// Queue a text frame on the live connection.
    fn send(&mut self, text: String) -> TransportResult<()>;

    /// Close the live connection, if any, with the given status.
    fn close(&mut self, code: CloseCode, reason: &str);

    /// Resolves once a closed connection has finished its close handshake.
    fn drained(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

/// WebSocket transport implementation using tokio-tungstenite.
///
/// Each connect spawns a task on the current tokio runtime that owns the
/// socket. Outbound frames reach it through a channel.
pub struct WebSocketTransport {
    /// The connection task, if connecting or connected.
    live: Option<LiveConnection>,
    /// Task of the most recently closed connection.
    closing: Option<JoinHandle<()>>,
}

/// Internal handle to a connection task.
struct LiveConnection {
    outbound: mpsc::UnboundedSender<Message>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport {
            live: None,
            closing: None,
        }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str, events: EventSender) {
        self.close(CloseCode::Normal, "reconnecting");

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_connection(
            url.to_string(),
            events,
            outbound_rx,
            cancel.clone(),
        ));

        self.live = Some(LiveConnection {
            outbound,
            cancel,
            task,
        });
    }

    fn send(&mut self, text: String) -> TransportResult<()> {
        let live = self.live.as_ref().ok_or(TransportError::ConnectionClosed)?;
        live.outbound
            .send(Message::Text(text.into()))
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    fn close(&mut self, code: CloseCode, reason: &str) {
        let Some(live) = self.live.take() else {
            return;
        };
        // Aborts a handshake still in flight; an open socket sends the
        // close frame and exits on its own.
        live.cancel.cancel();
        let frame = CloseFrame {
            code: WsCloseCode::from(u16::from(code)),
            reason: reason.to_string().into(),
        };
        let _ = live.outbound.send(Message::Close(Some(frame)));
        if let Some(previous) = self.closing.replace(live.task) {
            previous.abort();
        }
    }

    fn drained(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if let Some(task) = self.closing.take() {
                let _ = task.await;
            }
        })
    }
}

/// Connection task: handshake, then pump frames both ways.
async fn run_connection(
    url: String,
    events: EventSender,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
) {
    let connect_result = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(epoch = %events.epoch(), "connect cancelled");
            return;
        }
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
    };

    let ws_stream = match connect_result {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            events.fail(e.to_string());
            return;
        }
    };

    let (mut sink, mut stream) = ws_stream.split();
    events.open();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(Message::Close(frame)) => {
                    let _ = sink.send(Message::Close(frame)).await;
                    // Wait briefly for the peer's close reply.
                    let _ = tokio::time::timeout(CLOSE_REPLY_WAIT, stream.next()).await;
                    return;
                }
                Some(msg) => {
                    if let Err(e) = sink.send(msg).await {
                        warn!(epoch = %events.epoch(), "send failed: {}", e);
                        events.close(CloseCode::Abnormal);
                        return;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    events.message(text.as_str());
                }
                Some(Ok(Message::Close(frame))) => {
                    let code = frame
                        .map(|f| CloseCode::from(u16::from(f.code)))
                        .unwrap_or(CloseCode::NoStatus);
                    events.close(code);
                    return;
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite; binary frames are not part of the protocol.
                }
                Some(Err(e)) => {
                    debug!(epoch = %events.epoch(), "receive failed: {}", e);
                    events.close(CloseCode::Abnormal);
                    return;
                }
                None => {
                    events.close(CloseCode::Abnormal);
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
