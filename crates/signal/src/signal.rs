// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Public handle to the signaling client.
//!
//! [`Signal`] owns a dedicated network thread running a current-thread tokio
//! runtime. Every public call posts a request to that thread and returns
//! immediately; only [`Signal::teardown`] waits.

use std::future;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use rdv_core::{OutboundCommand, Scope};

use crate::config::SignalConfig;
use crate::error::{Error, Result};
use crate::machine::{Machine, PendingRetry, Request};
use crate::sink::EventSink;
use crate::state::{ConnectionState, SharedConnectionState};
use crate::transport::{Envelope, Epoch, Transport, WebSocketTransport};

/// How long teardown waits for the close handshake before stopping the runtime.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// What a signaling client can do, as seen by its users.
pub trait SignalInterface {
    /// Connect (if needed) and authenticate with the rendezvous server.
    fn sign_in(&self, id: &str, password: &str);

    /// Leave the server and stay disconnected until the next sign-in.
    fn sign_out(&self);

    /// Send a command scoped to a session. An empty id sends it globally.
    fn send_command(&self, session_id: &str, name: &str, payload: Value);

    /// Send a command not tied to any session.
    fn send_global_command(&self, name: &str, payload: Value);

    /// Change the rendezvous URL used by the next connect.
    fn set_config(&self, url: &str);

    /// Session id granted at sign-in, empty when not signed in.
    fn session_id(&self) -> String;
}

/// Signaling client.
pub struct Signal {
    requests: mpsc::UnboundedSender<Request>,
    shutdown: CancellationToken,
    shared: Arc<SharedConnectionState>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl Signal {
    /// Start a client speaking WebSocket to the configured server.
    pub fn new<S: EventSink>(config: &SignalConfig, sink: S) -> Result<Self> {
        Self::spawn(config, WebSocketTransport::new(), sink)
    }

    /// Start a client on the given transport.
    ///
    /// Fails if the URL is invalid or the runtime or thread cannot be created.
    pub fn spawn<T: Transport, S: EventSink>(
        config: &SignalConfig,
        transport: T,
        sink: S,
    ) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (requests, requests_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SharedConnectionState::new());
        let machine = Machine::new(config, transport, sink, events_tx, Arc::clone(&shared));
        let shutdown = CancellationToken::new();
        let loop_shutdown = shutdown.clone();

        let handle = thread::Builder::new()
            .name("rdv-signal".to_string())
            .spawn(move || {
                runtime.block_on(run_loop(machine, requests_rx, events_rx, loop_shutdown))
            })?;
        let thread_id = handle.thread().id();
        debug!(url = %config.url, "network thread started");

        Ok(Signal {
            requests,
            shutdown,
            shared,
            thread: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// True iff the connection is exactly in the opened state.
    pub fn opened(&self) -> bool {
        self.shared.is_opened()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.get()
    }

    /// Human-readable state including any pending retry.
    pub fn status_string(&self) -> String {
        self.shared.status_string()
    }

    /// Retries allowed after a failure before giving up (0 = unlimited).
    pub fn set_reconnect_attempts(&self, attempts: u32) {
        self.post(Request::SetReconnectAttempts(attempts));
    }

    /// Minimum delay before a retry, in milliseconds.
    pub fn set_reconnect_delay(&self, millis: u64) {
        self.post(Request::SetReconnectDelay(millis));
    }

    /// Maximum delay before a retry, in milliseconds.
    pub fn set_reconnect_delay_max(&self, millis: u64) {
        self.post(Request::SetReconnectDelayMax(millis));
    }

    /// Close the connection and stop the network thread.
    ///
    /// Blocks until the thread has exited. No sink callback runs after this
    /// returns.
    pub fn teardown(&self) -> Result<()> {
        if thread::current().id() == self.thread_id {
            return Err(Error::TeardownFromNetworkThread);
        }
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(Error::AlreadyTornDown)?;

        self.shutdown.cancel();
        handle.join().map_err(|_| Error::NetworkThreadPanicked)?;
        info!("signal torn down");
        Ok(())
    }

    fn post(&self, request: Request) {
        if self.requests.send(request).is_err() {
            debug!("signal torn down, request dropped");
        }
    }
}

impl SignalInterface for Signal {
    fn sign_in(&self, id: &str, password: &str) {
        self.post(Request::SignIn {
            id: id.to_string(),
            password: password.to_string(),
        });
    }

    fn sign_out(&self) {
        self.post(Request::SignOut);
    }

    fn send_command(&self, session_id: &str, name: &str, payload: Value) {
        let command = OutboundCommand::new(Scope::session(session_id), name, payload);
        self.post(Request::Send(command));
    }

    fn send_global_command(&self, name: &str, payload: Value) {
        self.post(Request::Send(OutboundCommand::global(name, payload)));
    }

    fn set_config(&self, url: &str) {
        self.post(Request::SetConfig(url.to_string()));
    }

    fn session_id(&self) -> String {
        self.shared.session_id()
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

/// Network thread main loop.
///
/// Serializes API requests, transport events and the retry timer onto the
/// state machine until `shutdown` fires or every `Signal` is gone. Requests
/// already posted are applied before shutdown.
async fn run_loop<T: Transport, S: EventSink>(
    mut machine: Machine<T, S>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    mut events: mpsc::UnboundedReceiver<Envelope>,
    shutdown: CancellationToken,
) {
    loop {
        let retry = machine.pending_retry();
        tokio::select! {
            biased;
            request = requests.recv() => match request {
                Some(request) => machine.handle(request),
                None => break,
            },
            _ = shutdown.cancelled() => break,
            Some(envelope) = events.recv() => machine.on_transport(envelope),
            epoch = retry_timer(retry) => machine.on_retry_timer(epoch),
        }
    }

    machine.teardown();
    if tokio::time::timeout(CLOSE_GRACE, machine.transport_mut().drained())
        .await
        .is_err()
    {
        debug!("close handshake did not finish before shutdown");
    }
}

/// Resolves with the retry's epoch at its deadline; never resolves without one.
async fn retry_timer(retry: Option<PendingRetry>) -> Epoch {
    match retry {
        Some(retry) => {
            tokio::time::sleep_until(retry.deadline).await;
            retry.epoch
        }
        None => future::pending().await,
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
