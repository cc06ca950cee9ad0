// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection state machine.
//!
//! Owns the session, the transport, the reconnect policy and the retry
//! timer. Every method runs on the network thread, so none of the state
//! here is shared or locked; readers on other threads see the published
//! copy in [`SharedConnectionState`].
//!
//! ```text
//!            sign_in                open
//!   Closed ──────────► Opening ──────────► Opened
//!     ▲  ▲                │                  │
//!     │  └── retry timer ─┤ fail/close       │ fail/close
//!     │                   ▼                  │
//!     │            (policy: retry?) ◄────────┘
//!     │                   │ exhausted
//!     └───────────────────┘
//!
//!   Opening/Opened ── sign_out/teardown ──► Closing ──► Closed
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use rdv_core::protocol::{SIGNIN, SIGNOUT};
use rdv_core::{
    CloseCode, CloseReason, Decision, InboundCommand, OutboundCommand, ReconnectState, SignInReply,
};

use crate::config::SignalConfig;
use crate::sink::EventSink;
use crate::state::{ConnectionState, SharedConnectionState};
use crate::transport::{Envelope, Epoch, EventSender, Transport, TransportEvent};

/// Work posted to the network thread by the public API.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    SignIn { id: String, password: String },
    SignOut,
    Send(OutboundCommand),
    SetConfig(String),
    SetReconnectAttempts(u32),
    SetReconnectDelay(u64),
    SetReconnectDelayMax(u64),
}

/// A retry armed for the connection attempt of `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingRetry {
    pub epoch: Epoch,
    pub delay: Duration,
    pub deadline: Instant,
}

#[derive(Debug, Default)]
struct Session {
    session_id: String,
    user_id: String,
    password: String,
    url: String,
}

pub(crate) struct Machine<T: Transport, S: EventSink> {
    transport: T,
    sink: S,
    events: mpsc::UnboundedSender<Envelope>,
    shared: Arc<SharedConnectionState>,
    state: ConnectionState,
    epoch: Epoch,
    session: Session,
    reconnect: ReconnectState,
    retry: Option<PendingRetry>,
    /// Cleared by sign-out, auth failure and teardown; set by sign-in.
    auto_reconnect: bool,
    /// A lifecycle is in progress whose close has not been reported yet.
    active: bool,
}

impl<T: Transport, S: EventSink> Machine<T, S> {
    pub fn new(
        config: &SignalConfig,
        transport: T,
        sink: S,
        events: mpsc::UnboundedSender<Envelope>,
        shared: Arc<SharedConnectionState>,
    ) -> Self {
        shared.set(ConnectionState::Closed);
        Machine {
            transport,
            sink,
            events,
            shared,
            state: ConnectionState::Closed,
            epoch: Epoch::default(),
            session: Session {
                url: config.url.clone(),
                ..Session::default()
            },
            reconnect: config.reconnect.to_state(),
            retry: None,
            auto_reconnect: false,
            active: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn opened(&self) -> bool {
        self.state == ConnectionState::Opened
    }

    pub fn pending_retry(&self) -> Option<PendingRetry> {
        self.retry
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[cfg(test)]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[cfg(test)]
    pub fn reconnect(&self) -> &ReconnectState {
        &self.reconnect
    }

    #[cfg(test)]
    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    /// Apply a request from the public API.
    pub fn handle(&mut self, request: Request) {
        match request {
            Request::SignIn { id, password } => self.sign_in(id, password),
            Request::SignOut => self.sign_out(),
            Request::Send(command) => self.send(command),
            Request::SetConfig(url) => {
                debug!(url = %url, "rendezvous url updated");
                self.session.url = url;
            }
            Request::SetReconnectAttempts(attempts) => self.reconnect.set_max_attempts(attempts),
            Request::SetReconnectDelay(millis) => {
                self.reconnect.set_min_delay(Duration::from_millis(millis))
            }
            Request::SetReconnectDelayMax(millis) => {
                self.reconnect.set_max_delay(Duration::from_millis(millis))
            }
        }
    }

    fn sign_in(&mut self, id: String, password: String) {
        let same_credentials = self.session.user_id == id && self.session.password == password;
        self.session.user_id = id;
        self.session.password = password;
        self.auto_reconnect = true;

        match self.state {
            ConnectionState::Opened if !same_credentials => self.send_signin(),
            ConnectionState::Opened | ConnectionState::Opening => {
                debug!(state = %self.state, "sign-in already in progress");
            }
            ConnectionState::Closing | ConnectionState::Closed => {
                self.reconnect.reset();
                self.connect();
            }
        }
    }

    fn sign_out(&mut self) {
        if self.state == ConnectionState::Opened {
            self.send(OutboundCommand::signout());
        }
        self.auto_reconnect = false;
        self.close_deliberately(CloseCode::Normal, CloseReason::SignedOut);
    }

    /// Close for good: reconnects stay disabled until the next sign-in.
    pub fn teardown(&mut self) {
        self.auto_reconnect = false;
        self.close_deliberately(CloseCode::GoingAway, CloseReason::TornDown);
        self.session.user_id.clear();
        self.session.password.clear();
    }

    fn connect(&mut self) {
        self.retry = None;
        self.epoch = self.epoch.next();
        self.active = true;
        self.set_state(ConnectionState::Opening);
        info!(epoch = %self.epoch, url = %self.session.url, "connecting");

        let events = EventSender::new(self.epoch, self.events.clone());
        self.transport.connect(&self.session.url, events);
    }

    fn send(&mut self, command: OutboundCommand) {
        if !self.opened() {
            debug!(command = %command.name, state = %self.state, "not opened, command dropped");
            return;
        }
        let text = match command.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!(command = %command.name, "failed to encode command: {}", e);
                return;
            }
        };
        if let Err(e) = self.transport.send(text) {
            warn!(command = %command.name, "failed to send command: {}", e);
        }
    }

    fn send_signin(&mut self) {
        let command = OutboundCommand::signin(&self.session.user_id, &self.session.password);
        self.send(command);
    }

    /// Apply an event reported by the transport.
    pub fn on_transport(&mut self, envelope: Envelope) {
        if envelope.epoch != self.epoch || !self.state.is_live() {
            debug!(epoch = %envelope.epoch, current = %self.epoch, "stale transport event dropped");
            return;
        }

        match envelope.event {
            TransportEvent::Open => self.on_open(),
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Fail(reason) => {
                warn!(epoch = %self.epoch, "connection failed: {}", reason);
                self.connection_lost(CloseCode::Abnormal);
            }
            TransportEvent::Close(CloseCode::Normal) => {
                info!(epoch = %self.epoch, "server closed the connection");
                self.release(CloseCode::Normal);
                self.finish(CloseReason::Remote(CloseCode::Normal));
            }
            TransportEvent::Close(code) => {
                warn!(epoch = %self.epoch, code = %code, "connection closed");
                self.connection_lost(code);
            }
        }
    }

    fn on_open(&mut self) {
        if self.state != ConnectionState::Opening {
            return;
        }
        self.reconnect.reset();
        self.shared.set_attempt(0);
        self.set_state(ConnectionState::Opened);
        info!(epoch = %self.epoch, "connection opened");
        self.send_signin();
    }

    fn on_message(&mut self, text: &str) {
        if self.state != ConnectionState::Opened {
            return;
        }
        let command = match InboundCommand::from_json(text) {
            Ok(command) => command,
            Err(e) => {
                warn!(epoch = %self.epoch, "dropping inbound message: {}", e);
                return;
            }
        };

        let rejected = if command.is(SIGNIN) {
            self.on_signin_reply(&command.payload)
        } else {
            if command.is(SIGNOUT) {
                debug!("server acknowledged sign-out");
            }
            None
        };

        self.sink.on_command_received(command);

        if let Some(message) = rejected {
            self.auto_reconnect = false;
            self.close_deliberately(CloseCode::Policy, CloseReason::AuthFailure { message });
        }
    }

    /// Returns the rejection message if the server refused the credentials.
    fn on_signin_reply(&mut self, payload: &Value) -> Option<Option<String>> {
        match SignInReply::from_payload(payload) {
            Ok(reply) if reply.accepted() => {
                info!(session_id = %reply.session_id, "signed in");
                self.session.session_id = reply.session_id;
                self.shared.set_session_id(&self.session.session_id);
                None
            }
            Ok(reply) => {
                warn!(message = ?reply.message, "sign-in rejected");
                Some(reply.message)
            }
            Err(e) => {
                warn!("malformed sign-in reply: {}", e);
                None
            }
        }
    }

    /// The connection dropped without being asked to.
    fn connection_lost(&mut self, code: CloseCode) {
        self.release(code);

        if !self.auto_reconnect {
            self.finish(CloseReason::Remote(code));
            return;
        }

        match self.reconnect.decide() {
            Decision::Retry { delay, next } => {
                self.reconnect = next;
                self.shared.set_attempt(self.reconnect.attempts_made());
                self.retry = Some(PendingRetry {
                    epoch: self.epoch,
                    delay,
                    deadline: Instant::now() + delay,
                });
                info!(
                    epoch = %self.epoch,
                    attempt = self.reconnect.attempts_made(),
                    delay_ms = delay.as_millis() as u64,
                    "reconnect scheduled"
                );
            }
            Decision::Exhausted => {
                let attempts = self.reconnect.attempts_made();
                warn!(attempts, "reconnect attempts exhausted");
                self.finish(CloseReason::RetryExhausted {
                    attempts,
                    last: code,
                });
            }
        }
    }

    /// A retry timer fired.
    pub fn on_retry_timer(&mut self, epoch: Epoch) {
        match self.retry {
            Some(retry) if retry.epoch == epoch && self.state == ConnectionState::Closed => {
                debug!(
                    attempt = self.reconnect.attempts_made(),
                    waited_ms = retry.delay.as_millis() as u64,
                    "retrying"
                );
                self.connect();
            }
            _ => debug!(epoch = %epoch, "stale retry timer ignored"),
        }
    }

    /// Deliberate close. Cancels the retry timer before touching the transport.
    fn close_deliberately(&mut self, code: CloseCode, reason: CloseReason) {
        self.retry = None;

        if self.state.is_live() {
            self.set_state(ConnectionState::Closing);
            self.transport.close(code, &reason.to_string());
            // Anything the old connection still reports is now stale.
            self.epoch = self.epoch.next();
        }
        self.release(code);
        self.finish(reason);
    }

    /// Drop the transport handle and the server session.
    fn release(&mut self, code: CloseCode) {
        if self.state.is_live() {
            self.transport.close(code, "");
        }
        self.set_state(ConnectionState::Closed);
        if !self.session.session_id.is_empty() {
            self.session.session_id.clear();
            self.shared.set_session_id("");
        }
    }

    /// Report a terminal close, once per lifecycle.
    fn finish(&mut self, reason: CloseReason) {
        self.retry = None;
        self.shared.set_attempt(0);
        if !self.active {
            return;
        }
        self.active = false;
        info!(reason = %reason, "signal closed");
        self.sink.on_closed(reason);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "state change");
        }
        self.state = state;
        self.shared.set(state);
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
