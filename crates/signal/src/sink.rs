// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Notifications delivered by the signaling client.
//!
//! The sink is called on the network thread and must not block it.
//! Heavy handling belongs behind a channel; [`ChannelSink`] does that.

use tokio::sync::mpsc;

use rdv_core::{CloseReason, InboundCommand};

/// A notification from the signaling client.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEvent {
    /// A command arrived from the server.
    Command(InboundCommand),
    /// The connection settled in the closed state.
    Closed(CloseReason),
}

/// Receives notifications from the signaling client.
pub trait EventSink: Send + 'static {
    /// Called once per decoded inbound command.
    fn on_command_received(&mut self, command: InboundCommand);

    /// Called once per terminal close.
    fn on_closed(&mut self, reason: CloseReason);
}

impl<F> EventSink for F
where
    F: FnMut(SignalEvent) + Send + 'static,
{
    fn on_command_received(&mut self, command: InboundCommand) {
        self(SignalEvent::Command(command))
    }

    fn on_closed(&mut self, reason: CloseReason) {
        self(SignalEvent::Closed(reason))
    }
}

/// Forwards notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SignalEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver for its notifications.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelSink { tx }, rx)
    }

    fn forward(&self, event: SignalEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("signal event dropped: receiver gone");
        }
    }
}

impl EventSink for ChannelSink {
    fn on_command_received(&mut self, command: InboundCommand) {
        self.forward(SignalEvent::Command(command));
    }

    fn on_closed(&mut self, reason: CloseReason) {
        self.forward(SignalEvent::Closed(reason));
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
