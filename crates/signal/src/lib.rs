// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rdv-signal: signaling-channel client for a rendezvous server.
//!
//! Keeps one authenticated WebSocket connection to the server, exchanges
//! JSON commands over it, and reconnects with backoff when it drops.
//!
//! # Architecture
//!
//! ```text
//!  caller threads                      network thread (tokio current_thread)
//! ┌─────────────┐   Request      ┌──────────────────────────────────────┐
//! │   Signal    │──────────────► │              run loop                │
//! │  (handle)   │                │  ┌─────────┐   ┌──────────────────┐  │
//! └─────────────┘                │  │ Machine │──►│ Transport (trait)│──┼──► server
//!        ▲                       │  └─────────┘   └──────────────────┘  │
//!        │ lock-free reads       │     ▲  │  ▲            │ Envelope     │
//! ┌──────┴───────────────┐       │     │  │  └────────────┘ (epoch)     │
//! │SharedConnectionState │◄──────┼─────┘  │ retry timer                 │
//! └──────────────────────┘       │        ▼                             │
//!                                │   EventSink (commands, close)        │
//!                                └──────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - Built-in `signin` handshake, session id published on success
//! - Automatic reconnect with bounded geometric backoff
//! - Stale connection events and timers dropped by epoch
//! - Injectable transport trait for testing

pub mod config;
pub mod error;
mod machine;
pub mod signal;
pub mod sink;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use config::{ReconnectConfig, SignalConfig};
pub use error::{Error, Result};
pub use signal::{Signal, SignalInterface};
pub use sink::{ChannelSink, EventSink, SignalEvent};
pub use state::ConnectionState;
pub use transport::{Epoch, EventSender, Transport, TransportEvent, WebSocketTransport};

pub use rdv_core::{CloseCode, CloseReason, InboundCommand, OutboundCommand, Scope};
