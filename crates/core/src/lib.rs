// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rdv-core: Shared library for the rdv signaling client
//!
//! This crate holds the pieces of the signaling channel that do no I/O:
//! the command wire format, close reasons, and the reconnect backoff policy.
//! The connection itself lives in `rdv-signal`.

pub mod backoff;
pub mod close;
pub mod error;
pub mod protocol;

pub use backoff::{Decision, ReconnectState};
pub use close::{CloseCode, CloseReason};
pub use error::{ProtocolError, Result};
pub use protocol::{InboundCommand, OutboundCommand, Scope, SignInReply};
