// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Close status codes and the reasons a signaling channel ends.

use std::fmt;

/// WebSocket close status (RFC 6455 §7.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// 1000
    Normal,
    /// 1001
    GoingAway,
    /// 1002
    Protocol,
    /// 1005, close frame without a status.
    NoStatus,
    /// 1006, connection dropped or never opened.
    Abnormal,
    /// 1008
    Policy,
    /// 1011
    Error,
    /// Any other status, carried verbatim.
    Other(u16),
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::Protocol,
            1005 => CloseCode::NoStatus,
            1006 => CloseCode::Abnormal,
            1008 => CloseCode::Policy,
            1011 => CloseCode::Error,
            other => CloseCode::Other(other),
        }
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        match code {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::Protocol => 1002,
            CloseCode::NoStatus => 1005,
            CloseCode::Abnormal => 1006,
            CloseCode::Policy => 1008,
            CloseCode::Error => 1011,
            CloseCode::Other(other) => other,
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u16::from(*self))
    }
}

/// Why a signaling channel settled in the closed state.
///
/// Delivered exactly once per terminal close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The application signed out.
    SignedOut,
    /// The client was torn down.
    TornDown,
    /// The server closed the connection normally.
    Remote(CloseCode),
    /// The server rejected the sign-in credentials.
    AuthFailure { message: Option<String> },
    /// The reconnect budget ran out.
    RetryExhausted {
        /// Retries made after the initial failure.
        attempts: u32,
        /// Close status of the last failed attempt.
        last: CloseCode,
    },
}

impl CloseReason {
    /// The close status associated with this reason.
    pub fn code(&self) -> CloseCode {
        match self {
            CloseReason::SignedOut => CloseCode::Normal,
            CloseReason::TornDown => CloseCode::GoingAway,
            CloseReason::Remote(code) => *code,
            CloseReason::AuthFailure { .. } => CloseCode::Policy,
            CloseReason::RetryExhausted { last, .. } => *last,
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::SignedOut => write!(f, "signed out"),
            CloseReason::TornDown => write!(f, "torn down"),
            CloseReason::Remote(code) => write!(f, "closed by server ({})", code),
            CloseReason::AuthFailure { message: Some(m) } => {
                write!(f, "sign-in rejected: {}", m)
            }
            CloseReason::AuthFailure { message: None } => write!(f, "sign-in rejected"),
            CloseReason::RetryExhausted { attempts, last } => {
                write!(f, "gave up after {} retries (last status {})", attempts, last)
            }
        }
    }
}

#[cfg(test)]
#[path = "close_tests.rs"]
mod tests;
