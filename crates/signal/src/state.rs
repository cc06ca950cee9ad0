// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection state published by the network thread.
//!
//! The state machine is the only writer. Readers on other threads get
//! lock-free access to the lifecycle state and the retry count.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::RwLock;

/// Lifecycle state of the signaling connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport connect in progress.
    Opening,
    /// Transport open; commands can be sent.
    Opened,
    /// Deliberate close in progress.
    Closing,
    /// No live transport. Initial state.
    Closed,
}

impl ConnectionState {
    fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Opening => 0,
            ConnectionState::Opened => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Closed => 3,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionState::Opening,
            1 => ConnectionState::Opened,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }

    /// Returns true if a transport handle is live in this state.
    pub fn is_live(self) -> bool {
        matches!(self, ConnectionState::Opening | ConnectionState::Opened)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Opening => "opening",
            ConnectionState::Opened => "opened",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Connection state visible to both the network thread and callers.
pub struct SharedConnectionState {
    /// Current state (atomic for lock-free reads).
    state: AtomicU8,
    /// Retries made since the last successful open.
    attempt: AtomicU32,
    /// Session id granted by the server, empty when none.
    session_id: RwLock<String>,
}

impl SharedConnectionState {
    /// Create a new shared state initialized to closed.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Closed.to_u8()),
            attempt: AtomicU32::new(0),
            session_id: RwLock::new(String::new()),
        }
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }

    pub fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::Acquire)
    }

    pub fn set_attempt(&self, attempt: u32) {
        self.attempt.store(attempt, Ordering::Release);
    }

    pub fn session_id(&self) -> String {
        match self.session_id.read() {
            Ok(id) => id.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_session_id(&self, id: &str) {
        let mut guard = match self.session_id.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clear();
        guard.push_str(id);
    }

    /// Check if exactly opened.
    pub fn is_opened(&self) -> bool {
        self.get() == ConnectionState::Opened
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> String {
        match self.get() {
            ConnectionState::Opening => {
                let attempt = self.attempt();
                if attempt > 0 {
                    format!("opening (retry {})", attempt)
                } else {
                    "opening".to_string()
                }
            }
            ConnectionState::Closed if self.attempt() > 0 => {
                format!("closed (retry {} pending)", self.attempt())
            }
            state => state.to_string(),
        }
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
