// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors reported by the signaling client.
///
/// Connection-level failures never surface here; they become state
/// transitions and a close notification. Only local conditions do.
#[derive(Debug, Error)]
pub enum Error {
    #[error("signal already torn down")]
    AlreadyTornDown,

    #[error("teardown called from the network thread\n  hint: tear down from the thread that owns the Signal, not from an event sink callback")]
    TeardownFromNetworkThread,

    #[error("network thread panicked")]
    NetworkThreadPanicked,

    #[error("invalid rendezvous URL '{0}': must be ws:// or wss://")]
    InvalidUrl(String),

    #[error("'{0}' needs TLS, which this build does not include\n  hint: enable the `tls` feature of rdv-signal")]
    TlsUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for rdv-signal operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
