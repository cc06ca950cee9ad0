// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rdv-core operations.

use thiserror::Error;

/// Errors raised while encoding or decoding signaling messages.
///
/// None of these are fatal to a connection: the client logs and drops
/// the offending message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message has no command name")]
    MissingCommand,
}

/// A specialized Result type for rdv-core operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
