// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Signaling command wire format.
//!
//! Every frame on the signaling channel is a JSON object:
//!
//! ```text
//! {"command": "<name>", "data": <payload>, "id": "<session id>"}
//! ```
//!
//! - `command` is required and must be a non-empty string
//! - `data` defaults to `{}` when absent
//! - `id` targets a session; global commands omit it

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProtocolError, Result};

/// Command sent on open to authenticate the channel.
pub const SIGNIN: &str = "signin";

/// Command sent best-effort before a deliberate close.
pub const SIGNOUT: &str = "signout";

/// Target of an outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Delivered to a specific session.
    Session(String),
    /// Broadcast; no target session id on the wire.
    Global,
}

impl Scope {
    /// Scope for a session id. An empty id is treated as global.
    pub fn session(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            Scope::Global
        } else {
            Scope::Session(id)
        }
    }

    fn target(&self) -> Option<&str> {
        match self {
            Scope::Session(id) => Some(id),
            Scope::Global => None,
        }
    }
}

/// A command on its way to the rendezvous server.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCommand {
    pub scope: Scope,
    pub name: String,
    pub payload: Value,
}

#[derive(Serialize)]
struct Envelope<'a> {
    command: &'a str,
    data: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

impl OutboundCommand {
    /// Creates a command for the given scope.
    pub fn new(scope: Scope, name: impl Into<String>, payload: Value) -> Self {
        OutboundCommand {
            scope,
            name: name.into(),
            payload,
        }
    }

    /// Creates a global command.
    pub fn global(name: impl Into<String>, payload: Value) -> Self {
        Self::new(Scope::Global, name, payload)
    }

    /// Creates the sign-in command carrying the user's credentials.
    pub fn signin(user_id: &str, password: &str) -> Self {
        let mut data = Map::new();
        data.insert("id".to_string(), Value::String(user_id.to_string()));
        data.insert("password".to_string(), Value::String(password.to_string()));
        Self::global(SIGNIN, Value::Object(data))
    }

    /// Creates the sign-out notification.
    pub fn signout() -> Self {
        Self::global(SIGNOUT, Value::Object(Map::new()))
    }

    /// Serializes the command to its wire form.
    pub fn to_json(&self) -> Result<String> {
        let envelope = Envelope {
            command: &self.name,
            data: &self.payload,
            id: self.scope.target(),
        };
        Ok(serde_json::to_string(&envelope)?)
    }
}

/// A command received from the rendezvous server.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCommand {
    pub name: String,
    pub payload: Value,
}

impl InboundCommand {
    /// Decodes a raw text frame.
    ///
    /// Fails when the frame is not a JSON object or carries no command name.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let name = match object.remove("command") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => return Err(ProtocolError::MissingCommand),
        };

        let payload = match object.remove("data") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(data) => data,
        };

        Ok(InboundCommand { name, payload })
    }

    /// Returns true if this command has the given name.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Server reply to a `signin` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInReply {
    /// Whether the credentials were accepted.
    #[serde(default)]
    pub result: bool,
    /// Session id granted by the server.
    #[serde(default)]
    pub session_id: String,
    /// Optional human-readable rejection reason.
    #[serde(default)]
    pub message: Option<String>,
}

impl SignInReply {
    /// Reads a reply out of a `signin` command payload.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        Ok(SignInReply::deserialize(payload)?)
    }

    /// Returns true if the server granted a session.
    pub fn accepted(&self) -> bool {
        self.result && !self.session_id.is_empty()
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
