// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Signaling client configuration.
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! url = "wss://rendezvous.example.com/signal"
//!
//! [reconnect]
//! max_attempts = 0        # 0 = unlimited
//! delay_ms = 5000
//! delay_max_ms = 25000
//! factor = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use rdv_core::backoff::{self, ReconnectState};

use crate::error::{Error, Result};

/// Signaling client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Rendezvous server URL: `ws://...` or `wss://...`.
    pub url: String,
    /// Reconnect policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Reconnect policy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Retries after a failure before giving up (default: 0 = unlimited).
    #[serde(default)]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds (default: 5000).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Upper bound on the retry delay in milliseconds (default: 25000).
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
    /// Growth factor applied per failed attempt (default: 2.0).
    #[serde(default = "default_factor")]
    pub factor: f64,
}

fn default_delay_ms() -> u64 {
    backoff::DEFAULT_MIN_DELAY.as_millis() as u64
}

fn default_delay_max_ms() -> u64 {
    backoff::DEFAULT_MAX_DELAY.as_millis() as u64
}

fn default_factor() -> f64 {
    backoff::DEFAULT_FACTOR
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            max_attempts: 0,
            delay_ms: default_delay_ms(),
            delay_max_ms: default_delay_max_ms(),
            factor: default_factor(),
        }
    }
}

impl ReconnectConfig {
    /// Builds the initial policy state.
    ///
    /// A `delay_max_ms` below `delay_ms` is raised to match.
    pub fn to_state(&self) -> ReconnectState {
        ReconnectState::new(
            Duration::from_millis(self.delay_ms),
            Duration::from_millis(self.delay_max_ms),
            self.max_attempts,
        )
        .with_factor(self.factor)
    }
}

impl SignalConfig {
    /// Creates a configuration for the given URL with the default policy.
    pub fn new(url: impl Into<String>) -> Self {
        SignalConfig {
            url: url.into(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SignalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns true if the URL requests TLS.
    pub fn is_secure(&self) -> bool {
        self.url.starts_with("wss://")
    }

    /// Checks the URL scheme and the policy values.
    pub fn validate(&self) -> Result<()> {
        if !is_websocket_url(&self.url) {
            return Err(Error::InvalidUrl(self.url.clone()));
        }
        if self.is_secure() && !cfg!(feature = "tls") {
            return Err(Error::TlsUnavailable(self.url.clone()));
        }
        if !self.reconnect.factor.is_finite() || self.reconnect.factor < 1.0 {
            return Err(Error::Config(format!(
                "reconnect factor must be at least 1.0, got {}",
                self.reconnect.factor
            )));
        }
        Ok(())
    }
}

/// Returns true for `ws://` and `wss://` URLs with a non-empty host part.
pub fn is_websocket_url(url: &str) -> bool {
    url.strip_prefix("ws://")
        .or_else(|| url.strip_prefix("wss://"))
        .is_some_and(|rest| !rest.is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
