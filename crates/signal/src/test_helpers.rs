// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for signal module tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rdv_core::CloseCode;
use serde_json::Value;

use crate::transport::{EventSender, Transport, TransportError, TransportResult};

/// Mock transport for testing without real sockets.
///
/// Clones share state, so a test can keep one handle while the state
/// machine owns another, and drive the connection from outside.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Default)]
struct MockInner {
    /// URL of every connect call, in order.
    connects: Vec<String>,
    /// Frames written via send().
    sent: Vec<String>,
    /// Codes passed to close().
    closes: Vec<CloseCode>,
    /// Sender for the most recent connect call.
    events: Option<EventSender>,
    /// Whether a connection is live.
    live: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_count(&self) -> usize {
        self.inner.lock().unwrap().connects.len()
    }

    pub fn connect_urls(&self) -> Vec<String> {
        self.inner.lock().unwrap().connects.clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().unwrap().sent.clone()
    }

    /// Sent frames parsed as JSON.
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }

    /// Command names of sent frames.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .map(|v| v["command"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn closes(&self) -> Vec<CloseCode> {
        self.inner.lock().unwrap().closes.clone()
    }

    pub fn is_live(&self) -> bool {
        self.inner.lock().unwrap().live
    }

    /// Event sender handed over by the latest connect call.
    pub fn sender(&self) -> EventSender {
        self.inner.lock().unwrap().events.clone().unwrap()
    }

    pub fn open(&self) {
        self.sender().open();
    }

    pub fn fail(&self) {
        self.sender().fail("mock failure");
    }

    pub fn close_remote(&self, code: CloseCode) {
        self.sender().close(code);
    }

    pub fn message(&self, text: &str) {
        self.sender().message(text);
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str, events: EventSender) {
        let mut inner = self.inner.lock().unwrap();
        inner.connects.push(url.to_string());
        inner.events = Some(events);
        inner.live = true;
    }

    fn send(&mut self, text: String) -> TransportResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.live {
            return Err(TransportError::ConnectionClosed);
        }
        inner.sent.push(text);
        Ok(())
    }

    fn close(&mut self, code: CloseCode, _reason: &str) {
        let mut inner = self.inner.lock().unwrap();
        if inner.live {
            inner.live = false;
            inner.closes.push(code);
        }
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub fn wait_until(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
