// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn command(name: &str) -> InboundCommand {
    InboundCommand {
        name: name.to_string(),
        payload: json!({}),
    }
}

#[test]
fn closure_sink_receives_both_kinds() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let mut sink = move |event: SignalEvent| log.lock().unwrap().push(event);

    sink.on_command_received(command("offer"));
    sink.on_closed(CloseReason::SignedOut);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            SignalEvent::Command(command("offer")),
            SignalEvent::Closed(CloseReason::SignedOut),
        ]
    );
}

#[test]
fn channel_sink_forwards_in_order() {
    let (mut sink, mut rx) = ChannelSink::new();
    sink.on_command_received(command("a"));
    sink.on_command_received(command("b"));
    sink.on_closed(CloseReason::TornDown);

    assert_eq!(rx.try_recv().unwrap(), SignalEvent::Command(command("a")));
    assert_eq!(rx.try_recv().unwrap(), SignalEvent::Command(command("b")));
    assert_eq!(
        rx.try_recv().unwrap(),
        SignalEvent::Closed(CloseReason::TornDown)
    );
}

#[test]
fn channel_sink_tolerates_dropped_receiver() {
    let (mut sink, rx) = ChannelSink::new();
    drop(rx);
    sink.on_closed(CloseReason::SignedOut);
}
