// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn shared_state_initial_values() {
    let state = SharedConnectionState::new();
    assert_eq!(state.get(), ConnectionState::Closed);
    assert_eq!(state.attempt(), 0);
    assert_eq!(state.session_id(), "");
    assert!(!state.is_opened());
}

#[test]
fn opened_only_when_exactly_opened() {
    let state = SharedConnectionState::new();
    for (s, expected) in [
        (ConnectionState::Opening, false),
        (ConnectionState::Opened, true),
        (ConnectionState::Closing, false),
        (ConnectionState::Closed, false),
    ] {
        state.set(s);
        assert_eq!(state.get(), s);
        assert_eq!(state.is_opened(), expected, "state {}", s);
    }
}

#[test]
fn live_states() {
    assert!(ConnectionState::Opening.is_live());
    assert!(ConnectionState::Opened.is_live());
    assert!(!ConnectionState::Closing.is_live());
    assert!(!ConnectionState::Closed.is_live());
}

#[test]
fn session_id_replaced_and_cleared() {
    let state = SharedConnectionState::new();
    state.set_session_id("s-1");
    assert_eq!(state.session_id(), "s-1");
    state.set_session_id("s-22");
    assert_eq!(state.session_id(), "s-22");
    state.set_session_id("");
    assert_eq!(state.session_id(), "");
}

#[test]
fn shared_state_status_string() {
    let state = SharedConnectionState::new();
    assert_eq!(state.status_string(), "closed");

    state.set(ConnectionState::Opening);
    assert_eq!(state.status_string(), "opening");

    state.set_attempt(3);
    assert_eq!(state.status_string(), "opening (retry 3)");

    state.set(ConnectionState::Closed);
    assert_eq!(state.status_string(), "closed (retry 3 pending)");

    state.set(ConnectionState::Opened);
    state.set_attempt(0);
    assert_eq!(state.status_string(), "opened");
}
