// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn global_ping_roundtrip() {
    let cmd = OutboundCommand::new(Scope::Global, "ping", json!({}));
    let json = cmd.to_json().unwrap();
    let parsed = InboundCommand::from_json(&json).unwrap();
    assert_eq!(parsed.name, "ping");
    assert_eq!(parsed.payload, json!({}));
}

#[test]
fn global_command_omits_target() {
    let json = OutboundCommand::global("offer", json!({"sdp": "v=0"}))
        .to_json()
        .unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        json!({"command": "offer", "data": {"sdp": "v=0"}})
    );
}

#[test]
fn scoped_command_carries_session_id() {
    let json = OutboundCommand::new(Scope::session("s-42"), "offer", json!({"sdp": "v=0"}))
        .to_json()
        .unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["id"], "s-42");
    assert_eq!(value["command"], "offer");
}

#[test]
fn empty_session_id_is_global() {
    assert_eq!(Scope::session(""), Scope::Global);
    assert_eq!(Scope::session("abc"), Scope::Session("abc".into()));
}

#[test]
fn signin_command_format() {
    let json = OutboundCommand::signin("alice", "secret").to_json().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        json!({"command": "signin", "data": {"id": "alice", "password": "secret"}})
    );
}

#[test]
fn signout_command_format() {
    let json = OutboundCommand::signout().to_json().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value, json!({"command": "signout", "data": {}}));
}

#[test]
fn decode_missing_data_is_empty_object() {
    let cmd = InboundCommand::from_json(r#"{"command":"ping"}"#).unwrap();
    assert!(cmd.is("ping"));
    assert_eq!(cmd.payload, json!({}));
}

#[test]
fn decode_ignores_extra_fields() {
    let cmd =
        InboundCommand::from_json(r#"{"command":"answer","data":[1,2],"id":"s-1","x":true}"#)
            .unwrap();
    assert_eq!(cmd.name, "answer");
    assert_eq!(cmd.payload, json!([1, 2]));
}

#[parameterized(
    not_json = { "hello" },
    truncated = { r#"{"command":"#},
)]
fn decode_rejects_unparseable(text: &str) {
    let err = InboundCommand::from_json(text).unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[parameterized(
    array = { "[1,2,3]" },
    string = { r#""signin""# },
    null = { "null" },
)]
fn decode_rejects_non_objects(text: &str) {
    let err = InboundCommand::from_json(text).unwrap_err();
    assert!(matches!(err, ProtocolError::NotAnObject));
}

#[parameterized(
    absent = { r#"{"data":{}}"# },
    empty = { r#"{"command":""}"# },
    number = { r#"{"command":7}"# },
)]
fn decode_rejects_missing_command(text: &str) {
    let err = InboundCommand::from_json(text).unwrap_err();
    assert!(matches!(err, ProtocolError::MissingCommand));
}

#[test]
fn signin_reply_accepted() {
    let reply = SignInReply::from_payload(&json!({"result": true, "session_id": "s-1"})).unwrap();
    assert!(reply.accepted());
    assert_eq!(reply.session_id, "s-1");
    assert_eq!(reply.message, None);
}

#[test]
fn signin_reply_rejected() {
    let reply =
        SignInReply::from_payload(&json!({"result": false, "message": "bad password"})).unwrap();
    assert!(!reply.accepted());
    assert_eq!(reply.message.as_deref(), Some("bad password"));
}

#[test]
fn signin_reply_without_session_is_not_accepted() {
    let reply = SignInReply::from_payload(&json!({"result": true})).unwrap();
    assert!(!reply.accepted());
}

#[test]
fn signin_reply_wrong_shape_is_error() {
    assert!(SignInReply::from_payload(&json!("nope")).is_err());
}
