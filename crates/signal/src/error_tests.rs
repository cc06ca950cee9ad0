// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    already_torn_down = { Error::AlreadyTornDown, "already torn down" },
    from_network_thread = { Error::TeardownFromNetworkThread, "hint:" },
    invalid_url = { Error::InvalidUrl("http://x".into()), "http://x" },
    tls_unavailable = { Error::TlsUnavailable("wss://x".into()), "tls" },
    config = { Error::Config("bad factor".into()), "bad factor" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_toml() {
    let toml_err = toml::from_str::<toml::Table>("url = ").unwrap_err();
    let err: Error = toml_err.into();
    assert!(matches!(err, Error::Toml(_)));
}
