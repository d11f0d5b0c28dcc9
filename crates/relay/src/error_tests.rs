// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    config = { Error::Config("bad".into()), true, 1 },
    core = { Error::Core(edp_core::Error::CorruptedData("x".into())), true, 2 },
    remote = { Error::Remote(RemoteError::Unauthorized), false, 1 },
    unavailable = { Error::RemoteUnavailable("down".into()), false, 1 },
)]
fn fatality_and_exit_code(err: Error, fatal: bool, code: i32) {
    assert_eq!(err.is_fatal(), fatal);
    assert_eq!(err.exit_code(), code);
}

#[test]
fn core_error_display_is_transparent() {
    let err = Error::from(edp_core::Error::CorruptedData("bad row".into()));
    assert_eq!(err.to_string(), "corrupted data: bad row");
}

#[test]
fn config_error_display() {
    let err = Error::Config("invalid value 'x' for relay.interval_secs".into());
    assert_eq!(
        err.to_string(),
        "configuration error: invalid value 'x' for relay.interval_secs"
    );
}
