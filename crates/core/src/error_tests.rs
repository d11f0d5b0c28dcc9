// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_payload = { Error::InvalidPayload("missing NEW_KOORDY".into()), "NEW_KOORDY" },
    invalid_status = { Error::InvalidStatus("x".into()), "0 to 255" },
    invalid_outbox_status = { Error::InvalidOutboxStatus("DONE".into()), "NEW, DEAD" },
    corrupted = { Error::CorruptedData("bad row".into()), "bad row" },
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
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn error_from_sqlite() {
    let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, Error::Database(_)));
}
