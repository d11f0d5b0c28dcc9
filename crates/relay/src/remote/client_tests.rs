// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::remote::Method;
use crate::test_helpers::MockTransport;
use edp_core::{Position, UnitStatus};
use serde_json::json;
use yare::parameterized;

const UNIT_ID: &str = "6f1c2a1e-0d5b-4c3a-9f7e-2b8d4e6a1c00";

fn login() -> Credentials {
    Credentials {
        token: None,
        username: Some("relay".into()),
        password: Some("secret".into()),
    }
}

fn client(transport: MockTransport) -> RemoteClient<MockTransport> {
    RemoteClient::with_transport("http://remote/api", login(), transport)
}

#[test]
fn authenticate_posts_credentials_and_reads_token() {
    let c = client(MockTransport::new().respond(200, r#"{"token":"abc"}"#));

    assert_eq!(c.authenticate().as_deref(), Some("abc"));
    let requests = c.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/token");
    assert_eq!(
        requests[0].body,
        Some(json!({"username": "relay", "password": "secret"}))
    );
    assert_eq!(requests[0].bearer, None);
}

#[parameterized(
    rejected = { 403, r#"{"error":"denied"}"# },
    malformed = { 200, "not json" },
    missing_token = { 200, "{}" },
)]
fn authenticate_returns_none_on_bad_response(status: u16, body: &str) {
    let c = client(MockTransport::new().respond(status, body));
    assert_eq!(c.authenticate(), None);
}

#[test]
fn authenticate_returns_none_on_network_failure() {
    let c = client(MockTransport::new().fail(TransportError::Timeout("10s".into())));
    assert_eq!(c.authenticate(), None);
}

#[test]
fn authenticate_falls_back_to_static_token() {
    let credentials = Credentials {
        token: Some("static".into()),
        ..Credentials::default()
    };
    let c = RemoteClient::with_transport("http://remote/api", credentials, MockTransport::new());

    assert_eq!(c.authenticate().as_deref(), Some("static"));
    assert!(c.transport().requests().is_empty());
}

#[test]
fn authenticate_without_credentials_is_none() {
    let c = RemoteClient::with_transport(
        "http://remote/api",
        Credentials::default(),
        MockTransport::new(),
    );
    assert_eq!(c.authenticate(), None);
}

#[test]
fn verify_connection_logs_in_then_checks_token() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(200, "{}"),
    );

    assert!(c.verify_connection());
    assert_eq!(c.token(), Some("abc"));
    let requests = c.transport().requests();
    assert_eq!(requests[1].method, Method::Get);
    assert_eq!(requests[1].path, "/token");
    assert_eq!(requests[1].bearer.as_deref(), Some("abc"));
}

#[test]
fn verify_connection_false_for_empty_url() {
    let mut c = RemoteClient::with_transport("", login(), MockTransport::new());
    assert!(!c.verify_connection());
    assert!(c.transport().requests().is_empty());
}

#[test]
fn verify_connection_clears_rejected_token() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(401, ""),
    );
    assert!(!c.verify_connection());
    assert_eq!(c.token(), None);
}

#[test]
fn verify_connection_false_when_unreachable() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .fail(TransportError::ConnectionFailed("refused".into())),
    );
    assert!(!c.verify_connection());
}

#[test]
fn persistent_401_reauthenticates_once_then_gives_up() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"first"}"#)
            .respond(401, "")
            .respond(200, r#"{"token":"second"}"#)
            .respond(401, ""),
    );

    let err = c.list_units().unwrap_err();

    assert!(matches!(err, RemoteError::Unauthorized));
    assert_eq!(c.transport().count(Method::Post, "/token"), 2);
    assert_eq!(c.transport().count(Method::Get, "/units"), 2);
    assert_eq!(c.token(), None);
}

#[test]
fn failed_reauthentication_skips_the_retry() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"first"}"#)
            .respond(401, "")
            .respond(403, ""),
    );

    let err = c.list_units().unwrap_err();

    assert!(matches!(err, RemoteError::Unauthorized));
    assert_eq!(c.transport().count(Method::Post, "/token"), 2);
    assert_eq!(c.transport().count(Method::Get, "/units"), 1);
    assert_eq!(c.token(), None);
}

#[test]
fn single_401_is_recovered_with_fresh_token() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"stale"}"#)
            .respond(401, "")
            .respond(200, r#"{"token":"fresh"}"#)
            .respond(200, r#"{"_embedded":{"unitList":[{"id":"6f1c2a1e-0d5b-4c3a-9f7e-2b8d4e6a1c00","name":"ELW","status":2}]}}"#),
    );

    let units = c.list_units().unwrap();

    assert_eq!(units.len(), 1);
    assert_eq!(c.token(), Some("fresh"));
    let requests = c.transport().requests();
    assert_eq!(requests[1].bearer.as_deref(), Some("stale"));
    assert_eq!(requests[3].bearer.as_deref(), Some("fresh"));
}

#[test]
fn list_units_non_success_is_read_error() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(503, "unavailable"),
    );
    let err = c.list_units().unwrap_err();
    assert!(matches!(err, RemoteError::Read { status: 503 }));
    assert!(err.is_transient());
}

#[test]
fn list_units_without_embedded_is_empty() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(200, r#"{"_links":{}}"#),
    );
    assert!(c.list_units().unwrap().is_empty());
}

#[test]
fn create_unit_returns_remote_id() {
    let body = format!(r#"{{"id":"{UNIT_ID}","name":"ELW","status":3}}"#);
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(201, &body),
    );

    let created = c
        .create_unit(&Unit::new("ELW").with_status(UnitStatus::new(3)))
        .unwrap();

    assert_eq!(created.id, Some(UNIT_ID.parse().unwrap()));
    let requests = c.transport().requests();
    assert_eq!(requests[1].method, Method::Post);
    assert_eq!(requests[1].path, "/units");
    assert_eq!(requests[1].body, Some(json!({"name": "ELW", "status": 3})));
}

#[test]
fn create_unit_without_id_is_decode_error() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(201, r#"{"name":"ELW"}"#),
    );
    let err = c.create_unit(&Unit::new("ELW")).unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)));
}

#[test]
fn create_unit_rejected_is_write_error() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(409, ""),
    );
    let err = c.create_unit(&Unit::new("ELW")).unwrap_err();
    assert!(matches!(err, RemoteError::Write { status: 409 }));
    assert!(!err.is_transient());
}

#[test]
fn update_unit_patches_only_present_fields() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(200, "{}"),
    );
    let id: Uuid = UNIT_ID.parse().unwrap();
    let update = UnitUpdate {
        status: Some(UnitStatus::new(2)),
        position: None,
    };

    c.update_unit(id, &update).unwrap();

    let requests = c.transport().requests();
    assert_eq!(requests[1].method, Method::Patch);
    assert_eq!(requests[1].path, format!("/units/{UNIT_ID}"));
    assert_eq!(requests[1].body, Some(json!({"status": 2})));
    assert_eq!(requests[1].bearer.as_deref(), Some("abc"));
}

#[test]
fn update_unit_carries_position() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(204, ""),
    );
    let update = UnitUpdate {
        status: None,
        position: Some(Some(Position::new(7.1, 50.7))),
    };

    c.update_unit(UNIT_ID.parse().unwrap(), &update).unwrap();

    assert_eq!(
        c.transport().requests()[1].body,
        Some(json!({"position": {"longitude": 7.1, "latitude": 50.7}}))
    );
}

#[test]
fn update_unit_clears_position_with_null() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(204, ""),
    );
    let update = UnitUpdate {
        status: None,
        position: Some(None),
    };

    c.update_unit(UNIT_ID.parse().unwrap(), &update).unwrap();

    assert_eq!(
        c.transport().requests()[1].body,
        Some(json!({"position": null}))
    );
}

#[test]
fn transport_failure_is_transient() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .fail(TransportError::Timeout("10s".into())),
    );
    let err = c
        .update_unit(UNIT_ID.parse().unwrap(), &UnitUpdate::default())
        .unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
    assert!(err.is_transient());
}

#[test]
fn held_token_is_reused_without_login() {
    let mut c = client(
        MockTransport::new()
            .respond(200, r#"{"token":"abc"}"#)
            .respond(200, "{}")
            .respond(200, "{}")
            .respond(200, "{}"),
    );
    let id: Uuid = UNIT_ID.parse().unwrap();
    c.update_unit(id, &UnitUpdate::default()).unwrap();
    c.update_unit(id, &UnitUpdate::default()).unwrap();
    c.update_unit(id, &UnitUpdate::default()).unwrap();

    assert_eq!(c.transport().count(Method::Post, "/token"), 1);
}
