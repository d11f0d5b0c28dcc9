// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client side of the remote unit API.
//!
//! The API exposes `/token` for login and verification, `/units` for the
//! unit collection and `/units/{id}` for partial updates. All bodies are JSON
//! and every unit call carries a bearer token.

mod client;
pub mod dto;
pub mod transport;

pub use client::{Credentials, RemoteClient, RemoteError, RemoteResult, AUTH_RETRY_BUDGET};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport, TransportError};

use edp_core::{Unit, UnitUpdate};
use uuid::Uuid;

/// Unit operations consumed by reconciliation and the relay loop.
pub trait UnitApi {
    /// Returns every unit the remote service knows.
    fn list_units(&mut self) -> RemoteResult<Vec<Unit>>;

    /// Creates `unit` remotely and returns it with its assigned id.
    fn create_unit(&mut self, unit: &Unit) -> RemoteResult<Unit>;

    /// Sends the present fields of `update` to the unit with `id`.
    fn update_unit(&mut self, id: Uuid, update: &UnitUpdate) -> RemoteResult<()>;
}
