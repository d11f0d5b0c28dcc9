// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! edp-core: Shared library for the EDP outbox relay
//!
//! This crate provides the unit model, the typed outbox payload, and the
//! SQLite-backed local store the relay daemon reads pending changes and
//! local units from.

pub mod db;
pub mod error;
pub mod outbox;
pub mod unit;

pub use db::{Database, OutboxSource, UnitSource};
pub use error::{Error, Result};
pub use outbox::{OutboxPayload, OutboxRow, OutboxStatus};
pub use unit::{Position, Unit, UnitMapping, UnitStatus, UnitUpdate};
