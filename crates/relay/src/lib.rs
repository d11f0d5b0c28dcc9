// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! edp_relay - forwards local unit changes to a remote unit API.
//!
//! # Main Components
//!
//! - [`config`] - layered settings from `edp-relay.toml`, the environment and defaults
//! - [`remote`] - authenticated client for the remote unit API
//! - [`reconcile`] - startup merge of local and remote units by name
//! - [`relay`] - the polling loop that drains the outbox into the remote API
//! - [`startup`] - retry policy for bringing the remote side up
//!
//! The store itself lives in `edp_core`.

pub mod config;
pub mod env;
pub mod error;
pub mod reconcile;
pub mod relay;
pub mod remote;
pub mod startup;

#[cfg(test)]
mod test_helpers;

pub use config::{ApiConfig, Config, ConfigProvider};
pub use error::{Error, Result};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileReport};
pub use relay::{CycleReport, Relay, RelayOptions, RelayStats};
pub use remote::{RemoteClient, RemoteError, UnitApi};
