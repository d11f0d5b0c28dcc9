// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the relay service.

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors that stop or delay the relay.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] edp_core::Error),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("remote API unavailable: {0}")]
    RemoteUnavailable(String),
}

impl Error {
    /// Fatal errors end the process; the rest are retried at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Core(_))
    }

    /// Process exit code for a fatal error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Core(_) => 2,
            _ => 1,
        }
    }
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
