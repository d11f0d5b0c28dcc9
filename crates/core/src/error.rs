// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for edp-core operations.

use thiserror::Error;

/// All possible errors that can occur in edp-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid outbox payload: {0}")]
    InvalidPayload(String),

    #[error("invalid unit status: '{0}'\n  hint: status codes are integers from 0 to 255")]
    InvalidStatus(String),

    #[error("invalid outbox status: '{0}'\n  hint: valid statuses are: NEW, DEAD")]
    InvalidOutboxStatus(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for edp-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
