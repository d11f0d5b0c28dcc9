// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`names`] submodule.

use std::collections::HashMap;
use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Returns the value of `WORK_DIR` if set and non-empty.
pub fn work_dir() -> Option<PathBuf> {
    std::env::var(names::WORK_DIR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Captures the process environment.
///
/// Configuration is resolved once at startup against this snapshot.
pub fn snapshot() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
