// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Startup retry policy.
//!
//! Until the remote API is reachable and reconciliation succeeded, startup
//! is retried after a fixed delay. Fatal errors end the retries.

use std::time::Duration;

use crate::error::Result;

/// Run `attempt` until it succeeds or fails fatally.
///
/// `sleep` is called with `delay` between attempts.
pub fn retry_until_ready<T>(
    delay: Duration,
    mut attempt: impl FnMut() -> Result<T>,
    mut sleep: impl FnMut(Duration),
) -> Result<T> {
    let mut tries: u32 = 0;
    loop {
        tries += 1;
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    attempt = tries,
                    "startup failed: {e}; retrying in {}s",
                    delay.as_secs()
                );
                sleep(delay);
            }
        }
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
