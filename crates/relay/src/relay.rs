// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The relay loop.
//!
//! Every cycle drains the pending outbox rows in id order. A row is
//! acknowledged only after its change reached the remote API, or when it
//! carries no change at all. Failed rows stay pending and are retried on the
//! next cycle, unless a maximum attempt count moves them to the dead-letter
//! state. Later rows of a unit whose row failed wait behind it, so changes to
//! one unit reach the remote side in order.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use edp_core::{OutboxRow, OutboxSource, UnitMapping};
use thiserror::Error;

use crate::remote::{RemoteError, UnitApi};

/// Why a single row could not be relayed.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("no remote unit mapped for '{0}'")]
    MissingMapping(String),

    #[error(transparent)]
    Payload(edp_core::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    /// Time between the starts of two cycles.
    pub interval: Duration,
    /// Failed attempts after which a row is quarantined.
    pub max_attempts: Option<u32>,
}

impl Default for RelayOptions {
    fn default() -> Self {
        RelayOptions {
            interval: Duration::from_secs(3),
            max_attempts: None,
        }
    }
}

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    /// Rows whose change was sent and acknowledged.
    pub applied: usize,
    /// Rows acknowledged without a remote call.
    pub unchanged: usize,
    pub failed: usize,
    pub quarantined: usize,
    /// Rows left pending behind an earlier failed row of the same unit.
    pub deferred: usize,
}

/// Running totals over the lifetime of a relay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayStats {
    pub cycles: u64,
    pub applied: u64,
    pub unchanged: u64,
    pub failed: u64,
    pub quarantined: u64,
    /// End of the last cycle that completed without a store error.
    pub last_success: Option<DateTime<Utc>>,
}

impl RelayStats {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.applied += report.applied as u64;
        self.unchanged += report.unchanged as u64;
        self.failed += report.failed as u64;
        self.quarantined += report.quarantined as u64;
        self.last_success = Some(Utc::now());
    }
}

enum Applied {
    Sent,
    Unchanged,
}

/// Forwards outbox rows from `S` to the remote API `A`.
pub struct Relay<S: OutboxSource, A: UnitApi> {
    source: S,
    api: A,
    mapping: UnitMapping,
    options: RelayOptions,
    attempts: HashMap<i64, u32>,
    stats: RelayStats,
}

impl<S: OutboxSource, A: UnitApi> Relay<S, A> {
    pub fn new(source: S, api: A, mapping: UnitMapping, options: RelayOptions) -> Self {
        Relay {
            source,
            api,
            mapping,
            options,
            attempts: HashMap::new(),
            stats: RelayStats::default(),
        }
    }

    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    pub fn mapping(&self) -> &UnitMapping {
        &self.mapping
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Relay every pending row once.
    ///
    /// Row failures are logged and counted; only store errors are returned.
    pub fn run_cycle(&mut self) -> edp_core::Result<CycleReport> {
        let rows = self.source.fetch_pending()?;
        self.attempts
            .retain(|id, _| rows.iter().any(|row| row.id == *id));

        let mut report = CycleReport {
            fetched: rows.len(),
            ..CycleReport::default()
        };

        // units with a pending failed row in this cycle
        let mut blocked: HashSet<&str> = HashSet::new();

        for row in &rows {
            if row.created_at.is_none() {
                tracing::warn!(row = row.id, "unreadable created_at");
            }
            if blocked.contains(row.pk.as_str()) {
                tracing::debug!(
                    row = row.id,
                    unit = %row.pk,
                    "waiting behind an earlier failed row"
                );
                report.deferred += 1;
                continue;
            }
            match self.apply(row) {
                Ok(outcome) => {
                    self.source.acknowledge(row.id)?;
                    self.attempts.remove(&row.id);
                    match outcome {
                        Applied::Sent => report.applied += 1,
                        Applied::Unchanged => report.unchanged += 1,
                    }
                }
                Err(e) => {
                    tracing::warn!(row = row.id, unit = %row.pk, "relay failed: {e}");
                    report.failed += 1;
                    if self.record_failure(row.id) {
                        tracing::warn!(row = row.id, unit = %row.pk, "moving row to dead letter");
                        self.source.quarantine(row.id)?;
                        self.attempts.remove(&row.id);
                        report.quarantined += 1;
                    } else {
                        blocked.insert(row.pk.as_str());
                    }
                }
            }
        }

        if report.fetched > 0 {
            tracing::info!(
                applied = report.applied,
                unchanged = report.unchanged,
                failed = report.failed,
                quarantined = report.quarantined,
                deferred = report.deferred,
                "relayed {} outbox rows",
                report.fetched
            );
        }
        self.stats.record(&report);
        Ok(report)
    }

    /// Run cycles forever at the configured interval.
    ///
    /// Returns only when the store fails.
    pub fn run(&mut self) -> edp_core::Result<()> {
        tracing::info!(
            "relay started, polling every {}s",
            self.options.interval.as_secs_f64()
        );
        loop {
            let started = Instant::now();
            self.run_cycle()?;
            if let Some(rest) = self.options.interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    fn apply(&mut self, row: &OutboxRow) -> Result<Applied, RowError> {
        let id = self
            .mapping
            .get(&row.pk)
            .ok_or_else(|| RowError::MissingMapping(row.pk.clone()))?;
        let update = row
            .parse_payload()
            .and_then(|payload| payload.changes())
            .map_err(RowError::Payload)?;
        if update.is_empty() {
            tracing::debug!(row = row.id, "no change for '{}'", row.pk);
            return Ok(Applied::Unchanged);
        }
        self.api.update_unit(id, &update)?;
        tracing::debug!(row = row.id, "updated '{}'", row.pk);
        Ok(Applied::Sent)
    }

    /// Count a failed attempt; true once the row should be quarantined.
    fn record_failure(&mut self, row_id: i64) -> bool {
        let count = self.attempts.entry(row_id).or_insert(0);
        *count += 1;
        self.options.max_attempts.is_some_and(|max| *count >= max)
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
