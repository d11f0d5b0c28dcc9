// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Startup reconciliation of local and remote units.
//!
//! Units are matched by name. Local units missing remotely are created,
//! matched units get the local state pushed when it differs, and remote-only
//! units are mapped so their outbox rows still resolve but are never touched.

use std::collections::HashMap;

use edp_core::{Unit, UnitMapping, UnitSource};

use crate::error::Result;
use crate::remote::UnitApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Create and update remote units from local state.
    pub push_local: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions { push_local: true }
    }
}

/// Counts of what reconciliation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub remote_only: usize,
}

/// Build the name to remote id mapping, bringing the remote side in line
/// with local units on the way.
///
/// Any error aborts the whole run; no partial mapping is returned.
pub fn reconcile(
    local: &impl UnitSource,
    remote: &mut impl UnitApi,
    options: ReconcileOptions,
) -> Result<(UnitMapping, ReconcileReport)> {
    let remote_units = remote.list_units()?;
    let local_units = local.local_units()?;

    let mut by_name: HashMap<String, Unit> = HashMap::with_capacity(remote_units.len());
    for unit in remote_units {
        if unit.id.is_none() {
            tracing::warn!("remote unit '{}' has no id, skipping", unit.name);
            continue;
        }
        if by_name.contains_key(&unit.name) {
            tracing::warn!("duplicate remote unit name '{}', keeping the first", unit.name);
            continue;
        }
        by_name.insert(unit.name.clone(), unit);
    }

    let mut mapping = UnitMapping::new();
    let mut report = ReconcileReport::default();

    for unit in &local_units {
        match by_name.remove(&unit.name) {
            Some(existing) => {
                let Some(id) = existing.id else { continue };
                mapping.insert(unit.name.as_str(), id);
                let update = unit.diff_from(&existing);
                if !options.push_local || update.is_empty() {
                    report.unchanged += 1;
                    continue;
                }
                tracing::info!("updating remote unit '{}'", unit.name);
                remote.update_unit(id, &update)?;
                report.updated += 1;
            }
            None if options.push_local => {
                tracing::info!("creating remote unit '{}'", unit.name);
                let created = remote.create_unit(unit)?;
                if let Some(id) = created.id {
                    mapping.insert(unit.name.as_str(), id);
                }
                report.created += 1;
            }
            None => {
                tracing::debug!("local unit '{}' has no remote counterpart", unit.name);
            }
        }
    }

    for (name, unit) in by_name {
        if let Some(id) = unit.id {
            mapping.insert(name, id);
            report.remote_only += 1;
        }
    }

    tracing::info!(
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        remote_only = report.remote_only,
        "reconciled {} units",
        mapping.len()
    );
    Ok((mapping, report))
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
